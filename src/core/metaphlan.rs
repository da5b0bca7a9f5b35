use std::path::{Path, PathBuf};

use crate::{
    consts::*,
    error::{PipelineError, Result},
    executor::{job::Job, manager::Executor},
    table::PooledTable,
};

/// Find every per-sample MetaPhlAn profile anywhere under `dir`, sorted
pub fn find_profiles(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut profiles = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        for entry in std::fs::read_dir(&current)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() {
                pending.push(path);
            } else if entry
                .file_name()
                .to_string_lossy()
                .ends_with(METAPHLAN_PROFILE_SUFFIX)
            {
                profiles.push(path);
            }
        }
    }

    if profiles.is_empty() {
        return Err(PipelineError::InvalidFormat(format!(
            "no *{} files found under {}",
            METAPHLAN_PROFILE_SUFFIX,
            dir.display()
        )));
    }

    profiles.sort();
    Ok(profiles)
}

pub fn merge_job(profiles: &[PathBuf], output: &Path) -> Job {
    Job::new(MERGE_METAPHLAN).flag("-o", output).args(profiles)
}

/// Merge the taxonomic profiles of all samples into one table
pub fn merge_taxonomy(
    profiles_dir: &Path,
    pooled_dir: &Path,
    executor: &mut dyn Executor,
) -> Result<PooledTable> {
    let profiles = find_profiles(profiles_dir)?;
    let output = pooled_dir.join(format!("{}.{}", TAXONOMY, TSV));

    log::info!(
        "INFO [{}]: merging {} taxonomic profiles",
        MERGE_METAPHLAN,
        profiles.len()
    );

    executor.execute(&merge_job(&profiles, &output))?;
    PooledTable::read(&output)
}
