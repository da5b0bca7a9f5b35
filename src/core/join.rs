use std::path::{Path, PathBuf};

use crate::{
    consts::*,
    core::OutputKind,
    error::Result,
    executor::{job::Job, manager::Executor},
    table::PooledTable,
};

/// Build the humann_join_tables invocation pooling every per-sample
/// file of `kind` found in `input_dir`
pub fn join_job(input_dir: &Path, kind: OutputKind, output: &Path) -> Job {
    Job::new(JOIN_TABLES)
        .flag("-i", input_dir)
        .flag("-o", output)
        .flag("--file_name", kind.name())
}

/// Pool the per-sample outputs of `kind` into one table.
///
/// The joined table is re-serialized without its leading comment line,
/// which humann_renorm_table would read as the header. Returns the path
/// of the uncommented table inside `pooled_dir`.
pub fn join_tables(
    input_dir: &Path,
    pooled_dir: &Path,
    kind: OutputKind,
    executor: &mut dyn Executor,
) -> Result<PathBuf> {
    let joined = pooled_dir.join(format!("{}.{}.{}", kind.name(), JOINED_SUFFIX, TSV));
    let staged = pooled_dir.join(format!("{}.{}", kind.name(), TSV));

    executor.execute(&join_job(input_dir, kind, &joined))?;

    let table = PooledTable::read(&joined)?;
    table.write_uncommented(&staged)?;

    log::info!(
        "INFO [{}]: pooled {} features across {} samples",
        kind,
        table.n_features(),
        table.n_columns()
    );

    Ok(staged)
}
