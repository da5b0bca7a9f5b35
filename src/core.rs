pub mod humann;
pub mod join;
pub mod metaphlan;
pub mod rename;
pub mod renorm;

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::{
    consts::*,
    error::{PipelineError, Result},
    executor::manager::Executor,
    formats::SampleSequences,
    table::PooledTable,
};
use humann::{HumannDatabases, HumannParams};
use renorm::RenormMethod;

/// Kinds of pooled table produced by a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OutputKind {
    GeneFamilies,
    PathCoverage,
    PathAbundance,
    Taxonomy,
}

impl OutputKind {
    pub const ALL: [OutputKind; 4] = [
        OutputKind::GeneFamilies,
        OutputKind::PathCoverage,
        OutputKind::PathAbundance,
        OutputKind::Taxonomy,
    ];

    /// File-name token humann3 uses for this kind
    pub fn name(&self) -> &'static str {
        match self {
            Self::GeneFamilies => GENEFAMILIES,
            Self::PathCoverage => PATHCOVERAGE,
            Self::PathAbundance => PATHABUNDANCE,
            Self::Taxonomy => TAXONOMY,
        }
    }

    /// Renormalization applied after joining; taxonomy is merged instead
    pub fn method(&self) -> Option<RenormMethod> {
        match self {
            Self::GeneFamilies => Some(RenormMethod::Cpm),
            Self::PathCoverage | Self::PathAbundance => Some(RenormMethod::Relab),
            Self::Taxonomy => None,
        }
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Everything a run needs, already validated
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub samples: SampleSequences,
    pub databases: HumannDatabases,
    pub params: HumannParams,
    /// Parent directory for the scratch tree; system temp if unset
    pub scratch_root: Option<PathBuf>,
}

/// One pooled table per output kind
#[derive(Debug, Clone, Default)]
pub struct RunOutputs {
    tables: HashMap<OutputKind, PooledTable>,
}

impl RunOutputs {
    pub fn get(&self, kind: OutputKind) -> Option<&PooledTable> {
        self.tables.get(&kind)
    }

    pub fn insert(&mut self, kind: OutputKind, table: PooledTable) {
        self.tables.insert(kind, table);
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn kinds(&self) -> Vec<OutputKind> {
        let mut kinds = self.tables.keys().copied().collect::<Vec<_>>();
        kinds.sort();
        kinds
    }

    /// Write `<kind>.tsv` for every table into `dir`
    pub fn write_all(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;

        let mut written = Vec::new();
        for kind in self.kinds() {
            if let Some(table) = self.tables.get(&kind) {
                let path = dir.join(format!("{}.{}", kind, TSV));
                table.write(&path)?;
                written.push(path);
            }
        }

        Ok(written)
    }

    pub fn into_inner(self) -> HashMap<OutputKind, PooledTable> {
        self.tables
    }
}

/// Create a scratch directory that is removed when dropped
pub fn scratch_dir(root: Option<&Path>) -> Result<TempDir> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(HUMANNPIPE);

    let dir = match root {
        Some(root) => {
            std::fs::create_dir_all(root)?;
            builder.tempdir_in(root)?
        }
        None => builder.tempdir()?,
    };

    log::debug!("scratch directory at {}", dir.path().display());
    Ok(dir)
}

/// Profile every sample, then pool and renormalize each output kind.
///
/// # Example
///
/// ```rust, no_run
/// use humannpipe::{config::Config, core::run, executor::LocalExecutor};
///
/// let config = Config::read("config.toml".into()).unwrap();
/// let request = config.request().unwrap();
/// let outputs = run(&request, &mut LocalExecutor::new()).unwrap();
/// assert_eq!(outputs.len(), 4);
/// ```
pub fn run(request: &RunRequest, executor: &mut dyn Executor) -> Result<RunOutputs> {
    request.params.validate()?;
    if request.samples.is_empty() {
        return Err(PipelineError::InvalidFormat("no samples to profile".into()));
    }

    log::info!(
        "INFO [{}]: running {} samples with {} threads",
        HUMANNPIPE,
        request.samples.len(),
        request.params.threads
    );

    // INFO: dropped on every exit path, success or failure
    let scratch = scratch_dir(request.scratch_root.as_deref())?;
    let profiles_dir = scratch.path().join("profiles");
    let pooled_dir = scratch.path().join("pooled");
    std::fs::create_dir_all(&profiles_dir)?;
    std::fs::create_dir_all(&pooled_dir)?;

    humann::profile_samples(
        &request.samples,
        &request.databases,
        &request.params,
        &profiles_dir,
        executor,
    )?;

    let mut outputs = RunOutputs::default();
    for kind in OutputKind::ALL {
        let table = match kind.method() {
            Some(method) => {
                let staged = join::join_tables(&profiles_dir, &pooled_dir, kind, executor)?;
                let normalized = pooled_dir.join(format!("{}.{}.{}", kind, method, TSV));
                renorm::renorm_table(&staged, method, None, &normalized, executor)?
            }
            None => metaphlan::merge_taxonomy(&profiles_dir, &pooled_dir, executor)?,
        };

        outputs.insert(kind, table);
    }

    log::info!("SUCCESS: produced {} pooled tables", outputs.len());

    Ok(outputs)
}
