use clap::ValueEnum;
use serde::Deserialize;

use std::fmt;
use std::path::Path;

use crate::{
    consts::*,
    core::scratch_dir,
    error::Result,
    executor::{job::Job, manager::Executor},
    table::PooledTable,
};

/// Normalization scheme of humann_renorm_table
#[derive(Deserialize, ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RenormMethod {
    /// copies per million
    Cpm,
    /// relative abundance
    Relab,
}

impl RenormMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cpm => "cpm",
            Self::Relab => "relab",
        }
    }
}

impl fmt::Display for RenormMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Normalize stratified levels by the community total or by each level's total
#[derive(Deserialize, ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum NormMode {
    #[default]
    Community,
    Levelwise,
}

impl NormMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Community => "community",
            Self::Levelwise => "levelwise",
        }
    }
}

/// Build the humann_renorm_table invocation
///
/// # Example
///
/// ```rust, ignore
/// let job = renorm_job(&input, RenormMethod::Cpm, None, &output);
/// assert_eq!(job.value_of("-u"), Some("cpm"));
/// ```
pub fn renorm_job(input: &Path, method: RenormMethod, mode: Option<NormMode>, output: &Path) -> Job {
    let job = Job::new(RENORM_TABLE)
        .flag("-i", input)
        .flag("-o", output)
        .flag("-u", method.as_str());

    match mode {
        Some(mode) => job.flag("-m", mode.as_str()),
        None => job,
    }
}

/// Run one renormalization and load its output
pub fn renorm_table(
    input: &Path,
    method: RenormMethod,
    mode: Option<NormMode>,
    output: &Path,
    executor: &mut dyn Executor,
) -> Result<PooledTable> {
    executor.execute(&renorm_job(input, method, mode, output))?;
    PooledTable::read(output)
}

/// Normalize a pooled table to copies per million
pub fn cpm(table: &PooledTable, mode: NormMode, executor: &mut dyn Executor) -> Result<PooledTable> {
    normalize(table, RenormMethod::Cpm, mode, executor)
}

/// Normalize a pooled table to relative abundance
pub fn relab(table: &PooledTable, mode: NormMode, executor: &mut dyn Executor) -> Result<PooledTable> {
    normalize(table, RenormMethod::Relab, mode, executor)
}

fn normalize(
    table: &PooledTable,
    method: RenormMethod,
    mode: NormMode,
    executor: &mut dyn Executor,
) -> Result<PooledTable> {
    let scratch = scratch_dir(None)?;
    let staged = scratch.path().join(STAGED_TABLE);
    let output = scratch.path().join(format!("{}.{}", method, TSV));

    table.write_uncommented(&staged)?;
    renorm_table(&staged, method, Some(mode), &output, executor)
}
