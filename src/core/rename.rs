use clap::ValueEnum;
use serde::Deserialize;

use std::fmt;
use std::path::{Path, PathBuf};

use crate::{
    consts::*,
    core::scratch_dir,
    error::{PipelineError, Result},
    executor::{job::Job, manager::Executor},
    formats,
    table::PooledTable,
};

/// Reference vocabularies bundled with humann_rename_table
#[derive(Deserialize, ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum RenameScheme {
    KeggOrthology,
    KeggPathway,
    KeggModule,
    Ec,
    MetacycRxn,
    MetacycPwy,
    Pfam,
    Eggnog,
    Go,
    #[value(name = "infogo1000")]
    #[serde(rename = "infogo1000")]
    Infogo1000,
}

impl RenameScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::KeggOrthology => "kegg-orthology",
            Self::KeggPathway => "kegg-pathway",
            Self::KeggModule => "kegg-module",
            Self::Ec => "ec",
            Self::MetacycRxn => "metacyc-rxn",
            Self::MetacycPwy => "metacyc-pwy",
            Self::Pfam => "pfam",
            Self::Eggnog => "eggnog",
            Self::Go => "go",
            Self::Infogo1000 => "infogo1000",
        }
    }
}

impl fmt::Display for RenameScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenameParams {
    pub name: Option<RenameScheme>,
    /// Directory holding a single custom mapping file
    pub reference_mapping: Option<PathBuf>,
    /// Remove non-alphanumeric characters from names
    pub simplify: bool,
}

impl RenameParams {
    pub fn validate(&self) -> Result<()> {
        if self.name.is_none() && self.reference_mapping.is_none() {
            return Err(PipelineError::InvalidParam(
                "renaming needs a reference name or a reference mapping".into(),
            ));
        }

        Ok(())
    }
}

/// Build the humann_rename_table invocation
pub fn rename_job(
    input: &Path,
    params: &RenameParams,
    mapping_file: Option<&Path>,
    output: &Path,
) -> Job {
    let mut job = Job::new(RENAME_TABLE).flag("-i", input).flag("-o", output);

    if let Some(name) = params.name {
        job = job.flag("-n", name.as_str());
    }
    if let Some(mapping) = mapping_file {
        job = job.flag("-c", mapping);
    }

    job.switch("-s", params.simplify)
}

/// Relabel the features of a pathway table
pub fn rename_pathways(
    table: &PooledTable,
    params: &RenameParams,
    executor: &mut dyn Executor,
) -> Result<PooledTable> {
    rename_table(table, params, executor)
}

/// Relabel the features of a gene family table
pub fn rename_gene_families(
    table: &PooledTable,
    params: &RenameParams,
    executor: &mut dyn Executor,
) -> Result<PooledTable> {
    rename_table(table, params, executor)
}

fn rename_table(
    table: &PooledTable,
    params: &RenameParams,
    executor: &mut dyn Executor,
) -> Result<PooledTable> {
    params.validate()?;

    let mapping_file = params
        .reference_mapping
        .as_deref()
        .map(formats::resolve_single_file)
        .transpose()?;

    let scratch = scratch_dir(None)?;
    let staged = scratch.path().join(STAGED_TABLE);
    let output = scratch.path().join(format!("renamed.{}", TSV));

    table.write_uncommented(&staged)?;
    executor.execute(&rename_job(&staged, params, mapping_file.as_deref(), &output))?;

    PooledTable::read(&output)
}
