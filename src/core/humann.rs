use clap::ValueEnum;
use serde::Deserialize;

use std::fmt;
use std::path::{Path, PathBuf};

use crate::{
    consts::*,
    error::{PipelineError, Result},
    executor::{job::Job, manager::Executor},
    formats::{self, Bowtie2Index, Sample, SampleSequences},
};

/// Memory mode handed to `humann3 --memory-use`
#[derive(Deserialize, ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MemoryUse {
    #[default]
    Minimum,
    Maximum,
}

impl MemoryUse {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Minimum => "minimum",
            Self::Maximum => "maximum",
        }
    }
}

impl fmt::Display for MemoryUse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tuning parameters held constant across every sample of a batch,
/// read from the `[params]` table of a run config
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct HumannParams {
    pub threads: u32,
    pub memory_use: MemoryUse,
    /// Quantile for the MetaPhlAn robust average, in [0, 1]
    pub metaphlan_stat_q: f64,
}

impl Default for HumannParams {
    fn default() -> Self {
        Self {
            threads: DEFAULT_THREADS,
            memory_use: MemoryUse::default(),
            metaphlan_stat_q: DEFAULT_STAT_Q,
        }
    }
}

impl HumannParams {
    pub fn validate(&self) -> Result<()> {
        if self.threads == 0 {
            return Err(PipelineError::InvalidParam(
                "threads must be a positive integer".into(),
            ));
        }

        if !(0.0..=1.0).contains(&self.metaphlan_stat_q) {
            return Err(PipelineError::InvalidParam(format!(
                "metaphlan_stat_q must be within [0, 1], got {}",
                self.metaphlan_stat_q
            )));
        }

        Ok(())
    }
}

/// Reference databases resolved from their directories
#[derive(Debug, Clone, PartialEq)]
pub struct HumannDatabases {
    pub nucleotide: PathBuf,
    pub protein: PathBuf,
    pub pathway: PathBuf,
    pub pathway_mapping: PathBuf,
    pub bowtie2: Bowtie2Index,
}

impl HumannDatabases {
    /// Validate each directory against its declared format and resolve
    /// the single-file databases and the bowtie2 basename.
    pub fn resolve(
        nucleotide: &Path,
        protein: &Path,
        pathway: &Path,
        pathway_mapping: &Path,
        bowtie2: &Path,
    ) -> Result<Self> {
        formats::HUMANN_DB.validate(nucleotide)?;
        formats::HUMANN_DB.validate(protein)?;
        formats::BOWTIE2_INDEX.validate(bowtie2)?;

        Ok(Self {
            nucleotide: nucleotide.to_path_buf(),
            protein: protein.to_path_buf(),
            pathway: formats::resolve_single_file(pathway)?,
            pathway_mapping: formats::resolve_single_file(pathway_mapping)?,
            bowtie2: Bowtie2Index::from_dir(bowtie2)?,
        })
    }
}

/// Options forwarded verbatim to MetaPhlAn through humann3
pub fn metaphlan_options(index: &Bowtie2Index, stat_q: f64) -> String {
    format!(
        "--offline --bowtie2db {} --index {} --stat_q {}",
        index.dir.display(),
        index.basename,
        stat_q
    )
}

/// Build the humann3 invocation for one sample
///
/// # Example
///
/// ```rust, ignore
/// let job = humann_job(&sample, &databases, &params, &scratch);
/// assert_eq!(job.value_of("--threads"), Some("4"));
/// ```
pub fn humann_job(
    sample: &Sample,
    databases: &HumannDatabases,
    params: &HumannParams,
    output_dir: &Path,
) -> Job {
    let pathways = format!(
        "{},{}",
        databases.pathway_mapping.display(),
        databases.pathway.display()
    );

    Job::new(HUMANN)
        .flag("-i", &sample.path)
        .flag("-o", output_dir)
        .flag("--threads", params.threads.to_string())
        .flag("--memory-use", params.memory_use.as_str())
        .flag("--output-format", TSV)
        .arg("--remove-column-description-output")
        .flag("--nucleotide-database", &databases.nucleotide)
        .flag("--protein-database", &databases.protein)
        .flag("--pathways-database", pathways)
        .flag(
            "--metaphlan-options",
            metaphlan_options(&databases.bowtie2, params.metaphlan_stat_q),
        )
}

/// Run humann3 once per sample, in collection order.
///
/// The first failing sample aborts the batch.
pub fn profile_samples(
    samples: &SampleSequences,
    databases: &HumannDatabases,
    params: &HumannParams,
    output_dir: &Path,
    executor: &mut dyn Executor,
) -> Result<()> {
    let total = samples.len();

    for (idx, sample) in samples.iter().enumerate() {
        log::info!(
            "INFO [{}]: profiling sample {} ({}/{})",
            HUMANN,
            sample.id,
            idx + 1,
            total
        );

        executor.execute(&humann_job(sample, databases, params, output_dir))?;
    }

    Ok(())
}
