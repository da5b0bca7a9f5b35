use serde::Deserialize;

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::cli::RunArgs;
use crate::consts::*;
use crate::core::{
    humann::{HumannDatabases, HumannParams},
    RunRequest,
};
use crate::error::{PipelineError, Result};
use crate::formats::SampleSequences;

/// A struct representing a run configuration file.
///
/// # Fields
///
/// * `metadata` - Free-form key-value pairs, logged at start.
/// * `packages` - Executable overrides, tool name -> path.
/// * `inputs` - Sequence and database directories.
/// * `params` - humann3 tuning parameters.
/// * `global` - Output and scratch locations.
///
/// # Example
///
/// ``` toml
/// [metadata]
/// project = "gut-study"
///
/// [packages]
/// humann3 = "/opt/humann/bin/humann3"
///
/// [inputs]
/// sequences = "reads"
/// nucleotide_database = "db/chocophlan"
/// protein_database = "db/uniref"
/// pathway_database = "db/pathways"
/// pathway_mapping = "db/pathway_mapping"
/// bowtie_database = "db/metaphlan"
///
/// [params]
/// threads = 4
/// memory_use = "minimum"
/// metaphlan_stat_q = 0.2
///
/// [global]
/// output_dir = "results"
/// ```
#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    #[serde(default)]
    pub packages: HashMap<String, String>,
    pub inputs: Inputs,
    #[serde(default)]
    pub params: HumannParams,
    #[serde(default)]
    pub global: Global,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Inputs {
    pub sequences: PathBuf,
    pub nucleotide_database: PathBuf,
    pub protein_database: PathBuf,
    pub pathway_database: PathBuf,
    pub pathway_mapping: PathBuf,
    pub bowtie_database: PathBuf,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Global {
    pub output_dir: PathBuf,
    pub scratch_dir: Option<PathBuf>,
    /// Append a timestamped run directory under `output_dir`
    pub timestamp: bool,
}

impl Default for Global {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            scratch_dir: None,
            timestamp: true,
        }
    }
}

impl Config {
    /// Read a configuration file and return a Config struct.
    ///
    /// Relative input paths are resolved against the directory
    /// holding the configuration file.
    ///
    /// # Example
    ///
    /// ``` rust, no_run
    /// use humannpipe::config::Config;
    /// use std::path::PathBuf;
    ///
    /// let config = Config::read(PathBuf::from("config.toml"));
    /// ```
    pub fn read(config: PathBuf) -> Result<Self> {
        let mut file = File::open(&config)
            .map_err(|e| PipelineError::Config(format!("{}: {}", config.display(), e)))?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let mut parsed = Self::from_toml(&contents)?;
        if let Some(base) = config.parent().filter(|p| !p.as_os_str().is_empty()) {
            parsed.rebase(base);
        }

        Ok(parsed)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    fn rebase(&mut self, base: &Path) {
        let join = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };

        join(&mut self.inputs.sequences);
        join(&mut self.inputs.nucleotide_database);
        join(&mut self.inputs.protein_database);
        join(&mut self.inputs.pathway_database);
        join(&mut self.inputs.pathway_mapping);
        join(&mut self.inputs.bowtie_database);
        join(&mut self.global.output_dir);
        if let Some(scratch) = self.global.scratch_dir.as_mut() {
            join(scratch);
        }
    }

    /// In-place override of the config with command-line values
    ///
    /// # Example
    ///
    /// ``` rust, ignore
    /// let mut config = Config::read(args.config.clone())?;
    /// config.aware(&args).validate()?;
    /// ```
    pub fn aware(&mut self, args: &RunArgs) -> &mut Self {
        if let Some(threads) = args.threads {
            self.params.threads = threads;
        }
        if let Some(memory_use) = args.memory_use {
            self.params.memory_use = memory_use;
        }
        if let Some(stat_q) = args.stat_q {
            self.params.metaphlan_stat_q = stat_q;
        }
        if let Some(output_dir) = &args.output_dir {
            self.global.output_dir = output_dir.clone();
        }
        if let Some(scratch_dir) = &args.scratch_dir {
            self.global.scratch_dir = Some(scratch_dir.clone());
        }

        self
    }

    pub fn validate(&self) -> Result<()> {
        self.params.validate()
    }

    /// Resolve every input directory against its declared format
    pub fn request(&self) -> Result<RunRequest> {
        self.validate()?;

        let inputs = &self.inputs;
        let databases = HumannDatabases::resolve(
            &inputs.nucleotide_database,
            &inputs.protein_database,
            &inputs.pathway_database,
            &inputs.pathway_mapping,
            &inputs.bowtie_database,
        )?;

        Ok(RunRequest {
            samples: SampleSequences::from_dir(&inputs.sequences)?,
            databases,
            params: self.params.clone(),
            scratch_root: self.global.scratch_dir.clone(),
        })
    }

    /// Create the directory the pooled tables are written to,
    /// with a timestamp appended unless disabled.
    ///
    /// # Example
    ///
    /// ``` rust, no_run
    /// use humannpipe::config::Config;
    ///
    /// let config = Config::read("config.toml".into()).unwrap();
    /// let output = config.create_global_output_dir().unwrap();
    ///
    /// // results/humannpipe_run_202610191200
    /// ```
    pub fn create_global_output_dir(&self) -> Result<PathBuf> {
        let dir = if self.global.timestamp {
            self.global.output_dir.join(format!(
                "{}_{}",
                OUTPUT,
                chrono::Local::now().format("%Y%m%d%H%M")
            ))
        } else {
            self.global.output_dir.clone()
        };

        std::fs::create_dir_all(&dir)?;

        Ok(dir)
    }
}
