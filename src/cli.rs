use clap::{Parser, Subcommand};
use log::Level;
use std::path::PathBuf;

use crate::consts::DEFAULT_CONFIG;
use crate::core::{
    humann::MemoryUse,
    rename::{RenameParams, RenameScheme},
    renorm::NormMode,
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: SubArgs,

    #[arg(
        short = 'v',
        long = "verbose",
        help = "Increase verbosity",
        global = true,
        conflicts_with = "quiet"
    )]
    pub verbose: bool,

    #[arg(short = 'q', long = "quiet", help = "Decrease verbosity", global = true)]
    pub quiet: bool,
}

impl Args {
    pub fn log_level(&self) -> Level {
        if self.verbose {
            Level::Debug
        } else if self.quiet {
            Level::Warn
        } else {
            Level::Info
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum SubArgs {
    #[command(name = "run")]
    Run {
        #[command(flatten)]
        args: RunArgs,
    },
    #[command(name = "validate")]
    Validate {
        #[command(flatten)]
        args: ValidateArgs,
    },
    #[command(name = "rename-pathways")]
    RenamePathways {
        #[command(flatten)]
        args: RenameArgs,
    },
    #[command(name = "rename-gene-families")]
    RenameGeneFamilies {
        #[command(flatten)]
        args: RenameArgs,
    },
    #[command(name = "cpm")]
    Cpm {
        #[command(flatten)]
        args: NormArgs,
    },
    #[command(name = "relab")]
    Relab {
        #[command(flatten)]
        args: NormArgs,
    },
}

/// Profile every sample with humann3 and pool the results
///
/// # Example
///
/// ```bash,no_run
/// humannpipe run -c config.toml -t 8
/// ```
///
/// # Note
///
/// * Values given here override the ones in --config
/// * If not config.toml is provided, it will default to config.toml
#[derive(Debug, Parser, Clone)]
pub struct RunArgs {
    #[arg(
        short = 'c',
        long = "config",
        help = "Path to the configuration file",
        value_name = "CONFIG",
        default_value = DEFAULT_CONFIG
    )]
    pub config: PathBuf,

    #[arg(
        short = 't',
        long = "threads",
        help = "Number of threads humann3 should use",
        value_name = "THREADS",
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub threads: Option<u32>,

    #[arg(
        short = 'm',
        long = "memory-use",
        help = "Amount of memory humann3 may use",
        value_name = "MODE"
    )]
    pub memory_use: Option<MemoryUse>,

    #[arg(
        long = "stat-q",
        help = "Quantile value for the MetaPhlAn robust average",
        value_name = "Q"
    )]
    pub stat_q: Option<f64>,

    #[arg(
        short = 'o',
        long = "output-dir",
        help = "Directory to write pooled tables to",
        value_name = "DIR"
    )]
    pub output_dir: Option<PathBuf>,

    #[arg(long = "scratch-dir", help = "Parent directory for scratch files", value_name = "DIR")]
    pub scratch_dir: Option<PathBuf>,
}

/// Check every input directory of a config without running any tool
///
/// # Example
///
/// ```bash,no_run
/// humannpipe validate -c config.toml
/// ```
#[derive(Debug, Parser, Clone)]
pub struct ValidateArgs {
    #[arg(
        short = 'c',
        long = "config",
        help = "Path to the configuration file",
        value_name = "CONFIG",
        default_value = DEFAULT_CONFIG
    )]
    pub config: PathBuf,

    #[arg(long = "check-tools", help = "Also check that every external tool can be launched")]
    pub check_tools: bool,
}

/// Rename the feature ids of a pooled table
///
/// # Example
///
/// ```bash,no_run
/// humannpipe rename-gene-families -i genefamilies.tsv -o renamed.tsv -n kegg-orthology -s
/// ```
///
/// # Note
///
/// * Either --name or --reference-mapping must be given
#[derive(Debug, Parser, Clone)]
pub struct RenameArgs {
    #[arg(short = 'i', long = "input", help = "Pooled table to rename", value_name = "TABLE")]
    pub input: PathBuf,

    #[arg(short = 'o', long = "output", help = "Renamed table", value_name = "TABLE")]
    pub output: PathBuf,

    #[arg(
        short = 'n',
        long = "name",
        help = "Name of the reference database to use for renaming",
        value_name = "NAME",
        required_unless_present = "reference_mapping"
    )]
    pub name: Option<RenameScheme>,

    #[arg(
        short = 'r',
        long = "reference-mapping",
        help = "Directory holding a custom mapping file",
        value_name = "DIR"
    )]
    pub reference_mapping: Option<PathBuf>,

    #[arg(short = 's', long = "simplify", help = "Remove non-alphanumeric characters from names")]
    pub simplify: bool,
}

impl RenameArgs {
    pub fn params(&self) -> RenameParams {
        RenameParams {
            name: self.name,
            reference_mapping: self.reference_mapping.clone(),
            simplify: self.simplify,
        }
    }
}

/// Normalize a pooled table
///
/// # Example
///
/// ```bash,no_run
/// humannpipe cpm -i genefamilies.tsv -o genefamilies.cpm.tsv -m levelwise
/// ```
#[derive(Debug, Parser, Clone)]
pub struct NormArgs {
    #[arg(short = 'i', long = "input", help = "Pooled table to normalize", value_name = "TABLE")]
    pub input: PathBuf,

    #[arg(short = 'o', long = "output", help = "Normalized table", value_name = "TABLE")]
    pub output: PathBuf,

    #[arg(
        short = 'm',
        long = "mode",
        help = "Normalize all levels by [community] total or [levelwise] totals",
        value_name = "MODE",
        default_value = "community"
    )]
    pub mode: NormMode,
}
