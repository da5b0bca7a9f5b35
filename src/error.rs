use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("{tool} exited with {status}")]
    ToolFailed { tool: String, status: ExitStatus },

    #[error("failed to launch {tool}: {source}")]
    ToolSpawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid bowtie2 index: {0}")]
    InvalidIndex(String),

    #[error("invalid directory format: {0}")]
    InvalidFormat(String),

    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("malformed table {path}: {reason}")]
    Table { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl From<toml::de::Error> for PipelineError {
    fn from(err: toml::de::Error) -> Self {
        PipelineError::Config(err.to_string())
    }
}
