pub mod cli;
pub mod config;
pub mod consts;
pub mod core;
pub mod error;
pub mod executor;
pub mod formats;
pub mod table;

pub use error::{PipelineError, Result};
