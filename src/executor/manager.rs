use std::collections::HashMap;
use std::process::{Command, Stdio};

use crate::{
    error::{PipelineError, Result},
    executor::job::Job,
};

/// Something that can run a [`Job`] to completion.
///
/// The pipeline only builds jobs and hands them over in order; any
/// error returned here aborts the operation that issued the job.
pub trait Executor {
    fn execute(&mut self, job: &Job) -> Result<()>;
}

/// Runs jobs as local child processes, one at a time.
///
/// # Example
///
/// ```rust, no_run
/// use humannpipe::executor::{job::Job, manager::{Executor, LocalExecutor}};
///
/// let mut executor = LocalExecutor::new();
/// executor.execute(&Job::new("humann3").arg("--version")).unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct LocalExecutor {
    /// Executable overrides, tool name -> path
    pub packages: HashMap<String, String>,
}

impl LocalExecutor {
    pub fn new() -> Self {
        Self {
            packages: HashMap::new(),
        }
    }

    pub fn with_packages(packages: HashMap<String, String>) -> Self {
        Self { packages }
    }

    /// Executable that will be launched for `tool`
    pub fn program(&self, tool: &str) -> String {
        self.packages
            .get(tool)
            .cloned()
            .unwrap_or_else(|| tool.to_string())
    }

    /// Check that every tool in `tools` can be launched.
    ///
    /// Only spawn failures count; the exit status of `--version`
    /// varies between tools and is ignored.
    pub fn check(&self, tools: &[&str]) -> Result<()> {
        for tool in tools {
            let program = self.program(tool);
            Command::new(&program)
                .arg("--version")
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .map_err(|source| PipelineError::ToolSpawn {
                    tool: program.clone(),
                    source,
                })?;

            log::debug!("found {}", program);
        }

        Ok(())
    }
}

impl Executor for LocalExecutor {
    fn execute(&mut self, job: &Job) -> Result<()> {
        let program = self.program(job.tool());
        log::info!("INFO [{}]: {}", job.tool(), job);

        let status = Command::new(&program)
            .args(job.get_args())
            .status()
            .map_err(|source| PipelineError::ToolSpawn {
                tool: program.clone(),
                source,
            })?;

        if !status.success() {
            log::error!("ERROR: failed to execute {}", job);
            return Err(PipelineError::ToolFailed {
                tool: job.tool().to_string(),
                status,
            });
        }

        Ok(())
    }
}
