use std::ffi::{OsStr, OsString};
use std::fmt;

/// Struct to represent one external tool invocation
///
/// # Example
///
/// ```rust, no_run
/// use humannpipe::executor::job::Job;
///
/// let job = Job::new("humann_renorm_table")
///     .flag("-i", "genefamilies.tsv")
///     .flag("-o", "genefamilies.cpm.tsv")
///     .flag("-u", "cpm");
///
/// assert_eq!(
///     job.to_string(),
///     "humann_renorm_table -i genefamilies.tsv -o genefamilies.cpm.tsv -u cpm"
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    tool: String,
    args: Vec<OsString>,
}

impl Job {
    /// Create a new job for `tool` with no arguments
    pub fn new(tool: &str) -> Self {
        Self {
            tool: tool.to_string(),
            args: Vec::new(),
        }
    }

    /// Add an argument to the job
    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    /// Add multiple arguments to the job
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|arg| arg.as_ref().to_os_string()));
        self
    }

    /// Add a flag followed by its value
    pub fn flag<S: AsRef<OsStr>>(self, name: &str, value: S) -> Self {
        self.arg(name).arg(value)
    }

    /// Add a bare switch only when `on` is set
    pub fn switch(self, name: &str, on: bool) -> Self {
        if on {
            self.arg(name)
        } else {
            self
        }
    }

    pub fn tool(&self) -> &str {
        &self.tool
    }

    pub fn get_args(&self) -> &[OsString] {
        &self.args
    }

    /// Value following `flag`, if present and valid UTF-8
    pub fn value_of(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a.as_os_str() == OsStr::new(flag))
            .and_then(|idx| self.args.get(idx + 1))
            .and_then(|value| value.to_str())
    }

    /// Number of times `flag` appears in the argument list
    pub fn count_of(&self, flag: &str) -> usize {
        self.args
            .iter()
            .filter(|a| a.as_os_str() == OsStr::new(flag))
            .count()
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tool)?;
        for arg in &self.args {
            let arg = arg.to_string_lossy();
            if arg.contains(char::is_whitespace) {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}
