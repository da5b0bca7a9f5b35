pub mod job;
pub mod manager;

pub use job::Job;
pub use manager::{Executor, LocalExecutor};
