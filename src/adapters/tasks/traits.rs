//! Task submission abstraction
//!
//! The platform scheduler runs the actual work; callers only hand over a
//! task name, a user label and an argument vector and get a task id back.

use crate::domain::{Result, TaskId};
use async_trait::async_trait;
use std::path::Path;

/// Name of the platform's record upload task
pub const BIBUPLOAD_TASK: &str = "bibupload";

/// A low-level task submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRequest {
    /// Task binary name (e.g. `bibupload`)
    pub name: String,
    /// User label the task runs under
    pub user: String,
    /// Task arguments
    pub args: Vec<String>,
}

impl TaskRequest {
    pub fn new(name: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            user: user.into(),
            args: Vec::new(),
        }
    }

    /// Appends an argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Upload of `file` with the given mode flags (`-a`, `-c`, `-d`, `-r -i`, ...)
    pub fn bibupload(user: impl Into<String>, modes: &[&str], file: &Path, priority: i32) -> Self {
        let mut request = Self::new(BIBUPLOAD_TASK, user);
        for mode in modes {
            request = request.arg(*mode);
        }
        request
            .arg(file.to_string_lossy())
            .arg("-P")
            .arg(priority.to_string())
    }
}

/// Hands tasks to the platform scheduler
#[async_trait]
pub trait TaskSubmitter: Send + Sync {
    /// Submits a task and returns the id the scheduler assigned
    ///
    /// # Errors
    ///
    /// Returns an error if the task could not be queued.
    async fn submit(&self, request: &TaskRequest) -> Result<TaskId>;
}
