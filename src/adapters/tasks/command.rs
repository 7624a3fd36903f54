//! Task submission through the platform's task binaries
//!
//! Runs `<bin_dir>/<task> -u <user> <args...>` and reads the id from the
//! `Task #<id> submitted.` line the binaries print once the task is queued.

use super::traits::{TaskRequest, TaskSubmitter};
use crate::domain::{Result, SubmissionError, TaskId};
use async_trait::async_trait;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tokio::process::Command;

fn task_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"Task #(\d+) submitted").expect("task id pattern is a valid regex")
    })
}

/// Extracts the task id from submitter output
pub fn parse_task_id(output: &str) -> Option<TaskId> {
    task_id_pattern()
        .captures(output)
        .and_then(|cap| cap[1].parse().ok())
}

/// Submits tasks by invoking the platform binaries
#[derive(Debug, Clone)]
pub struct CommandSubmitter {
    bin_dir: PathBuf,
}

impl CommandSubmitter {
    pub fn new(bin_dir: impl Into<PathBuf>) -> Self {
        Self {
            bin_dir: bin_dir.into(),
        }
    }

    pub fn bin_dir(&self) -> &Path {
        &self.bin_dir
    }
}

#[async_trait]
impl TaskSubmitter for CommandSubmitter {
    async fn submit(&self, request: &TaskRequest) -> Result<TaskId> {
        let program = self.bin_dir.join(&request.name);
        tracing::debug!(
            program = %program.display(),
            user = %request.user,
            args = ?request.args,
            "Submitting task"
        );

        let output = Command::new(&program)
            .arg("-u")
            .arg(&request.user)
            .args(&request.args)
            .output()
            .await
            .map_err(|e| SubmissionError::LaunchFailed {
                task: request.name.clone(),
                message: format!("{}: {}", program.display(), e),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            return Err(SubmissionError::NonZeroExit {
                task: request.name.clone(),
                status: output.status.code().unwrap_or(-1),
                stderr: stderr.trim().to_string(),
            }
            .into());
        }

        let task_id = parse_task_id(&stdout)
            .or_else(|| parse_task_id(&stderr))
            .ok_or_else(|| SubmissionError::MissingTaskId {
                task: request.name.clone(),
                output: stdout.trim().to_string(),
            })?;

        tracing::info!(task = %request.name, %task_id, "Task submitted");
        Ok(task_id)
    }
}
