//! Forwarding of submitted records to the upload pipeline
//!
//! A web submission leaves the generated record in `<curdir>/<record_file>`.
//! The forwarder stages a copy in the shared directory, queues a
//! `bibupload -r -i` task for it and leaves the task id in
//! `<curdir>/bibupload_id` for the later steps of the workflow.

use crate::adapters::tasks::{TaskRequest, TaskSubmitter};
use crate::config::BibTasksConfig;
use crate::domain::{BibTaskError, Result, TaskId};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// File in the submission directory receiving the task id
pub const BIBUPLOAD_ID_FILE: &str = "bibupload_id";

/// Timestamp layout of staged file names
pub const STAGED_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H:%M:%S";

/// Insert-or-replace upload modes
const INSERT_OR_REPLACE: [&str; 2] = ["-r", "-i"];

/// Staged file name for a report number
///
/// Slashes in the report number are replaced so the name stays a single
/// path component.
pub fn staged_file_name(report_number: &str, now: DateTime<Local>) -> String {
    format!(
        "{}_{}",
        report_number.replace('/', "_"),
        now.format(STAGED_TIMESTAMP_FORMAT)
    )
}

/// Copies submitted records to the staging directory and queues their upload
pub struct RecordForwarder {
    staging_dir: PathBuf,
    record_file: String,
    task_user: String,
    priority: i32,
    submitter: Arc<dyn TaskSubmitter>,
}

impl RecordForwarder {
    pub fn new(
        staging_dir: impl Into<PathBuf>,
        record_file: impl Into<String>,
        task_user: impl Into<String>,
        priority: i32,
        submitter: Arc<dyn TaskSubmitter>,
    ) -> Self {
        Self {
            staging_dir: staging_dir.into(),
            record_file: record_file.into(),
            task_user: task_user.into(),
            priority,
            submitter,
        }
    }

    /// Forwarder set up from `[submission]` and `[platform]`
    pub fn from_config(config: &BibTasksConfig, submitter: Arc<dyn TaskSubmitter>) -> Self {
        Self::new(
            config.staging_dir(),
            config.submission.record_file.as_str(),
            config.submission.task_user.as_str(),
            config.submission.priority,
            submitter,
        )
    }

    /// Overrides the staging directory
    pub fn with_staging_dir(mut self, staging_dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = staging_dir.into();
        self
    }

    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    /// Stages `<curdir>/<record_file>` and submits it for insert-or-replace
    ///
    /// # Errors
    ///
    /// Returns [`BibTaskError::WebSubmit`] when the record file is missing,
    /// an I/O error when staging or writing the id file fails, and the
    /// submitter's error when the task can't be queued.
    pub async fn insert_record(&self, curdir: &Path, report_number: &str) -> Result<TaskId> {
        let initial_file = curdir.join(&self.record_file);
        let exists = tokio::fs::try_exists(&initial_file).await.map_err(|e| {
            BibTaskError::Io(format!(
                "Could not access record file {}: {}",
                initial_file.display(),
                e
            ))
        })?;
        if !exists {
            return Err(BibTaskError::WebSubmit(format!(
                "Could not find record file: {}",
                initial_file.display()
            )));
        }

        let final_file = self
            .staging_dir
            .join(staged_file_name(report_number, Local::now()));
        tokio::fs::copy(&initial_file, &final_file)
            .await
            .map_err(|e| {
                BibTaskError::Io(format!(
                    "Could not copy {} to {}: {}",
                    initial_file.display(),
                    final_file.display(),
                    e
                ))
            })?;
        tracing::info!(
            report_number,
            staged = %final_file.display(),
            "Record file staged"
        );

        let request = TaskRequest::bibupload(
            self.task_user.as_str(),
            &INSERT_OR_REPLACE,
            &final_file,
            self.priority,
        );
        let task_id = self.submitter.submit(&request).await?;

        tokio::fs::write(curdir.join(BIBUPLOAD_ID_FILE), task_id.to_string()).await?;
        tracing::info!(report_number, %task_id, "Record submitted for upload");

        Ok(task_id)
    }
}
