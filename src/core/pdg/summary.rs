//! PDG sync summary and reporting

use crate::domain::TaskId;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// The three change-sets a run produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChangeKind {
    /// New PDG fields for records that had none
    Append,
    /// Complete `084` block of records whose PDG values changed
    Correct,
    /// PDG fields to strip from records no longer in the feed
    Delete,
}

impl ChangeKind {
    pub const ALL: [ChangeKind; 3] = [ChangeKind::Append, ChangeKind::Correct, ChangeKind::Delete];

    /// Output file suffix
    pub fn file_name(self) -> &'static str {
        match self {
            ChangeKind::Append => "append.xml",
            ChangeKind::Correct => "correct.xml",
            ChangeKind::Delete => "delete.xml",
        }
    }

    /// Upload mode flag matching the change-set
    pub fn upload_mode(self) -> &'static str {
        match self {
            ChangeKind::Append => "-a",
            ChangeKind::Correct => "-c",
            ChangeKind::Delete => "-d",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Append => write!(f, "append"),
            ChangeKind::Correct => write!(f, "correct"),
            ChangeKind::Delete => write!(f, "delete"),
        }
    }
}

/// A change-set file written to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenChangeSet {
    pub kind: ChangeKind,
    pub path: PathBuf,
    pub records: usize,
}

/// A change-set queued for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedChangeSet {
    pub kind: ChangeKind,
    pub path: PathBuf,
    pub task_id: TaskId,
}

/// A change-set whose upload could not be queued
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedSubmission {
    pub kind: ChangeKind,
    pub path: PathBuf,
    pub message: String,
}

/// Summary of a PDG sync run
#[derive(Debug, Clone, Default)]
pub struct PdgSyncSummary {
    /// Records matching the PDG search term
    pub search_hits: usize,

    /// Records with usable current PDG data
    pub current_records: usize,

    /// Records that could not be fetched or carry no `084` field
    pub bad_records: usize,

    /// Snapshot elements read from the input file
    pub input_elements: usize,

    pub valid_elements: usize,
    pub missing_elements: usize,
    pub invalid_elements: usize,

    /// Sizes of the add/compare/delete sets
    pub to_add: usize,
    pub to_compare: usize,
    pub to_delete: usize,

    /// Records per change-set
    pub appended: usize,
    pub corrected: usize,
    pub deleted: usize,

    /// Report files written (bad, missing and invalid lists)
    pub reports: Vec<PathBuf>,

    pub change_sets: Vec<WrittenChangeSet>,
    pub submitted: Vec<SubmittedChangeSet>,
    pub failed_submissions: Vec<FailedSubmission>,

    pub dry_run: bool,
    pub duration: Duration,
}

impl PdgSyncSummary {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Self::default()
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Total records across the three change-sets
    pub fn total_changes(&self) -> usize {
        self.appended + self.corrected + self.deleted
    }

    /// Records of one change-set
    pub fn changes_for(&self, kind: ChangeKind) -> usize {
        match kind {
            ChangeKind::Append => self.appended,
            ChangeKind::Correct => self.corrected,
            ChangeKind::Delete => self.deleted,
        }
    }

    /// Path of the written change-set of one kind
    pub fn change_set_path(&self, kind: ChangeKind) -> Option<&PathBuf> {
        self.change_sets
            .iter()
            .find(|written| written.kind == kind)
            .map(|written| &written.path)
    }

    /// True when every attempted submission was queued
    pub fn is_successful(&self) -> bool {
        self.failed_submissions.is_empty()
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            search_hits = self.search_hits,
            current_records = self.current_records,
            bad_records = self.bad_records,
            input_elements = self.input_elements,
            valid = self.valid_elements,
            missing = self.missing_elements,
            invalid = self.invalid_elements,
            appended = self.appended,
            corrected = self.corrected,
            deleted = self.deleted,
            dry_run = self.dry_run,
            duration_secs = self.duration.as_secs(),
            "PDG update completed"
        );

        for submitted in &self.submitted {
            tracing::info!(
                kind = %submitted.kind,
                task_id = %submitted.task_id,
                path = %submitted.path.display(),
                "Change-set submitted"
            );
        }

        if !self.failed_submissions.is_empty() {
            tracing::warn!(
                failed = self.failed_submissions.len(),
                "PDG update completed with failed submissions"
            );
            for failure in &self.failed_submissions {
                tracing::warn!(
                    kind = %failure.kind,
                    path = %failure.path.display(),
                    message = %failure.message,
                    "Submission failed"
                );
            }
        }
    }
}
