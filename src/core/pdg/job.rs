//! PDG sync job orchestration
//!
//! One run goes through these phases:
//!
//! 1. **Fetching current data**: search the source for records with PDG data
//! 2. **Input parsing**: classify the snapshot against the target collection
//! 3. **Matching**: partition record ids into add/compare/delete
//! 4. **Update**: build the three change-sets
//! 5. **Writing changes**: serialize change-sets and reports
//! 6. **Submitting changes** (optional): queue each change-set for upload

use super::parser::{classify_elements, read_elements};
use super::reconcile::{
    check_existing_pdg_fields, create_new_pdg_fields, remove_pdg_fields, ChangeSet,
    ReconciliationSets, CLASSIFICATION_TAG,
};
use super::report::ReportWriter;
use super::summary::{
    ChangeKind, FailedSubmission, PdgSyncSummary, SubmittedChangeSet, WrittenChangeSet,
};
use crate::adapters::source::RecordSource;
use crate::adapters::tasks::{TaskRequest, TaskSubmitter};
use crate::config::BibTasksConfig;
use crate::domain::{Record, RecordId, Result};
use crate::log_phase;
use chrono::Local;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

pub const BAD_RECORDS_FILE: &str = "bad_record_ids";
pub const MISSING_RECORDS_FILE: &str = "missing-records.txt";
pub const INVALID_ELEMENTS_FILE: &str = "invalid-elements.txt";

/// Parameters of one PDG sync run
#[derive(Debug, Clone)]
pub struct PdgSyncOptions {
    /// JSON snapshot to reconcile against
    pub input_file: PathBuf,
    pub output_dir: PathBuf,
    pub dry_run: bool,
    pub search_term: String,
    pub collection: String,
    pub output_prefix: String,
    pub upload_priority: i32,
    pub task_user: String,
}

impl PdgSyncOptions {
    /// Options from configuration; output goes to the shared tmp directory
    pub fn from_config(config: &BibTasksConfig, input_file: impl Into<PathBuf>) -> Self {
        Self {
            input_file: input_file.into(),
            output_dir: PathBuf::from(&config.platform.tmp_shared_dir),
            dry_run: config.application.dry_run,
            search_term: config.pdg.search_term.clone(),
            collection: config.pdg.collection.clone(),
            output_prefix: config.pdg.output_prefix.clone(),
            upload_priority: config.pdg.upload_priority,
            task_user: config.pdg.task_user.clone(),
        }
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Reconciles record PDG fields against a snapshot
pub struct PdgSyncJob {
    source: Arc<dyn RecordSource>,
    submitter: Option<Arc<dyn TaskSubmitter>>,
    options: PdgSyncOptions,
}

impl PdgSyncJob {
    /// Create a new job
    ///
    /// Change-sets are queued for upload only when a submitter is given and
    /// the run is not a dry run.
    pub fn new(
        source: Arc<dyn RecordSource>,
        submitter: Option<Arc<dyn TaskSubmitter>>,
        options: PdgSyncOptions,
    ) -> Self {
        Self {
            source,
            submitter,
            options,
        }
    }

    /// Execute the run
    ///
    /// # Errors
    ///
    /// Fails if the snapshot can't be read or the record source is
    /// unreachable. Per-record problems and write failures end up in the
    /// summary and the logs instead.
    pub async fn run(&self) -> Result<PdgSyncSummary> {
        let start_time = Instant::now();
        let mut summary = PdgSyncSummary::new(self.options.dry_run);
        let reports = ReportWriter::new(
            &self.options.output_dir,
            &self.options.output_prefix,
            Local::now(),
            self.options.dry_run,
        );

        tracing::info!(
            input = %self.options.input_file.display(),
            output_dir = %self.options.output_dir.display(),
            dry_run = self.options.dry_run,
            "Starting PDG update"
        );

        log_phase!("Fetching current data");
        let (current_records, bad_records) = self.fetch_current_records(&mut summary).await?;
        if !bad_records.is_empty() {
            tracing::warn!(count = bad_records.len(), "Records without usable PDG data");
            if let Some(path) = reports.write_list(BAD_RECORDS_FILE, &bad_records) {
                summary.reports.push(path);
            }
        }

        log_phase!("Input parsing");
        let elements = read_elements(&self.options.input_file)?;
        summary.input_elements = elements.len();
        let collection = self
            .source
            .collection_members(&self.options.collection)
            .await?;
        tracing::debug!(
            collection = %self.options.collection,
            members = collection.len(),
            "Collection loaded"
        );
        let parsed = classify_elements(elements, &collection);
        summary.valid_elements = parsed.pdg_data.len();
        summary.missing_elements = parsed.missing.len();
        summary.invalid_elements = parsed.invalid.len();
        tracing::info!(
            valid = summary.valid_elements,
            missing = summary.missing_elements,
            invalid = summary.invalid_elements,
            "Input classified"
        );

        if !parsed.missing.is_empty() {
            if let Some(path) = reports.write_list(MISSING_RECORDS_FILE, &parsed.missing) {
                summary.reports.push(path);
            }
        }
        if !parsed.invalid.is_empty() {
            if let Some(path) = reports.write_list(INVALID_ELEMENTS_FILE, &parsed.invalid) {
                summary.reports.push(path);
            }
        }

        log_phase!("Matching");
        let sets = ReconciliationSets::partition(current_records.keys(), parsed.pdg_data.keys());
        summary.to_add = sets.add.len();
        summary.to_compare = sets.compare.len();
        summary.to_delete = sets.delete.len();
        tracing::info!(
            add = summary.to_add,
            compare = summary.to_compare,
            delete = summary.to_delete,
            "Records matched"
        );

        log_phase!("Update");
        let compared =
            check_existing_pdg_fields(&sets.compare, &parsed.pdg_data, &current_records);
        let mut removals = remove_pdg_fields(&sets.delete, &current_records);
        removals.extend(compared.removals);

        let mut change_sets = BTreeMap::new();
        change_sets.insert(
            ChangeKind::Append,
            create_new_pdg_fields(&sets.add, &parsed.pdg_data),
        );
        change_sets.insert(ChangeKind::Correct, compared.corrections);
        change_sets.insert(ChangeKind::Delete, removals);
        for changes in change_sets.values_mut() {
            changes.retain(|_, record| !record.has_no_data_fields());
        }
        summary.appended = count(&change_sets, ChangeKind::Append);
        summary.corrected = count(&change_sets, ChangeKind::Correct);
        summary.deleted = count(&change_sets, ChangeKind::Delete);

        log_phase!("Writing changes");
        for (kind, changes) in &change_sets {
            if let Some(path) = reports.write_records(kind.file_name(), changes) {
                summary.change_sets.push(WrittenChangeSet {
                    kind: *kind,
                    path,
                    records: changes.len(),
                });
            }
        }

        match &self.submitter {
            Some(_) if self.options.dry_run => {
                tracing::info!("DRY: Skipping submission of change-sets");
            }
            Some(submitter) => {
                log_phase!("Submitting changes");
                self.submit_change_sets(submitter.as_ref(), &mut summary)
                    .await;
            }
            None => {}
        }

        Ok(summary.with_duration(start_time.elapsed()))
    }

    /// Records matching the search term, split into usable and bad ones
    async fn fetch_current_records(
        &self,
        summary: &mut PdgSyncSummary,
    ) -> Result<(BTreeMap<RecordId, Record>, Vec<RecordId>)> {
        let hits: BTreeSet<RecordId> = self
            .source
            .search(&self.options.search_term)
            .await?
            .into_iter()
            .collect();
        summary.search_hits = hits.len();
        tracing::info!(
            count = hits.len(),
            term = %self.options.search_term,
            source = self.source.backend_name(),
            "Records with PDG data found"
        );

        let mut current = BTreeMap::new();
        let mut bad = Vec::new();
        for recid in hits {
            match self.source.get_record(recid).await {
                Ok(Some(record)) if record.has_field(CLASSIFICATION_TAG) => {
                    current.insert(recid, record);
                }
                Ok(Some(_)) => {
                    tracing::warn!(%recid, "Record has no 084 field");
                    bad.push(recid);
                }
                Ok(None) => {
                    tracing::warn!(%recid, "Record could not be found");
                    bad.push(recid);
                }
                Err(e) if e.is_unreachable() => return Err(e),
                Err(e) => {
                    tracing::warn!(%recid, error = %e, "Record could not be fetched");
                    bad.push(recid);
                }
            }
        }

        summary.current_records = current.len();
        summary.bad_records = bad.len();
        Ok((current, bad))
    }

    async fn submit_change_sets(
        &self,
        submitter: &dyn TaskSubmitter,
        summary: &mut PdgSyncSummary,
    ) {
        for written in summary.change_sets.clone() {
            let request = TaskRequest::bibupload(
                self.options.task_user.as_str(),
                &[written.kind.upload_mode()],
                &written.path,
                self.options.upload_priority,
            );

            match submitter.submit(&request).await {
                Ok(task_id) => summary.submitted.push(SubmittedChangeSet {
                    kind: written.kind,
                    path: written.path,
                    task_id,
                }),
                Err(e) => {
                    tracing::warn!(
                        kind = %written.kind,
                        path = %written.path.display(),
                        error = %e,
                        "Could not submit change-set"
                    );
                    summary.failed_submissions.push(FailedSubmission {
                        kind: written.kind,
                        path: written.path,
                        message: e.to_string(),
                    });
                }
            }
        }
    }
}

fn count(change_sets: &BTreeMap<ChangeKind, ChangeSet>, kind: ChangeKind) -> usize {
    change_sets.get(&kind).map_or(0, |changes| changes.len())
}
