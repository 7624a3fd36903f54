//! Output files of a PDG sync run
//!
//! All files of one run share a prefix and timestamp:
//! `<prefix><%Y-%m-%d_%H-%M-%S>_<name>`. Write failures are logged and
//! swallowed; the run carries on with the next file.

use super::reconcile::ChangeSet;
use crate::core::marcxml::collection_to_xml;
use chrono::{DateTime, Local};
use std::fmt::Display;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Timestamp layout used in output file names
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Writes change-sets and data-quality reports for one run
#[derive(Debug, Clone)]
pub struct ReportWriter {
    output_dir: PathBuf,
    prefix: String,
    timestamp: String,
    dry_run: bool,
}

impl ReportWriter {
    pub fn new(
        output_dir: impl Into<PathBuf>,
        prefix: impl Into<String>,
        started_at: DateTime<Local>,
        dry_run: bool,
    ) -> Self {
        Self {
            output_dir: output_dir.into(),
            prefix: prefix.into(),
            timestamp: started_at.format(TIMESTAMP_FORMAT).to_string(),
            dry_run,
        }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Full path of output file `name`
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}{}_{}", self.prefix, self.timestamp, name))
    }

    /// Writes one line per item
    ///
    /// Reports are written in dry-run mode as well. Returns the path on success.
    pub fn write_list<T: Display>(&self, name: &str, lines: &[T]) -> Option<PathBuf> {
        let path = self.path_for(name);
        let mut contents = String::new();
        for line in lines {
            contents.push_str(&line.to_string());
            contents.push('\n');
        }

        match self.write_file(&path, &contents) {
            Ok(()) => {
                tracing::info!(lines = lines.len(), path = %path.display(), "Lines written");
                Some(path)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Could not write to file");
                None
            }
        }
    }

    /// Writes a change-set as a MARCXML collection
    ///
    /// Does nothing for an empty change-set. In dry-run mode only the
    /// intended record count is logged.
    pub fn write_records(&self, name: &str, records: &ChangeSet) -> Option<PathBuf> {
        if records.is_empty() {
            return None;
        }

        if self.dry_run {
            tracing::info!(
                count = records.len(),
                file = name,
                "DRY: Ready to write entries to file"
            );
            return None;
        }

        let xml = match collection_to_xml(records.values()) {
            Ok(xml) => xml,
            Err(e) => {
                tracing::warn!(file = name, error = %e, "Could not serialize change-set");
                return None;
            }
        };

        tracing::info!(count = records.len(), file = name, "Writing entries to file");
        let path = self.path_for(name);
        match self.write_file(&path, &xml) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "Change-set written");
                Some(path)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Could not write to file");
                None
            }
        }
    }

    fn write_file(&self, path: &Path, contents: &str) -> std::io::Result<()> {
        fs::create_dir_all(&self.output_dir)?;
        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;
        file.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pdg::reconcile::pdg_field;
    use crate::domain::{Record, RecordId};
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn started_at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2018, 6, 12, 9, 30, 5).unwrap()
    }

    fn change_set() -> ChangeSet {
        let mut record = Record::new(RecordId::new(42));
        record.add_field(pdg_field("S008"));
        let mut records = ChangeSet::new();
        records.insert(RecordId::new(42), record);
        records
    }

    #[test]
    fn test_path_for_uses_prefix_and_timestamp() {
        let writer = ReportWriter::new("/tmp/out", "PDG-update_", started_at(), false);
        assert_eq!(
            writer.path_for("append.xml"),
            PathBuf::from("/tmp/out/PDG-update_2018-06-12_09-30-05_append.xml")
        );
    }

    #[test]
    fn test_write_list_one_line_per_item() {
        let dir = TempDir::new().unwrap();
        let writer = ReportWriter::new(dir.path(), "PDG-update_", started_at(), false);

        let path = writer.write_list("bad_record_ids", &[12, 34]).unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "12\n34\n");
    }

    #[test]
    fn test_write_list_failure_is_swallowed() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "x").unwrap();

        let writer = ReportWriter::new(&blocker, "PDG-update_", started_at(), false);
        assert!(writer.write_list("missing-records.txt", &["a"]).is_none());
    }

    #[test]
    fn test_write_records_produces_collection() {
        let dir = TempDir::new().unwrap();
        let writer = ReportWriter::new(dir.path(), "PDG-update_", started_at(), false);

        let path = writer.write_records("append.xml", &change_set()).unwrap();
        let xml = fs::read_to_string(path).unwrap();
        assert!(xml.starts_with("<collection>"));
        assert!(xml.contains(r#"<subfield code="a">S008</subfield>"#));
    }

    #[test]
    fn test_write_records_dry_run_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let writer = ReportWriter::new(dir.path(), "PDG-update_", started_at(), true);

        assert!(writer.write_records("append.xml", &change_set()).is_none());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_write_records_empty_set_skipped() {
        let dir = TempDir::new().unwrap();
        let writer = ReportWriter::new(dir.path(), "PDG-update_", started_at(), false);

        assert!(writer.write_records("delete.xml", &ChangeSet::new()).is_none());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
