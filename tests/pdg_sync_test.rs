//! End-to-end tests for the PDG sync job
//!
//! Runs the job against a MARCXML dump on disk and against a mocked Invenio
//! instance, and checks the files it leaves behind.

use async_trait::async_trait;
use bibtasks::adapters::source::{InvenioClient, MarcXmlStore, RecordSource};
use bibtasks::adapters::tasks::{TaskRequest, TaskSubmitter};
use bibtasks::config::{SourceBackend, SourceConfig};
use bibtasks::core::marcxml::parse_collection;
use bibtasks::core::pdg::{ChangeKind, PdgSyncJob, PdgSyncOptions};
use bibtasks::domain::{RecordId, Result, TaskId};
use mockito::Matcher;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

const DUMP: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<collection xmlns="http://www.loc.gov/MARC21/slim">
  <record>
    <controlfield tag="001">100</controlfield>
    <datafield tag="084" ind1=" " ind2=" ">
      <subfield code="2">PDG</subfield>
      <subfield code="9">PDG</subfield>
      <subfield code="a">S008</subfield>
    </datafield>
    <datafield tag="084" ind1=" " ind2=" ">
      <subfield code="2">PDG</subfield>
      <subfield code="9">PDG</subfield>
      <subfield code="a">S010</subfield>
    </datafield>
    <datafield tag="084" ind1=" " ind2=" ">
      <subfield code="2">PACS</subfield>
      <subfield code="a">13.20.He</subfield>
    </datafield>
    <datafield tag="980" ind1=" " ind2=" ">
      <subfield code="a">HEP</subfield>
    </datafield>
  </record>
  <record>
    <controlfield tag="001">200</controlfield>
    <datafield tag="084" ind1=" " ind2=" ">
      <subfield code="2">PDG</subfield>
      <subfield code="9">PDG</subfield>
      <subfield code="a">M001</subfield>
    </datafield>
    <datafield tag="084" ind1=" " ind2=" ">
      <subfield code="2">PACS</subfield>
      <subfield code="a">14.40.Lb</subfield>
    </datafield>
    <datafield tag="980" ind1=" " ind2=" ">
      <subfield code="a">HEP</subfield>
    </datafield>
  </record>
  <record>
    <controlfield tag="001">300</controlfield>
    <datafield tag="245" ind1=" " ind2=" ">
      <subfield code="a">Measurement of the B meson lifetime</subfield>
    </datafield>
    <datafield tag="980" ind1=" " ind2=" ">
      <subfield code="a">HEP</subfield>
    </datafield>
  </record>
  <record>
    <controlfield tag="001">400</controlfield>
    <datafield tag="980" ind1=" " ind2=" ">
      <subfield code="a">CONFERENCES</subfield>
    </datafield>
  </record>
</collection>
"#;

const SNAPSHOT: &str = r#"[
    {"inspireId": 100, "pdgIdList": ["S008", "S009"]},
    {"inspireId": 300, "pdgIdList": ["S042", "S042"]},
    {"inspireId": 400, "pdgIdList": ["S001"]},
    {"inspireId": 999, "pdgIdList": ["S002"]},
    {"inspireId": 100, "pdgIdList": ["S008"], "extra": true},
    ["not", "an", "object"]
]"#;

fn options(dir: &Path, input: &str) -> PdgSyncOptions {
    let input_file = dir.join("pdg-snapshot.json");
    fs::write(&input_file, input).unwrap();
    PdgSyncOptions {
        input_file,
        output_dir: dir.join("out"),
        dry_run: false,
        search_term: "084:pdg".to_string(),
        collection: "HEP".to_string(),
        output_prefix: "PDG-update_".to_string(),
        upload_priority: 5,
        task_user: "bst_pdg_update_idents".to_string(),
    }
}

async fn dump_store(dir: &Path) -> Arc<dyn RecordSource> {
    let dump = dir.join("hep.xml");
    fs::write(&dump, DUMP).unwrap();
    Arc::new(MarcXmlStore::open(&dump).await.unwrap())
}

fn output_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_sync_against_marcxml_dump() {
    let dir = TempDir::new().unwrap();
    let source = dump_store(dir.path()).await;
    let job = PdgSyncJob::new(source, None, options(dir.path(), SNAPSHOT));

    let summary = job.run().await.unwrap();

    assert_eq!(summary.search_hits, 2);
    assert_eq!(summary.bad_records, 0);
    assert_eq!(summary.input_elements, 6);
    assert_eq!(summary.valid_elements, 2);
    assert_eq!(summary.missing_elements, 2);
    assert_eq!(summary.invalid_elements, 2);
    assert_eq!(summary.to_add, 1);
    assert_eq!(summary.to_compare, 1);
    assert_eq!(summary.to_delete, 1);

    // One timestamp for every file of the run
    let names = output_names(&dir.path().join("out"));
    let pattern = Regex::new(
        r"^PDG-update_\d{4}-\d{2}-\d{2}_\d{2}-\d{2}-\d{2}_(append\.xml|correct\.xml|delete\.xml|missing-records\.txt|invalid-elements\.txt)$",
    )
    .unwrap();
    assert_eq!(names.len(), 5, "unexpected outputs: {names:?}");
    assert!(names.iter().all(|n| pattern.is_match(n)), "{names:?}");
    let timestamps: std::collections::BTreeSet<&str> = names.iter().map(|n| &n[11..30]).collect();
    assert_eq!(timestamps.len(), 1);

    // Append: deduplicated values for the record without PDG data
    let append = fs::read_to_string(summary.change_set_path(ChangeKind::Append).unwrap()).unwrap();
    let append = parse_collection(&append).unwrap();
    assert_eq!(append.len(), 1);
    assert_eq!(append[0].recid(), RecordId::new(300));
    assert_eq!(append[0].field_instances("084").count(), 1);

    // Correct: whole 084 block after the edit, PACS kept
    let correct =
        fs::read_to_string(summary.change_set_path(ChangeKind::Correct).unwrap()).unwrap();
    let correct = parse_collection(&correct).unwrap();
    assert_eq!(correct.len(), 1);
    let values: Vec<&str> = correct[0]
        .field_instances("084")
        .filter_map(|f| f.first_subfield_value('a'))
        .collect();
    assert!(values.contains(&"S008"));
    assert!(values.contains(&"S009"));
    assert!(values.contains(&"13.20.He"));
    assert!(!values.contains(&"S010"));

    // Delete: only the PDG fields of the dropped record
    let delete = fs::read_to_string(summary.change_set_path(ChangeKind::Delete).unwrap()).unwrap();
    let delete = parse_collection(&delete).unwrap();
    assert_eq!(delete.len(), 1);
    assert_eq!(delete[0].recid(), RecordId::new(200));
    let fields: Vec<_> = delete[0].data_fields().iter().collect();
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].first_subfield_value('a'), Some("M001"));

    // Reports hold the raw elements as compact JSON, one per line
    let missing = summary
        .reports
        .iter()
        .find(|p| p.to_string_lossy().ends_with("missing-records.txt"))
        .unwrap();
    let missing = fs::read_to_string(missing).unwrap();
    assert_eq!(missing.lines().count(), 2);
    assert!(missing.contains(r#""inspireId":999"#));
}

#[tokio::test]
async fn test_second_run_after_applying_changes_is_a_no_op() {
    let dir = TempDir::new().unwrap();
    let snapshot = r#"[
        {"inspireId": 100, "pdgIdList": ["S010", "S008"]},
        {"inspireId": 200, "pdgIdList": ["M001"]}
    ]"#;
    let source = dump_store(dir.path()).await;
    let job = PdgSyncJob::new(source, None, options(dir.path(), snapshot));

    let summary = job.run().await.unwrap();

    assert_eq!(summary.to_compare, 2);
    assert_eq!(summary.total_changes(), 0);
    assert!(summary.change_sets.is_empty());
    assert!(summary.reports.is_empty());
}

#[derive(Default)]
struct QueueRecorder {
    requests: Mutex<Vec<TaskRequest>>,
}

#[async_trait]
impl TaskSubmitter for QueueRecorder {
    async fn submit(&self, request: &TaskRequest) -> Result<TaskId> {
        let mut requests = self.requests.lock().unwrap();
        requests.push(request.clone());
        Ok(TaskId::new(5000 + requests.len() as u64))
    }
}

#[tokio::test]
async fn test_submit_queues_each_change_set() {
    let dir = TempDir::new().unwrap();
    let source = dump_store(dir.path()).await;
    let recorder = Arc::new(QueueRecorder::default());
    let job = PdgSyncJob::new(
        source,
        Some(recorder.clone() as Arc<dyn TaskSubmitter>),
        options(dir.path(), SNAPSHOT),
    );

    let summary = job.run().await.unwrap();

    assert!(summary.is_successful());
    let task_ids: Vec<TaskId> = summary.submitted.iter().map(|s| s.task_id).collect();
    assert_eq!(
        task_ids,
        vec![TaskId::new(5001), TaskId::new(5002), TaskId::new(5003)]
    );

    let requests = recorder.requests.lock().unwrap();
    for (request, kind) in requests.iter().zip(ChangeKind::ALL) {
        let path = summary.change_set_path(kind).unwrap();
        assert_eq!(request.name, "bibupload");
        assert_eq!(
            request.args,
            vec![
                kind.upload_mode().to_string(),
                path.to_string_lossy().to_string(),
                "-P".to_string(),
                "5".to_string(),
            ]
        );
    }
}

fn record_xml(recid: u64, pdg: &[&str]) -> String {
    let mut xml = format!("<collection><record><controlfield tag=\"001\">{recid}</controlfield>");
    for value in pdg {
        xml.push_str(&format!(
            "<datafield tag=\"084\" ind1=\" \" ind2=\" \">\
             <subfield code=\"2\">PDG</subfield>\
             <subfield code=\"9\">PDG</subfield>\
             <subfield code=\"a\">{value}</subfield></datafield>"
        ));
    }
    xml.push_str("</record></collection>");
    xml
}

#[tokio::test]
async fn test_sync_against_invenio() {
    let mut server = mockito::Server::new_async().await;
    let _search = server
        .mock("GET", "/search")
        .match_query(Matcher::UrlEncoded("p".into(), "084:pdg".into()))
        .with_status(200)
        .with_body("[10, 11]")
        .create_async()
        .await;
    let _members = server
        .mock("GET", "/search")
        .match_query(Matcher::UrlEncoded("cc".into(), "HEP".into()))
        .with_status(200)
        .with_body("[10, 11, 12]")
        .create_async()
        .await;
    let _record_10 = server
        .mock("GET", "/record/10/export/xm")
        .with_status(200)
        .with_body(record_xml(10, &["S008"]))
        .create_async()
        .await;
    let _record_11 = server
        .mock("GET", "/record/11/export/xm")
        .with_status(404)
        .create_async()
        .await;

    let source = InvenioClient::new(&SourceConfig {
        backend: SourceBackend::Invenio,
        marcxml_path: None,
        base_url: Some(server.url()),
        api_key: None,
        timeout_seconds: 5,
        tls_verify: true,
    })
    .unwrap();

    let dir = TempDir::new().unwrap();
    let snapshot = r#"[
        {"inspireId": 10, "pdgIdList": ["S008", "S009"]},
        {"inspireId": 12, "pdgIdList": ["M001"]}
    ]"#;
    let job = PdgSyncJob::new(Arc::new(source), None, options(dir.path(), snapshot));

    let summary = job.run().await.unwrap();

    assert_eq!(summary.search_hits, 2);
    assert_eq!(summary.bad_records, 1);
    assert_eq!(summary.appended, 1);
    assert_eq!(summary.corrected, 1);
    assert_eq!(summary.deleted, 0);

    let bad = summary
        .reports
        .iter()
        .find(|p| p.to_string_lossy().ends_with("bad_record_ids"))
        .unwrap();
    assert_eq!(fs::read_to_string(bad).unwrap(), "11\n");
}

#[tokio::test]
async fn test_unreachable_source_fails_the_run() {
    let source = InvenioClient::new(&SourceConfig {
        backend: SourceBackend::Invenio,
        marcxml_path: None,
        // Nothing listens on the discard port
        base_url: Some("http://127.0.0.1:9".to_string()),
        api_key: None,
        timeout_seconds: 2,
        tls_verify: true,
    })
    .unwrap();

    let dir = TempDir::new().unwrap();
    let job = PdgSyncJob::new(Arc::new(source), None, options(dir.path(), "[]"));

    let err = job.run().await.unwrap_err();
    assert!(err.is_unreachable(), "unexpected error: {err}");
}
