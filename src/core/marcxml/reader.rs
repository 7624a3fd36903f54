//! MARCXML parsing into [`Record`]s

use crate::domain::record::{BLANK_INDICATOR, RECID_TAG};
use crate::domain::{DataField, Record, RecordId, RecordSourceError, Result};
use serde::Deserialize;

/// `<collection>` root
#[derive(Debug, Deserialize)]
struct MarcCollection {
    #[serde(rename = "record", default)]
    records: Vec<MarcRecord>,
}

/// `<record>` entry
#[derive(Debug, Deserialize)]
struct MarcRecord {
    #[serde(rename = "controlfield", default)]
    control_fields: Vec<MarcControlField>,
    #[serde(rename = "datafield", default)]
    data_fields: Vec<MarcDataField>,
}

#[derive(Debug, Deserialize)]
struct MarcControlField {
    #[serde(rename = "@tag")]
    tag: String,
    #[serde(rename = "$text", default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct MarcDataField {
    #[serde(rename = "@tag")]
    tag: String,
    #[serde(rename = "@ind1", default)]
    ind1: String,
    #[serde(rename = "@ind2", default)]
    ind2: String,
    #[serde(rename = "subfield", default)]
    subfields: Vec<MarcSubfield>,
}

#[derive(Debug, Deserialize)]
struct MarcSubfield {
    #[serde(rename = "@code")]
    code: String,
    #[serde(rename = "$text", default)]
    value: String,
}

fn indicator(raw: &str) -> char {
    raw.chars().next().unwrap_or(BLANK_INDICATOR)
}

impl MarcRecord {
    fn into_record(self) -> Result<Record> {
        let recid_raw = self
            .control_fields
            .iter()
            .find(|cf| cf.tag == RECID_TAG)
            .map(|cf| cf.value.trim().to_string())
            .ok_or_else(|| {
                RecordSourceError::InvalidMarcXml("record without control field 001".to_string())
            })?;
        let recid: RecordId = recid_raw
            .parse()
            .map_err(RecordSourceError::InvalidMarcXml)?;

        let mut record = Record::new(recid);
        for cf in self.control_fields {
            record.set_control_field(cf.tag, cf.value);
        }

        for df in self.data_fields {
            let mut field = DataField::new(df.tag, indicator(&df.ind1), indicator(&df.ind2));
            for sf in df.subfields {
                let code = sf.code.chars().next().ok_or_else(|| {
                    RecordSourceError::InvalidMarcXml(format!(
                        "empty subfield code in field {} of record {}",
                        field.tag, recid
                    ))
                })?;
                field.add_subfield(code, sf.value);
            }
            record.add_field(field);
        }

        Ok(record)
    }
}

/// Parses a MARCXML `<collection>` document
///
/// # Errors
///
/// Returns an error if the document is not well-formed MARCXML or a record
/// lacks a numeric `001` control field.
pub fn parse_collection(content: &str) -> Result<Vec<Record>> {
    let collection: MarcCollection = quick_xml::de::from_str(content)
        .map_err(|e| RecordSourceError::InvalidMarcXml(e.to_string()))?;

    collection
        .records
        .into_iter()
        .map(MarcRecord::into_record)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<collection xmlns="http://www.loc.gov/MARC21/slim">
  <record>
    <controlfield tag="001">1234</controlfield>
    <controlfield tag="005">20180612101010.0</controlfield>
    <datafield tag="084" ind1=" " ind2=" ">
      <subfield code="2">PDG</subfield>
      <subfield code="9">PDG</subfield>
      <subfield code="a">S008</subfield>
    </datafield>
    <datafield tag="980" ind1=" " ind2=" ">
      <subfield code="a">HEP</subfield>
    </datafield>
  </record>
  <record>
    <controlfield tag="001">99</controlfield>
  </record>
</collection>
"#;

    #[test]
    fn test_parse_collection() {
        let records = parse_collection(SAMPLE).unwrap();
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.recid(), RecordId::new(1234));
        assert_eq!(
            first.control_fields().get("005").map(String::as_str),
            Some("20180612101010.0")
        );
        let pdg = first.field_instances("084").next().unwrap();
        assert_eq!(pdg.ind1, ' ');
        assert_eq!(pdg.first_subfield_value('2'), Some("PDG"));
        assert_eq!(pdg.first_subfield_value('a'), Some("S008"));

        assert_eq!(records[1].recid(), RecordId::new(99));
        assert!(records[1].has_no_data_fields());
    }

    #[test]
    fn test_record_without_recid_is_rejected() {
        let xml = r#"<collection><record>
            <datafield tag="980" ind1=" " ind2=" "><subfield code="a">HEP</subfield></datafield>
        </record></collection>"#;
        assert!(parse_collection(xml).is_err());
    }

    #[test]
    fn test_non_numeric_recid_is_rejected() {
        let xml = r#"<collection><record>
            <controlfield tag="001">abc</controlfield>
        </record></collection>"#;
        assert!(parse_collection(xml).is_err());
    }

    #[test]
    fn test_round_trip_through_writer() {
        let records = parse_collection(SAMPLE).unwrap();
        let xml = crate::core::marcxml::collection_to_xml(&records).unwrap();
        let again = parse_collection(&xml).unwrap();
        assert_eq!(again.len(), 1);
        assert_eq!(again[0], records[0]);
    }
}
