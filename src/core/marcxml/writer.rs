//! MARCXML serialization of records

use crate::domain::record::RECID_TAG;
use crate::domain::{BibTaskError, DataField, Record, Result};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

fn xml_error(err: impl std::fmt::Display) -> BibTaskError {
    BibTaskError::Serialization(format!("MARCXML write failed: {err}"))
}

/// Serializes records as a `<collection>` document
///
/// Records without data fields carry no change and are left out.
pub fn collection_to_xml<'a, I>(records: I) -> Result<String>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer
        .write_event(Event::Start(BytesStart::new("collection")))
        .map_err(xml_error)?;
    for record in records {
        if record.has_no_data_fields() {
            continue;
        }
        write_record(&mut writer, record)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new("collection")))
        .map_err(xml_error)?;

    let mut out = String::from_utf8(writer.into_inner()).map_err(xml_error)?;
    out.push('\n');
    Ok(out)
}

fn write_record(writer: &mut Writer<Vec<u8>>, record: &Record) -> Result<()> {
    writer
        .write_event(Event::Start(BytesStart::new("record")))
        .map_err(xml_error)?;

    let recid = record.recid().to_string();
    write_control_field(writer, RECID_TAG, &recid)?;
    for (tag, value) in record.control_fields() {
        write_control_field(writer, tag, value)?;
    }
    for field in record.data_fields() {
        write_data_field(writer, field)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("record")))
        .map_err(xml_error)?;
    Ok(())
}

fn write_control_field(writer: &mut Writer<Vec<u8>>, tag: &str, value: &str) -> Result<()> {
    let mut start = BytesStart::new("controlfield");
    start.push_attribute(("tag", tag));
    writer.write_event(Event::Start(start)).map_err(xml_error)?;
    writer
        .write_event(Event::Text(BytesText::new(value)))
        .map_err(xml_error)?;
    writer
        .write_event(Event::End(BytesEnd::new("controlfield")))
        .map_err(xml_error)?;
    Ok(())
}

fn write_data_field(writer: &mut Writer<Vec<u8>>, field: &DataField) -> Result<()> {
    let ind1 = field.ind1.to_string();
    let ind2 = field.ind2.to_string();
    let mut start = BytesStart::new("datafield");
    start.push_attribute(("tag", field.tag.as_str()));
    start.push_attribute(("ind1", ind1.as_str()));
    start.push_attribute(("ind2", ind2.as_str()));
    writer.write_event(Event::Start(start)).map_err(xml_error)?;

    for subfield in &field.subfields {
        let code = subfield.code.to_string();
        let mut sf = BytesStart::new("subfield");
        sf.push_attribute(("code", code.as_str()));
        writer.write_event(Event::Start(sf)).map_err(xml_error)?;
        writer
            .write_event(Event::Text(BytesText::new(&subfield.value)))
            .map_err(xml_error)?;
        writer
            .write_event(Event::End(BytesEnd::new("subfield")))
            .map_err(xml_error)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("datafield")))
        .map_err(xml_error)?;
    Ok(())
}
