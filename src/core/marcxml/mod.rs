//! MARCXML codec
//!
//! - [`writer`] - serializes change records for the upload pipeline
//! - [`reader`] - parses record dumps and record exports

pub mod reader;
pub mod writer;

pub use reader::parse_collection;
pub use writer::collection_to_xml;
