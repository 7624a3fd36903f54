//! Web submission support
//!
//! - [`forwarder`] - stages submitted records and queues their upload

pub mod forwarder;

pub use forwarder::{staged_file_name, RecordForwarder, BIBUPLOAD_ID_FILE};
