//! Record source layer
//!
//! Trait-based access to the platform's search index and record store.

pub mod factory;
pub mod invenio;
pub mod marcxml;
pub mod traits;

pub use factory::create_record_source;
pub use invenio::InvenioClient;
pub use marcxml::MarcXmlStore;
pub use traits::RecordSource;
