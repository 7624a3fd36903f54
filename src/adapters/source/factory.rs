//! Record source factory
//!
//! Creates the record source selected by `source.backend`.

use super::invenio::InvenioClient;
use super::marcxml::MarcXmlStore;
use super::traits::RecordSource;
use crate::config::{SourceBackend, SourceConfig};
use crate::domain::{BibTaskError, Result};
use std::sync::Arc;

/// Create a record source based on the configuration
///
/// # Errors
///
/// Returns an error if the backend's settings are missing or the source
/// cannot be opened.
pub async fn create_record_source(config: &SourceConfig) -> Result<Arc<dyn RecordSource>> {
    match config.backend {
        SourceBackend::MarcXml => {
            let path = config.marcxml_path.as_deref().ok_or_else(|| {
                BibTaskError::Configuration(
                    "source.marcxml_path is required for the marcxml backend".to_string(),
                )
            })?;

            tracing::info!(path = %path, "Creating MARCXML record source");
            let store = MarcXmlStore::open(path).await?;
            Ok(Arc::new(store) as Arc<dyn RecordSource>)
        }
        SourceBackend::Invenio => {
            let client = InvenioClient::new(config)?;
            tracing::info!(base_url = %client.base_url(), "Creating Invenio record source");
            Ok(Arc::new(client) as Arc<dyn RecordSource>)
        }
    }
}
