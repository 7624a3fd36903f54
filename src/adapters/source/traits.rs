//! Record source abstraction
//!
//! Search, collection membership and record retrieval are owned by the host
//! platform. Jobs only see them through [`RecordSource`].

use crate::domain::{Record, RecordId, Result};
use async_trait::async_trait;
use std::collections::BTreeSet;

/// Read access to the platform's records and search index
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Record ids matching a search query such as `084:pdg`
    ///
    /// # Errors
    ///
    /// Returns an error if the query is unsupported or the search fails.
    async fn search(&self, query: &str) -> Result<Vec<RecordId>>;

    /// All record ids belonging to collection `name` (e.g. `HEP`)
    ///
    /// # Errors
    ///
    /// Returns an error if the membership list cannot be retrieved.
    async fn collection_members(&self, name: &str) -> Result<BTreeSet<RecordId>>;

    /// Fetches a record, or `None` if it does not exist
    ///
    /// # Errors
    ///
    /// Returns an error if the record exists but can't be retrieved or decoded.
    async fn get_record(&self, recid: RecordId) -> Result<Option<Record>>;

    /// Short backend name for logs
    fn backend_name(&self) -> &'static str;
}
