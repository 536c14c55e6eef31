//! Upstream record lookup
//!
//! The resolver only needs one thing from the system of record: the
//! display name of a single record, addressed by type and id.

mod salesforce;

pub use salesforce::{SalesforceClient, build_name_query};

use crate::error::Result;
use async_trait::async_trait;

/// Query-by-id lookup against the system of record
#[async_trait]
pub trait RecordQuery: Send + Sync {
    /// Display name of the `record_type` record with `id`, `None` when no such record exists
    async fn query_name(&self, record_type: &str, id: &str) -> Result<Option<String>>;
}
