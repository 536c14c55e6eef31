//! Resolution request and result types

/// Where a name comes from when the cache misses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameSource {
    /// Query the system of record for the record's name
    Upstream,

    /// Use the value carried by the message itself (custom events)
    Payload(Option<String>),
}

/// One "what is the name of this identifier" question
///
/// `id` and `record_type` are optional because they are lifted straight
/// out of the message; the resolver rejects requests missing either.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionRequest {
    pub id: Option<String>,
    pub record_type: Option<String>,
    pub source: NameSource,
}

impl ResolutionRequest {
    /// Request resolved through the upstream query on a cache miss
    pub fn upstream(id: Option<String>, record_type: Option<String>) -> Self {
        Self {
            id,
            record_type,
            source: NameSource::Upstream,
        }
    }

    /// Request answered by an inline payload value on a cache miss
    pub fn with_payload(
        id: Option<String>,
        record_type: Option<String>,
        value: Option<String>,
    ) -> Self {
        Self {
            id,
            record_type,
            source: NameSource::Payload(value),
        }
    }
}

/// A resolved name under its context key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub key: String,
    pub value: String,
}

pub(crate) fn context_key_for(record_type: &str) -> String {
    format!("{}Name", record_type)
}
