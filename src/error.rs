use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnricherError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Cache unavailable: {0}")]
    CacheUnavailable(String),

    #[error("Upstream query failed: {0}")]
    UpstreamQuery(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl EnricherError {
    /// Stable label for the variant, used as a structured log field
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "invalid_argument",
            Self::CacheUnavailable(_) => "cache_unavailable",
            Self::UpstreamQuery(_) => "upstream_query",
            Self::Config(_) => "config",
            Self::Io(_) => "io",
            Self::Serde(_) => "serde",
            Self::Internal(_) => "internal",
        }
    }
}

pub type Result<T> = std::result::Result<T, EnricherError>;
