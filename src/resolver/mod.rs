//! Cache-aside name resolution
//!
//! Turns one opaque identifier into a display name:
//! - Cache first, keyed by the identifier alone
//! - On miss, either the caller-supplied payload value or an upstream query
//! - Every write carries the configured expiry (24 hours by default)

mod cache_aside;
mod types;

pub use cache_aside::{DEFAULT_KEY_PREFIX, DEFAULT_TTL, Resolver, ResolverStats};
pub use types::{NameSource, Resolution, ResolutionRequest};
