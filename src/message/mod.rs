//! CDC message model
//!
//! Messages are kept close to their wire form so that everything the
//! enricher does not touch is forwarded exactly as it was received.

mod types;

pub use types::{ChangeEventHeader, ChangeMessage, Context};
