pub mod cache;
pub mod config;
pub mod enricher;
pub mod error;
pub mod logging;
pub mod message;
pub mod resolver;
pub mod stream;
pub mod upstream;

pub use enricher::Enricher;
pub use error::{EnricherError, Result};
pub use message::ChangeMessage;
pub use resolver::Resolver;

#[cfg(test)]
pub(crate) mod testing;
