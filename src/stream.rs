//! Line-delimited JSON transport loop
//!
//! Reads one CDC message per line, enriches it and forwards it as one line.
//! Messages that cannot be parsed or enriched are logged and dropped; a
//! message is never forwarded partially enriched.

use crate::enricher::Enricher;
use crate::error::{EnricherError, Result};
use crate::logging::log_error;
use crate::message::ChangeMessage;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// Counters for one run of the loop
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StreamStats {
    pub received: u64,
    pub forwarded: u64,
    pub dropped: u64,
}

/// Process messages from `reader` until EOF, writing enriched ones to `writer`
///
/// Only I/O errors on the streams themselves end the loop early.
pub async fn run<R, W>(enricher: &Enricher, reader: R, mut writer: W) -> Result<StreamStats>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut stats = StreamStats::default();
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        stats.received += 1;

        let mut message = match ChangeMessage::from_json(line) {
            Ok(message) => message,
            Err(e) => {
                stats.dropped += 1;
                log_error("parse_message", None, &EnricherError::from(e));
                continue;
            }
        };

        if let Err(e) = enricher.enrich(&mut message).await {
            stats.dropped += 1;
            tracing::warn!("Dropping message that could not be enriched");
            log_error("enrich", message.replay_id().as_deref(), &e);
            continue;
        }

        let mut out = message.to_json()?;
        out.push('\n');
        writer.write_all(out.as_bytes()).await?;
        writer.flush().await?;
        stats.forwarded += 1;
    }

    tracing::info!(
        received = stats.received,
        forwarded = stats.forwarded,
        dropped = stats.dropped,
        "Input stream finished"
    );
    Ok(stats)
}
