//! Message enrichment
//!
//! Derives the resolution requests implied by a message's shape, resolves
//! them concurrently and attaches the names as the message's context.

use crate::error::{EnricherError, Result};
use crate::logging::Timer;
use crate::message::{ChangeMessage, Context};
use crate::resolver::{Resolution, ResolutionRequest, Resolver};
use std::sync::Arc;
use tokio::task::JoinSet;

/// Derive the resolution requests for a message
///
/// - `ChangeEventHeader.commitUser` → User
/// - `ChangeEventHeader.recordIds[0]` → `entityName`
/// - `CreatedById` → User (custom events)
/// - `Type__c` → `Type__c`, keyed by `event.replayId`, named by `Payload__c`
///
/// Shapes are checked independently; a message may match any number of them.
pub fn derive_requests(message: &ChangeMessage) -> Vec<ResolutionRequest> {
    let mut requests = Vec::new();

    // Record mutation
    if let Some(header) = message.change_event_header() {
        if let Some(commit_user) = header.commit_user {
            requests.push(ResolutionRequest::upstream(
                Some(commit_user),
                Some("User".to_string()),
            ));
        }
        if let Some(record_id) = header.first_record_id {
            requests.push(ResolutionRequest::upstream(
                Some(record_id),
                header.entity_name,
            ));
        }
    }

    // Custom event
    if let Some(created_by) = message.payload_field("CreatedById") {
        requests.push(ResolutionRequest::upstream(
            Some(created_by),
            Some("User".to_string()),
        ));
    }
    if let Some(event_type) = message.payload_field("Type__c") {
        requests.push(ResolutionRequest::with_payload(
            message.replay_id(),
            Some(event_type),
            message.payload_field("Payload__c"),
        ));
    }

    requests
}

/// Attaches resolved names to CDC messages
#[derive(Clone)]
pub struct Enricher {
    resolver: Arc<Resolver>,
}

impl Enricher {
    pub fn new(resolver: Arc<Resolver>) -> Self {
        Self { resolver }
    }

    /// Enrich a message in place
    ///
    /// All requests run as concurrent tasks. The context is replaced only
    /// once every one of them succeeded; on the first failure the remaining
    /// tasks are aborted and the message keeps its previous context.
    ///
    /// Results are merged in completion order, so two requests producing
    /// the same key (e.g. `commitUser` and `CreatedById`) leave whichever
    /// finished last.
    pub async fn enrich(&self, message: &mut ChangeMessage) -> Result<()> {
        let _timer = Timer::new("enrich");
        let requests = derive_requests(message);

        tracing::debug!(
            replay_id = ?message.replay_id(),
            requests = requests.len(),
            "Enriching message"
        );

        let mut tasks = JoinSet::new();
        for request in requests {
            let resolver = self.resolver.clone();
            tasks.spawn(async move { resolver.resolve(&request).await });
        }

        let mut context = Context::new();
        while let Some(joined) = tasks.join_next().await {
            let resolution = joined
                .map_err(|e| EnricherError::Internal(format!("Resolution task failed: {}", e)))??;

            if let Some(Resolution { key, value }) = resolution {
                context.insert(key, value);
            }
        }

        tracing::debug!(
            replay_id = ?message.replay_id(),
            resolved = context.len(),
            "Message enriched"
        );
        message.context = Some(context);
        Ok(())
    }

    /// Enrich an owned message and hand it back
    pub async fn enriched(&self, mut message: ChangeMessage) -> Result<ChangeMessage> {
        self.enrich(&mut message).await?;
        Ok(message)
    }
}
