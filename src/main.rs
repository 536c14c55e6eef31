use cdc_enricher::cache;
use cdc_enricher::config::load_settings;
use cdc_enricher::error::Result;
use cdc_enricher::stream;
use cdc_enricher::upstream::SalesforceClient;
use cdc_enricher::{Enricher, Resolver};
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::signal;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing; stdout carries only enriched messages
    let builder = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("cdc_enricher=info")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true);

    if std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json")) {
        builder.json().init();
    } else {
        builder.init();
    }

    tracing::info!("Starting CDC enricher");

    // Load configuration
    let settings = load_settings()?;
    tracing::info!("Configuration loaded");
    tracing::debug!(
        "Config: backend={:?}, ttl_secs={}, salesforce={}",
        settings.cache.backend,
        settings.cache.ttl_secs,
        settings.salesforce.instance_url
    );

    // Connect the cache store once and share it
    let cache_store = cache::connect(&settings.cache).await?;
    tracing::info!("Cache store ready");

    let salesforce = Arc::new(SalesforceClient::new(settings.salesforce.clone())?);
    tracing::info!("Salesforce client created");

    let resolver = Arc::new(Resolver::with_options(
        cache_store,
        salesforce,
        settings.cache.ttl(),
        settings.cache.key_prefix.clone(),
    ));
    let enricher = Enricher::new(resolver.clone());

    let reader = BufReader::new(tokio::io::stdin());
    let writer = tokio::io::stdout();

    let result = tokio::select! {
        result = stream::run(&enricher, reader, writer) => {
            result.map(|stats| {
                tracing::info!(
                    forwarded = stats.forwarded,
                    dropped = stats.dropped,
                    "Input closed"
                );
            })
        }
        signal_name = shutdown_signal() => {
            tracing::info!(signal = %signal_name, "Received shutdown signal, stopping");
            Ok(())
        }
    };

    resolver.log_stats().await;
    tracing::info!("Shutdown complete");
    result
}

/// Wait for SIGINT or SIGTERM (Ctrl+C elsewhere)
async fn shutdown_signal() -> String {
    #[cfg(unix)]
    {
        use signal::unix::{SignalKind, signal};

        let (mut sigint, mut sigterm) = match (
            signal(SignalKind::interrupt()),
            signal(SignalKind::terminate()),
        ) {
            (Ok(sigint), Ok(sigterm)) => (sigint, sigterm),
            _ => {
                tracing::warn!("Failed to install signal handlers, falling back to Ctrl+C");
                let _ = signal::ctrl_c().await;
                return "Ctrl+C".to_string();
            }
        };

        tokio::select! {
            _ = sigint.recv() => "SIGINT (Ctrl+C)".to_string(),
            _ = sigterm.recv() => "SIGTERM".to_string(),
        }
    }

    #[cfg(not(unix))]
    {
        let _ = signal::ctrl_c().await;
        "Ctrl+C".to_string()
    }
}
