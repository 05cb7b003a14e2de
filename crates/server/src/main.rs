//! waylay binary entry point.
//!
//! Boots the engine against the real network: install, activate, then run
//! a single URL from argv through the interception pipeline. Useful for
//! smoke-testing routing rules and cache behavior against a live origin.
//! Logging goes to stderr so stdout stays clean for the response summary.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;
use url::Url;

use waylay_core::{CacheDb, EngineConfig};
use waylay_engine::channels::{NoopSyncFlush, TracingNotificationSink};
use waylay_engine::{Engine, EngineRequest, FetchOutcome, HttpTransport, InMemoryClients, TransportConfig};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let target = std::env::args().nth(1).context("usage: waylay <url>")?;
    let target = Url::parse(&target).with_context(|| format!("invalid url: {target}"))?;

    let config = EngineConfig::load().context("failed to load configuration")?;
    tracing::info!(version = %config.version, db = %config.db_path.display(), "starting waylay");

    let db = CacheDb::open(&config.db_path)
        .await
        .context("failed to open cache store")?;
    let transport = Arc::new(HttpTransport::new(TransportConfig::from(&config))?);
    let clients = Arc::new(InMemoryClients::new());

    let engine = Engine::new(
        &config,
        db,
        transport,
        clients,
        Arc::new(NoopSyncFlush),
        Arc::new(TracingNotificationSink),
    )?;

    engine.on_install().await.context("install failed")?;
    engine.on_activate().await.context("activation failed")?;

    let request = EngineRequest::navigate(target);
    match engine.on_fetch(&request).await? {
        FetchOutcome::PassThrough => println!("pass-through: {}", request.url),
        FetchOutcome::Respond(response) => {
            println!(
                "{} {} ({} bytes, {:?}, content-type: {})",
                response.status,
                request.url,
                response.body.len(),
                response.source,
                response.content_type().unwrap_or("-"),
            );
        }
    }

    // Let any stale-while-revalidate refresh settle before exiting.
    engine.supervisor().wait_idle().await;

    Ok(())
}
