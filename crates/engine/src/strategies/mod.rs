//! Strategy executors and the dispatcher in front of them.
//!
//! The dispatcher is the single entry point for intercepted requests. It
//! classifies, runs exactly one executor, and guarantees that nothing
//! escapes: network-only errors propagate untranslated, genuine network
//! failures that survived an executor's fallback chain propagate so the
//! caller sees the real failure, and anything else becomes a generic 500.

pub mod cache_first;
pub mod network_first;
pub mod network_only;

use std::sync::Arc;

use waylay_core::{CacheDb, Decision, Error, RouteTable, StoreNames, Strategy};

use crate::fallback;
use crate::request::EngineRequest;
use crate::response::ServedResponse;
use crate::supervisor::Supervisor;
use crate::transport::NetworkTransport;

/// What the interception hook hands back: a response, or the request
/// untouched.
#[derive(Debug)]
pub enum FetchOutcome {
    PassThrough,
    Respond(ServedResponse),
}

/// Everything an executor consumes.
pub(crate) struct StrategyContext<'a> {
    pub db: &'a CacheDb,
    pub transport: &'a Arc<dyn NetworkTransport>,
    pub stores: &'a StoreNames,
    pub supervisor: &'a Supervisor,
}

/// Classify and execute one intercepted request.
pub(crate) async fn dispatch(
    routes: &RouteTable, ctx: &StrategyContext<'_>, request: &EngineRequest,
) -> Result<FetchOutcome, Error> {
    let strategy = match routes.classify(request.method.as_str(), &request.url) {
        Decision::PassThrough => return Ok(FetchOutcome::PassThrough),
        Decision::Handle(strategy) => strategy,
    };

    tracing::debug!(%strategy, url = %request.url, "dispatching");

    let result = match strategy {
        Strategy::NetworkOnly => network_only::run(ctx, request).await,
        Strategy::CacheFirst => cache_first::run(ctx, request).await,
        Strategy::NetworkFirst => network_first::run(ctx, request).await,
    };

    match result {
        Ok(response) => Ok(FetchOutcome::Respond(response)),
        // Auth/admin/analytics callers must see the real failure.
        Err(e) if strategy == Strategy::NetworkOnly => Err(e),
        // A network failure the fallback chain could not absorb.
        Err(e) if e.is_network() => Err(e),
        Err(e) => {
            tracing::error!(%strategy, url = %request.url, error = %e, "executor failed internally");
            Ok(FetchOutcome::Respond(fallback::internal_error()))
        }
    }
}
