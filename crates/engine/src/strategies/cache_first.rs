//! Cache-first executor with stale-while-revalidate refresh.
//!
//! A hit is served immediately; a supervised background task then refreshes
//! the entry so the next request sees a newer copy. The response already
//! served can never be delayed or failed by that refresh.

use std::sync::Arc;

use waylay_core::Error;

use super::StrategyContext;
use crate::fallback;
use crate::request::EngineRequest;
use crate::response::ServedResponse;

pub(crate) async fn run(ctx: &StrategyContext<'_>, request: &EngineRequest) -> Result<ServedResponse, Error> {
    let cached = match ctx.db.lookup_any(request.method.as_str(), request.url.as_str()).await {
        Ok(found) => found,
        Err(store_err) => {
            // A failed read degrades to a miss; the network path still works.
            tracing::warn!(url = %request.url, error = %store_err, "cache lookup failed");
            None
        }
    };

    if let Some((store, stored)) = cached {
        spawn_refresh(ctx, request, store);
        return Ok(ServedResponse::from_stored(stored));
    }

    match ctx.transport.fetch(request).await {
        Ok(response) => {
            if response.is_success() {
                let write = ctx
                    .db
                    .put_entry(&ctx.stores.runtime, request.method.as_str(), request.url.as_str(), &response.to_stored())
                    .await;
                if let Err(e) = write {
                    tracing::warn!(url = %request.url, error = %e, "runtime cache write failed");
                }
            }
            Ok(response)
        }
        Err(e) if e.is_network() && request.is_image() => {
            tracing::debug!(url = %request.url, "origin unreachable, serving placeholder image");
            Ok(fallback::placeholder_image())
        }
        Err(e) => Err(e),
    }
}

/// Refresh the entry in the store it was found in. Never awaited by the
/// request that triggered it; the supervisor logs failures.
fn spawn_refresh(ctx: &StrategyContext<'_>, request: &EngineRequest, store: String) {
    let db = ctx.db.clone();
    let transport = Arc::clone(ctx.transport);
    let request = request.clone();

    ctx.supervisor.spawn("stale-while-revalidate", async move {
        let fresh = transport.fetch(&request).await?;
        if fresh.is_success() {
            db.put_entry(&store, request.method.as_str(), request.url.as_str(), &fresh.to_stored())
                .await?;
        }
        Ok(())
    });
}
