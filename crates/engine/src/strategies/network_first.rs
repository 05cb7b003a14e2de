//! Network-first executor.
//!
//! Freshness wins: go to the network, keep a copy for later, and only reach
//! for the cache (then the offline page) when the origin is unreachable.

use waylay_core::Error;

use super::StrategyContext;
use crate::fallback;
use crate::request::EngineRequest;
use crate::response::ServedResponse;

pub(crate) async fn run(ctx: &StrategyContext<'_>, request: &EngineRequest) -> Result<ServedResponse, Error> {
    match ctx.transport.fetch(request).await {
        Ok(response) => {
            if response.is_success() {
                // The write happens-before the response is returned, but a
                // write failure is logged and swallowed: the network path
                // stays the correctness-preserving one.
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
        Err(e) if e.is_network() => {
            let cached = match ctx.db.lookup_any(request.method.as_str(), request.url.as_str()).await {
                Ok(found) => found,
                Err(store_err) => {
                    tracing::warn!(url = %request.url, error = %store_err, "cache lookup failed");
                    None
                }
            };

            if let Some((store, stored)) = cached {
                tracing::debug!(url = %request.url, %store, "origin unreachable, served from cache");
                return Ok(ServedResponse::from_stored(stored));
            }

            if request.is_navigation() {
                tracing::debug!(url = %request.url, "origin unreachable, serving offline page");
                return Ok(fallback::offline_page());
            }

            Err(e)
        }
        Err(e) => Err(e),
    }
}
