//! Network-only executor.
//!
//! A hard exclusion, not an optimization: auth, admin and analytics
//! requests hit the origin directly with no cache read, no cache write and
//! no fallback, so their callers always see the real outcome.

use waylay_core::Error;

use super::StrategyContext;
use crate::request::EngineRequest;
use crate::response::ServedResponse;

pub(crate) async fn run(ctx: &StrategyContext<'_>, request: &EngineRequest) -> Result<ServedResponse, Error> {
    ctx.transport.fetch(request).await
}
