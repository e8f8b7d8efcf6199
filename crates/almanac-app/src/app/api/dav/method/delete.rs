//! DELETE method handler.

use salvo::Request;

use super::if_match;
use crate::app::api::dav::dispatch::RequestContext;
use crate::app::api::dav::response::DavResponse;
use crate::error::AppResult;

/// ## Summary
/// Removes the object named by the path, forwarding `If-Match` verbatim.
///
/// Succeeds with `204 No Content`; whatever body the store returns is dropped.
///
/// ## Errors
/// Returns the store's error, e.g. `PreconditionFailed` for a stale `If-Match`.
#[tracing::instrument(skip_all, fields(path = %ctx.path))]
pub async fn delete(req: &mut Request, ctx: &RequestContext) -> AppResult<DavResponse> {
    tracing::info!("Handling DELETE request");

    let resource = ctx.resource()?;
    let if_match = if_match(req)?;

    let discarded = ctx
        .collaborators
        .store
        .delete(resource, &ctx.path, if_match.as_deref())
        .await?;
    tracing::debug!(discarded = discarded.len(), "Object deleted");

    Ok(DavResponse::new(ctx.route.success))
}
