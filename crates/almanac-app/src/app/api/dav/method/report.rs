//! REPORT method handler.

use salvo::Request;

use almanac_core::constants::XML_CONTENT_TYPE;

use crate::app::api::dav::dispatch::RequestContext;
use crate::app::api::dav::response::DavResponse;
use crate::error::AppResult;

/// ## Summary
/// Hands the raw XML body to the DAV engine and returns its multistatus answer.
///
/// ## Errors
/// Returns an error if the body cannot be read or the engine fails.
#[tracing::instrument(skip_all, fields(path = %ctx.path))]
pub async fn report(req: &mut Request, ctx: &RequestContext) -> AppResult<DavResponse> {
    tracing::info!("Handling REPORT request");

    let resource = ctx.resource()?;
    let xml = ctx.read_body(req).await?;
    let answer = ctx
        .collaborators
        .dav
        .report(&xml, resource, &ctx.path)
        .await?;

    Ok(DavResponse::new(ctx.route.success).body(XML_CONTENT_TYPE, answer))
}
