//! PROPFIND method handler.

use salvo::Request;
use salvo::http::HeaderValue;

use almanac_core::constants::{DAV_COMPLIANCE, XML_CONTENT_TYPE};

use super::options::dav_header;
use crate::app::api::dav::dispatch::RequestContext;
use crate::app::api::dav::response::DavResponse;
use crate::error::AppResult;

/// ## Summary
/// Hands the raw XML body to the DAV engine and returns its multistatus answer.
///
/// Not access-gated.
///
/// ## Errors
/// Returns an error if the body cannot be read or the engine fails.
#[tracing::instrument(skip_all, fields(path = %ctx.path))]
pub async fn propfind(req: &mut Request, ctx: &RequestContext) -> AppResult<DavResponse> {
    tracing::info!("Handling PROPFIND request");

    let resource = ctx.resource()?;
    let xml = ctx.read_body(req).await?;
    let answer = ctx
        .collaborators
        .dav
        .propfind(&xml, resource, &ctx.path)
        .await?;

    Ok(DavResponse::new(ctx.route.success)
        .header(dav_header(), HeaderValue::from_static(DAV_COMPLIANCE))
        .body(XML_CONTENT_TYPE, answer))
}
