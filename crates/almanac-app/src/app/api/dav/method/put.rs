//! PUT method handler.

use salvo::Request;
use salvo::http::HeaderValue;
use salvo::http::header::ETAG;

use super::if_match;
use crate::app::api::dav::dispatch::RequestContext;
use crate::app::api::dav::extract::body::BodyDecoder;
use crate::app::api::dav::response::DavResponse;
use crate::error::AppResult;

/// ## Summary
/// Decodes the body to text and stores it as the object named by the path.
///
/// `If-Match` is passed to the store verbatim; the store decides whether it
/// holds. The new entity tag is echoed when the store reports one.
///
/// ## Errors
/// Returns `DecodeError` if no charset decodes the body, or the store's error.
#[tracing::instrument(skip_all, fields(path = %ctx.path))]
pub async fn put(req: &mut Request, ctx: &RequestContext) -> AppResult<DavResponse> {
    tracing::info!("Handling PUT request");

    let resource = ctx.resource()?;
    let if_match = if_match(req)?;
    let bytes = ctx.read_body(req).await?;

    let decoded = BodyDecoder::new(ctx.settings.encoding.request.as_str())
        .decode(req.headers(), &bytes)?;
    tracing::debug!(charset = %decoded.charset, len = decoded.text.len(), "Body decoded");

    let etag = ctx
        .collaborators
        .store
        .write(resource, &ctx.path, &decoded.text, if_match.as_deref())
        .await?;

    let mut response = DavResponse::new(ctx.route.success);
    if let Some(etag) = etag {
        match HeaderValue::from_str(&etag) {
            Ok(value) => response = response.header(ETAG, value),
            Err(e) => tracing::warn!(error = %e, etag, "Store returned an unusable entity tag"),
        }
    }

    Ok(response)
}
