//! OPTIONS method handler.

use salvo::http::HeaderValue;
use salvo::http::header::ALLOW;

use almanac_core::constants::{ALLOWED_METHODS, DAV_COMPLIANCE};

use crate::app::api::dav::dispatch::RequestContext;
use crate::app::api::dav::response::DavResponse;

/// ## Summary
/// Advertises the supported methods and DAV compliance classes.
///
/// Never consults access control or storage, whatever the path.
#[must_use]
#[tracing::instrument(skip_all, fields(path = %ctx.path))]
pub fn options(ctx: &RequestContext) -> DavResponse {
    tracing::info!("Handling OPTIONS request");

    DavResponse::new(ctx.route.success)
        .header(ALLOW, HeaderValue::from_static(ALLOWED_METHODS))
        .header(dav_header(), HeaderValue::from_static(DAV_COMPLIANCE))
}

/// The `DAV` response header name.
#[must_use]
pub fn dav_header() -> salvo::http::HeaderName {
    salvo::http::HeaderName::from_static("dav")
}
