//! GET method handler.

use almanac_core::constants::CALENDAR_CONTENT_TYPE;

use crate::app::api::dav::dispatch::RequestContext;
use crate::app::api::dav::response::DavResponse;
use crate::error::AppResult;

/// ## Summary
/// Returns the whole calendar as one iCalendar document.
///
/// ## Errors
/// Returns an error if the store cannot read the calendar.
#[tracing::instrument(skip_all, fields(path = %ctx.path))]
pub async fn get(ctx: &RequestContext) -> AppResult<DavResponse> {
    tracing::info!("Handling GET request");

    let resource = ctx.resource()?;
    let calendar = ctx.collaborators.store.read(resource).await?;

    Ok(DavResponse::new(ctx.route.success).body(CALENDAR_CONTENT_TYPE, calendar))
}
