// One handler per supported verb. The dispatcher has already run the access
// gate and the resource check by the time these are called.

use salvo::Request;
use salvo::http::header::IF_MATCH;

use almanac_service::error::ServiceError;

use crate::error::AppResult;

pub mod delete;
pub mod get;
pub mod options;
pub mod propfind;
pub mod put;
pub mod report;


/// ## Summary
/// Raw `If-Match` header value, forwarded to the store unchanged.
///
/// ## Errors
/// Returns `InvalidRequest` if the header is not visible ASCII.
pub fn if_match(req: &Request) -> AppResult<Option<String>> {
    req.headers()
        .get(IF_MATCH)
        .map(|value| {
            value.to_str().map(ToString::to_string).map_err(|e| {
                ServiceError::InvalidRequest(format!("unreadable If-Match header: {e}")).into()
            })
        })
        .transpose()
}
