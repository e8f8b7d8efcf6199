//! Access gate for DAV handlers.

use salvo::Request;
use salvo::http::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use salvo::http::{HeaderValue, StatusCode};

use almanac_service::auth::{AccessControl, Credentials, ResourceIdentifier};

use crate::app::api::dav::response::DavResponse;

/// Sent if the configured realm cannot be used in a header value.
const FALLBACK_CHALLENGE: &str = "Basic realm=\"Almanac\"";

/// ## Summary
/// Extracts the request's credentials and asks the access backend whether
/// they may act on `resource`.
///
/// Malformed credentials and backend errors are denials.
#[tracing::instrument(skip_all, fields(calendar = ?resource.map(ToString::to_string)))]
pub async fn check_access(
    req: &Request,
    access: &dyn AccessControl,
    resource: Option<&ResourceIdentifier>,
) -> bool {
    let header = match req.headers().get(AUTHORIZATION).map(HeaderValue::to_str) {
        None => None,
        Some(Ok(value)) => Some(value),
        Some(Err(e)) => {
            tracing::debug!(error = %e, "Authorization header is not visible ASCII");
            return false;
        }
    };

    let credentials = match Credentials::from_authorization(header) {
        Ok(credentials) => credentials,
        Err(e) => {
            tracing::debug!(error = %e, "Rejecting malformed credentials");
            return false;
        }
    };

    match access
        .authorize(credentials.username(), credentials.password(), resource)
        .await
    {
        Ok(granted) => {
            tracing::debug!(user = ?credentials.username(), granted, "Access decision");
            granted
        }
        Err(e) => {
            tracing::error!(error = %e, "Access backend failed; denying request");
            false
        }
    }
}

/// ## Summary
/// Builds the `401 Unauthorized` response carrying a Basic challenge for `realm`.
#[must_use]
pub fn challenge(realm: &str) -> DavResponse {
    let value = HeaderValue::from_str(&format!("Basic realm=\"{realm}\"")).unwrap_or_else(|e| {
        tracing::warn!(error = %e, realm, "Configured realm is not a valid header value");
        HeaderValue::from_static(FALLBACK_CHALLENGE)
    });

    DavResponse::new(StatusCode::UNAUTHORIZED).header(WWW_AUTHENTICATE, value)
}
