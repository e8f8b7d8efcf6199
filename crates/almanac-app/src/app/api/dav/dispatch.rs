//! Method dispatch.
//!
//! A fixed table maps each supported verb to its policy. The dispatcher runs
//! the access gate for rows that require it, enforces the resource
//! requirement, then calls the method handler. Every response, error
//! responses included, leaves through [`DavResponse::write_into`].

use std::sync::Arc;

use salvo::http::{Method, StatusCode};
use salvo::{Depot, FlowCtrl, Request, Response, async_trait};

use almanac_core::constants::TEXT_CONTENT_TYPE;
use almanac_service::auth::ResourceIdentifier;
use almanac_service::dav::Collaborators;
use almanac_service::error::ServiceError;

use super::extract::auth::{challenge, check_access};
use super::method;
use super::response::DavResponse;
use crate::collaborators_handler::get_collaborators_from_depot;
use crate::config::{Settings, get_settings_from_depot};
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DavMethod {
    Options,
    Propfind,
    Get,
    Put,
    Delete,
    Report,
}

impl DavMethod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Options => "OPTIONS",
            Self::Propfind => "PROPFIND",
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Report => "REPORT",
        }
    }
}

/// Per-method policy.
#[derive(Debug, Clone, Copy)]
pub struct MethodRoute {
    pub method: DavMethod,
    /// Run the access gate before anything else.
    pub requires_auth: bool,
    /// Answer 404 when the path names no calendar.
    pub needs_resource: bool,
    pub success: StatusCode,
}

pub const DISPATCH_TABLE: [MethodRoute; 6] = [
    MethodRoute {
        method: DavMethod::Options,
        requires_auth: false,
        needs_resource: false,
        success: StatusCode::OK,
    },
    MethodRoute {
        method: DavMethod::Propfind,
        requires_auth: false,
        needs_resource: true,
        success: StatusCode::MULTI_STATUS,
    },
    MethodRoute {
        method: DavMethod::Get,
        requires_auth: true,
        needs_resource: true,
        success: StatusCode::OK,
    },
    MethodRoute {
        method: DavMethod::Put,
        requires_auth: true,
        needs_resource: true,
        success: StatusCode::CREATED,
    },
    MethodRoute {
        method: DavMethod::Delete,
        requires_auth: true,
        needs_resource: true,
        success: StatusCode::NO_CONTENT,
    },
    MethodRoute {
        method: DavMethod::Report,
        requires_auth: true,
        needs_resource: true,
        success: StatusCode::MULTI_STATUS,
    },
];

impl MethodRoute {
    /// ## Summary
    /// Finds the table row for a request method. Method names are case-sensitive.
    #[must_use]
    pub fn lookup(method: &Method) -> Option<&'static Self> {
        DISPATCH_TABLE
            .iter()
            .find(|route| route.method.as_str() == method.as_str())
    }
}

/// Everything a method handler needs besides the request itself.
pub struct RequestContext {
    pub route: &'static MethodRoute,
    pub path: String,
    pub resource: Option<ResourceIdentifier>,
    pub settings: Arc<Settings>,
    pub collaborators: Collaborators,
}

impl RequestContext {
    /// ## Summary
    /// The calendar the request targets.
    ///
    /// ## Errors
    /// Returns `NotFound` when the path names no calendar.
    pub fn resource(&self) -> AppResult<&ResourceIdentifier> {
        self.resource
            .as_ref()
            .ok_or_else(|| ServiceError::NotFound(self.path.clone()).into())
    }

    /// ## Summary
    /// Reads the raw request body, capped at `server.max_body_size`.
    ///
    /// ## Errors
    /// Returns `BodyError` if the body cannot be read or exceeds the cap.
    pub async fn read_body(&self, req: &mut Request) -> AppResult<Vec<u8>> {
        let max = usize::try_from(self.settings.server.max_body_size).unwrap_or(usize::MAX);
        let bytes = req
            .payload_with_max_size(max)
            .await
            .map_err(|e| AppError::BodyError(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

/// Routes every request through [`DISPATCH_TABLE`].
pub struct Dispatcher;

#[async_trait]
impl salvo::Handler for Dispatcher {
    #[tracing::instrument(skip(self, req, depot, res, _ctrl), fields(
        method = %req.method(),
        path = %req.uri().path()
    ))]
    async fn handle(
        &self,
        req: &mut Request,
        depot: &mut Depot,
        res: &mut Response,
        _ctrl: &mut FlowCtrl,
    ) {
        let response = dispatch(req, depot).await;
        tracing::debug!(status = %response.status, len = response.body.len(), "Responding");
        response.write_into(res);
    }
}

async fn dispatch(req: &mut Request, depot: &Depot) -> DavResponse {
    let Some(route) = MethodRoute::lookup(req.method()) else {
        tracing::info!("Unsupported method");
        return DavResponse::new(StatusCode::NOT_IMPLEMENTED);
    };

    let (settings, collaborators) = match (
        get_settings_from_depot(depot),
        get_collaborators_from_depot(depot),
    ) {
        (Ok(settings), Ok(collaborators)) => (settings, collaborators),
        (Err(e), _) | (_, Err(e)) => return error_response(&e),
    };

    let path = req.uri().path().to_string();
    let resource = ResourceIdentifier::resolve(&path);

    if route.requires_auth
        && !check_access(req, collaborators.access.as_ref(), resource.as_ref()).await
    {
        tracing::info!("Access denied");
        return challenge(&settings.auth.realm);
    }

    if route.needs_resource && resource.is_none() {
        tracing::debug!("Path names no calendar");
        return DavResponse::new(StatusCode::NOT_FOUND);
    }

    let ctx = RequestContext {
        route,
        path,
        resource,
        settings,
        collaborators,
    };

    let result = match route.method {
        DavMethod::Options => Ok(method::options::options(&ctx)),
        DavMethod::Propfind => method::propfind::propfind(req, &ctx).await,
        DavMethod::Get => method::get::get(&ctx).await,
        DavMethod::Put => method::put::put(req, &ctx).await,
        DavMethod::Delete => method::delete::delete(req, &ctx).await,
        DavMethod::Report => method::report::report(req, &ctx).await,
    };

    result.unwrap_or_else(|e| error_response(&e))
}

/// ## Summary
/// Maps a handler failure to its response. Undecodable bodies get a plain-text
/// body naming the charsets tried.
#[must_use]
pub fn error_response(error: &AppError) -> DavResponse {
    let status = error.status_code();
    if status.is_server_error() {
        tracing::error!(error = %error, "Request failed");
    } else {
        tracing::debug!(error = %error, %status, "Request rejected");
    }

    match error {
        AppError::DecodeError(_) => {
            DavResponse::new(status).body(TEXT_CONTENT_TYPE, error.to_string().into_bytes())
        }
        _ => DavResponse::new(status),
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
