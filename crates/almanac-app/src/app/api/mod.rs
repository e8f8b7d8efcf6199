pub mod dav;

use std::sync::Arc;
use std::time::Duration;

use salvo::Router;
use salvo::logging::Logger;
use salvo::timeout::Timeout;

use almanac_service::dav::Collaborators;

use crate::collaborators_handler::CollaboratorsHandler;
use crate::config::{Settings, SettingsHandler};

/// ## Summary
/// Constructs the protocol router. Every path is served by the DAV dispatcher.
#[must_use]
pub fn routes() -> Router {
    dav::routes()
}

/// ## Summary
/// Wraps [`routes`] with request logging, the request timeout and depot
/// injection of the settings and collaborators.
#[must_use]
pub fn service_router(settings: Arc<Settings>, collaborators: Collaborators) -> Router {
    let timeout = Duration::from_secs(settings.server.request_timeout_secs);

    Router::new()
        .hoop(Logger::new())
        .hoop(Timeout::new(timeout))
        .hoop(SettingsHandler { settings })
        .hoop(CollaboratorsHandler { collaborators })
        .push(routes())
}
