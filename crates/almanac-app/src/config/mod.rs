use std::sync::Arc;

pub use almanac_core::config::*;
use salvo::async_trait;

use crate::error::{AppError, AppResult};

pub struct SettingsHandler {
    pub settings: Arc<Settings>,
}

#[async_trait]
impl salvo::Handler for SettingsHandler {
    #[tracing::instrument(skip(self, _req, depot, _res, _ctrl))]
    async fn handle(
        &self,
        _req: &mut salvo::Request,
        depot: &mut salvo::Depot,
        _res: &mut salvo::Response,
        _ctrl: &mut salvo::FlowCtrl,
    ) {
        depot.inject(Arc::clone(&self.settings));
    }
}

/// ## Summary
/// Retrieves the application configuration from the depot.
///
/// ## Errors
/// Returns an error if the configuration is not found in the depot.
pub fn get_settings_from_depot(depot: &salvo::Depot) -> AppResult<Arc<Settings>> {
    depot.obtain::<Arc<Settings>>().cloned().map_err(|_err| {
        AppError::CoreError(almanac_core::error::CoreError::InvariantViolation(
            "Configuration not found in depot",
        ))
    })
}
