use salvo::async_trait;

use almanac_core::error::CoreError;
use almanac_service::dav::Collaborators;

use crate::error::AppResult;

/// Injects the shared collaborator bundle into every request's depot.
pub struct CollaboratorsHandler {
    pub collaborators: Collaborators,
}

#[async_trait]
impl salvo::Handler for CollaboratorsHandler {
    #[tracing::instrument(skip(self, _req, depot, _res, _ctrl))]
    async fn handle(
        &self,
        _req: &mut salvo::Request,
        depot: &mut salvo::Depot,
        _res: &mut salvo::Response,
        _ctrl: &mut salvo::FlowCtrl,
    ) {
        depot.inject(self.collaborators.clone());
    }
}

/// ## Summary
/// Retrieves the collaborator bundle from the depot.
///
/// ## Errors
/// Returns an error if the collaborators are not found in the depot.
pub fn get_collaborators_from_depot(depot: &salvo::Depot) -> AppResult<Collaborators> {
    depot
        .obtain::<Collaborators>()
        .cloned()
        .map_err(|_err| CoreError::InvariantViolation("Collaborators not found in depot").into())
}
