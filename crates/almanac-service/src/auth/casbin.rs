use std::path::Path;

use casbin::{CoreApi, MgmtApi};

use almanac_core::config::UserConfig;

use crate::error::ServiceResult;

/// ## Summary
/// Initialize a Casbin enforcer deciding which user may access which calendar.
///
/// Policies are `p, <user or *>, <namespace>/<calendar pattern>`. With a policy
/// file the policies are loaded from it; without one every configured user is
/// granted their own namespace (`<user>/*`).
///
/// ## Errors
/// Returns an error if the model or the policy file cannot be loaded.
#[tracing::instrument(skip(users))]
pub async fn init_enforcer(
    policy_file: Option<&Path>,
    users: &[UserConfig],
) -> ServiceResult<casbin::Enforcer> {
    tracing::debug!("Initializing Casbin enforcer");

    let model = casbin::DefaultModel::from_str(include_str!("casbin_model.conf")).await?;
    tracing::debug!("Casbin model loaded");

    let enforcer = if let Some(path) = policy_file {
        let adapter = casbin::FileAdapter::new(path.to_path_buf());
        casbin::Enforcer::new(model, adapter).await?
    } else {
        let mut enforcer = casbin::Enforcer::new(model, casbin::MemoryAdapter::default()).await?;
        for user in users {
            let _added = enforcer
                .add_policy(vec![user.name.clone(), format!("{}/*", user.name)])
                .await?;
        }
        enforcer
    };

    tracing::info!(
        policy_count = enforcer.get_policy().len(),
        "Casbin enforcer initialized successfully"
    );
    Ok(enforcer)
}
