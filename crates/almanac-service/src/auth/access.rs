//! Access decisions.
//!
//! The HTTP layer only consumes the boolean returned by [`AccessControl::authorize`];
//! which backend produces it is chosen once at start-up from `auth.method`.

use std::sync::Arc;

use casbin::CoreApi;
use salvo::async_trait;

use almanac_core::config::{AuthConfig, AuthMethod, UserConfig};

use super::casbin::init_enforcer;
use super::password::check_user_password;
use super::resource::ResourceIdentifier;
use crate::error::ServiceResult;

/// Decides whether a request's credentials may act on a calendar.
///
/// Implementations are shared by every in-flight request and must be safe to
/// call concurrently.
#[async_trait]
pub trait AccessControl: Send + Sync {
    /// ## Summary
    /// Returns `true` to grant access. `username`/`password` are `None` for
    /// anonymous requests; `resource` is `None` when the path names no calendar.
    ///
    /// ## Errors
    /// Returns an error if the decision cannot be evaluated; callers treat it as a denial.
    async fn authorize(
        &self,
        username: Option<&str>,
        password: Option<&str>,
        resource: Option<&ResourceIdentifier>,
    ) -> ServiceResult<bool>;
}

/// Grants every request, anonymous ones included.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAll;

#[async_trait]
impl AccessControl for AllowAll {
    async fn authorize(
        &self,
        _username: Option<&str>,
        _password: Option<&str>,
        _resource: Option<&ResourceIdentifier>,
    ) -> ServiceResult<bool> {
        Ok(true)
    }
}

/// Checks passwords against the configured users, then asks a Casbin policy
/// whether the user may touch the calendar.
pub struct PolicyAccessControl {
    users: Vec<UserConfig>,
    enforcer: casbin::Enforcer,
}

impl PolicyAccessControl {
    #[must_use]
    pub fn new(users: Vec<UserConfig>, enforcer: casbin::Enforcer) -> Self {
        Self { users, enforcer }
    }

    /// ## Summary
    /// Builds the backend from the `auth` configuration section.
    ///
    /// ## Errors
    /// Returns an error if the Casbin enforcer cannot be initialized.
    pub async fn from_config(auth: &AuthConfig) -> ServiceResult<Self> {
        let enforcer = init_enforcer(auth.policy_file.as_deref(), &auth.users).await?;
        Ok(Self::new(auth.users.clone(), enforcer))
    }
}

#[async_trait]
impl AccessControl for PolicyAccessControl {
    #[tracing::instrument(skip(self, password))]
    async fn authorize(
        &self,
        username: Option<&str>,
        password: Option<&str>,
        resource: Option<&ResourceIdentifier>,
    ) -> ServiceResult<bool> {
        let (Some(username), Some(password)) = (username, password) else {
            tracing::debug!("Anonymous request denied");
            return Ok(false);
        };

        if !check_user_password(&self.users, username, password)? {
            tracing::debug!("Invalid username or password");
            return Ok(false);
        }

        // No calendar to protect; the handler reports the missing resource.
        let Some(resource) = resource else {
            return Ok(true);
        };

        let object = resource.to_string();
        let granted = self.enforcer.enforce((username, object.as_str()))?;
        tracing::debug!(granted, "Policy evaluated");
        Ok(granted)
    }
}

/// ## Summary
/// Builds the access backend selected by `auth.method`.
///
/// ## Errors
/// Returns an error if the policy backend cannot be initialized.
pub async fn access_control_from_settings(auth: &AuthConfig) -> ServiceResult<Arc<dyn AccessControl>> {
    match auth.method {
        AuthMethod::None => {
            tracing::warn!("Authentication disabled: every request is granted");
            Ok(Arc::new(AllowAll))
        }
        AuthMethod::Policy => Ok(Arc::new(PolicyAccessControl::from_config(auth).await?)),
    }
}
