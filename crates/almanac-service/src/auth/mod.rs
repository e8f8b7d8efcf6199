//! Authentication and authorization flow.
//!
//! ## Module Organization
//!
//! - `access`: The `AccessControl` contract and its backends (allow-all, casbin policy)
//! - `casbin`: Casbin enforcer initialization from the configured policy
//! - `credentials`: `Authorization` header parsing into `Credentials`
//! - `password`: Password hashing and verification with Argon2
//! - `resource`: Request path resolution into a `ResourceIdentifier`

pub mod access;
pub mod casbin;
pub mod credentials;
pub mod password;
pub mod resource;

// Re-export commonly used types at module level
pub use access::{AccessControl, AllowAll, PolicyAccessControl, access_control_from_settings};
pub use credentials::Credentials;
pub use resource::{ResourceIdentifier, path_segments};
