use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};

use almanac_core::config::UserConfig;

use crate::error::{ServiceError, ServiceResult};

/// ## Summary
/// Hashes a password using Argon2id with a random salt.
///
/// ## Errors
/// Returns an error if password hashing fails.
pub fn hash_password(password: &str) -> ServiceResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ServiceError::InvalidConfiguration(format!("Failed to hash password: {e}")))?;

    Ok(password_hash.to_string())
}

/// ## Summary
/// Verifies a password against a stored Argon2 hash.
///
/// ## Errors
/// Returns `NotAuthenticated` if the password does not match, or
/// `InvalidConfiguration` if the stored hash cannot be parsed.
pub fn verify_password(password: &str, password_hash: &str) -> ServiceResult<()> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| ServiceError::InvalidConfiguration(format!("Invalid password hash: {e}")))?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|err| {
            tracing::trace!("Password verification failed: {}", err);
            ServiceError::NotAuthenticated
        })
}

/// ## Summary
/// Checks a username/password pair against the configured users.
///
/// Unknown users and wrong passwords both yield `Ok(false)`.
///
/// ## Errors
/// Returns `InvalidConfiguration` if the matching user's stored hash is malformed.
pub fn check_user_password(
    users: &[UserConfig],
    username: &str,
    password: &str,
) -> ServiceResult<bool> {
    let Some(user) = users.iter().find(|user| user.name == username) else {
        tracing::debug!(user = %username, "Unknown user");
        return Ok(false);
    };

    match verify_password(password, &user.password_hash) {
        Ok(()) => Ok(true),
        Err(ServiceError::NotAuthenticated) => Ok(false),
        Err(e) => Err(e),
    }
}
