//! `Authorization` header parsing.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use almanac_core::constants::BASIC_SCHEME;

use crate::error::{ServiceError, ServiceResult};

/// Credentials presented with a request.
///
/// Derived once per request from the `Authorization` header and never stored.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// No `Authorization` header was sent.
    Anonymous,
    /// HTTP Basic credentials.
    Basic { username: String, password: String },
}

impl Credentials {
    /// ## Summary
    /// Parses the raw `Authorization` header value, if any.
    ///
    /// The value must use the `Basic` scheme; its payload is base64 text of the
    /// form `user:password`, split on the first colon so passwords may contain colons.
    ///
    /// ## Errors
    /// Returns `MalformedCredentials` if the scheme is not `Basic`, the payload is
    /// not valid base64 or UTF-8, or the decoded text has no colon.
    pub fn from_authorization(header: Option<&str>) -> ServiceResult<Self> {
        let Some(header) = header else {
            return Ok(Self::Anonymous);
        };

        let (scheme, payload) = header
            .trim()
            .split_once(char::is_whitespace)
            .ok_or_else(|| malformed("missing credentials after scheme"))?;
        if !scheme.eq_ignore_ascii_case(BASIC_SCHEME) {
            return Err(malformed(format!("unsupported scheme {scheme:?}")));
        }

        let decoded = STANDARD
            .decode(payload.trim())
            .map_err(|e| malformed(format!("invalid base64 payload: {e}")))?;
        let plain =
            String::from_utf8(decoded).map_err(|e| malformed(format!("payload is not UTF-8: {e}")))?;

        let (username, password) = plain
            .split_once(':')
            .ok_or_else(|| malformed("no colon between user and password"))?;

        Ok(Self::Basic {
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    #[must_use]
    pub fn username(&self) -> Option<&str> {
        match self {
            Self::Anonymous => None,
            Self::Basic { username, .. } => Some(username),
        }
    }

    #[must_use]
    pub fn password(&self) -> Option<&str> {
        match self {
            Self::Anonymous => None,
            Self::Basic { password, .. } => Some(password),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Anonymous => f.write_str("Anonymous"),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .finish_non_exhaustive(),
        }
    }
}

fn malformed(reason: impl Into<String>) -> ServiceError {
    ServiceError::MalformedCredentials(reason.into())
}
