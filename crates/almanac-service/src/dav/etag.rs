//! Entity tags.

use sha2::{Digest, Sha256};

/// ## Summary
/// Computes the strong, quoted entity tag of a calendar object.
#[must_use]
pub fn etag_for(data: &[u8]) -> String {
    format!("\"{}\"", hex::encode(Sha256::digest(data)))
}

/// ## Summary
/// Evaluates an `If-Match` header value against the current entity tag.
///
/// `*` matches any existing object; otherwise the header is a comma-separated
/// list of tags, compared after dropping a weak `W/` prefix. A missing object
/// (`current` is `None`) matches nothing.
#[must_use]
pub fn if_match_satisfied(if_match: &str, current: Option<&str>) -> bool {
    let Some(current) = current else {
        return false;
    };

    if_match.split(',').map(str::trim).any(|candidate| {
        candidate == "*" || candidate.strip_prefix("W/").unwrap_or(candidate) == current
    })
}
