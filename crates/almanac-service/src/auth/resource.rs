//! Request path resolution.
//!
//! Calendar paths have the shape `/<namespace>/<calendar>/<object>`. The first
//! two non-empty segments identify the calendar; anything shorter names no
//! calendar at all.

use std::fmt;

use percent_encoding::percent_decode_str;

/// Identifies a calendar collection: a namespace (usually the owner) and a calendar name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceIdentifier {
    namespace: String,
    calendar: String,
}

impl ResourceIdentifier {
    /// ## Summary
    /// Resolves a request path into the calendar it targets.
    ///
    /// Returns `None` when the path has fewer than two non-empty segments, or when
    /// either of the first two segments is not a usable name (`.`, `..`, or a
    /// decoded segment containing a path separator).
    #[must_use]
    pub fn resolve(path: &str) -> Option<Self> {
        let mut segments = path_segments(path).into_iter();
        let namespace = segments.next()?;
        let calendar = segments.next()?;

        if !is_safe_segment(&namespace) || !is_safe_segment(&calendar) {
            tracing::debug!(path = %path, "Rejecting unsafe calendar path segment");
            return None;
        }

        Some(Self {
            namespace,
            calendar,
        })
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    #[must_use]
    pub fn calendar(&self) -> &str {
        &self.calendar
    }
}

/// Renders as `namespace/calendar`, the form used for ACL objects.
impl fmt::Display for ResourceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.calendar)
    }
}

/// ## Summary
/// Splits a path on `/`, dropping empty segments and percent-decoding the rest.
#[must_use]
pub fn path_segments(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| percent_decode_str(segment).decode_utf8_lossy().into_owned())
        .collect()
}

/// ## Summary
/// Whether a decoded segment can be used as a single file-system name.
#[must_use]
pub fn is_safe_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains(['/', '\\', '\0'])
}
