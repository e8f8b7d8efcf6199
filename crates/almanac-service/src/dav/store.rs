//! File-system calendar storage.
//!
//! Layout: `<root>/<namespace>/<calendar>/<object>.ics`, one file per calendar
//! object. Calendars come into existence with their first object.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use salvo::async_trait;
use tokio::sync::Mutex;

use super::collaborator::{CalendarStore, StoredObject};
use super::etag::{etag_for, if_match_satisfied};
use crate::auth::resource::{ResourceIdentifier, is_safe_segment, path_segments};
use crate::error::{ServiceError, ServiceResult};

const OBJECT_EXTENSION: &str = "ics";
const PRODID: &str = "-//Almanac//CalDAV Server//EN";

/// Top-level calendar properties dropped when objects are merged into one calendar.
const WRAPPER_PROPERTIES: [&str; 3] = ["VERSION", "PRODID", "CALSCALE"];

pub struct FsCalendarStore {
    root: PathBuf,
    /// Serialises writers so the `If-Match` check and the write are atomic.
    write_lock: Mutex<()>,
}

impl FsCalendarStore {
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            write_lock: Mutex::new(()),
        }
    }

    fn calendar_dir(&self, resource: &ResourceIdentifier) -> PathBuf {
        self.root
            .join(resource.namespace())
            .join(resource.calendar())
    }

    /// ## Summary
    /// Extracts the object file name from a `/<namespace>/<calendar>/<object>` path.
    ///
    /// ## Errors
    /// Returns `InvalidRequest` if the path does not name exactly one object.
    fn object_path(&self, resource: &ResourceIdentifier, path: &str) -> ServiceResult<PathBuf> {
        let segments = path_segments(path);
        let [_, _, name] = segments.as_slice() else {
            return Err(ServiceError::InvalidRequest(format!(
                "path {path} does not name a calendar object"
            )));
        };
        if !is_safe_segment(name) || name.starts_with('.') {
            return Err(ServiceError::InvalidRequest(format!(
                "invalid object name {name:?}"
            )));
        }
        // Only `.ics` files are listed back.
        if Path::new(name).extension().is_none_or(|ext| ext != OBJECT_EXTENSION) {
            return Err(ServiceError::InvalidRequest(format!(
                "object name {name:?} must end in .{OBJECT_EXTENSION}"
            )));
        }

        Ok(self.calendar_dir(resource).join(name))
    }
}

#[async_trait]
impl CalendarStore for FsCalendarStore {
    #[tracing::instrument(skip(self), fields(calendar = %resource))]
    async fn read(&self, resource: &ResourceIdentifier) -> ServiceResult<Vec<u8>> {
        let objects = self.list(resource).await?;
        tracing::debug!(objects = objects.len(), "Merging calendar objects");
        Ok(merge_calendar(&objects).into_bytes())
    }

    #[tracing::instrument(skip(self, text), fields(calendar = %resource, len = text.len()))]
    async fn write(
        &self,
        resource: &ResourceIdentifier,
        path: &str,
        text: &str,
        if_match: Option<&str>,
    ) -> ServiceResult<Option<String>> {
        let target = self.object_path(resource, path)?;
        let dir = self.calendar_dir(resource);

        let _guard = self.write_lock.lock().await;

        if let Some(if_match) = if_match {
            let current = read_optional(&target).await?.map(|data| etag_for(&data));
            if !if_match_satisfied(if_match, current.as_deref()) {
                tracing::debug!(if_match, current = ?current, "If-Match not satisfied");
                return Err(ServiceError::PreconditionFailed(format!(
                    "{path} does not match {if_match}"
                )));
            }
        }

        match tokio::fs::metadata(&dir).await {
            Ok(meta) if !meta.is_dir() => {
                return Err(ServiceError::Conflict(format!(
                    "{resource} exists and is not a calendar"
                )));
            }
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tokio::fs::create_dir_all(&dir).await?;
                tracing::info!(calendar = %resource, "Calendar created");
            }
            Err(e) => return Err(e.into()),
        }

        let temp = dir.join(format!(".{}.tmp", uuid::Uuid::new_v4()));
        tokio::fs::write(&temp, text.as_bytes()).await?;
        if let Err(e) = tokio::fs::rename(&temp, &target).await {
            let _removed = tokio::fs::remove_file(&temp).await;
            return Err(e.into());
        }

        let etag = etag_for(text.as_bytes());
        tracing::debug!(etag = %etag, "Calendar object written");
        Ok(Some(etag))
    }

    #[tracing::instrument(skip(self), fields(calendar = %resource))]
    async fn delete(
        &self,
        resource: &ResourceIdentifier,
        path: &str,
        if_match: Option<&str>,
    ) -> ServiceResult<Vec<u8>> {
        let target = self.object_path(resource, path)?;

        let _guard = self.write_lock.lock().await;

        let Some(data) = read_optional(&target).await? else {
            return Err(ServiceError::NotFound(path.to_string()));
        };

        if let Some(if_match) = if_match {
            let current = etag_for(&data);
            if !if_match_satisfied(if_match, Some(&current)) {
                tracing::debug!(if_match, current = %current, "If-Match not satisfied");
                return Err(ServiceError::PreconditionFailed(format!(
                    "{path} does not match {if_match}"
                )));
            }
        }

        tokio::fs::remove_file(&target).await?;
        tracing::debug!("Calendar object deleted");
        Ok(Vec::new())
    }

    #[tracing::instrument(skip(self), fields(calendar = %resource))]
    async fn list(&self, resource: &ResourceIdentifier) -> ServiceResult<Vec<StoredObject>> {
        let dir = self.calendar_dir(resource);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut objects = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
                continue;
            };
            let is_object = !name.starts_with('.')
                && path.extension().is_some_and(|ext| ext == OBJECT_EXTENSION)
                && entry.file_type().await?.is_file();
            if !is_object {
                continue;
            }

            let bytes = tokio::fs::read(&path).await?;
            let etag = etag_for(&bytes);
            let data = String::from_utf8(bytes).map_err(|e| {
                ServiceError::InvalidRequest(format!("{name} is not UTF-8 text: {e}"))
            })?;
            objects.push(StoredObject { name, etag, data });
        }

        objects.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(objects)
    }
}

async fn read_optional(path: &Path) -> ServiceResult<Option<Vec<u8>>> {
    match tokio::fs::read(path).await {
        Ok(data) => Ok(Some(data)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// ## Summary
/// Merges calendar objects into a single `VCALENDAR`, dropping each object's
/// own wrapper and top-level `VERSION`/`PRODID`/`CALSCALE` lines.
#[must_use]
pub fn merge_calendar(objects: &[StoredObject]) -> String {
    let mut out = format!("BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:{PRODID}\r\n");
    for object in objects {
        for line in calendar_body_lines(&object.data) {
            out.push_str(line);
            out.push_str("\r\n");
        }
    }
    out.push_str("END:VCALENDAR\r\n");
    out
}

fn calendar_body_lines(data: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    // Components open inside the VCALENDAR wrapper.
    let mut depth = 0usize;
    let mut skipping = false;

    for line in data.lines() {
        if line.starts_with([' ', '\t']) {
            // Folded continuation of the previous line.
            if !skipping {
                lines.push(line);
            }
            continue;
        }

        let upper = line.to_ascii_uppercase();
        skipping = if upper == "BEGIN:VCALENDAR" || upper == "END:VCALENDAR" {
            true
        } else if upper.starts_with("BEGIN:") {
            depth += 1;
            false
        } else if upper.starts_with("END:") {
            depth = depth.saturating_sub(1);
            false
        } else {
            depth == 0
                && WRAPPER_PROPERTIES
                    .iter()
                    .any(|name| upper.starts_with(&format!("{name}:")) || upper.starts_with(&format!("{name};")))
        };

        if !skipping && !line.is_empty() {
            lines.push(line);
        }
    }
    lines
}
