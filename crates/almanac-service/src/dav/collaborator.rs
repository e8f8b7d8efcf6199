use std::sync::Arc;

use salvo::async_trait;

use almanac_core::config::Settings;

use crate::auth::{AccessControl, ResourceIdentifier, access_control_from_settings};
use crate::error::ServiceResult;

use super::{FsCalendarStore, XmlDavEngine};

/// A single calendar object as persisted by a `CalendarStore`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Object file name within its calendar, e.g. `event1.ics`.
    pub name: String,
    /// Quoted entity tag of `data`.
    pub etag: String,
    /// iCalendar text.
    pub data: String,
}

/// Persistent calendar storage.
///
/// `path` arguments are the raw request path; stores derive the object name from it.
/// Implementations must be safe for concurrent use by many requests.
#[async_trait]
pub trait CalendarStore: Send + Sync {
    /// ## Summary
    /// Returns the whole calendar as a single iCalendar document.
    ///
    /// ## Errors
    /// Returns an error if the calendar cannot be read.
    async fn read(&self, resource: &ResourceIdentifier) -> ServiceResult<Vec<u8>>;

    /// ## Summary
    /// Creates or replaces the object named by `path`. `if_match` is the raw
    /// `If-Match` header value, if the client sent one.
    ///
    /// Returns the new entity tag when the store knows it.
    ///
    /// ## Errors
    /// Returns `PreconditionFailed` when `if_match` does not match the current object.
    async fn write(
        &self,
        resource: &ResourceIdentifier,
        path: &str,
        text: &str,
        if_match: Option<&str>,
    ) -> ServiceResult<Option<String>>;

    /// ## Summary
    /// Removes the object named by `path` and returns a response body (possibly empty).
    ///
    /// ## Errors
    /// Returns `NotFound` for a missing object and `PreconditionFailed` when
    /// `if_match` does not match the current object.
    async fn delete(
        &self,
        resource: &ResourceIdentifier,
        path: &str,
        if_match: Option<&str>,
    ) -> ServiceResult<Vec<u8>>;

    /// ## Summary
    /// Lists the objects of a calendar, sorted by name. A calendar that was never
    /// written to is empty.
    ///
    /// ## Errors
    /// Returns an error if the calendar cannot be read.
    async fn list(&self, resource: &ResourceIdentifier) -> ServiceResult<Vec<StoredObject>>;
}

/// XML protocol operations. Request bodies are passed through undecoded; their
/// encoding is the XML document's own business.
#[async_trait]
pub trait DavEngine: Send + Sync {
    /// ## Summary
    /// Answers a PROPFIND with a multistatus XML body.
    ///
    /// ## Errors
    /// Returns `InvalidRequest` for malformed XML and `NotFound` for a missing object.
    async fn propfind(
        &self,
        xml: &[u8],
        resource: &ResourceIdentifier,
        path: &str,
    ) -> ServiceResult<Vec<u8>>;

    /// ## Summary
    /// Answers a REPORT (`calendar-multiget` or `calendar-query`) with a multistatus XML body.
    ///
    /// ## Errors
    /// Returns `InvalidRequest` for malformed XML or an unsupported report.
    async fn report(
        &self,
        xml: &[u8],
        resource: &ResourceIdentifier,
        path: &str,
    ) -> ServiceResult<Vec<u8>>;
}

/// The read-only collaborator set shared by every request.
#[derive(Clone)]
pub struct Collaborators {
    pub access: Arc<dyn AccessControl>,
    pub store: Arc<dyn CalendarStore>,
    pub dav: Arc<dyn DavEngine>,
}

impl Collaborators {
    /// ## Summary
    /// Builds the configured access backend, a file-system store rooted at
    /// `storage.folder` and the XML engine over that store.
    ///
    /// ## Errors
    /// Returns an error if the access backend cannot be initialized.
    pub async fn from_settings(settings: &Settings) -> ServiceResult<Self> {
        let access = access_control_from_settings(&settings.auth).await?;
        let store: Arc<dyn CalendarStore> =
            Arc::new(FsCalendarStore::new(settings.storage.folder.clone()));
        let dav = Arc::new(XmlDavEngine::new(store.clone()));

        Ok(Self { access, store, dav })
    }
}
