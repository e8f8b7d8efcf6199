//! Recording collaborators for handler tests.

use std::sync::{Arc, Mutex};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use salvo::async_trait;
use salvo::prelude::*;

use almanac_service::auth::{AccessControl, ResourceIdentifier};
use almanac_service::dav::{CalendarStore, Collaborators, DavEngine, StoredObject};
use almanac_service::error::{ServiceError, ServiceResult};

use crate::app::api::service_router;
use crate::config::Settings;

pub const BASE: &str = "http://127.0.0.1:5800";
pub const CALENDAR: &str = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nEND:VCALENDAR\r\n";
pub const MULTISTATUS: &str = "<D:multistatus xmlns:D=\"DAV:\"/>";
pub const STORED_ETAG: &str = "\"etag-1\"";

pub fn basic(user: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{user}:{password}")))
}

#[derive(Clone, Copy)]
enum Decision {
    Grant,
    Deny,
    Fail,
}

/// Records `(username, calendar)` for every call.
pub struct RecordingAccess {
    decision: Decision,
    calls: Mutex<Vec<(Option<String>, Option<String>)>>,
}

impl RecordingAccess {
    fn with(decision: Decision) -> Self {
        Self {
            decision,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn granting() -> Self {
        Self::with(Decision::Grant)
    }

    pub fn denying() -> Self {
        Self::with(Decision::Deny)
    }

    pub fn failing() -> Self {
        Self::with(Decision::Fail)
    }

    pub fn calls(&self) -> Vec<(Option<String>, Option<String>)> {
        self.calls.lock().expect("lock").clone()
    }
}

#[async_trait]
impl AccessControl for RecordingAccess {
    async fn authorize(
        &self,
        username: Option<&str>,
        _password: Option<&str>,
        resource: Option<&ResourceIdentifier>,
    ) -> ServiceResult<bool> {
        self.calls.lock().expect("lock").push((
            username.map(ToString::to_string),
            resource.map(ToString::to_string),
        ));
        match self.decision {
            Decision::Grant => Ok(true),
            Decision::Deny => Ok(false),
            Decision::Fail => Err(ServiceError::InvalidConfiguration("backend down".into())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Read {
        calendar: String,
    },
    Write {
        calendar: String,
        path: String,
        text: String,
        if_match: Option<String>,
    },
    Delete {
        calendar: String,
        path: String,
        if_match: Option<String>,
    },
}

/// Records every call. Conditional requests fail with `PreconditionFailed`
/// when `reject_if_match` is set.
#[derive(Default)]
pub struct RecordingStore {
    pub reject_if_match: bool,
    calls: Mutex<Vec<StoreCall>>,
}

impl RecordingStore {
    pub fn rejecting_if_match() -> Self {
        Self {
            reject_if_match: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().expect("lock").clone()
    }

    fn record(&self, call: StoreCall) {
        self.calls.lock().expect("lock").push(call);
    }

    fn check(&self, if_match: Option<&str>) -> ServiceResult<()> {
        match if_match {
            Some(tag) if self.reject_if_match => {
                Err(ServiceError::PreconditionFailed(format!("stale {tag}")))
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl CalendarStore for RecordingStore {
    async fn read(&self, resource: &ResourceIdentifier) -> ServiceResult<Vec<u8>> {
        self.record(StoreCall::Read {
            calendar: resource.to_string(),
        });
        Ok(CALENDAR.as_bytes().to_vec())
    }

    async fn write(
        &self,
        resource: &ResourceIdentifier,
        path: &str,
        text: &str,
        if_match: Option<&str>,
    ) -> ServiceResult<Option<String>> {
        self.record(StoreCall::Write {
            calendar: resource.to_string(),
            path: path.to_string(),
            text: text.to_string(),
            if_match: if_match.map(ToString::to_string),
        });
        self.check(if_match)?;
        Ok(Some(STORED_ETAG.to_string()))
    }

    async fn delete(
        &self,
        resource: &ResourceIdentifier,
        path: &str,
        if_match: Option<&str>,
    ) -> ServiceResult<Vec<u8>> {
        self.record(StoreCall::Delete {
            calendar: resource.to_string(),
            path: path.to_string(),
            if_match: if_match.map(ToString::to_string),
        });
        self.check(if_match)?;
        Ok(b"store body".to_vec())
    }

    async fn list(&self, _resource: &ResourceIdentifier) -> ServiceResult<Vec<StoredObject>> {
        Ok(Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DavCall {
    pub operation: &'static str,
    pub xml: Vec<u8>,
    pub calendar: String,
    pub path: String,
}

#[derive(Default)]
pub struct RecordingDav {
    calls: Mutex<Vec<DavCall>>,
}

impl RecordingDav {
    pub fn calls(&self) -> Vec<DavCall> {
        self.calls.lock().expect("lock").clone()
    }

    fn record(&self, operation: &'static str, xml: &[u8], resource: &ResourceIdentifier, path: &str) {
        self.calls.lock().expect("lock").push(DavCall {
            operation,
            xml: xml.to_vec(),
            calendar: resource.to_string(),
            path: path.to_string(),
        });
    }
}

#[async_trait]
impl DavEngine for RecordingDav {
    async fn propfind(
        &self,
        xml: &[u8],
        resource: &ResourceIdentifier,
        path: &str,
    ) -> ServiceResult<Vec<u8>> {
        self.record("propfind", xml, resource, path);
        Ok(MULTISTATUS.as_bytes().to_vec())
    }

    async fn report(
        &self,
        xml: &[u8],
        resource: &ResourceIdentifier,
        path: &str,
    ) -> ServiceResult<Vec<u8>> {
        self.record("report", xml, resource, path);
        Ok(MULTISTATUS.as_bytes().to_vec())
    }
}

/// A service over recording collaborators, with handles to inspect them.
pub struct Harness {
    pub service: Service,
    pub access: Arc<RecordingAccess>,
    pub store: Arc<RecordingStore>,
    pub dav: Arc<RecordingDav>,
}

impl Harness {
    pub fn new(access: RecordingAccess, store: RecordingStore) -> Self {
        Self::with_settings(access, store, Settings::default())
    }

    pub fn with_settings(access: RecordingAccess, store: RecordingStore, settings: Settings) -> Self {
        let access = Arc::new(access);
        let store = Arc::new(store);
        let dav = Arc::new(RecordingDav::default());

        let collaborators = Collaborators {
            access: access.clone(),
            store: store.clone(),
            dav: dav.clone(),
        };

        Self {
            service: Service::new(service_router(Arc::new(settings), collaborators)),
            access,
            store,
            dav,
        }
    }

    pub fn granting() -> Self {
        Self::new(RecordingAccess::granting(), RecordingStore::default())
    }

    pub fn denying() -> Self {
        Self::new(RecordingAccess::denying(), RecordingStore::default())
    }
}

/// Asserts `Content-Length` matches the body that was actually sent.
pub async fn assert_exact_length(res: &mut salvo::Response) -> Vec<u8> {
    use salvo::test::ResponseExt;

    let declared = res
        .headers()
        .get(salvo::http::header::CONTENT_LENGTH)
        .expect("Content-Length present")
        .to_str()
        .expect("ascii")
        .parse::<usize>()
        .expect("numeric");
    let body = res.take_bytes(None).await.expect("body").to_vec();
    assert_eq!(declared, body.len(), "Content-Length must equal body length");
    body
}
