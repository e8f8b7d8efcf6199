//! `WebDAV`/`CalDAV` XML.
//!
//! - `engine`: `XmlDavEngine`, answering PROPFIND and REPORT from a `CalendarStore`
//! - `multistatus`: Multistatus response model and serializer
//! - `propfind`: PROPFIND request parsing
//! - `report`: REPORT request parsing

pub mod engine;
pub mod multistatus;
pub mod propfind;
pub mod report;

pub use engine::XmlDavEngine;

use quick_xml::events::BytesStart;

use crate::error::{ServiceError, ServiceResult};

pub const DAV_NS: &str = "DAV:";
pub const CALDAV_NS: &str = "urn:ietf:params:xml:ns:caldav";
pub const CALENDARSERVER_NS: &str = "http://calendarserver.org/ns/";

/// A namespace-qualified XML element name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    pub namespace: String,
    pub local_name: String,
}

impl QName {
    #[must_use]
    pub fn new(namespace: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            local_name: local_name.into(),
        }
    }

    #[must_use]
    pub fn dav(local_name: &str) -> Self {
        Self::new(DAV_NS, local_name)
    }

    #[must_use]
    pub fn caldav(local_name: &str) -> Self {
        Self::new(CALDAV_NS, local_name)
    }

    #[must_use]
    pub fn calendarserver(local_name: &str) -> Self {
        Self::new(CALENDARSERVER_NS, local_name)
    }

    #[must_use]
    pub fn is(&self, namespace: &str, local_name: &str) -> bool {
        self.namespace == namespace && self.local_name == local_name
    }
}

/// In-scope `xmlns` declarations, innermost last.
pub(crate) type Namespaces = Vec<(String, String)>;

pub(crate) fn invalid_xml(reason: impl std::fmt::Display) -> ServiceError {
    ServiceError::InvalidRequest(format!("malformed XML body: {reason}"))
}

/// Records the `xmlns` declarations carried by an element.
pub(crate) fn collect_namespaces(e: &BytesStart<'_>, namespaces: &mut Namespaces) -> ServiceResult<()> {
    for attr in e.attributes() {
        let attr = attr.map_err(invalid_xml)?;
        let key = std::str::from_utf8(attr.key.as_ref()).map_err(invalid_xml)?;
        let value = std::str::from_utf8(&attr.value).map_err(invalid_xml)?;
        if let Some(prefix) = key.strip_prefix("xmlns:") {
            namespaces.push((prefix.to_string(), value.to_string()));
        } else if key == "xmlns" {
            namespaces.push((String::new(), value.to_string()));
        } else {
            // Not a namespace declaration
        }
    }
    Ok(())
}

/// Resolves an element name against the declarations seen so far. Unprefixed
/// names without a default namespace are taken to be `DAV:`.
pub(crate) fn resolve_qname(e: &BytesStart<'_>, namespaces: &Namespaces) -> ServiceResult<QName> {
    let name_bytes = e.name();
    let name = std::str::from_utf8(name_bytes.as_ref()).map_err(invalid_xml)?;

    let (prefix, local_name) = name.split_once(':').unwrap_or(("", name));

    let namespace = namespaces
        .iter()
        .rev()
        .find(|(p, _)| p == prefix)
        .map_or(DAV_NS, |(_, ns)| ns.as_str());

    Ok(QName::new(namespace, local_name))
}

/// Reads an attribute value, if present.
pub(crate) fn attribute(e: &BytesStart<'_>, name: &str) -> ServiceResult<Option<String>> {
    for attr in e.attributes() {
        let attr = attr.map_err(invalid_xml)?;
        if attr.key.as_ref() == name.as_bytes() {
            let value = std::str::from_utf8(&attr.value).map_err(invalid_xml)?;
            return Ok(Some(value.to_string()));
        }
    }
    Ok(None)
}
