//! PROPFIND and REPORT answered from a `CalendarStore`.

use std::sync::Arc;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use salvo::async_trait;
use salvo::http::StatusCode;

use almanac_core::constants::CALENDAR_CONTENT_TYPE;

use super::multistatus::{
    Multistatus, Outcome, Property, PropertyValue, Propstat, Response, serialize_multistatus,
};
use super::propfind::{PropfindRequest, parse_propfind};
use super::report::{ReportRequest, parse_report};
use super::{DAV_NS, QName};
use crate::auth::{ResourceIdentifier, path_segments};
use crate::dav::collaborator::{CalendarStore, DavEngine, StoredObject};
use crate::dav::etag::etag_for;
use crate::error::{ServiceError, ServiceResult};

/// Characters escaped when a name is placed in an href path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

const SUPPORTED_COMPONENTS: [&str; 3] = ["VEVENT", "VTODO", "VJOURNAL"];

pub struct XmlDavEngine {
    store: Arc<dyn CalendarStore>,
}

impl XmlDavEngine {
    #[must_use]
    pub fn new(store: Arc<dyn CalendarStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl DavEngine for XmlDavEngine {
    #[tracing::instrument(skip(self, xml), fields(calendar = %resource))]
    async fn propfind(
        &self,
        xml: &[u8],
        resource: &ResourceIdentifier,
        path: &str,
    ) -> ServiceResult<Vec<u8>> {
        let request = parse_propfind(xml)?;
        let objects = self.store.list(resource).await?;

        let responses = match object_name(path) {
            Some(name) => {
                let object = objects
                    .iter()
                    .find(|object| object.name == name)
                    .ok_or_else(|| ServiceError::NotFound(path.to_string()))?;
                vec![object_response(resource, object, &request)]
            }
            None => std::iter::once(collection_response(resource, &objects, &request))
                .chain(
                    objects
                        .iter()
                        .map(|object| object_response(resource, object, &request)),
                )
                .collect(),
        };

        tracing::debug!(responses = responses.len(), "PROPFIND answered");
        serialize_multistatus(&Multistatus { responses })
    }

    #[tracing::instrument(skip(self, xml), fields(calendar = %resource))]
    async fn report(
        &self,
        xml: &[u8],
        resource: &ResourceIdentifier,
        path: &str,
    ) -> ServiceResult<Vec<u8>> {
        let request = parse_report(xml)?;
        let objects = self.store.list(resource).await?;

        let responses: Vec<Response> = match request {
            ReportRequest::Multiget { properties, hrefs } => {
                let properties = PropfindRequest::Prop(report_properties(properties));
                hrefs
                    .iter()
                    .map(|href| {
                        let found = href_object_name(href, resource)
                            .and_then(|name| objects.iter().find(|object| object.name == name));
                        match found {
                            Some(object) => object_response(resource, object, &properties),
                            None => Response {
                                href: href.clone(),
                                outcome: Outcome::Status(StatusCode::NOT_FOUND),
                            },
                        }
                    })
                    .collect()
            }
            ReportRequest::Query {
                properties,
                component,
            } => {
                let properties = PropfindRequest::Prop(report_properties(properties));
                objects
                    .iter()
                    .filter(|object| {
                        component
                            .as_deref()
                            .is_none_or(|component| contains_component(&object.data, component))
                    })
                    .map(|object| object_response(resource, object, &properties))
                    .collect()
            }
        };

        tracing::debug!(path, responses = responses.len(), "REPORT answered");
        serialize_multistatus(&Multistatus { responses })
    }
}

/// Object name addressed by a `/<namespace>/<calendar>/<object>` path.
fn object_name(path: &str) -> Option<String> {
    path_segments(path).into_iter().nth(2)
}

/// Object name of an href inside `resource`. Hrefs may be absolute URLs.
fn href_object_name(href: &str, resource: &ResourceIdentifier) -> Option<String> {
    let path = href
        .split_once("://")
        .map_or(href, |(_, rest)| rest.find('/').map_or("", |i| &rest[i..]));
    let segments = path_segments(path);
    match segments.as_slice() {
        [namespace, calendar, name]
            if namespace == resource.namespace() && calendar == resource.calendar() =>
        {
            Some(name.clone())
        }
        _ => None,
    }
}

fn report_properties(properties: Vec<QName>) -> Vec<QName> {
    if properties.is_empty() {
        vec![QName::dav("getetag"), QName::caldav("calendar-data")]
    } else {
        properties
    }
}

fn contains_component(data: &str, component: &str) -> bool {
    data.lines()
        .filter_map(|line| line.trim_end().split_once(':'))
        .any(|(key, value)| key.eq_ignore_ascii_case("BEGIN") && value.eq_ignore_ascii_case(component))
}

fn collection_href(resource: &ResourceIdentifier) -> String {
    format!(
        "/{}/{}/",
        utf8_percent_encode(resource.namespace(), SEGMENT),
        utf8_percent_encode(resource.calendar(), SEGMENT)
    )
}

fn object_href(resource: &ResourceIdentifier, object: &StoredObject) -> String {
    format!(
        "{}{}",
        collection_href(resource),
        utf8_percent_encode(&object.name, SEGMENT)
    )
}

fn collection_response(
    resource: &ResourceIdentifier,
    objects: &[StoredObject],
    request: &PropfindRequest,
) -> Response {
    let ctag = etag_for(
        objects
            .iter()
            .map(|object| object.etag.as_str())
            .collect::<String>()
            .as_bytes(),
    );

    let value_of = |name: &QName| -> Option<PropertyValue> {
        let value = match (name.namespace.as_str(), name.local_name.as_str()) {
            (DAV_NS, "resourcetype") => PropertyValue::ResourceType(vec![
                QName::dav("collection"),
                QName::caldav("calendar"),
            ]),
            (DAV_NS, "displayname") => PropertyValue::Text(resource.calendar().to_string()),
            (DAV_NS, "getcontenttype") => PropertyValue::Text(CALENDAR_CONTENT_TYPE.to_string()),
            (DAV_NS, "getetag") => PropertyValue::Text(ctag.clone()),
            (super::CALENDARSERVER_NS, "getctag") => PropertyValue::Text(ctag.clone()),
            (super::CALDAV_NS, "supported-calendar-component-set") => {
                PropertyValue::Components(SUPPORTED_COMPONENTS.to_vec())
            }
            _ => return None,
        };
        Some(value)
    };

    let all = [
        QName::dav("resourcetype"),
        QName::dav("displayname"),
        QName::dav("getcontenttype"),
        QName::dav("getetag"),
        QName::calendarserver("getctag"),
        QName::caldav("supported-calendar-component-set"),
    ];

    Response {
        href: collection_href(resource),
        outcome: Outcome::Propstats(propstats(request, &all, value_of)),
    }
}

fn object_response(
    resource: &ResourceIdentifier,
    object: &StoredObject,
    request: &PropfindRequest,
) -> Response {
    let value_of = |name: &QName| -> Option<PropertyValue> {
        let value = match (name.namespace.as_str(), name.local_name.as_str()) {
            (DAV_NS, "resourcetype") => PropertyValue::ResourceType(Vec::new()),
            (DAV_NS, "getcontenttype") => PropertyValue::Text(CALENDAR_CONTENT_TYPE.to_string()),
            (DAV_NS, "getcontentlength") => PropertyValue::Text(object.data.len().to_string()),
            (DAV_NS, "getetag") => PropertyValue::Text(object.etag.clone()),
            (super::CALDAV_NS, "calendar-data") => PropertyValue::Text(object.data.clone()),
            _ => return None,
        };
        Some(value)
    };

    // calendar-data is only returned when asked for by name.
    let all = [
        QName::dav("resourcetype"),
        QName::dav("getcontenttype"),
        QName::dav("getcontentlength"),
        QName::dav("getetag"),
    ];

    Response {
        href: object_href(resource, object),
        outcome: Outcome::Propstats(propstats(request, &all, value_of)),
    }
}

/// Splits the requested properties into a 200 propstat for those with a value
/// and a 404 propstat for the rest. Empty propstats are omitted.
fn propstats(
    request: &PropfindRequest,
    all: &[QName],
    value_of: impl Fn(&QName) -> Option<PropertyValue>,
) -> Vec<Propstat> {
    let (found, missing) = match request {
        PropfindRequest::AllProp => (
            all.iter()
                .filter_map(|name| value_of(name).map(|value| Property::new(name.clone(), value)))
                .collect(),
            Vec::new(),
        ),
        PropfindRequest::PropName => (
            all.iter()
                .map(|name| Property::new(name.clone(), PropertyValue::Empty))
                .collect(),
            Vec::new(),
        ),
        PropfindRequest::Prop(names) => {
            let mut found = Vec::new();
            let mut missing = Vec::new();
            for name in names {
                match value_of(name) {
                    Some(value) => found.push(Property::new(name.clone(), value)),
                    None => missing.push(Property::new(name.clone(), PropertyValue::Empty)),
                }
            }
            (found, missing)
        }
    };

    [(StatusCode::OK, found), (StatusCode::NOT_FOUND, missing)]
        .into_iter()
        .filter(|(_, properties)| !properties.is_empty())
        .map(|(status, properties)| Propstat { status, properties })
        .collect()
}
