//! Multistatus XML serialization.

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use salvo::http::StatusCode;

use super::{CALDAV_NS, CALENDARSERVER_NS, DAV_NS, QName};
use crate::error::ServiceResult;

#[derive(Debug, Clone, Default)]
pub struct Multistatus {
    pub responses: Vec<Response>,
}

#[derive(Debug, Clone)]
pub struct Response {
    pub href: String,
    pub outcome: Outcome,
}

/// A response carries either per-property results or a single status.
#[derive(Debug, Clone)]
pub enum Outcome {
    Propstats(Vec<Propstat>),
    Status(StatusCode),
}

#[derive(Debug, Clone)]
pub struct Propstat {
    pub status: StatusCode,
    pub properties: Vec<Property>,
}

#[derive(Debug, Clone)]
pub struct Property {
    pub name: QName,
    pub value: PropertyValue,
}

#[derive(Debug, Clone)]
pub enum PropertyValue {
    Empty,
    Text(String),
    ResourceType(Vec<QName>),
    /// `supported-calendar-component-set` entries.
    Components(Vec<&'static str>),
}

impl Property {
    #[must_use]
    pub fn new(name: QName, value: PropertyValue) -> Self {
        Self { name, value }
    }
}

#[must_use]
pub fn status_line(status: StatusCode) -> String {
    format!(
        "HTTP/1.1 {} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or_default()
    )
}

/// ## Summary
/// Serializes a multistatus response to UTF-8 XML.
///
/// ## Errors
/// Returns an error if XML writing fails.
pub fn serialize_multistatus(multistatus: &Multistatus) -> ServiceResult<Vec<u8>> {
    let mut writer = Writer::new(Vec::new());

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

    let mut elem = BytesStart::new("D:multistatus");
    elem.push_attribute(("xmlns:D", DAV_NS));
    elem.push_attribute(("xmlns:C", CALDAV_NS));
    elem.push_attribute(("xmlns:CS", CALENDARSERVER_NS));
    writer.write_event(Event::Start(elem))?;

    for response in &multistatus.responses {
        write_response(&mut writer, response)?;
    }

    writer.write_event(Event::End(BytesEnd::new("D:multistatus")))?;

    Ok(writer.into_inner())
}

fn write_response<W: std::io::Write>(
    writer: &mut Writer<W>,
    response: &Response,
) -> Result<(), quick_xml::Error> {
    writer.write_event(Event::Start(BytesStart::new("D:response")))?;
    write_text_element(writer, "D:href", &response.href)?;

    match &response.outcome {
        Outcome::Status(status) => {
            write_text_element(writer, "D:status", &status_line(*status))?;
        }
        Outcome::Propstats(propstats) => {
            for propstat in propstats {
                writer.write_event(Event::Start(BytesStart::new("D:propstat")))?;
                writer.write_event(Event::Start(BytesStart::new("D:prop")))?;
                for prop in &propstat.properties {
                    write_property(writer, prop)?;
                }
                writer.write_event(Event::End(BytesEnd::new("D:prop")))?;
                write_text_element(writer, "D:status", &status_line(propstat.status))?;
                writer.write_event(Event::End(BytesEnd::new("D:propstat")))?;
            }
        }
    }

    writer.write_event(Event::End(BytesEnd::new("D:response")))?;
    Ok(())
}

fn write_property<W: std::io::Write>(
    writer: &mut Writer<W>,
    prop: &Property,
) -> Result<(), quick_xml::Error> {
    let (elem_name, foreign_ns) = element_name(&prop.name);
    let start = || {
        let mut elem = BytesStart::new(elem_name.as_str());
        if let Some(ns) = foreign_ns {
            elem.push_attribute(("xmlns:X", ns));
        }
        elem
    };

    match &prop.value {
        PropertyValue::Empty => {
            writer.write_event(Event::Empty(start()))?;
        }
        PropertyValue::Text(text) => {
            writer.write_event(Event::Start(start()))?;
            writer.write_event(Event::Text(BytesText::new(text)))?;
            writer.write_event(Event::End(BytesEnd::new(elem_name.as_str())))?;
        }
        PropertyValue::ResourceType(types) => {
            writer.write_event(Event::Start(start()))?;
            for rt in types {
                let (rt_name, _) = element_name(rt);
                writer.write_event(Event::Empty(BytesStart::new(rt_name.as_str())))?;
            }
            writer.write_event(Event::End(BytesEnd::new(elem_name.as_str())))?;
        }
        PropertyValue::Components(components) => {
            writer.write_event(Event::Start(start()))?;
            for comp in components {
                let mut comp_elem = BytesStart::new("C:comp");
                comp_elem.push_attribute(("name", *comp));
                writer.write_event(Event::Empty(comp_elem))?;
            }
            writer.write_event(Event::End(BytesEnd::new(elem_name.as_str())))?;
        }
    }

    Ok(())
}

/// Prefixed element name, plus the namespace to declare inline when it is not
/// one of the root declarations.
fn element_name(name: &QName) -> (String, Option<&str>) {
    match namespace_prefix(&name.namespace) {
        Some(prefix) => (format!("{prefix}:{}", name.local_name), None),
        None => (format!("X:{}", name.local_name), Some(name.namespace.as_str())),
    }
}

fn namespace_prefix(namespace: &str) -> Option<&'static str> {
    match namespace {
        DAV_NS => Some("D"),
        CALDAV_NS => Some("C"),
        CALENDARSERVER_NS => Some("CS"),
        _ => None,
    }
}

fn write_text_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    name: &str,
    text: &str,
) -> Result<(), quick_xml::Error> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}
