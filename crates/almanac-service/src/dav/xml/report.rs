//! REPORT request XML parsing.
//!
//! Two reports are understood: `calendar-multiget`, which names objects by
//! href, and `calendar-query`, whose filter is honoured down to the component
//! type (`VEVENT`, `VTODO`, ...).

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::{
    CALDAV_NS, DAV_NS, Namespaces, QName, attribute, collect_namespaces, invalid_xml,
    resolve_qname,
};
use crate::error::{ServiceError, ServiceResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportRequest {
    Multiget {
        properties: Vec<QName>,
        hrefs: Vec<String>,
    },
    Query {
        properties: Vec<QName>,
        /// Component type the objects must contain, if the filter names one.
        component: Option<String>,
    },
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ReportKind {
    Multiget,
    Query,
}

/// ## Summary
/// Parses a REPORT request body.
///
/// ## Errors
/// Returns `InvalidRequest` if the XML is malformed, empty, or names a report
/// other than `calendar-multiget` and `calendar-query`.
pub fn parse_report(xml: &[u8]) -> ServiceResult<ReportRequest> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut namespaces = Namespaces::new();
    let mut kind: Option<ReportKind> = None;
    let mut properties = Vec::new();
    let mut hrefs = Vec::new();
    let mut comp_filters: Vec<String> = Vec::new();
    let mut prop_depth: Option<usize> = None;
    let mut in_href = false;
    let mut href_buf = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                collect_namespaces(e, &mut namespaces)?;
                let name = resolve_qname(e, &namespaces)?;

                if let Some(depth) = prop_depth.as_mut() {
                    if *depth == 0 {
                        properties.push(name);
                    }
                    *depth += 1;
                } else if kind.is_none() {
                    kind = Some(report_kind(&name)?);
                } else if name.is(DAV_NS, "prop") {
                    prop_depth = Some(0);
                } else if name.is(DAV_NS, "href") {
                    in_href = true;
                    href_buf.clear();
                } else {
                    record_comp_filter(e, &name, &mut comp_filters)?;
                }
            }
            Ok(Event::Empty(ref e)) => {
                collect_namespaces(e, &mut namespaces)?;
                let name = resolve_qname(e, &namespaces)?;

                if prop_depth == Some(0) {
                    properties.push(name);
                } else if prop_depth.is_some() {
                    // Nested content of a requested property
                } else if kind.is_none() {
                    kind = Some(report_kind(&name)?);
                } else {
                    record_comp_filter(e, &name, &mut comp_filters)?;
                }
            }
            Ok(Event::Text(ref e)) => {
                if in_href {
                    let decoded = reader.decoder().decode(e.as_ref()).map_err(invalid_xml)?;
                    href_buf.push_str(&decoded);
                }
            }
            Ok(Event::End(_)) => {
                if let Some(depth) = prop_depth {
                    prop_depth = depth.checked_sub(1);
                } else if in_href {
                    in_href = false;
                    hrefs.push(href_buf.trim().to_string());
                } else {
                    // Closing a filter or the report root
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(invalid_xml(e)),
            _ => {}
        }
        buf.clear();
    }

    let kind = kind.ok_or_else(|| invalid_xml("missing report element"))?;
    Ok(match kind {
        ReportKind::Multiget => ReportRequest::Multiget { properties, hrefs },
        ReportKind::Query => ReportRequest::Query {
            properties,
            // The outermost comp-filter selects VCALENDAR itself.
            component: comp_filters
                .into_iter()
                .find(|name| !name.eq_ignore_ascii_case("VCALENDAR")),
        },
    })
}

fn report_kind(name: &QName) -> ServiceResult<ReportKind> {
    if name.is(CALDAV_NS, "calendar-multiget") {
        Ok(ReportKind::Multiget)
    } else if name.is(CALDAV_NS, "calendar-query") {
        Ok(ReportKind::Query)
    } else {
        Err(ServiceError::InvalidRequest(format!(
            "unsupported report {}",
            name.local_name
        )))
    }
}

fn record_comp_filter(
    e: &BytesStart<'_>,
    name: &QName,
    comp_filters: &mut Vec<String>,
) -> ServiceResult<()> {
    if name.is(CALDAV_NS, "comp-filter")
        && let Some(component) = attribute(e, "name")?
    {
        comp_filters.push(component.to_ascii_uppercase());
    }
    Ok(())
}
