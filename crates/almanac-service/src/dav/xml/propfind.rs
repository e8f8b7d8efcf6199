//! PROPFIND request XML parsing.

use quick_xml::Reader;
use quick_xml::events::Event;

use super::{Namespaces, QName, collect_namespaces, invalid_xml, resolve_qname};
use crate::error::ServiceResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropfindRequest {
    /// Every property the server knows about.
    AllProp,
    /// Property names only, without values.
    PropName,
    /// The listed properties.
    Prop(Vec<QName>),
}

/// ## Summary
/// Parses a PROPFIND request body. An empty body asks for all properties.
///
/// ## Errors
/// Returns `InvalidRequest` if the XML is malformed or has no `propfind` root.
pub fn parse_propfind(xml: &[u8]) -> ServiceResult<PropfindRequest> {
    if xml.iter().all(u8::is_ascii_whitespace) {
        return Ok(PropfindRequest::AllProp);
    }

    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut namespaces = Namespaces::new();
    let mut seen_root = false;
    let mut request: Option<PropfindRequest> = None;
    let mut properties = Vec::new();
    // Element depth inside <prop>; properties are its direct children.
    let mut prop_depth: Option<usize> = None;

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
                } else if !seen_root {
                    if !name.is(super::DAV_NS, "propfind") {
                        return Err(invalid_xml(format!("unexpected root {}", name.local_name)));
                    }
                    seen_root = true;
                } else if name.is(super::DAV_NS, "prop") {
                    prop_depth = Some(0);
                } else {
                    request = request.or_else(|| selector(&name));
                }
            }
            Ok(Event::Empty(ref e)) => {
                collect_namespaces(e, &mut namespaces)?;
                let name = resolve_qname(e, &namespaces)?;

                if prop_depth == Some(0) {
                    properties.push(name);
                } else if prop_depth.is_some() {
                    // Nested content of a requested property
                } else if !seen_root {
                    if !name.is(super::DAV_NS, "propfind") {
                        return Err(invalid_xml(format!("unexpected root {}", name.local_name)));
                    }
                    seen_root = true;
                } else if name.is(super::DAV_NS, "prop") {
                    request = Some(PropfindRequest::Prop(Vec::new()));
                } else {
                    request = request.or_else(|| selector(&name));
                }
            }
            Ok(Event::End(_)) => {
                if let Some(depth) = prop_depth {
                    if depth == 0 {
                        prop_depth = None;
                        request = Some(PropfindRequest::Prop(std::mem::take(&mut properties)));
                    } else {
                        prop_depth = Some(depth - 1);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(invalid_xml(e)),
            _ => {}
        }
        buf.clear();
    }

    if !seen_root {
        return Err(invalid_xml("missing propfind element"));
    }

    Ok(request.unwrap_or(PropfindRequest::AllProp))
}

fn selector(name: &QName) -> Option<PropfindRequest> {
    if name.is(super::DAV_NS, "allprop") {
        Some(PropfindRequest::AllProp)
    } else if name.is(super::DAV_NS, "propname") {
        Some(PropfindRequest::PropName)
    } else {
        None
    }
}
