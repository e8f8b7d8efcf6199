//! Tests for PROPFIND method.
//!
//! Verifies collection and object property discovery, unknown property
//! reporting and malformed request handling.

use salvo::http::StatusCode;

use super::helpers::*;

const PROP_DISPLAYNAME_AND_COLOR: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<D:propfind xmlns:D="DAV:" xmlns:A="http://apple.com/ns/ical/">
  <D:prop>
    <D:displayname/>
    <A:calendar-color/>
  </D:prop>
</D:propfind>"#;

const PROP_CTAG: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<D:propfind xmlns:D="DAV:" xmlns:CS="http://calendarserver.org/ns/">
  <D:prop>
    <CS:getctag/>
  </D:prop>
</D:propfind>"#;

const PROP_CALENDAR_DATA: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<D:propfind xmlns:D="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
  <D:prop>
    <D:getetag/>
    <C:calendar-data/>
  </D:prop>
</D:propfind>"#;

const ALLPROP: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<D:propfind xmlns:D="DAV:"><D:allprop/></D:propfind>"#;

// ============================================================================
// Collection Tests
// ============================================================================

/// ## Summary
/// Test that PROPFIND on a calendar lists the collection and its objects.
#[test_log::test(tokio::test)]
async fn propfind_collection_lists_objects() {
    let server = TestServer::with_policy().await;
    server.seed_as_alice("/alice/work/event.ics", EVENT_ICS).await;
    server.seed_as_alice("/alice/work/todo.ics", TODO_ICS).await;

    let response = TestRequest::propfind("/alice/work/")
        .depth("1")
        .xml_body(ALLPROP)
        .send(&server.service)
        .await
        .assert_status(StatusCode::MULTI_STATUS)
        .assert_header("Content-Type", "application/xml; charset=utf-8")
        .assert_header_contains("DAV", "calendar-access")
        .assert_content_length()
        .assert_multistatus()
        .assert_body_contains("<D:href>/alice/work/</D:href>")
        .assert_body_contains("<D:href>/alice/work/event.ics</D:href>")
        .assert_body_contains("<D:href>/alice/work/todo.ics</D:href>")
        .assert_body_contains("<D:collection/>")
        .assert_body_contains("<C:calendar/>")
        .assert_body_contains("<D:displayname>work</D:displayname>")
        .assert_body_contains("<CS:getctag>")
        .assert_body_not_contains("<C:calendar-data>");

    assert_eq!(response.count_multistatus_responses(), 3);
}

/// ## Summary
/// Test that an empty body is treated as allprop.
#[test_log::test(tokio::test)]
async fn propfind_empty_body_is_allprop() {
    let server = TestServer::with_policy().await;

    let response = TestRequest::propfind("/alice/work/")
        .send(&server.service)
        .await
        .assert_status(StatusCode::MULTI_STATUS)
        .assert_body_contains("<D:resourcetype>")
        .assert_body_contains("<C:supported-calendar-component-set>")
        .assert_body_contains("<C:comp name=\"VEVENT\"/>");

    assert_eq!(response.count_multistatus_responses(), 1);
}

/// ## Summary
/// Test that unknown properties land in a 404 propstat.
#[test_log::test(tokio::test)]
async fn propfind_unknown_property_is_not_found() {
    let server = TestServer::with_policy().await;

    TestRequest::propfind("/alice/work/")
        .xml_body(PROP_DISPLAYNAME_AND_COLOR)
        .send(&server.service)
        .await
        .assert_status(StatusCode::MULTI_STATUS)
        .assert_body_contains("<D:displayname>work</D:displayname>")
        .assert_body_contains("calendar-color")
        .assert_body_contains("HTTP/1.1 200 OK")
        .assert_body_contains("HTTP/1.1 404 Not Found");
}

/// ## Summary
/// Test that the collection tag changes when an object changes.
#[test_log::test(tokio::test)]
async fn propfind_ctag_changes_after_write() {
    let server = TestServer::with_policy().await;
    server.seed_as_alice("/alice/work/event.ics", EVENT_ICS).await;

    let before = TestRequest::propfind("/alice/work/")
        .xml_body(PROP_CTAG)
        .send(&server.service)
        .await
        .assert_status(StatusCode::MULTI_STATUS)
        .body_string();

    server
        .seed_as_alice("/alice/work/event.ics", &EVENT_ICS.replace("Planning", "Review"))
        .await;

    let after = TestRequest::propfind("/alice/work/")
        .xml_body(PROP_CTAG)
        .send(&server.service)
        .await
        .assert_status(StatusCode::MULTI_STATUS)
        .body_string();

    assert_ne!(before, after);
}

// ============================================================================
// Object Tests
// ============================================================================

/// ## Summary
/// Test that PROPFIND on an object path answers only that object.
#[test_log::test(tokio::test)]
async fn propfind_object_returns_single_response() {
    let server = TestServer::with_policy().await;
    server.seed_as_alice("/alice/work/event.ics", EVENT_ICS).await;
    server.seed_as_alice("/alice/work/todo.ics", TODO_ICS).await;

    let response = TestRequest::propfind("/alice/work/event.ics")
        .depth("0")
        .xml_body(PROP_CALENDAR_DATA)
        .send(&server.service)
        .await
        .assert_status(StatusCode::MULTI_STATUS)
        .assert_body_contains("<D:href>/alice/work/event.ics</D:href>")
        .assert_body_contains("<D:getetag>")
        .assert_body_contains("SUMMARY:Planning")
        .assert_body_not_contains("todo.ics");

    assert_eq!(response.count_multistatus_responses(), 1);
}

/// ## Summary
/// Test that PROPFIND on a missing object is 404.
#[test_log::test(tokio::test)]
async fn propfind_missing_object_is_not_found() {
    let server = TestServer::with_policy().await;

    TestRequest::propfind("/alice/work/missing.ics")
        .send(&server.service)
        .await
        .assert_status(StatusCode::NOT_FOUND)
        .assert_content_length();
}

// ============================================================================
// Error Tests
// ============================================================================

/// ## Summary
/// Test that malformed XML is a bad request.
#[test_log::test(tokio::test)]
async fn propfind_malformed_xml_is_bad_request() {
    let server = TestServer::with_policy().await;

    TestRequest::propfind("/alice/work/")
        .xml_body("<D:propfind xmlns:D=\"DAV:\"><D:prop></D:propfind>")
        .send(&server.service)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

/// ## Summary
/// Test that PROPFIND on a path naming no calendar is 404.
#[test_log::test(tokio::test)]
async fn propfind_root_is_not_found() {
    let server = TestServer::with_policy().await;

    TestRequest::propfind("/")
        .send(&server.service)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
