//! Tests for PUT method.
//!
//! Verifies storage of calendar objects, request body charset decoding and
//! conditional writes with `If-Match`.

use salvo::http::StatusCode;

use super::helpers::*;

/// `SUMMARY:Café` encoded as ISO-8859-1.
fn latin1_event() -> Vec<u8> {
    let mut body = b"BEGIN:VCALENDAR\r\nVERSION:2.0\r\nBEGIN:VEVENT\r\nUID:cafe@example.com\r\nSUMMARY:Caf"
        .to_vec();
    body.push(0xE9);
    body.extend_from_slice(b"\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n");
    body
}

// ============================================================================
// Basic PUT Tests
// ============================================================================

/// ## Summary
/// Test that PUT stores a new object and returns its ETag.
#[test_log::test(tokio::test)]
async fn put_creates_object() {
    let server = TestServer::with_policy().await;

    let response = TestRequest::put("/alice/work/event.ics")
        .basic_auth("alice", ALICE_PASSWORD)
        .icalendar_body(EVENT_ICS)
        .send(&server.service)
        .await
        .assert_status(StatusCode::CREATED)
        .assert_header("Content-Length", "0")
        .assert_body_empty();

    let etag = response.get_etag().expect("ETag on PUT");
    assert!(etag.starts_with('"') && etag.ends_with('"'), "{etag}");

    let stored = std::fs::read_to_string(server.storage_path().join("alice/work/event.ics"))
        .expect("stored object");
    assert_eq!(stored, EVENT_ICS);
}

/// ## Summary
/// Test that an overwrite changes the ETag.
#[test_log::test(tokio::test)]
async fn put_overwrite_changes_etag() {
    let server = TestServer::with_policy().await;
    let first = server.seed_as_alice("/alice/work/event.ics", EVENT_ICS).await;
    let second = server
        .seed_as_alice("/alice/work/event.ics", &EVENT_ICS.replace("Planning", "Review"))
        .await;

    assert_ne!(first, second);

    TestRequest::get("/alice/work/")
        .basic_auth("alice", ALICE_PASSWORD)
        .send(&server.service)
        .await
        .assert_status(StatusCode::OK)
        .assert_body_contains("SUMMARY:Review")
        .assert_body_not_contains("SUMMARY:Planning");
}

/// ## Summary
/// Test that a PUT addressing the collection itself is rejected.
#[test_log::test(tokio::test)]
async fn put_without_object_name_is_bad_request() {
    let server = TestServer::with_policy().await;

    TestRequest::put("/alice/work/")
        .basic_auth("alice", ALICE_PASSWORD)
        .icalendar_body(EVENT_ICS)
        .send(&server.service)
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_content_length();
}

/// ## Summary
/// Test that hidden object names are rejected.
#[test_log::test(tokio::test)]
async fn put_hidden_object_name_is_bad_request() {
    let server = TestServer::with_policy().await;

    TestRequest::put("/alice/work/.hidden.ics")
        .basic_auth("alice", ALICE_PASSWORD)
        .icalendar_body(EVENT_ICS)
        .send(&server.service)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

/// ## Summary
/// Test that an object name without the `.ics` extension is rejected, so
/// every accepted object is visible to GET.
#[test_log::test(tokio::test)]
async fn put_without_ics_extension_is_bad_request() {
    let server = TestServer::with_policy().await;

    TestRequest::put("/alice/work/event1")
        .basic_auth("alice", ALICE_PASSWORD)
        .icalendar_body(EVENT_ICS)
        .send(&server.service)
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_header_missing("ETag");

    TestRequest::get("/alice/work/")
        .basic_auth("alice", ALICE_PASSWORD)
        .send(&server.service)
        .await
        .assert_status(StatusCode::OK)
        .assert_body_not_contains("BEGIN:VEVENT");
}

/// ## Summary
/// Test that anonymous PUT never reaches the store.
#[test_log::test(tokio::test)]
async fn anonymous_put_is_not_stored() {
    let server = TestServer::with_policy().await;

    TestRequest::put("/alice/work/event.ics")
        .icalendar_body(EVENT_ICS)
        .send(&server.service)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    assert!(!server.storage_path().join("alice/work/event.ics").exists());
}

/// ## Summary
/// Test that a calendar name that is a file, not a folder, yields 409.
#[test_log::test(tokio::test)]
async fn put_into_non_directory_calendar_is_conflict() {
    let server = TestServer::with_policy().await;
    std::fs::create_dir_all(server.storage_path().join("alice")).expect("namespace dir");
    std::fs::write(server.storage_path().join("alice/work"), b"not a folder").expect("file");

    TestRequest::put("/alice/work/event.ics")
        .basic_auth("alice", ALICE_PASSWORD)
        .icalendar_body(EVENT_ICS)
        .send(&server.service)
        .await
        .assert_status(StatusCode::CONFLICT);
}

// ============================================================================
// Charset Tests
// ============================================================================

/// ## Summary
/// Test that an undeclared Latin-1 body is decoded through the fallback charsets.
#[test_log::test(tokio::test)]
async fn undeclared_latin1_body_uses_fallback() {
    let server = TestServer::with_policy().await;

    TestRequest::put("/alice/work/cafe.ics")
        .basic_auth("alice", ALICE_PASSWORD)
        .content_type("text/calendar")
        .body(latin1_event())
        .send(&server.service)
        .await
        .assert_status(StatusCode::CREATED);

    TestRequest::get("/alice/work/")
        .basic_auth("alice", ALICE_PASSWORD)
        .send(&server.service)
        .await
        .assert_status(StatusCode::OK)
        .assert_body_contains("SUMMARY:Café");
}

/// ## Summary
/// Test that a declared charset is honored.
#[test_log::test(tokio::test)]
async fn declared_charset_is_used() {
    let server = TestServer::with_policy().await;

    TestRequest::put("/alice/work/cafe.ics")
        .basic_auth("alice", ALICE_PASSWORD)
        .content_type("text/calendar; charset=\"ISO-8859-1\"")
        .body(latin1_event())
        .send(&server.service)
        .await
        .assert_status(StatusCode::CREATED);

    let stored = std::fs::read_to_string(server.storage_path().join("alice/work/cafe.ics"))
        .expect("stored object");
    assert!(stored.contains("SUMMARY:Café"), "{stored}");
}

/// ## Summary
/// Test that UTF-8 content is stored unchanged when declared as UTF-8.
#[test_log::test(tokio::test)]
async fn utf8_body_is_stored_unchanged() {
    let server = TestServer::with_policy().await;
    let ics = EVENT_ICS.replace("Planning", "Café ☕");

    server.seed_as_alice("/alice/work/event.ics", &ics).await;

    let stored = std::fs::read_to_string(server.storage_path().join("alice/work/event.ics"))
        .expect("stored object");
    assert_eq!(stored, ics);
}

// ============================================================================
// Precondition Tests
// ============================================================================

/// ## Summary
/// Test that a stale If-Match fails with 412 and leaves the object untouched.
#[test_log::test(tokio::test)]
async fn stale_if_match_is_precondition_failed() {
    let server = TestServer::with_policy().await;
    server.seed_as_alice("/alice/work/event.ics", EVENT_ICS).await;

    TestRequest::put("/alice/work/event.ics")
        .basic_auth("alice", ALICE_PASSWORD)
        .if_match("\"stale\"")
        .icalendar_body(&EVENT_ICS.replace("Planning", "Review"))
        .send(&server.service)
        .await
        .assert_status(StatusCode::PRECONDITION_FAILED)
        .assert_content_length();

    let stored = std::fs::read_to_string(server.storage_path().join("alice/work/event.ics"))
        .expect("stored object");
    assert_eq!(stored, EVENT_ICS);
}

/// ## Summary
/// Test that the current ETag satisfies If-Match.
#[test_log::test(tokio::test)]
async fn current_if_match_overwrites() {
    let server = TestServer::with_policy().await;
    let etag = server.seed_as_alice("/alice/work/event.ics", EVENT_ICS).await;

    TestRequest::put("/alice/work/event.ics")
        .basic_auth("alice", ALICE_PASSWORD)
        .if_match(&etag)
        .icalendar_body(&EVENT_ICS.replace("Planning", "Review"))
        .send(&server.service)
        .await
        .assert_status(StatusCode::CREATED)
        .assert_header_contains("ETag", "\"");
}

/// ## Summary
/// Test that If-Match on a missing object fails.
#[test_log::test(tokio::test)]
async fn if_match_on_missing_object_is_precondition_failed() {
    let server = TestServer::with_policy().await;

    TestRequest::put("/alice/work/event.ics")
        .basic_auth("alice", ALICE_PASSWORD)
        .if_match("*")
        .icalendar_body(EVENT_ICS)
        .send(&server.service)
        .await
        .assert_status(StatusCode::PRECONDITION_FAILED);
}
