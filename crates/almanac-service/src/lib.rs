//! Protocol-facing services for the Almanac CalDAV server.
//!
//! Everything the HTTP layer calls lives here: credential parsing, the access
//! control backends, resource resolution, calendar storage and the DAV XML
//! engine. Storage and XML are reached through the traits in
//! [`dav::collaborator`], so the HTTP layer never depends on a concrete backend.

pub mod auth;
pub mod dav;
pub mod error;
