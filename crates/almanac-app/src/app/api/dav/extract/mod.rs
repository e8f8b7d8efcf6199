//! Request extraction: credentials and the access gate, body decoding.

pub mod auth;
pub mod body;
