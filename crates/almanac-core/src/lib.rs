//! Shared configuration, errors and protocol constants for the Almanac server.

pub mod config;
pub mod constants;
pub mod error;
