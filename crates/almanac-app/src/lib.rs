pub mod app;
pub mod collaborators_handler;
pub mod config;
pub mod error;
