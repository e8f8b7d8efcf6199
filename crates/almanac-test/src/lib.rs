//! Almanac CalDAV server - integration test support.
//!
//! Re-exports the workspace crates so integration tests can reach every layer
//! through one dependency.

pub mod component {
    pub use almanac_core::{config, constants};
    pub use almanac_service::{auth, dav, error};

    pub mod app {
        pub use almanac_app::app::api::{routes, service_router};
    }
}
