//! Calendar storage and DAV XML operations.
//!
//! - `collaborator`: Contracts the HTTP layer calls (`CalendarStore`, `DavEngine`) and the `Collaborators` bundle
//! - `etag`: Entity tag computation and `If-Match` evaluation
//! - `store`: File-system backed `CalendarStore`
//! - `xml`: Multistatus PROPFIND/REPORT engine over any `CalendarStore`

pub mod collaborator;
pub mod etag;
pub mod store;
pub mod xml;

pub use collaborator::{CalendarStore, Collaborators, DavEngine, StoredObject};
pub use store::FsCalendarStore;
pub use xml::XmlDavEngine;
