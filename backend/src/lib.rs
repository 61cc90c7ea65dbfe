//! Session authentication backend for the site's CMS.
//!
//! The crate is laid out hexagonally: [`domain`] holds accounts, credentials,
//! sessions and the ports they are stored through; [`inbound`] exposes them
//! over HTTP; [`outbound`] implements the ports on PostgreSQL or in memory.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
