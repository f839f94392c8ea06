//! Recipe backend library modules.
//!
//! The crate follows a ports-and-adapters layout: `domain` owns entities,
//! validation, reconciliation, and the ports; `inbound` exposes them over
//! HTTP; `outbound` implements the driven ports against PostgreSQL, memory,
//! and the filesystem.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
