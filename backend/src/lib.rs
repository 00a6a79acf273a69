//! Organisation chart backend library.
//!
//! Hexagonal layout: [`domain`] holds the rules and ports, [`inbound`] the
//! actix-web adapter, and [`outbound`] the PostgreSQL and in-memory stores.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
