//! Axum extractors for request handling
//!
//! Custom extractors for API-token authentication, the acting admin,
//! path parameters and validated JSON bodies.

mod auth;
mod path;
mod validated;

pub use auth::{Actor, ApiToken, ACTOR_HEADER};
pub use path::PrincipalIdPath;
pub use validated::{OptionalValidatedJson, ValidatedJson};
