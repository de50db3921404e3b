//! Error types for the domain layer and its ports

mod domain_error;

pub use domain_error::{DeliveryError, DomainError, EndpointError};
