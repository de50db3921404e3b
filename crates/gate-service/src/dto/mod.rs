//! Data transfer objects for API requests and responses
//!
//! - Request DTOs with validation for API inputs
//! - Response DTOs for serializing API outputs

pub mod requests;
pub mod responses;

pub use requests::{
    AddAdminRequest, ConfirmRequest, ExportQuery, JoinRequest, LocaleRequest, SubmissionRequest,
};
pub use responses::{
    AdminResponse, EndpointFailure, EnforcementResponse, ExportResponse, GrantDurationResponse,
    HealthChecks, HealthResponse, JoinDecisionResponse, LocaleResponse, MemberCard, ReadinessResponse,
    SubmissionResponse, TransitionResponse,
};
