//! Ports - interfaces the infrastructure layer implements

mod ports;
mod repositories;

pub use ports::{EndpointClient, Notifier};
pub use repositories::{
    AdminRepository, EndpointLinkRepository, MemberLookup, MemberRepository, PrincipalRepository,
    RepoResult,
};
