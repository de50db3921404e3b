//! Route handlers
//!
//! All HTTP request handlers organized by domain.

pub mod admins;
pub mod config;
pub mod health;
pub mod members;
pub mod principals;
pub mod submissions;
