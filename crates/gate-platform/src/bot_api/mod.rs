//! Bot API endpoint adapter.
//!
//! Implements [`gate_core::EndpointClient`] against a Telegram-style bot HTTP API.

mod client;
mod types;

pub use client::BotApiClient;
pub use types::{BotResponse, ChatMember, InviteLink};
