//! Bot API wire types.

use serde::{Deserialize, Serialize};

/// Envelope every bot API method answers with
#[derive(Debug, Clone, Deserialize)]
pub struct BotResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub error_code: Option<u16>,
}

/// Invitation link returned by `createChatInviteLink`
#[derive(Debug, Clone, Deserialize)]
pub struct InviteLink {
    pub invite_link: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub creates_join_request: bool,
}

/// Membership record returned by `getChatMember`
#[derive(Debug, Clone, Deserialize)]
pub struct ChatMember {
    pub status: String,
}

impl ChatMember {
    /// Anyone not `left` or `kicked` is inside the chat, restricted members included
    pub fn is_present(&self) -> bool {
        !matches!(self.status.as_str(), "left" | "kicked")
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct GetChatMember {
    pub chat_id: i64,
    pub user_id: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct BanChatMember {
    pub chat_id: i64,
    pub user_id: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct UnbanChatMember {
    pub chat_id: i64,
    pub user_id: i64,
    pub only_if_banned: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateChatInviteLink<'a> {
    pub chat_id: i64,
    pub creates_join_request: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
}
