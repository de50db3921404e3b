//! Member entity <-> model mapper

use gate_core::entities::Member;
use gate_core::error::DomainError;
use gate_core::value_objects::{MembershipId, PrincipalId};

use super::{from_unix_opt, to_unix_opt};
use crate::models::{MemberModel, SqliteMemberModel};

impl From<MemberModel> for Member {
    fn from(model: MemberModel) -> Self {
        Member {
            id: model.id,
            membership_id: MembershipId::new(model.membership_id),
            principal_id: model.principal_id.map(PrincipalId::new),
            is_confirmed: model.is_confirmed,
            is_banned: model.is_banned,
            expires_at: model.expires_at,
            warn_sent_at: model.warn_sent_at,
            grace_notified_at: model.grace_notified_at,
            handle: model.handle,
            display_name: model.display_name,
        }
    }
}

impl TryFrom<SqliteMemberModel> for Member {
    type Error = DomainError;

    fn try_from(model: SqliteMemberModel) -> Result<Self, Self::Error> {
        Ok(Member {
            id: model.id,
            membership_id: MembershipId::new(model.membership_id),
            principal_id: model.principal_id.map(PrincipalId::new),
            is_confirmed: model.is_confirmed,
            is_banned: model.is_banned,
            expires_at: from_unix_opt(model.expires_at)?,
            warn_sent_at: from_unix_opt(model.warn_sent_at)?,
            grace_notified_at: from_unix_opt(model.grace_notified_at)?,
            handle: model.handle,
            display_name: model.display_name,
        })
    }
}

/// Unix-second view of a member's timestamps for SQLite binds
pub(crate) fn sqlite_timestamps(member: &Member) -> [Option<i64>; 3] {
    [
        to_unix_opt(member.expires_at),
        to_unix_opt(member.warn_sent_at),
        to_unix_opt(member.grace_notified_at),
    ]
}

/// Convert a batch of SQLite rows
pub(crate) fn sqlite_members(rows: Vec<SqliteMemberModel>) -> Result<Vec<Member>, DomainError> {
    rows.into_iter().map(Member::try_from).collect()
}
