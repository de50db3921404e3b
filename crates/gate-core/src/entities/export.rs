//! Export row - a member record flattened for reporting

use std::fmt::Write;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use super::Member;
use crate::value_objects::{MembershipId, PrincipalId};

/// One line of a member export, with the status derived at export time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    pub membership_id: MembershipId,
    pub principal_id: Option<PrincipalId>,
    pub handle: Option<String>,
    pub display_name: Option<String>,
    pub is_confirmed: bool,
    pub is_banned: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub status: &'static str,
    /// Seconds left for active members, 0 for expired ones
    pub remaining_secs: Option<i64>,
}

impl ExportRow {
    pub fn from_member(member: &Member, now: DateTime<Utc>) -> Self {
        let status = member.status(now);
        Self {
            membership_id: member.membership_id.clone(),
            principal_id: member.principal_id,
            handle: member.handle.clone(),
            display_name: member.display_name.clone(),
            is_confirmed: member.is_confirmed,
            is_banned: member.is_banned,
            expires_at: member.expires_at,
            status: status.label(),
            remaining_secs: status.remaining_seconds(),
        }
    }

    fn csv_fields(&self) -> [String; CSV_COLUMNS.len()] {
        [
            self.membership_id.to_string(),
            self.principal_id.map(|p| p.to_string()).unwrap_or_default(),
            self.handle.clone().unwrap_or_default(),
            self.is_confirmed.to_string(),
            self.is_banned.to_string(),
            self.expires_at
                .map(|at| at.to_rfc3339_opts(SecondsFormat::Secs, true))
                .unwrap_or_default(),
            self.remaining_secs.map(|s| s.to_string()).unwrap_or_default(),
            self.status.to_string(),
        ]
    }
}

/// Header of the CSV export, in column order
pub const CSV_COLUMNS: [&str; 8] = [
    "membership_id",
    "principal_id",
    "handle",
    "is_confirmed",
    "is_banned",
    "expires_at",
    "remaining_secs",
    "status",
];

/// Render rows as CSV with a header line and CRLF line endings
///
/// Absent values are empty fields. Fields holding a comma, quote or line
/// break are quoted with inner quotes doubled.
pub fn render_csv(rows: &[ExportRow]) -> String {
    let mut out = String::new();
    push_record(&mut out, CSV_COLUMNS.iter().copied());
    for row in rows {
        let fields = row.csv_fields();
        push_record(&mut out, fields.iter().map(String::as_str));
    }
    out
}

fn push_record<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>) {
    for (i, field) in fields.enumerate() {
        if i > 0 {
            out.push(',');
        }
        if field.contains([',', '"', '\n', '\r']) {
            let _ = write!(out, "\"{}\"", field.replace('"', "\"\""));
        } else {
            out.push_str(field);
        }
    }
    out.push_str("\r\n");
}
