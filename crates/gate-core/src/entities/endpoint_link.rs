//! Cached invitation reference for an access endpoint

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::value_objects::EndpointId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointLink {
    pub endpoint_id: EndpointId,
    pub link: String,
    pub updated_at: DateTime<Utc>,
}
