//! Endpoint link entity <-> model mapper

use gate_core::entities::EndpointLink;
use gate_core::error::DomainError;
use gate_core::value_objects::EndpointId;

use super::from_unix;
use crate::models::{EndpointLinkModel, SqliteEndpointLinkModel};

impl From<EndpointLinkModel> for EndpointLink {
    fn from(model: EndpointLinkModel) -> Self {
        EndpointLink {
            endpoint_id: EndpointId::new(model.endpoint_id),
            link: model.link,
            updated_at: model.updated_at,
        }
    }
}

impl TryFrom<SqliteEndpointLinkModel> for EndpointLink {
    type Error = DomainError;

    fn try_from(model: SqliteEndpointLinkModel) -> Result<Self, Self::Error> {
        Ok(EndpointLink {
            endpoint_id: EndpointId::new(model.endpoint_id),
            link: model.link,
            updated_at: from_unix(model.updated_at)?,
        })
    }
}
