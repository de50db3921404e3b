//! Principal entity <-> model mapper

use gate_core::entities::Principal;
use gate_core::error::DomainError;
use gate_core::value_objects::PrincipalId;

use super::from_unix;
use crate::models::{PrincipalModel, SqlitePrincipalModel};

impl From<PrincipalModel> for Principal {
    fn from(model: PrincipalModel) -> Self {
        Principal {
            id: PrincipalId::new(model.id),
            handle: model.handle,
            display_name: model.display_name,
            locale: model.locale,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl TryFrom<SqlitePrincipalModel> for Principal {
    type Error = DomainError;

    fn try_from(model: SqlitePrincipalModel) -> Result<Self, Self::Error> {
        Ok(Principal {
            id: PrincipalId::new(model.id),
            handle: model.handle,
            display_name: model.display_name,
            locale: model.locale,
            created_at: from_unix(model.created_at)?,
            updated_at: from_unix(model.updated_at)?,
        })
    }
}
