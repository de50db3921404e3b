//! Admin entity <-> model mapper

use gate_core::entities::Admin;
use gate_core::value_objects::PrincipalId;

use crate::models::{AdminModel, SqliteAdminModel};

impl From<AdminModel> for Admin {
    fn from(model: AdminModel) -> Self {
        Admin::new(PrincipalId::new(model.principal_id), model.is_top_level)
    }
}

impl From<SqliteAdminModel> for Admin {
    fn from(model: SqliteAdminModel) -> Self {
        Admin::new(PrincipalId::new(model.principal_id), model.is_top_level)
    }
}
