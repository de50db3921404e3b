//! Path parameter extractors
//!
//! Raw path segments are kept as strings and parsed on demand so that a
//! malformed id becomes `INVALID_PATH_PARAMETER`.

use gate_core::PrincipalId;
use serde::Deserialize;

use crate::response::ApiError;

/// Path parameters with principal_id
#[derive(Debug, Deserialize)]
pub struct PrincipalIdPath {
    pub principal_id: String,
}

impl PrincipalIdPath {
    /// Parse principal_id as a numeric id
    pub fn principal_id(&self) -> Result<PrincipalId, ApiError> {
        PrincipalId::parse(&self.principal_id)
            .map_err(|_| ApiError::invalid_path("Invalid principal_id format"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_principal_id_path_parsing() {
        let path = PrincipalIdPath {
            principal_id: "-1001".to_string(),
        };
        assert_eq!(path.principal_id().unwrap(), PrincipalId::new(-1001));

        let path = PrincipalIdPath {
            principal_id: "abc".to_string(),
        };
        assert!(matches!(path.principal_id(), Err(ApiError::InvalidPath(_))));
    }
}
