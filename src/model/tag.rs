use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::utils::validation::{TEXT_MAX_LEN, ValidationErrors, check_length, require_present};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Tag {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "Travel")]
    pub description: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TagPayload {
    #[schema(example = "Travel")]
    pub description: Option<String>,
}

impl TagPayload {
    /// Validated, trimmed description.
    pub fn validate(self) -> Result<String, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let description = require_present(&mut errors, "description", self.description);
        check_length(&mut errors, "description", description.as_deref(), TEXT_MAX_LEN);
        errors.finish(description.unwrap_or_default())
    }
}
