use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
pub enum Role {
    Manager,
    Employee,
}

impl Role {
    pub fn is_manager(&self) -> bool {
        *self == Role::Manager
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn parses_stored_names() {
        assert_eq!(Role::from_str("Manager").unwrap(), Role::Manager);
        assert_eq!(Role::from_str("Employee").unwrap(), Role::Employee);
        assert!(Role::from_str("Admin").is_err());
        assert_eq!(Role::Employee.to_string(), "Employee");
    }
}
