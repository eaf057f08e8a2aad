use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::role::Role;
use crate::model::user::{User, UserResponse};
use crate::utils::validation::{TEXT_MAX_LEN, ValidationErrors, check_length, require_present};

pub const PASSWORD_MIN_LEN: usize = 6;
pub const PASSWORD_MAX_LEN: usize = 128;

#[derive(Debug, Deserialize, ToSchema)]
pub struct SignUpRequest {
    pub user: SignUpUser,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SignUpUser {
    #[schema(example = "employee@email.com", format = "email")]
    pub email: Option<String>,
    #[schema(example = "123456")]
    pub password: Option<String>,
    #[schema(example = "Employee Name")]
    pub name: Option<String>,
    #[schema(example = "Employee")]
    pub role: Option<String>,
    #[schema(example = 1)]
    pub manager_user_id: Option<u64>,
    #[schema(example = true)]
    pub active: Option<bool>,
}

/// Sign-up values that passed validation; the password is still plain.
#[derive(Debug)]
pub struct ValidSignUp {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: Role,
    pub manager_user_id: Option<u64>,
    pub active: bool,
}

impl SignUpUser {
    /// `manager` is the user referenced by `manager_user_id`, if it exists.
    pub fn validate(self, manager: Option<&User>) -> Result<ValidSignUp, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let email = require_present(&mut errors, "email", self.email);
        if let Some(email) = &email {
            if !is_valid_email(email) {
                errors.add("email", "is invalid");
            }
        }
        check_length(&mut errors, "email", email.as_deref(), TEXT_MAX_LEN);

        let password = match self.password.filter(|p| !p.is_empty()) {
            Some(p) if p.chars().count() < PASSWORD_MIN_LEN => {
                errors.add(
                    "password",
                    format!("is too short (minimum is {PASSWORD_MIN_LEN} characters)"),
                );
                None
            }
            Some(p) if p.chars().count() > PASSWORD_MAX_LEN => {
                errors.add(
                    "password",
                    format!("is too long (maximum is {PASSWORD_MAX_LEN} characters)"),
                );
                None
            }
            Some(p) => Some(p),
            None => {
                errors.add("password", crate::utils::validation::BLANK);
                None
            }
        };

        let name = require_present(&mut errors, "name", self.name);
        check_length(&mut errors, "name", name.as_deref(), TEXT_MAX_LEN);

        let role = require_present(&mut errors, "role", self.role).and_then(|code| {
            match Role::from_str(&code) {
                Ok(role) => Some(role),
                Err(_) => {
                    errors.add("role", format!("{code} is not a valid role"));
                    None
                }
            }
        });

        if let Some(manager_id) = self.manager_user_id {
            if role == Some(Role::Manager) {
                errors.add("manager_user_id", "must be blank for a manager");
            } else if !manager.is_some_and(|m| m.id == manager_id && m.is_manager()) {
                errors.add("manager_user_id", "must reference an existing manager");
            }
        }

        match (email, password, name, role) {
            (Some(email), Some(password), Some(name), Some(role)) if errors.is_empty() => {
                Ok(ValidSignUp {
                    email,
                    password,
                    name,
                    role,
                    manager_user_id: self.manager_user_id,
                    active: self.active.unwrap_or(true),
                })
            }
            _ => Err(errors),
        }
    }
}

/// One `@` with something on both sides and no whitespace.
fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SignInRequest {
    pub user: Credentials,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct Credentials {
    #[schema(example = "manager@email.com", format = "email")]
    pub email: String,
    #[schema(example = "123456")]
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct SignUpResponse {
    pub user: UserResponse,
    #[schema(example = "Signed up successfully")]
    pub message: String,
}

#[derive(Serialize, ToSchema)]
pub struct SignInResponse {
    pub user: UserResponse,
    #[schema(example = "eyJ0eXAiOiJKV1QiLCJhbGciOiJIUzI1NiJ9...")]
    pub token: String,
    #[schema(example = "Signed in successfully")]
    pub message: String,
}

#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Signed out successfully")]
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::user;

    fn employee_sign_up(manager_user_id: Option<u64>) -> SignUpUser {
        SignUpUser {
            email: Some("employee@email.com".into()),
            password: Some("123456".into()),
            name: Some("Employee".into()),
            role: Some("Employee".into()),
            manager_user_id,
            active: None,
        }
    }

    #[test]
    fn employee_with_existing_manager_is_valid() {
        let manager = user(1, Role::Manager, None);
        let valid = employee_sign_up(Some(1)).validate(Some(&manager)).unwrap();
        assert_eq!(valid.role, Role::Employee);
        assert_eq!(valid.manager_user_id, Some(1));
        assert!(valid.active);
    }

    #[test]
    fn manager_reference_must_be_a_manager() {
        let not_a_manager = user(1, Role::Employee, None);
        let err = employee_sign_up(Some(1)).validate(Some(&not_a_manager)).unwrap_err();
        assert!(err.get("manager_user_id").is_some());

        let err = employee_sign_up(Some(9)).validate(None).unwrap_err();
        assert!(err.get("manager_user_id").is_some());
    }

    #[test]
    fn managers_have_no_manager() {
        let manager = user(1, Role::Manager, None);
        let err = SignUpUser {
            role: Some("Manager".into()),
            ..employee_sign_up(Some(1))
        }
        .validate(Some(&manager))
        .unwrap_err();
        assert_eq!(err.fields().collect::<Vec<_>>(), vec!["manager_user_id"]);
    }

    #[test]
    fn overlong_name_is_rejected() {
        let manager = user(1, Role::Manager, None);
        let err = SignUpUser {
            name: Some("n".repeat(TEXT_MAX_LEN + 1)),
            ..employee_sign_up(Some(1))
        }
        .validate(Some(&manager))
        .unwrap_err();
        assert_eq!(err.fields().collect::<Vec<_>>(), vec!["name"]);
    }

    #[test]
    fn reports_every_broken_field() {
        let err = SignUpUser {
            email: Some("no-at-sign".into()),
            password: Some("123".into()),
            role: Some("Admin".into()),
            ..SignUpUser::default()
        }
        .validate(None)
        .unwrap_err();

        assert_eq!(err.fields().collect::<Vec<_>>(), vec!["email", "name", "password", "role"]);
        assert_eq!(err.get("role"), Some(&["Admin is not a valid role".to_string()][..]));
    }
}
