use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::types::{TypeConstraintError, UserId, UserRole};
use crate::domain::user::NewUser;

/// HTML form behind the add/edit user screens.
#[derive(Debug, Deserialize, Validate)]
pub struct SaveUserForm {
    /// Subject assigned by the external auth service.
    #[validate(length(min = 1))]
    pub id: String,
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SaveUserFormPayload {
    pub user: NewUser,
}

#[derive(Debug, Error)]
pub enum SaveUserFormError {
    #[error("Save user form validation failed: {0}")]
    Validation(String),
    #[error("Save user form contains invalid data: {0}")]
    TypeConstraint(String),
}

impl From<ValidationErrors> for SaveUserFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for SaveUserFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

impl TryFrom<SaveUserForm> for SaveUserFormPayload {
    type Error = SaveUserFormError;

    fn try_from(form: SaveUserForm) -> Result<Self, Self::Error> {
        form.validate()?;

        Ok(Self {
            user: NewUser {
                id: UserId::new(form.id)?,
                name: form.name.trim().to_string(),
                email: form.email.trim().to_string(),
                role: UserRole::try_from(form.role.as_str())?,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_user_payload() {
        let form = SaveUserForm {
            id: "auth0|123".to_string(),
            name: " Ana ".to_string(),
            email: "ana@example.com".to_string(),
            role: "Vendedor".to_string(),
        };

        let payload = SaveUserFormPayload::try_from(form).unwrap();
        assert_eq!(payload.user.name, "Ana");
        assert_eq!(payload.user.role, UserRole::Vendedor);
    }

    #[test]
    fn rejects_unknown_role() {
        let form = SaveUserForm {
            id: "auth0|123".to_string(),
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            role: "root".to_string(),
        };

        assert!(matches!(
            SaveUserFormPayload::try_from(form),
            Err(SaveUserFormError::TypeConstraint(_))
        ));
    }
}
