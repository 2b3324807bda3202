use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{UserId, UserRole};

/// An application user managed through the admin screens.
///
/// The identifier is the subject assigned by the external auth service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub last_sign_in_at: Option<NaiveDateTime>,
}

/// Information required to create a new [`User`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewUser {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}
