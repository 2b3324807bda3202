use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::types::{TypeConstraintError, UserId, UserRole};
use crate::domain::user::{NewUser as DomainNewUser, User as DomainUser};

/// Diesel model representing the `users` table.
#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::users)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub last_sign_in_at: Option<NaiveDateTime>,
}

/// Insertable/patchable form of [`User`].
#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
}

impl TryFrom<User> for DomainUser {
    type Error = TypeConstraintError;

    fn try_from(user: User) -> Result<Self, Self::Error> {
        Ok(Self {
            id: UserId::new(user.id)?,
            name: user.name,
            email: user.email,
            role: UserRole::try_from(user.role)?,
            last_sign_in_at: user.last_sign_in_at,
        })
    }
}

impl From<DomainNewUser> for NewUser {
    fn from(user: DomainNewUser) -> Self {
        Self {
            id: user.id.into_inner(),
            name: user.name,
            email: user.email,
            role: user.role.into(),
        }
    }
}
