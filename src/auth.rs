//! Session-backed authentication extractor.
//!
//! Login itself is handled by the external auth service; this application
//! only reads the identity it established and checks the stored role.

use std::future::{Ready, ready};

use actix_identity::Identity;
use actix_web::dev::Payload;
use actix_web::error::ErrorUnauthorized;
use actix_web::{Error, FromRequest, HttpRequest};
use serde::{Deserialize, Serialize};

use crate::domain::types::UserRole;

/// Claims stored in the identity cookie by the auth collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Auth-service subject; matches `users.id`.
    pub sub: String,
    pub email: String,
    pub name: String,
    pub role: String,
}

impl AuthenticatedUser {
    /// The stored role, if it names one this application knows.
    pub fn role(&self) -> Option<UserRole> {
        UserRole::try_from(self.role.as_str()).ok()
    }

    /// Whether the user may use the application at all.
    pub fn has_access(&self) -> bool {
        self.role().is_some()
    }

    /// Whether the user may administer other users.
    pub fn is_admin(&self) -> bool {
        self.role() == Some(UserRole::Admin)
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let result = (|| {
            let identity = Identity::from_request(req, payload).into_inner()?;
            let claims = identity
                .id()
                .map_err(|e| ErrorUnauthorized(e.to_string()))?;
            serde_json::from_str(&claims).map_err(|e| ErrorUnauthorized(e.to_string()))
        })();

        ready(result)
    }
}
