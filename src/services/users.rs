use crate::auth::AuthenticatedUser;
use crate::domain::types::UserId;
use crate::domain::user::User;
use crate::forms::users::SaveUserFormPayload;
use crate::repository::{UserReader, UserWriter};

use super::{ServiceError, ServiceResult};

/// Core business logic for rendering the user administration page.
/// Only admins may manage users.
pub fn show_users<R>(user: &AuthenticatedUser, repo: &R) -> ServiceResult<Vec<User>>
where
    R: UserReader,
{
    if !user.is_admin() {
        return Err(ServiceError::Unauthorized);
    }

    match repo.list_users() {
        Ok(users) => Ok(users),
        Err(e) => {
            log::error!("Failed to list users: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Creates the user when the identifier is unseen, updates it otherwise.
pub fn save_user<R>(
    payload: SaveUserFormPayload,
    user: &AuthenticatedUser,
    repo: &R,
) -> ServiceResult<()>
where
    R: UserReader + UserWriter,
{
    if !user.is_admin() {
        return Err(ServiceError::Unauthorized);
    }

    let exists = match repo.get_user_by_id(&payload.user.id) {
        Ok(existing) => existing.is_some(),
        Err(e) => {
            log::error!("Failed to look up user: {e}");
            return Err(ServiceError::Internal);
        }
    };

    let result = if exists {
        repo.update_user(&payload.user)
    } else {
        repo.create_user(&payload.user)
    };

    match result {
        Ok(_) => Ok(()),
        Err(e) => {
            log::error!("Failed to save user: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Deletes a user. Admins cannot delete their own account.
pub fn delete_user<R>(id: &UserId, user: &AuthenticatedUser, repo: &R) -> ServiceResult<()>
where
    R: UserWriter,
{
    if !user.is_admin() {
        return Err(ServiceError::Unauthorized);
    }

    if id.as_str() == user.sub {
        return Err(ServiceError::Form(
            "No puedes eliminar tu propio usuario.".to_string(),
        ));
    }

    match repo.delete_user(id) {
        Ok(0) => Err(ServiceError::NotFound),
        Ok(_) => Ok(()),
        Err(e) => {
            log::error!("Failed to delete user: {e}");
            Err(ServiceError::Internal)
        }
    }
}
