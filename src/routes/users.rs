use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use serde::Deserialize;
use tera::Tera;

use crate::auth::AuthenticatedUser;
use crate::domain::types::UserId;
use crate::forms::users::{SaveUserForm, SaveUserFormPayload};
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{base_context, redirect, render_template};
use crate::services::ServiceError;
use crate::services::users::{
    delete_user as delete_user_service, save_user as save_user_service,
    show_users as show_users_service,
};

#[derive(Deserialize)]
struct DeleteUserForm {
    id: String,
}

#[get("/usuarios")]
pub async fn show_users(
    user: AuthenticatedUser,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match show_users_service(&user, repo.get_ref()) {
        Ok(users) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "users",
                &server_config.auth_service_url,
            );
            context.insert("users", &users);
            render_template(&tera, "users/index.html", &context)
        }
        Err(ServiceError::Unauthorized) => redirect("/na"),
        Err(err) => {
            log::error!("Failed to render users: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/usuarios/save")]
pub async fn save_user(
    web::Form(form): web::Form<SaveUserForm>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let payload = match SaveUserFormPayload::try_from(form) {
        Ok(payload) => payload,
        Err(err) => {
            FlashMessage::error(err.to_string()).send();
            return redirect("/usuarios");
        }
    };

    match save_user_service(payload, &user, repo.get_ref()) {
        Ok(()) => {
            FlashMessage::success("Usuario guardado correctamente.").send();
            redirect("/usuarios")
        }
        Err(ServiceError::Unauthorized) => redirect("/na"),
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            redirect("/usuarios")
        }
        Err(err) => {
            log::error!("Failed to save user: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/usuarios/delete")]
pub async fn delete_user(
    web::Form(form): web::Form<DeleteUserForm>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let id = match UserId::new(form.id) {
        Ok(id) => id,
        Err(err) => {
            FlashMessage::error(err.to_string()).send();
            return redirect("/usuarios");
        }
    };

    match delete_user_service(&id, &user, repo.get_ref()) {
        Ok(()) => {
            FlashMessage::success("Usuario eliminado.").send();
            redirect("/usuarios")
        }
        Err(ServiceError::Unauthorized) => redirect("/na"),
        Err(ServiceError::NotFound) => {
            FlashMessage::error("El usuario no existe").send();
            redirect("/usuarios")
        }
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            redirect("/usuarios")
        }
        Err(err) => {
            log::error!("Failed to delete user: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}
