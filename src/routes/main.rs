use actix_web::{HttpResponse, Responder, get, web};
use actix_web_flash_messages::IncomingFlashMessages;
use chrono::Local;
use tera::Tera;

use crate::auth::AuthenticatedUser;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{base_context, redirect, render_template};
use crate::services::ServiceError;
use crate::services::dashboard::show_dashboard as show_dashboard_service;

#[get("/")]
pub async fn index(
    user: AuthenticatedUser,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let today = Local::now().date_naive();

    match show_dashboard_service(today, &user, repo.get_ref()) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "dashboard",
                &server_config.auth_service_url,
            );
            context.insert("metrics", &data.metrics);
            context.insert("low_stock_products", &data.low_stock_products);
            context.insert("recent_sales", &data.recent_sales);
            render_template(&tera, "main/index.html", &context)
        }
        Err(ServiceError::Unauthorized) => redirect("/na"),
        Err(err) => {
            log::error!("Failed to render dashboard: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/na")]
pub async fn not_assigned(
    user: AuthenticatedUser,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let context = base_context(
        &flash_messages,
        &user,
        "dashboard",
        &server_config.auth_service_url,
    );

    render_template(&tera, "main/not_assigned.html", &context)
}
