use actix_web::{HttpResponse, Responder, get, web};
use actix_web_flash_messages::IncomingFlashMessages;
use serde::Deserialize;
use tera::Tera;

use crate::auth::AuthenticatedUser;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{base_context, redirect, render_template};
use crate::services::ServiceError;
use crate::services::import_export::download_orders as download_orders_service;
use crate::services::sales::show_sales as show_sales_service;

#[derive(Deserialize)]
struct SalesQueryParams {
    q: Option<String>,
}

#[derive(Deserialize)]
struct DownloadQueryParams {
    format: String,
}

#[get("/ventas")]
pub async fn show_sales(
    params: web::Query<SalesQueryParams>,
    user: AuthenticatedUser,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match show_sales_service(params.q.as_deref(), &user, repo.get_ref()) {
        Ok((orders, approved_total)) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "sales",
                &server_config.auth_service_url,
            );
            context.insert("orders", &orders);
            context.insert("approved_total", &approved_total);
            context.insert("search", &params.q);
            render_template(&tera, "sales/index.html", &context)
        }
        Err(ServiceError::Unauthorized) => redirect("/na"),
        Err(err) => {
            log::error!("Failed to render sales: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/ventas/download")]
pub async fn download_sales(
    params: web::Query<DownloadQueryParams>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match download_orders_service(&params.format, &user, repo.get_ref()) {
        Ok(file) => HttpResponse::Ok()
            .append_header(("Content-Type", file.content_type))
            .append_header((
                "Content-Disposition",
                format!("attachment; filename=\"{}\"", file.file_name),
            ))
            .body(file.bytes),
        Err(ServiceError::Unauthorized) => HttpResponse::Unauthorized().finish(),
        Err(ServiceError::Form(message)) => HttpResponse::BadRequest().body(message),
        Err(err) => {
            log::error!("Failed to download sales: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}
