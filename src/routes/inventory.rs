use actix_multipart::form::MultipartForm;
use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use serde::Deserialize;
use tera::Tera;

use crate::auth::AuthenticatedUser;
use crate::domain::product::ProductType;
use crate::forms::import_export::{UploadImportForm, parse_upload};
use crate::forms::products::{
    DeleteProductForm, DeleteProductFormPayload, SaveProductForm, SaveProductFormPayload,
};
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{base_context, redirect, render_template};
use crate::services::ServiceError;
use crate::services::import_export::{
    download_inventory as download_inventory_service, import_products as import_products_service,
};
use crate::services::inventory::{
    InventoryTab, delete_product as delete_product_service, save_product as save_product_service,
    show_inventory as show_inventory_service, show_product as show_product_service,
};

/// Errors shown inline after an upload, to keep the notification readable.
const MAX_REPORTED_ERRORS: usize = 5;

#[derive(Deserialize)]
struct InventoryQueryParams {
    q: Option<String>,
    tab: Option<String>,
    page: Option<usize>,
}

#[derive(Deserialize)]
struct DownloadQueryParams {
    format: String,
}

#[get("/inventario")]
pub async fn show_inventory(
    params: web::Query<InventoryQueryParams>,
    user: AuthenticatedUser,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let page = params.page.unwrap_or(1);
    let tab = params
        .tab
        .as_deref()
        .and_then(|tab| InventoryTab::try_from(tab).ok())
        .unwrap_or_default();

    match show_inventory_service(params.q.as_deref(), tab, page, &user, repo.get_ref()) {
        Ok(products) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "inventory",
                &server_config.auth_service_url,
            );
            context.insert("products", &products);
            context.insert("search", &params.q);
            render_template(&tera, "inventory/index.html", &context)
        }
        Err(ServiceError::Unauthorized) => redirect("/na"),
        Err(err) => {
            log::error!("Failed to render inventory: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/inventario/nuevo")]
pub async fn new_product(
    user: AuthenticatedUser,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    if !user.has_access() {
        return redirect("/na");
    }

    let context = base_context(
        &flash_messages,
        &user,
        "inventory",
        &server_config.auth_service_url,
    );

    render_template(&tera, "inventory/edit.html", &context)
}

#[get("/inventario/editar/{product_type}/{id}")]
pub async fn edit_product(
    path: web::Path<(String, i32)>,
    user: AuthenticatedUser,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let (product_type, id) = path.into_inner();

    let Ok(product_type) = ProductType::try_from(product_type.as_str()) else {
        return HttpResponse::NotFound().finish();
    };

    match show_product_service(product_type, id, &user, repo.get_ref()) {
        Ok(product) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "inventory",
                &server_config.auth_service_url,
            );
            context.insert("product", &product);
            render_template(&tera, "inventory/edit.html", &context)
        }
        Err(ServiceError::Unauthorized) => redirect("/na"),
        Err(ServiceError::NotFound) => {
            FlashMessage::error("El producto no existe").send();
            redirect("/inventario")
        }
        Err(err) => {
            log::error!("Failed to render product edit page: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/inventario/save")]
pub async fn save_product(
    web::Form(form): web::Form<SaveProductForm>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let payload = match SaveProductFormPayload::try_from(form) {
        Ok(payload) => payload,
        Err(err) => {
            FlashMessage::error(err.to_string()).send();
            return redirect("/inventario");
        }
    };

    match save_product_service(payload, &user, repo.get_ref()) {
        Ok(()) => {
            FlashMessage::success("Producto guardado correctamente.").send();
            redirect("/inventario")
        }
        Err(ServiceError::Unauthorized) => redirect("/na"),
        Err(ServiceError::NotFound) => {
            FlashMessage::error("El producto no existe").send();
            redirect("/inventario")
        }
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            redirect("/inventario")
        }
        Err(err) => {
            log::error!("Failed to save product: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/inventario/delete")]
pub async fn delete_product(
    web::Form(form): web::Form<DeleteProductForm>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let payload = match DeleteProductFormPayload::try_from(form) {
        Ok(payload) => payload,
        Err(err) => {
            FlashMessage::error(err.to_string()).send();
            return redirect("/inventario");
        }
    };

    match delete_product_service(payload, &user, repo.get_ref()) {
        Ok(()) => {
            FlashMessage::success("Producto eliminado.").send();
            redirect("/inventario")
        }
        Err(ServiceError::Unauthorized) => redirect("/na"),
        Err(ServiceError::NotFound) => {
            FlashMessage::error("El producto no existe").send();
            redirect("/inventario")
        }
        Err(err) => {
            log::error!("Failed to delete product: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/inventario/upload")]
pub async fn upload_products(
    MultipartForm(mut form): MultipartForm<UploadImportForm>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let Ok(product_type) = ProductType::try_from(form.product_type.as_str()) else {
        FlashMessage::error("Tipo de producto no válido.").send();
        return redirect("/inventario");
    };

    let parsed = match parse_upload(&mut form) {
        Ok(parsed) => parsed,
        Err(err) => {
            FlashMessage::error(format!("Error al procesar el archivo: {err}")).send();
            return redirect("/inventario");
        }
    };

    match import_products_service(&parsed, product_type, &user, repo.get_ref()) {
        Ok(report) => {
            let mut message = report.summary();
            if !report.errors.is_empty() {
                let details = report
                    .errors
                    .iter()
                    .take(MAX_REPORTED_ERRORS)
                    .cloned()
                    .collect::<Vec<_>>()
                    .join("\n");
                message = format!("{message}\nErrores:\n{details}");
            }

            if report.error_count == 0 {
                FlashMessage::success(message).send();
            } else {
                FlashMessage::warning(message).send();
            }
            redirect("/inventario")
        }
        Err(ServiceError::Unauthorized) => redirect("/na"),
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            redirect("/inventario")
        }
        Err(err) => {
            log::error!("Failed to import products: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/inventario/download")]
pub async fn download_inventory(
    params: web::Query<DownloadQueryParams>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match download_inventory_service(&params.format, &user, repo.get_ref()) {
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
            log::error!("Failed to download inventory: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}
