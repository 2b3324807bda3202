use actix_web::{HttpResponse, Responder, get, web};
use serde::Deserialize;

use crate::auth::AuthenticatedUser;
use crate::repository::DieselRepository;
use crate::services::ServiceError;
use crate::services::inventory::{InventoryTab, show_inventory as show_inventory_service};

/// Query parameters accepted by the `api_v1_products` endpoint.
#[derive(Deserialize, Debug)]
pub struct ApiV1ProductsQueryParams {
    pub query: Option<String>,
    pub tab: Option<String>,
    pub page: Option<usize>,
}

/// JSON listing of the catalog with optional search and pagination, for
/// consumption by the storefront.
#[get("/api/v1/products")]
pub async fn api_v1_products(
    params: web::Query<ApiV1ProductsQueryParams>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let tab = params
        .tab
        .as_deref()
        .and_then(|tab| InventoryTab::try_from(tab).ok())
        .unwrap_or_default();
    let page = params.page.unwrap_or(1);

    match show_inventory_service(params.query.as_deref(), tab, page, &user, repo.get_ref()) {
        Ok(products) => HttpResponse::Ok().json(products),
        Err(ServiceError::Unauthorized) => HttpResponse::Unauthorized().finish(),
        Err(err) => {
            log::error!("Failed to list products for API: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}
