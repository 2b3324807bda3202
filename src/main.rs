use std::process::ExitCode;

use actix_files::Files;
use actix_identity::IdentityMiddleware;
use actix_session::SessionMiddleware;
use actix_session::storage::CookieSessionStore;
use actix_web::cookie::Key;
use actix_web::{App, HttpServer, web};
use actix_web_flash_messages::FlashMessagesFramework;
use actix_web_flash_messages::storage::CookieMessageStore;
use tera::Tera;

use moovi::db::establish_connection_pool;
use moovi::models::config::ServerConfig;
use moovi::repository::DieselRepository;
use moovi::routes;

#[actix_web::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = match config::Config::builder()
        .add_source(config::File::with_name("config").required(false))
        .add_source(config::Environment::default())
        .build()
        .and_then(|settings| settings.try_deserialize::<ServerConfig>())
    {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    if config.secret_key.len() < 32 {
        log::error!("secret_key must be at least 32 bytes long");
        return ExitCode::FAILURE;
    }
    let secret_key = Key::derive_from(config.secret_key.as_bytes());

    let pool = match establish_connection_pool(&config.database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database pool: {e}");
            return ExitCode::FAILURE;
        }
    };
    let repo = DieselRepository::new(pool);

    let tera = match Tera::new("templates/**/*.html") {
        Ok(tera) => tera,
        Err(e) => {
            log::error!("Failed to load templates: {e}");
            return ExitCode::FAILURE;
        }
    };

    let message_store = CookieMessageStore::builder(secret_key.clone()).build();
    let message_framework = FlashMessagesFramework::builder(message_store).build();

    let bind_address = (config.bind_address.clone(), config.port);
    log::info!("Starting Moovi on {}:{}", bind_address.0, bind_address.1);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(repo.clone()))
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::new(tera.clone()))
            .wrap(message_framework.clone())
            .wrap(IdentityMiddleware::default())
            .wrap(SessionMiddleware::new(
                CookieSessionStore::default(),
                secret_key.clone(),
            ))
            .service(Files::new("/assets", "./assets"))
            .service(routes::main::index)
            .service(routes::main::not_assigned)
            .service(routes::inventory::show_inventory)
            .service(routes::inventory::new_product)
            .service(routes::inventory::edit_product)
            .service(routes::inventory::save_product)
            .service(routes::inventory::delete_product)
            .service(routes::inventory::upload_products)
            .service(routes::inventory::download_inventory)
            .service(routes::sales::show_sales)
            .service(routes::sales::download_sales)
            .service(routes::users::show_users)
            .service(routes::users::save_user)
            .service(routes::users::delete_user)
            .service(routes::api::api_v1_products)
    });

    let server = match server.bind(bind_address) {
        Ok(server) => server,
        Err(e) => {
            log::error!("Failed to bind HTTP server: {e}");
            return ExitCode::FAILURE;
        }
    };

    match server.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Server terminated with error: {e}");
            ExitCode::FAILURE
        }
    }
}
