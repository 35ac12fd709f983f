#[cfg(feature = "server")]
use actix_cors::Cors;
#[cfg(feature = "server")]
use actix_identity::IdentityMiddleware;
#[cfg(feature = "server")]
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
#[cfg(feature = "server")]
use actix_web::cookie::Key;
#[cfg(feature = "server")]
use actix_web::{App, HttpServer, middleware, web};

#[cfg(feature = "data")]
pub mod db;
#[cfg(feature = "data")]
pub mod domain;
#[cfg(feature = "data")]
mod error_conversions;
#[cfg(feature = "data")]
pub mod models;
#[cfg(feature = "data")]
pub mod pagination;
#[cfg(feature = "data")]
pub mod repository;
#[cfg(feature = "data")]
pub mod schema;

#[cfg(feature = "server")]
pub mod auth;
#[cfg(feature = "server")]
pub mod dto;
#[cfg(feature = "server")]
pub mod exports;
#[cfg(feature = "server")]
pub mod forms;
#[cfg(feature = "server")]
pub mod notifications;
#[cfg(feature = "server")]
pub mod routes;
#[cfg(feature = "server")]
pub mod services;

#[cfg(feature = "client")]
pub mod client;

/// Role every API caller must hold.
pub const SERVICE_ACCESS_ROLE: &str = "billing";

/// Builds and runs the Actix-Web HTTP server using the provided configuration.
#[cfg(feature = "server")]
pub async fn run(server_config: models::config::ServerConfig) -> std::io::Result<()> {
    use std::sync::Arc;

    use crate::exports::FsBlobStore;
    use crate::notifications::{EmailRegistry, InMemoryMailer, Mailer, ZmqMailer};
    use crate::repository::DieselRepository;

    // Establish Diesel connection pool for the SQLite database.
    let pool = db::establish_connection_pool(&server_config.database_url).map_err(|e| {
        std::io::Error::other(format!("Failed to establish database connection: {e}"))
    })?;
    let repo = DieselRepository::new(pool);

    let registry = EmailRegistry::from_glob(&server_config.templates_dir)
        .map_err(|e| std::io::Error::other(format!("Template parsing error(s): {e}")))?;

    let mailer: Arc<dyn Mailer> = if server_config.zmq_emailer_pub.is_empty() {
        log::warn!("No emailer endpoint configured, notifications stay in memory");
        Arc::new(InMemoryMailer::new())
    } else {
        let mailer = ZmqMailer::connect(&server_config.zmq_emailer_pub)
            .map_err(|e| std::io::Error::other(format!("Failed to start ZMQ sender: {e}")))?;
        Arc::new(mailer)
    };
    let mailer = web::Data::from(mailer);
    let registry = web::Data::new(registry);
    let store = web::Data::new(FsBlobStore::new(&server_config.exports_dir));

    // Keys and stores for identity and sessions.
    let secret_key = Key::try_from(server_config.secret.as_bytes())
        .map_err(|e| std::io::Error::other(format!("Invalid session secret: {e}")))?;

    let bind_address = (server_config.address.clone(), server_config.port);
    log::info!("Starting server on {}:{}", bind_address.0, bind_address.1);

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(IdentityMiddleware::default())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    .cookie_secure(false) // set to true in prod
                    .cookie_domain(Some(format!(".{}", server_config.domain)))
                    .build(),
            )
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .service(web::scope("/api").configure(routes::api::configure))
            .app_data(web::Data::new(repo.clone()))
            .app_data(registry.clone())
            .app_data(mailer.clone())
            .app_data(store.clone())
            .app_data(web::Data::new(server_config.clone()))
    })
    .bind(bind_address)?
    .run()
    .await
}
