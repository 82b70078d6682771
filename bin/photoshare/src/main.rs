//! # PhotoShare Binary
//!
//! The entry point that assembles the application based on compile-time features.

use actix_web::{web, App, HttpServer};
use ps_api::handlers::AppState;
use std::env;

// Feature-gated imports: This is the "Compiled-to-Order" magic
#[cfg(feature = "db-sqlite")]
use ps_db_sqlite::SqliteEventRepo;

#[cfg(feature = "storage-local")]
use ps_storage_local::LocalBlobStore;

#[cfg(feature = "auth-simple")]
use ps_auth_simple::SimpleIdentityProvider;

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let database_url = env_or("DATABASE_URL", "sqlite:photoshare.db");
    let upload_root = env_or("UPLOAD_ROOT", "./data/uploads");
    let upload_url_prefix = env_or("UPLOAD_URL_PREFIX", "/static/uploads");
    let bind_addr = env_or("BIND_ADDR", "127.0.0.1:8080");
    let public_base_url = env_or("PUBLIC_BASE_URL", &format!("http://{bind_addr}"));

    // 1. Initialize Database Implementation
    #[cfg(feature = "db-sqlite")]
    let repo = SqliteEventRepo::new(&database_url)
        .await
        .expect("Failed to init SQLite");

    // 2. Initialize Storage Implementation
    #[cfg(feature = "storage-local")]
    let store = LocalBlobStore::new(upload_root.clone().into(), upload_url_prefix.clone());

    // 3. Initialize Identity Implementation
    #[cfg(feature = "auth-simple")]
    let identity = {
        let hash = env_or("ADMIN_PASSWORD_HASH", "");
        if hash.is_empty() {
            log::warn!("ADMIN_PASSWORD_HASH not set; admin endpoints will reject everything");
        }
        let provider = SimpleIdentityProvider::new(&hash);
        match env::var("ACCOUNTS_EXPORT") {
            Ok(path) => provider.with_accounts_file(path.into()),
            Err(_) => provider,
        }
    };

    // 4. Wrap in AppState (Using dynamic dispatch for maximum flexibility)
    let state = web::Data::new(AppState {
        repo: Box::new(repo),
        store: Box::new(store),
        identity: Box::new(identity),
        public_base_url,
    });

    log::info!("📷 PhotoShare starting on http://{bind_addr}");

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(ps_api::middleware::cors_policy())
            .wrap(ps_api::middleware::standard_middleware())
            .service(actix_files::Files::new(&upload_url_prefix, upload_root.clone()))
            .configure(ps_api::configure_routes)
    })
    .bind(&bind_addr)?
    .run()
    .await
}
