//! # ps-api
//!
//! The web routing and orchestration layer for PhotoShare.

pub mod handlers;
pub mod middleware;

use actix_web::web;

/// Configures the routes for the photo-sharing service.
///
/// # Developer Note
/// We use a scoped configuration to allow the main binary to mount
/// the API under different paths if needed (e.g., /api/v1/).
/// `/events/archived` must register before `/events/{slug}` or the
/// literal segment would be captured as a slug.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("")
            .route("/events/archived", web::get().to(handlers::list_archived_events))
            .route("/events", web::post().to(handlers::create_event))
            .route("/events", web::get().to(handlers::list_events))
            .route("/events/{slug}", web::get().to(handlers::get_event))
            .route("/events/{slug}/archive", web::post().to(handlers::archive_event))
            .route("/events/{slug}/restore", web::post().to(handlers::restore_event))
            .route("/events/{slug}/photos", web::get().to(handlers::list_photos))
            .route("/events/{slug}/photos", web::post().to(handlers::upload_photos))
            .route("/events/{slug}/photos/{id}", web::delete().to(handlers::delete_photo)),
    );
}
