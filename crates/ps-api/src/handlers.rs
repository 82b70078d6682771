//! # ps-api Handlers
//!
//! This module coordinates the flow between HTTP requests and Core traits.
//! Every failure is collapsed into one JSON notice for the caller; no
//! structured error codes cross the interface boundary.

use actix_multipart::{Field, Multipart};
use actix_web::http::{header, StatusCode};
use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use chrono::Utc;
use futures_util::TryStreamExt;
use ps_compositor::frame;
use ps_compositor::loader::PendingSet;
use ps_core::error::AppError;
use ps_core::models::{Event, EventStatus, PlanTier, Role, UploadItem};
use ps_core::traits::{BlobStore, EventRepo, IdentityProvider};
use ps_core::{pipeline, slug};
use serde::Serialize;
use uuid::Uuid;

/// State shared across all Actix-web workers.
pub struct AppState {
    pub repo: Box<dyn EventRepo>,
    pub store: Box<dyn BlobStore>,
    pub identity: Box<dyn IdentityProvider>,
    /// Origin guests reach the service under; used to build share links.
    pub public_base_url: String,
}

/// Newtype bridging `AppError` into an actix response (orphan rule).
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match &self.0 {
            AppError::NotFound(_, _) => StatusCode::NOT_FOUND,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::QuotaExceeded { .. } => StatusCode::CONFLICT,
            AppError::ImageError { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .json(serde_json::json!({ "error": self.0.to_string() }))
    }
}

type ApiResult = Result<HttpResponse, ApiError>;

/// Event as served to clients, with the guest share link attached.
#[derive(Serialize)]
struct EventResponse {
    #[serde(flatten)]
    event: Event,
    share_url: String,
}

impl EventResponse {
    fn new(public_base_url: &str, event: Event) -> Self {
        let share_url = format!("{}/evento/{}", public_base_url, event.slug);
        EventResponse { event, share_url }
    }
}

fn bearer_password(header: Option<&str>) -> Option<&str> {
    header?.strip_prefix("Bearer ").filter(|p| !p.is_empty())
}

/// Resolves the request's principal: a valid admin bearer password yields
/// `Role::Admin`, everything else is an unauthenticated guest (`Client`).
async fn authenticate(state: &AppState, req: &HttpRequest) -> Role {
    let header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    match bearer_password(header) {
        Some(password) if state.identity.verify_admin_password(password).await => Role::Admin,
        _ => Role::Client,
    }
}

fn internal(err: impl std::fmt::Display) -> ApiError {
    ApiError(AppError::internal(err))
}

fn bad_multipart(err: impl std::fmt::Display) -> ApiError {
    ApiError(AppError::ValidationError(format!("malformed upload: {err}")))
}

async fn read_field_bytes(field: &mut Field) -> Result<Vec<u8>, ApiError> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(bad_multipart)? {
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

async fn read_field_text(field: &mut Field) -> Result<String, ApiError> {
    let bytes = read_field_bytes(field).await?;
    String::from_utf8(bytes).map_err(bad_multipart)
}

async fn load_event(state: &AppState, slug: &str) -> Result<Event, ApiError> {
    state
        .repo
        .get_event(slug)
        .await
        .map_err(internal)?
        .ok_or_else(|| ApiError(AppError::NotFound("event".into(), slug.into())))
}

// ── Event management ────────────────────────────────────────────────────────

/// Creates an event from a multipart form: `name`, optional `plan`,
/// `is_private`, `price_cents` and an optional transparent `frame` PNG.
/// The frame is uploaded before the event record is written; if the record
/// write then fails, the orphaned frame blob is not cleaned up.
pub async fn create_event(
    state: web::Data<AppState>,
    req: HttpRequest,
    mut payload: Multipart,
) -> ApiResult {
    if !authenticate(&state, &req).await.can_manage_events() {
        return Err(ApiError(AppError::Unauthorized(
            "admin credentials required".into(),
        )));
    }

    let mut name = String::new();
    let mut plan = PlanTier::Free;
    let mut is_private = false;
    let mut price_cents: i64 = 0;
    let mut frame_file: Option<(String, Vec<u8>)> = None;

    while let Some(mut field) = payload.try_next().await.map_err(bad_multipart)? {
        let field_name = field.name().to_string();
        match field_name.as_str() {
            "name" => name = read_field_text(&mut field).await?,
            "plan" => {
                let raw = read_field_text(&mut field).await?;
                plan = PlanTier::parse(raw.trim()).ok_or_else(|| {
                    ApiError(AppError::ValidationError(format!("unknown plan: {raw}")))
                })?;
            }
            "is_private" => {
                is_private = read_field_text(&mut field).await?.trim() == "true";
            }
            "price_cents" => {
                let raw = read_field_text(&mut field).await?;
                price_cents = raw.trim().parse().map_err(bad_multipart)?;
            }
            "frame" => {
                let file_name = field
                    .content_disposition()
                    .get_filename()
                    .unwrap_or("frame.png")
                    .to_string();
                let bytes = read_field_bytes(&mut field).await?;
                if !bytes.is_empty() {
                    frame_file = Some((file_name, bytes));
                }
            }
            _ => {
                // Drain unknown fields so the stream stays consumable.
                read_field_bytes(&mut field).await?;
            }
        }
    }

    let slug = slug::slugify(&name);
    if slug.is_empty() {
        return Err(ApiError(AppError::ValidationError(
            "event name produces an empty slug".into(),
        )));
    }
    if state.repo.get_event(&slug).await.map_err(internal)?.is_some() {
        return Err(ApiError(AppError::Conflict(format!(
            "event {slug} already exists"
        ))));
    }

    let (frame_path, frame_url) = match frame_file {
        Some((file_name, bytes)) => {
            let path = format!("frames/{}_{}", slug, file_name);
            let url = state.store.put(&path, bytes).await.map_err(internal)?;
            (Some(path), Some(url))
        }
        None => (None, None),
    };

    let event = Event {
        slug,
        name: name.trim().to_string(),
        created_at: Utc::now(),
        status: EventStatus::Active,
        frame_path,
        frame_url,
        photo_count: 0,
        photo_limit: plan.default_photo_limit(),
        is_private,
        plan,
        price_cents,
    };
    state.repo.create_event(event.clone()).await.map_err(internal)?;
    log::info!("created event {} (plan {})", event.slug, event.plan.as_str());

    Ok(HttpResponse::Created().json(EventResponse::new(&state.public_base_url, event)))
}

/// Active events, newest first. Events past their active window are shown on
/// the archived listing instead; both listings recompute the age cutoff at
/// read time.
pub async fn list_events(state: web::Data<AppState>, req: HttpRequest) -> ApiResult {
    if !authenticate(&state, &req).await.can_manage_events() {
        return Err(ApiError(AppError::Unauthorized(
            "admin credentials required".into(),
        )));
    }
    let now = Utc::now();
    let events: Vec<EventResponse> = state
        .repo
        .list_events(EventStatus::Active)
        .await
        .map_err(internal)?
        .into_iter()
        .filter(|e| !e.is_past_active_window(now))
        .map(|e| EventResponse::new(&state.public_base_url, e))
        .collect();
    Ok(HttpResponse::Ok().json(events))
}

/// Archived events: explicitly archived ones plus active events that have
/// aged past the window.
pub async fn list_archived_events(state: web::Data<AppState>, req: HttpRequest) -> ApiResult {
    if !authenticate(&state, &req).await.can_manage_events() {
        return Err(ApiError(AppError::Unauthorized(
            "admin credentials required".into(),
        )));
    }
    let now = Utc::now();
    let mut events = state
        .repo
        .list_events(EventStatus::Archived)
        .await
        .map_err(internal)?;
    let aged: Vec<Event> = state
        .repo
        .list_events(EventStatus::Active)
        .await
        .map_err(internal)?
        .into_iter()
        .filter(|e| e.is_past_active_window(now))
        .collect();
    events.extend(aged);
    events.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let events: Vec<EventResponse> = events
        .into_iter()
        .map(|e| EventResponse::new(&state.public_base_url, e))
        .collect();
    Ok(HttpResponse::Ok().json(events))
}

/// Public event lookup: guests need the name, frame and remaining quota.
pub async fn get_event(state: web::Data<AppState>, path: web::Path<String>) -> ApiResult {
    let event = load_event(&state, &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(EventResponse::new(&state.public_base_url, event)))
}

pub async fn archive_event(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> ApiResult {
    set_event_status(state, req, path, EventStatus::Archived).await
}

pub async fn restore_event(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> ApiResult {
    set_event_status(state, req, path, EventStatus::Active).await
}

async fn set_event_status(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    status: EventStatus,
) -> ApiResult {
    if !authenticate(&state, &req).await.can_manage_events() {
        return Err(ApiError(AppError::Unauthorized(
            "admin credentials required".into(),
        )));
    }
    let slug = path.into_inner();
    load_event(&state, &slug).await?;
    state.repo.set_status(&slug, status).await.map_err(internal)?;
    log::info!("event {} is now {}", slug, status.as_str());
    Ok(HttpResponse::NoContent().finish())
}

// ── Gallery ────────────────────────────────────────────────────────────────

/// Photos of one event, newest upload first.
pub async fn list_photos(state: web::Data<AppState>, path: web::Path<String>) -> ApiResult {
    let slug = path.into_inner();
    load_event(&state, &slug).await?;
    let photos = state.repo.list_photos(&slug).await.map_err(internal)?;
    Ok(HttpResponse::Ok().json(photos))
}

/// Guest upload: multipart `uploader_name` plus repeated `photos` files.
/// Selected files flow through the loader's MIME filter, the compositor
/// (when the event configured a frame), the quota guard, and the sequential
/// submission queue.
pub async fn upload_photos(
    state: web::Data<AppState>,
    path: web::Path<String>,
    mut payload: Multipart,
) -> ApiResult {
    let slug = path.into_inner();
    let event = load_event(&state, &slug).await?;

    let mut uploader_name: Option<String> = None;
    let mut pending = PendingSet::new();

    while let Some(mut field) = payload.try_next().await.map_err(bad_multipart)? {
        let field_name = field.name().to_string();
        match field_name.as_str() {
            "uploader_name" => uploader_name = Some(read_field_text(&mut field).await?),
            "photos" => {
                let file_name = field
                    .content_disposition()
                    .get_filename()
                    .unwrap_or("upload.jpg")
                    .to_string();
                let content_type = field
                    .content_type()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let bytes = read_field_bytes(&mut field).await?;
                if !bytes.is_empty() {
                    pending.add_selection([UploadItem {
                        file_name,
                        content_type,
                        bytes,
                    }]);
                }
            }
            _ => {
                read_field_bytes(&mut field).await?;
            }
        }
    }

    // Compositing happens before the quota read so rejected batches cost no
    // storage calls at all.
    let frame_bytes = match &event.frame_path {
        Some(frame_path) => Some(state.store.get(frame_path).await.map_err(internal)?),
        None => None,
    };
    let items = pending
        .take_all()
        .into_iter()
        .map(|item| frame::prepare(item, frame_bytes.as_deref()))
        .collect::<Result<Vec<_>, _>>()?;

    let accepted = pipeline::submit_batch(
        state.repo.as_ref(),
        state.store.as_ref(),
        &slug,
        uploader_name.as_deref(),
        items,
    )
    .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "accepted": accepted })))
}

/// Organizer deletes one photo: blob first, then record + counter in one
/// repo transaction. A record failure after the blob is gone leaves the
/// counter untouched (the documented inconsistency), never a crash.
pub async fn delete_photo(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<(String, Uuid)>,
) -> ApiResult {
    if !authenticate(&state, &req).await.can_delete_photos() {
        return Err(ApiError(AppError::Unauthorized(
            "admin credentials required".into(),
        )));
    }
    let (slug, id) = path.into_inner();
    let photo = state
        .repo
        .get_photo(&slug, id)
        .await
        .map_err(internal)?
        .ok_or_else(|| ApiError(AppError::NotFound("photo".into(), id.to_string())))?;

    let blob_path = format!("events/{}/{}", slug, photo.file_name);
    state.store.delete(&blob_path).await.map_err(internal)?;
    state.repo.delete_photo(&slug, id).await.map_err(internal)?;
    log::info!("deleted photo {} from event {}", id, slug);

    Ok(HttpResponse::NoContent().finish())
}
