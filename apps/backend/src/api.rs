use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use gallery_names::NameCache;
use gallery_storage::{ImageRecord, MetadataStore, UploadDir};
use serde::Serialize;
use serde_json::json;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

use crate::events::upload_events;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn MetadataStore>,
    pub uploads: Arc<UploadDir>,
    pub names: Arc<NameCache>,
    pub events_tx: broadcast::Sender<String>,
    pub defaults: UploadDefaults,
}

/// Values used when an upload omits `tags` or `element`.
#[derive(Debug, Clone)]
pub struct UploadDefaults {
    pub tags: String,
    pub element: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self::new(err.status(), err.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

pub fn build_router(state: AppState, api_key: Option<String>, max_upload_bytes: usize) -> Router {
    let files = ServeDir::new(state.uploads.root());
    let public_prefix = state.uploads.public_prefix().to_string();

    let api = Router::new()
        .route("/api/images", get(list_images))
        .route("/api/upload", post(upload_image))
        .route("/api/characters", get(list_characters))
        .route("/api/events", get(upload_events))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .route_layer(middleware::from_fn_with_state(api_key, enforce_api_key))
        .with_state(state);

    let router = Router::new()
        .route("/health", get(|| async { StatusCode::OK }))
        .merge(api);

    let router = if public_prefix.is_empty() {
        router.fallback_service(files)
    } else {
        router.nest_service(&format!("/{public_prefix}"), files)
    };

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn enforce_api_key(
    State(expected): State<Option<String>>,
    req: axum::http::Request<axum::body::Body>,
    next: middleware::Next,
) -> Result<Response, StatusCode> {
    if let Some(expected_key) = expected {
        let provided = req.headers().get("x-api-key").and_then(|h| h.to_str().ok());
        if provided != Some(expected_key.as_str()) {
            return Err(StatusCode::UNAUTHORIZED);
        }
    }

    Ok(next.run(req).await)
}

async fn list_images(State(state): State<AppState>) -> Result<Json<Vec<ImageRecord>>, ApiError> {
    state.store.list_all().await.map(Json).map_err(|err| {
        error!("Error reading database: {err}");
        ApiError::internal("Failed to read database")
    })
}

async fn list_characters(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.names.current().as_ref().clone())
}

#[derive(Serialize)]
struct UploadResponse {
    success: bool,
    image: ImageRecord,
}

struct UploadedFile {
    name: Option<String>,
    bytes: Vec<u8>,
}

#[derive(Default)]
struct UploadForm {
    file: Option<UploadedFile>,
    tags: Option<String>,
    element: Option<String>,
}

/// Collects the `image`, `tags` and `element` fields in whatever order they arrive.
async fn read_upload_form(multipart: &mut Multipart) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("image") => {
                let name = field.file_name().map(str::to_string);
                let bytes = field.bytes().await?;
                // A browser submits an empty, unnamed part when no file was chosen.
                let unselected = bytes.is_empty() && name.as_deref().map_or(true, str::is_empty);
                if form.file.is_none() && !unselected {
                    form.file = Some(UploadedFile {
                        name,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            Some("tags") => form.tags = Some(field.text().await?),
            Some("element") => form.element = Some(field.text().await?),
            other => debug!(field = ?other, "ignoring unexpected upload field"),
        }
    }

    Ok(form)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let form = read_upload_form(&mut multipart).await?;
    let Some(file) = form.file else {
        return Err(ApiError::bad_request("No image file provided"));
    };

    let uploaded_at = Utc::now();
    let stored = state
        .uploads
        .store(file.name.as_deref(), &file.bytes, uploaded_at)
        .await
        .map_err(|err| {
            error!("Error storing upload: {err:#}");
            ApiError::internal("Failed to store image")
        })?;

    let tags = non_empty(form.tags).unwrap_or_else(|| state.defaults.tags.clone());
    let element = non_empty(form.element).unwrap_or_else(|| state.defaults.element.clone());
    let record = ImageRecord::new(&stored.url, tags, element, uploaded_at);

    // The stored file stays on disk if this fails.
    let image = state.store.append(record).await.map_err(|err| {
        error!(file = %stored.file_name, "Error saving to database: {err}");
        ApiError::internal("Failed to save to database")
    })?;

    info!(url = %image.url, size = file.bytes.len(), "image uploaded");
    Ok(Json(UploadResponse {
        success: true,
        image,
    }))
}
