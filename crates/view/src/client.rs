use anyhow::{anyhow, Context, Result};
use gallery_storage::ImageRecord;
use reqwest::multipart::{Form, Part};
use reqwest::Response;
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::state::ViewState;
use crate::upload::UploadRequest;

/// HTTP client for the gallery backend.
#[derive(Clone)]
pub struct GalleryClient {
    base_url: String,
    api_key: Option<String>,
    http: reqwest::Client,
}

#[derive(Deserialize)]
struct UploadResponse {
    #[serde(default)]
    success: bool,
    image: Option<ImageRecord>,
    error: Option<String>,
}

impl GalleryClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
            http: reqwest::Client::new(),
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.authorize(self.http.get(self.url(path)))
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => req.header("x-api-key", key),
            None => req,
        }
    }

    pub async fn list_images(&self) -> Result<Vec<ImageRecord>> {
        let resp = ensure_success(self.get("/api/images").send().await?)?;
        resp.json().await.context("decoding image list")
    }

    pub async fn character_names(&self) -> Result<Vec<String>> {
        let resp = ensure_success(self.get("/api/characters").send().await?)?;
        resp.json().await.context("decoding character names")
    }

    pub async fn upload(&self, request: &UploadRequest) -> Result<ImageRecord> {
        let form = Form::new()
            .part(
                "image",
                Part::bytes(request.bytes.clone()).file_name(request.file_name.clone()),
            )
            .text("tags", request.tags.clone())
            .text("element", request.element.clone());

        let req = self.authorize(self.http.post(self.url("/api/upload")).multipart(form));
        let resp = ensure_success(req.send().await?)?;
        let body: UploadResponse = resp.json().await.context("decoding upload response")?;

        match body {
            UploadResponse {
                success: true,
                image: Some(image),
                ..
            } => Ok(image),
            UploadResponse { error, .. } => {
                Err(anyhow!(error.unwrap_or_else(|| "Upload failed".to_string())))
            }
        }
    }
}

fn ensure_success(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        Ok(resp)
    } else {
        Err(anyhow!("Server returned {status}"))
    }
}

/// Fetches the record list and re-renders dynamic cards. Failures leave the gallery untouched.
pub async fn refresh_gallery(client: &GalleryClient, state: &mut ViewState) -> bool {
    match client.list_images().await {
        Ok(records) => {
            state.load_images(&records, &mut rand::thread_rng());
            true
        }
        Err(err) => {
            error!("Error fetching images from backend: {err:#}");
            false
        }
    }
}

/// Submits the upload dialog's form and records the outcome in its status.
///
/// On success the gallery is refreshed and the dialog closes itself after
/// [`crate::upload::AUTO_CLOSE_DELAY`]. A failure leaves the dialog open for a retry.
pub async fn submit_upload(client: &GalleryClient, state: &mut ViewState) -> bool {
    let Some(request) = state.upload_mut().begin_submit() else {
        return false;
    };

    match client.upload(&request).await {
        Ok(image) => {
            info!(url = %image.url, "upload stored");
            state.upload_mut().finish(Ok(()));
            refresh_gallery(client, state).await;
            state.upload_mut().close_after_success().await;
            true
        }
        Err(err) => {
            error!("Upload failed: {err:#}");
            state.upload_mut().finish(Err(err.to_string()));
            false
        }
    }
}

/// Loads the autocomplete list; on failure the list stays empty.
pub async fn load_character_names(client: &GalleryClient, state: &mut ViewState) {
    match client.character_names().await {
        Ok(names) => {
            info!(count = names.len(), "Loaded characters");
            state.set_character_names(names);
        }
        Err(err) => warn!("Character load failed: {err:#}"),
    }
}
