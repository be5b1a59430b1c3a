mod api;
mod events;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use gallery_config::AppConfig;
use gallery_names::{CategorySource, NameCache, WikiCategorySource};
use gallery_storage::{JsonFileStore, MetadataStore, UploadDir};
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, EnvFilter};

use crate::api::{AppState, UploadDefaults};
use crate::events::NotifyingStore;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let app_config = AppConfig::from_env()?;
    info!(
        addr = %app_config.api_addr,
        uploads = %app_config.storage.upload_dir.display(),
        api_key = app_config.api_key.is_some(),
        "loaded configuration"
    );

    let store = Arc::new(JsonFileStore::open(&app_config.storage.database_path).await?);
    info!(path = %store.path().display(), "metadata store ready");
    let uploads = Arc::new(
        UploadDir::create(
            &app_config.storage.upload_dir,
            app_config.storage.public_prefix.clone(),
        )
        .await?,
    );
    let (events_tx, _events_rx) = broadcast::channel::<String>(64);
    let notifying_store: Arc<dyn MetadataStore> = Arc::new(NotifyingStore::new(store, events_tx.clone()));

    let names = Arc::new(NameCache::new());
    let name_source: Arc<dyn CategorySource> =
        Arc::new(WikiCategorySource::from_config(&app_config.wiki));
    let names_task = warm_name_cache(names.clone(), name_source, app_config.wiki.categories.clone());

    let state = AppState {
        store: notifying_store,
        uploads,
        names,
        events_tx,
        defaults: UploadDefaults {
            tags: app_config.storage.default_tags.clone(),
            element: app_config.storage.default_element.clone(),
        },
    };
    let app = api::build_router(
        state,
        app_config.api_key.clone(),
        app_config.storage.max_upload_bytes,
    );

    let api_task = start_api_server(app_config.api_addr, app).await?;

    signal::ctrl_c().await?;
    info!("shutting down");
    names_task.abort();
    api_task.abort();

    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,gallery_backend=debug,tower_http=debug"));

    fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_max_level(Level::TRACE)
        .init();
}

/// Fetches the autocomplete list once in the background; failures leave it empty.
fn warm_name_cache(
    names: Arc<NameCache>,
    source: Arc<dyn CategorySource>,
    categories: Vec<String>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let loaded = names.load(source.as_ref(), &categories).await;
        info!(count = loaded.len(), "character name cache ready");
    })
}

async fn start_api_server(addr: SocketAddr, app: Router) -> Result<JoinHandle<()>> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind api address {addr}"))?;
    info!(%addr, "starting api server");

    Ok(tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, app).await {
            error!("api server error: {err}");
        }
    }))
}
