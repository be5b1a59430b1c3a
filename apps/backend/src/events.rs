use std::convert::Infallible;
use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::{Stream, StreamExt};
use gallery_storage::{ImageRecord, MetadataStore, StoreError};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

use crate::api::AppState;

/// Store wrapper that announces every appended record to event subscribers.
pub struct NotifyingStore {
    inner: Arc<dyn MetadataStore>,
    tx: broadcast::Sender<String>,
}

impl NotifyingStore {
    pub fn new(inner: Arc<dyn MetadataStore>, tx: broadcast::Sender<String>) -> Self {
        Self { inner, tx }
    }
}

#[async_trait]
impl MetadataStore for NotifyingStore {
    async fn append(&self, record: ImageRecord) -> Result<ImageRecord, StoreError> {
        let record = self.inner.append(record).await?;

        // No subscribers is not an error.
        let _ = self.tx.send(
            serde_json::json!({
                "type": "upload",
                "image": &record,
            })
            .to_string(),
        );

        Ok(record)
    }

    async fn list_all(&self) -> Result<Vec<ImageRecord>, StoreError> {
        self.inner.list_all().await
    }
}

pub async fn upload_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.events_tx.subscribe();
    // Lagged receivers yield an error item; skipping it drops the missed events.
    let stream = BroadcastStream::new(rx).filter_map(|msg| async move {
        match msg {
            Ok(payload) => Some(Ok(Event::default().data(payload))),
            Err(_) => None,
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
