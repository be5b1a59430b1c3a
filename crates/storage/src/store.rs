use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::ImageRecord;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("metadata store I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("metadata store at {path} is not a valid record array: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to encode metadata records: {0}")]
    Encode(#[source] serde_json::Error),
}

impl StoreError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Ordered collection of image records; insertion order is upload order.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    async fn append(&self, record: ImageRecord) -> Result<ImageRecord, StoreError>;

    async fn list_all(&self) -> Result<Vec<ImageRecord>, StoreError>;
}

/// JSON-array store rewritten wholesale on each append.
///
/// Appends are serialized through an internal lock and land on disk by writing a
/// sibling temp file and renaming it over the store, so readers see either the
/// previous or the next array and concurrent uploads never drop each other.
pub struct JsonFileStore {
    path: PathBuf,
    tmp_path: PathBuf,
    writer: Mutex<()>,
}

impl JsonFileStore {
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|err| StoreError::io(parent, err))?;
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "database.json".to_string());
        let tmp_path = path.with_file_name(format!(".{file_name}.tmp"));

        let store = Self {
            path,
            tmp_path,
            writer: Mutex::new(()),
        };

        let exists = fs::try_exists(&store.path)
            .await
            .map_err(|err| StoreError::io(&store.path, err))?;
        if !exists {
            store.write_records(&[]).await?;
            info!(path = %store.path.display(), "created empty metadata store");
        }

        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_records(&self) -> Result<Vec<ImageRecord>, StoreError> {
        let raw = fs::read(&self.path)
            .await
            .map_err(|err| StoreError::io(&self.path, err))?;
        serde_json::from_slice(&raw).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    async fn write_records(&self, records: &[ImageRecord]) -> Result<(), StoreError> {
        let encoded = serde_json::to_vec_pretty(records).map_err(StoreError::Encode)?;
        fs::write(&self.tmp_path, &encoded)
            .await
            .map_err(|err| StoreError::io(&self.tmp_path, err))?;
        fs::rename(&self.tmp_path, &self.path)
            .await
            .map_err(|err| StoreError::io(&self.path, err))?;
        Ok(())
    }
}

#[async_trait]
impl MetadataStore for JsonFileStore {
    async fn append(&self, record: ImageRecord) -> Result<ImageRecord, StoreError> {
        let _guard = self.writer.lock().await;

        let mut records = self.read_records().await?;
        records.push(record.clone());
        self.write_records(&records).await?;

        debug!(url = %record.url, total = records.len(), "appended image record");
        Ok(record)
    }

    async fn list_all(&self) -> Result<Vec<ImageRecord>, StoreError> {
        self.read_records().await
    }
}
