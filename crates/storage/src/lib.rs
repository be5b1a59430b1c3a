//! Flat-file persistence for uploaded images.
//!
//! Metadata lives in a single JSON array on disk; binaries live in one upload
//! directory. The backend only talks to these through [`MetadataStore`] and
//! [`UploadDir`].

mod store;
mod uploads;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

pub use store::{JsonFileStore, MetadataStore, StoreError};
pub use uploads::{sanitize_file_name, StoredUpload, UploadDir};

/// One uploaded image as persisted in the metadata store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    /// Path relative to the serving root, e.g. `images/uploads/1700000000000-cat.png`.
    pub url: String,
    pub tags: String,
    pub element: String,
    pub created_at: DateTime<Utc>,
}

impl ImageRecord {
    pub fn new(
        url: impl Into<String>,
        tags: impl Into<String>,
        element: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            url: url.into(),
            tags: tags.into(),
            element: element.into(),
            // Millisecond precision keeps the serialized form stable across readers.
            created_at: created_at.trunc_subsecs(3),
        }
    }
}
