use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

const FALLBACK_NAME: &str = "upload";
const MAX_NAME_ATTEMPTS: i64 = 1_000;

/// A binary written into the upload directory.
#[derive(Debug, Clone)]
pub struct StoredUpload {
    pub file_name: String,
    pub path: PathBuf,
    /// Path relative to the serving root, suitable for [`crate::ImageRecord::url`].
    pub url: String,
}

/// Directory holding uploaded binaries, named `<upload-time-ms>-<sanitized-name>`.
#[derive(Debug, Clone)]
pub struct UploadDir {
    root: PathBuf,
    public_prefix: String,
}

impl UploadDir {
    pub async fn create(root: impl Into<PathBuf>, public_prefix: impl Into<String>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .await
            .with_context(|| format!("creating upload directory {}", root.display()))?;
        info!(dir = %root.display(), "upload directory ready");
        Ok(Self {
            root,
            public_prefix: public_prefix.into().trim_matches('/').to_string(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn public_prefix(&self) -> &str {
        &self.public_prefix
    }

    pub fn url_for(&self, file_name: &str) -> String {
        if self.public_prefix.is_empty() {
            file_name.to_string()
        } else {
            format!("{}/{}", self.public_prefix, file_name)
        }
    }

    /// Writes `bytes` under a fresh name derived from the upload time and original name.
    ///
    /// When the name is taken (same millisecond, same file) the timestamp part is
    /// bumped until a free name is found.
    pub async fn store(
        &self,
        original_name: Option<&str>,
        bytes: &[u8],
        uploaded_at: DateTime<Utc>,
    ) -> Result<StoredUpload> {
        // Recreated lazily in case the directory was removed while running.
        fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("creating upload directory {}", self.root.display()))?;

        let sanitized = sanitize_file_name(original_name.unwrap_or_default());
        let base_ms = uploaded_at.timestamp_millis();

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let file_name = format!("{}-{}", base_ms + attempt, sanitized);
            let path = self.root.join(&file_name);

            let mut file = match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                    debug!(%file_name, "upload name taken, retrying");
                    continue;
                }
                Err(err) => {
                    return Err(err).with_context(|| format!("creating {}", path.display()))
                }
            };

            file.write_all(bytes)
                .await
                .with_context(|| format!("writing {}", path.display()))?;
            file.flush()
                .await
                .with_context(|| format!("flushing {}", path.display()))?;

            debug!(%file_name, size = bytes.len(), "stored upload");
            return Ok(StoredUpload {
                url: self.url_for(&file_name),
                file_name,
                path,
            });
        }

        Err(anyhow!(
            "no free upload name for {sanitized} after {MAX_NAME_ATTEMPTS} attempts"
        ))
    }
}

/// Reduces a client-supplied file name to a safe single path component.
///
/// Directory parts are dropped and every whitespace run becomes `-`, including
/// leading and trailing runs.
pub fn sanitize_file_name(original: &str) -> String {
    let base = original.rsplit(['/', '\\']).next().unwrap_or_default();

    let mut out = String::with_capacity(base.len());
    let mut in_whitespace = false;
    for ch in base.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                out.push('-');
            }
            in_whitespace = true;
        } else if !ch.is_control() {
            out.push(ch);
            in_whitespace = false;
        }
    }

    match out.as_str() {
        "" | "." | ".." => FALLBACK_NAME.to_string(),
        _ => out,
    }
}
