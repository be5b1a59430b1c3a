use std::{env, fs, path::Path};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Configuration loaded from `gallery-config.toml` at the working directory root.
/// Every field is optional; present values populate environment variables that
/// [`crate::AppConfig::from_env`] reads, without overriding variables already set.
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub storage: StorageSection,
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub wiki: WikiSection,
}

#[derive(Debug, Default, Deserialize)]
pub struct StorageSection {
    pub database_path: Option<String>,
    pub upload_dir: Option<String>,
    pub public_prefix: Option<String>,
    pub max_upload_bytes: Option<usize>,
    pub default_tags: Option<String>,
    pub default_element: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiSection {
    pub addr: Option<String>,
    pub key: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WikiSection {
    pub endpoint: Option<String>,
    pub categories: Option<Vec<String>>,
    pub max_results: Option<usize>,
    pub max_rounds: Option<usize>,
}

const CANDIDATES: &[&str] = &["gallery-config.toml", "config/gallery-config.toml"];

pub fn load_file_config_into_env() -> Result<()> {
    if let Some(cfg) = read_first_config()? {
        apply_to_env(cfg);
    }
    Ok(())
}

fn apply_to_env(cfg: FileConfig) {
    set_if_missing("GALLERY_DATABASE_PATH", cfg.storage.database_path);
    set_if_missing("GALLERY_UPLOAD_DIR", cfg.storage.upload_dir);
    set_if_missing("GALLERY_PUBLIC_PREFIX", cfg.storage.public_prefix);
    set_if_missing(
        "GALLERY_MAX_UPLOAD_BYTES",
        cfg.storage.max_upload_bytes.map(|v| v.to_string()),
    );
    set_if_missing("GALLERY_DEFAULT_TAGS", cfg.storage.default_tags);
    set_if_missing("GALLERY_DEFAULT_ELEMENT", cfg.storage.default_element);

    set_if_missing("GALLERY_API_ADDR", cfg.api.addr);
    set_if_missing("GALLERY_API_KEY", cfg.api.key);

    set_if_missing("GALLERY_WIKI_ENDPOINT", cfg.wiki.endpoint);
    set_if_missing(
        "GALLERY_WIKI_CATEGORIES",
        cfg.wiki.categories.map(|v| v.join(",")),
    );
    set_if_missing(
        "GALLERY_WIKI_MAX_RESULTS",
        cfg.wiki.max_results.map(|v| v.to_string()),
    );
    set_if_missing(
        "GALLERY_WIKI_MAX_ROUNDS",
        cfg.wiki.max_rounds.map(|v| v.to_string()),
    );
}

fn read_first_config() -> Result<Option<FileConfig>> {
    for candidate in CANDIDATES {
        let path = Path::new(candidate);
        if path.exists() {
            return parse_config_file(path).map(Some);
        }
    }
    Ok(None)
}

fn parse_config_file(path: &Path) -> Result<FileConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let cfg: FileConfig =
        toml::from_str(&contents).with_context(|| format!("parsing {}", path.display()))?;
    Ok(cfg)
}

fn set_if_missing(key: &str, val: Option<String>) {
    if let Some(val) = val {
        let trimmed = val.trim();
        if trimmed.is_empty() {
            return;
        }
        if env::var(key).is_err() {
            env::set_var(key, trimmed);
        }
    }
}
