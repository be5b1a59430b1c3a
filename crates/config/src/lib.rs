//! Application-wide configuration helpers.
//!
//! Reads environment variables (with optional `.env` and `gallery-config.toml`)
//! and provides strongly typed config structs consumed by other crates.

mod file_loader;

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub use file_loader::load_file_config_into_env;

pub const DEFAULT_API_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_DATABASE_PATH: &str = "database.json";
pub const DEFAULT_UPLOAD_DIR: &str = "images/uploads";
pub const DEFAULT_PUBLIC_PREFIX: &str = "images/uploads";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;
pub const DEFAULT_TAGS: &str = "Gallery Image";
pub const DEFAULT_ELEMENT: &str = "Pyro";
pub const DEFAULT_WIKI_ENDPOINT: &str = "https://genshin-impact.fandom.com/api.php";
pub const DEFAULT_WIKI_CATEGORIES: &str = "Category:Playable Characters,Category:Characters";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_addr: SocketAddr,
    /// Shared secret required in `x-api-key` on `/api` routes when set.
    pub api_key: Option<String>,
    pub storage: StorageConfig,
    pub wiki: WikiConfig,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub database_path: PathBuf,
    pub upload_dir: PathBuf,
    /// Path prefix written into stored record URLs, relative to the serving root.
    pub public_prefix: String,
    pub max_upload_bytes: usize,
    pub default_tags: String,
    pub default_element: String,
}

#[derive(Debug, Clone)]
pub struct WikiConfig {
    pub endpoint: String,
    pub categories: Vec<String>,
    pub max_results: usize,
    pub max_rounds: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        load_file_config_into_env()?;
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup; missing keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_addr = lookup("GALLERY_API_ADDR")
            .unwrap_or_else(|| DEFAULT_API_ADDR.to_string())
            .parse::<SocketAddr>()
            .context("Failed to parse GALLERY_API_ADDR as a socket address")?;
        let api_key = lookup("GALLERY_API_KEY").filter(|k| !k.trim().is_empty());

        let storage = StorageConfig {
            database_path: PathBuf::from(read_string(&lookup, "GALLERY_DATABASE_PATH", DEFAULT_DATABASE_PATH)),
            upload_dir: PathBuf::from(read_string(&lookup, "GALLERY_UPLOAD_DIR", DEFAULT_UPLOAD_DIR)),
            public_prefix: read_string(&lookup, "GALLERY_PUBLIC_PREFIX", DEFAULT_PUBLIC_PREFIX)
                .trim_matches('/')
                .to_string(),
            max_upload_bytes: read_usize(&lookup, "GALLERY_MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            default_tags: read_string(&lookup, "GALLERY_DEFAULT_TAGS", DEFAULT_TAGS),
            default_element: read_string(&lookup, "GALLERY_DEFAULT_ELEMENT", DEFAULT_ELEMENT),
        };

        let wiki = WikiConfig {
            endpoint: read_string(&lookup, "GALLERY_WIKI_ENDPOINT", DEFAULT_WIKI_ENDPOINT),
            categories: read_list(&lookup, "GALLERY_WIKI_CATEGORIES", DEFAULT_WIKI_CATEGORIES),
            max_results: read_usize(&lookup, "GALLERY_WIKI_MAX_RESULTS", 5_000)?,
            max_rounds: read_usize(&lookup, "GALLERY_WIKI_MAX_ROUNDS", 50)?,
        };

        Ok(Self {
            api_addr,
            api_key,
            storage,
            wiki,
        })
    }
}

fn read_string<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn read_usize<F>(lookup: &F, key: &str, default: usize) -> Result<usize>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(val) => val
            .trim()
            .parse::<usize>()
            .with_context(|| format!("Failed to parse {key} as usize")),
        None => Ok(default),
    }
}

fn read_list<F>(lookup: &F, key: &str, default: &str) -> Vec<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .unwrap_or_else(|| default.to_string())
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
