//! Character-name list used for search autocomplete.
//!
//! Names are pulled from wiki categories through a [`CategorySource`],
//! normalised into a sorted, de-duplicated list and cached for the life of the
//! process by [`NameCache`].

mod cache;
mod wiki;

use std::collections::BTreeSet;

use anyhow::{Context, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

pub use cache::NameCache;
pub use wiki::WikiCategorySource;

/// Category titles that are wiki bookkeeping rather than character names.
const BLOCKED_NAMES: &[&str] = &["Character", "Characters", "Playable Characters", "NPCs"];

static CATEGORY_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^Category:").expect("category prefix pattern is valid"));
static STORYLINE_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)/Storyline$").expect("storyline suffix pattern is valid"));

/// Anything that can list the member titles of a named category.
#[async_trait]
pub trait CategorySource: Send + Sync {
    async fn category_members(&self, category: &str) -> Result<Vec<String>>;

    fn name(&self) -> &'static str;
}

/// Fetches every category in order and returns the cleaned name list.
pub async fn build_name_list(
    source: &dyn CategorySource,
    categories: &[String],
) -> Result<Vec<String>> {
    let mut combined = Vec::new();
    for category in categories {
        let members = source
            .category_members(category)
            .await
            .with_context(|| format!("listing members of {category}"))?;
        debug!(source = source.name(), %category, count = members.len(), "fetched category");
        combined.extend(members);
    }
    Ok(clean_names(combined))
}

/// Strips a leading `Category:` and a trailing `/Storyline`, then trims.
pub fn normalize_title(title: &str) -> String {
    let without_prefix = CATEGORY_PREFIX.replace(title, "");
    STORYLINE_SUFFIX
        .replace(&without_prefix, "")
        .trim()
        .to_string()
}

fn clean_names(titles: Vec<String>) -> Vec<String> {
    let unique: BTreeSet<String> = titles
        .iter()
        .map(|t| normalize_title(t))
        .filter(|n| !n.is_empty() && !BLOCKED_NAMES.contains(&n.as_str()) && !n.contains("List"))
        .collect();

    let mut names: Vec<String> = unique.into_iter().collect();
    names.sort_by(|a, b| a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b)));
    names
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use anyhow::{anyhow, Result};
    use async_trait::async_trait;

    use super::CategorySource;

    /// In-memory source; categories missing from the map fail.
    #[derive(Default)]
    pub struct FakeSource {
        pub categories: HashMap<String, Vec<String>>,
        pub calls: AtomicUsize,
    }

    impl FakeSource {
        pub fn with(mut self, category: &str, titles: &[&str]) -> Self {
            self.categories.insert(
                category.to_string(),
                titles.iter().map(|t| t.to_string()).collect(),
            );
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CategorySource for FakeSource {
        async fn category_members(&self, category: &str) -> Result<Vec<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.categories
                .get(category)
                .cloned()
                .ok_or_else(|| anyhow!("unknown category {category}"))
        }

        fn name(&self) -> &'static str {
            "fake"
        }
    }
}
