use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::{build_name_list, CategorySource};

/// Process-lifetime cache of the autocomplete name list.
///
/// The list is built at most once. A failed build caches an empty list instead
/// of surfacing the error; readers racing the first load see an empty list.
#[derive(Default)]
pub struct NameCache {
    names: OnceCell<Arc<Vec<String>>>,
}

impl NameCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Arc<Vec<String>> {
        self.names.get().cloned().unwrap_or_default()
    }

    pub fn is_loaded(&self) -> bool {
        self.names.initialized()
    }

    pub async fn load(
        &self,
        source: &dyn CategorySource,
        categories: &[String],
    ) -> Arc<Vec<String>> {
        self.names
            .get_or_init(|| async {
                match build_name_list(source, categories).await {
                    Ok(names) => {
                        info!(source = source.name(), count = names.len(), "loaded character names");
                        Arc::new(names)
                    }
                    Err(err) => {
                        warn!(source = source.name(), "character name load failed: {err:#}");
                        Arc::default()
                    }
                }
            })
            .await
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeSource;

    #[tokio::test]
    async fn empty_until_loaded() {
        let cache = NameCache::new();
        assert!(!cache.is_loaded());
        assert!(cache.current().is_empty());
    }

    #[tokio::test]
    async fn loads_once() {
        let cache = NameCache::new();
        let source = FakeSource::default().with("Category:A", &["Amber", "Albedo"]);
        let categories = vec!["Category:A".to_string()];

        let first = cache.load(&source, &categories).await;
        let second = cache.load(&source, &categories).await;

        assert_eq!(*first, vec!["Albedo", "Amber"]);
        assert_eq!(first, second);
        assert_eq!(cache.current(), first);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn failure_caches_empty_list() {
        let cache = NameCache::new();
        let source = FakeSource::default();
        let categories = vec!["Category:Unknown".to_string()];

        let names = cache.load(&source, &categories).await;

        assert!(names.is_empty());
        assert!(cache.is_loaded());
        // No retry until the process restarts.
        cache.load(&source, &categories).await;
        assert_eq!(source.calls(), 1);
    }
}
