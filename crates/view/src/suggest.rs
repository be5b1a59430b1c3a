pub const MAX_SUGGESTIONS: usize = 6;

/// Autocomplete entries shown under the search box.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Suggestions {
    items: Vec<String>,
}

impl Suggestions {
    /// Recomputes the list for `query` against `names`, keeping list order.
    pub fn update(&mut self, query: &str, names: &[String]) {
        self.items = matching_names(query, names);
    }

    pub fn hide(&mut self) {
        self.items.clear();
    }

    pub fn is_visible(&self) -> bool {
        !self.items.is_empty()
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.items.get(index).map(String::as_str)
    }
}

/// First [`MAX_SUGGESTIONS`] names containing the trimmed query, ignoring case.
pub fn matching_names(query: &str, names: &[String]) -> Vec<String> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    names
        .iter()
        .filter(|name| name.to_lowercase().contains(&needle))
        .take(MAX_SUGGESTIONS)
        .cloned()
        .collect()
}
