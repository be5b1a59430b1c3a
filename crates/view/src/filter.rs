use crate::card::Card;

pub const ALL_CATEGORY: &str = "all";

/// Category button plus free-text query applied to every card.
#[derive(Debug, Clone)]
pub struct FilterState {
    category: String,
    query: String,
    has_interacted: bool,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            category: ALL_CATEGORY.to_string(),
            query: String::new(),
            has_interacted: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterOutcome {
    pub visible_count: usize,
    /// Whether the "no results" indicator should show.
    pub show_empty_state: bool,
}

impl FilterState {
    pub fn category(&self) -> &str {
        &self.category
    }

    /// The query as typed, before normalisation.
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn has_interacted(&self) -> bool {
        self.has_interacted
    }

    /// Switches category and clears the text query.
    pub fn select_category(&mut self, key: &str) {
        self.has_interacted = true;
        self.category = key.to_lowercase();
        self.query.clear();
    }

    pub fn set_query(&mut self, raw: &str) {
        self.has_interacted = true;
        self.query = raw.to_string();
    }

    pub fn normalized_query(&self) -> String {
        self.query.trim().to_lowercase()
    }

    pub fn matches(&self, keywords: &str) -> bool {
        is_match(&self.category, &self.normalized_query(), keywords)
    }

    /// Shows or hides every card and reports the resulting count.
    pub fn apply(&self, cards: &mut [Card]) -> FilterOutcome {
        let query = self.normalized_query();
        let mut visible_count = 0;
        for card in cards.iter_mut() {
            let visible = is_match(&self.category, &query, card.keywords());
            card.set_visible(visible);
            if visible {
                visible_count += 1;
            }
        }

        FilterOutcome {
            visible_count,
            // Never flash "no results" before the user did anything.
            show_empty_state: self.has_interacted && visible_count == 0,
        }
    }
}

/// Visibility rule for one card. `category` and `query` must already be lowercased.
pub fn is_match(category: &str, query: &str, keywords: &str) -> bool {
    let match_category = category == ALL_CATEGORY || keywords.contains(category);
    let match_query = query.is_empty() || keywords.contains(query);
    match_category && match_query
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::StaticCard;
    use crate::render::Gallery;

    fn gallery(keywords: &[&str]) -> Gallery {
        Gallery::new(
            keywords
                .iter()
                .enumerate()
                .map(|(i, k)| StaticCard::new(format!("{i}.png"), *k)),
        )
    }

    fn visible(gallery: &Gallery) -> Vec<String> {
        gallery
            .cards()
            .iter()
            .filter(|c| c.is_visible())
            .map(|c| c.src.clone())
            .collect()
    }

    #[test]
    fn visibility_rule_truth_table() {
        let keywords = "hu tao pyro";
        assert!(is_match("all", "", keywords));
        assert!(is_match("pyro", "", keywords));
        assert!(!is_match("hydro", "", keywords));
        assert!(is_match("all", "tao", keywords));
        assert!(is_match("pyro", "hu", keywords));
        assert!(!is_match("pyro", "venti", keywords));
        assert!(!is_match("hydro", "hu", keywords));
    }

    #[test]
    fn rule_holds_for_every_category_and_query() {
        let keywords = ["hu tao pyro", "xingqiu hydro", "venti anemo", "diluc pyro", ""];
        let categories = ["all", "pyro", "hydro", "anemo", "geo"];
        let queries = ["", "hu", "i", "pyro", "zzz"];

        for category in categories {
            for query in queries {
                let mut g = gallery(&keywords);
                let mut filter = FilterState::default();
                filter.select_category(category);
                filter.set_query(query);
                let outcome = filter.apply(g.cards_mut());

                for card in g.cards() {
                    let expected = (category == "all" || card.keywords().contains(category))
                        && (query.is_empty() || card.keywords().contains(query));
                    assert_eq!(card.is_visible(), expected, "{category}/{query}/{}", card.keywords());
                }
                assert_eq!(outcome.visible_count, g.visible_ids().len());
            }
        }
    }

    #[test]
    fn query_is_trimmed_and_case_insensitive() {
        let mut g = gallery(&["Hu Tao Pyro", "Venti Anemo"]);
        let mut filter = FilterState::default();
        filter.set_query("  HU tao ");
        filter.apply(g.cards_mut());
        assert_eq!(visible(&g), vec!["0.png"]);
    }

    #[test]
    fn category_keys_are_lowercased_and_clear_the_query() {
        let mut filter = FilterState::default();
        filter.set_query("tao");
        filter.select_category("Pyro");
        assert_eq!(filter.category(), "pyro");
        assert_eq!(filter.query(), "");
    }

    #[test]
    fn empty_state_hidden_before_interaction() {
        let mut g = gallery(&[]);
        let outcome = FilterState::default().apply(g.cards_mut());
        assert_eq!(outcome.visible_count, 0);
        assert!(!outcome.show_empty_state);
    }

    #[test]
    fn empty_state_tracks_zero_after_interaction() {
        let mut g = gallery(&["hu tao pyro"]);
        let mut filter = FilterState::default();

        filter.set_query("venti");
        assert!(filter.apply(g.cards_mut()).show_empty_state);

        filter.set_query("hu");
        assert!(!filter.apply(g.cards_mut()).show_empty_state);

        filter.select_category("cryo");
        assert!(filter.apply(g.cards_mut()).show_empty_state);

        filter.select_category("all");
        assert!(!filter.apply(g.cards_mut()).show_empty_state);
    }
}
