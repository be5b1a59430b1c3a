use std::collections::BTreeSet;

use gallery_storage::ImageRecord;

pub const CARD_CLASS: &str = "img-card";
pub const DYNAMIC_CARD_CLASS: &str = "dynamic-card";
pub const FEATURED_CLASS: &str = "featured";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CardId(pub(crate) u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardOrigin {
    /// Authored into the page; survives re-renders.
    Static,
    /// Built from a fetched [`ImageRecord`]; replaced on every re-render.
    Dynamic,
}

/// A hand-authored card present before any records are fetched.
#[derive(Debug, Clone, Default)]
pub struct StaticCard {
    pub src: String,
    pub alt: Option<String>,
    pub caption: Option<String>,
    pub element: Option<String>,
    pub keywords: String,
    pub featured: bool,
}

impl StaticCard {
    pub fn new(src: impl Into<String>, keywords: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            keywords: keywords.into(),
            ..Self::default()
        }
    }

    pub fn caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    pub fn element(mut self, element: impl Into<String>) -> Self {
        self.element = Some(element.into());
        self
    }

    pub fn featured(mut self) -> Self {
        self.featured = true;
        self
    }
}

/// View model for one gallery tile.
#[derive(Debug, Clone)]
pub struct Card {
    id: CardId,
    origin: CardOrigin,
    pub src: String,
    pub alt: Option<String>,
    pub caption: Option<String>,
    pub element: Option<String>,
    keywords: String,
    featured: bool,
    classes: BTreeSet<String>,
    visible: bool,
}

impl Card {
    pub(crate) fn from_static(id: CardId, authored: StaticCard) -> Self {
        let mut card = Self {
            id,
            origin: CardOrigin::Static,
            src: authored.src,
            alt: authored.alt,
            caption: authored.caption,
            element: authored.element,
            keywords: authored.keywords.to_lowercase(),
            featured: authored.featured,
            classes: BTreeSet::new(),
            visible: true,
        };
        card.add_class(CARD_CLASS);
        if card.featured {
            card.add_class(FEATURED_CLASS);
        }
        card
    }

    pub(crate) fn from_record(id: CardId, record: &ImageRecord) -> Self {
        let mut card = Self {
            id,
            origin: CardOrigin::Dynamic,
            src: record.url.clone(),
            alt: Some(record.tags.clone()),
            caption: Some(record.tags.clone()),
            element: Some(record.element.clone()),
            keywords: keywords_for(&record.tags, &record.element),
            featured: false,
            classes: BTreeSet::new(),
            visible: true,
        };
        card.add_class(CARD_CLASS);
        card.add_class(DYNAMIC_CARD_CLASS);
        card
    }

    pub fn id(&self) -> CardId {
        self.id
    }

    pub fn origin(&self) -> CardOrigin {
        self.origin
    }

    /// Lowercased match target for category and text filtering.
    pub fn keywords(&self) -> &str {
        &self.keywords
    }

    pub fn is_featured(&self) -> bool {
        self.featured
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }

    pub(crate) fn add_class(&mut self, class: impl Into<String>) {
        self.classes.insert(class.into());
    }
}

/// Keyword string for a record: lowercased tags and element separated by a space.
pub fn keywords_for(tags: &str, element: &str) -> String {
    format!("{} {}", tags.to_lowercase(), element.to_lowercase())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn record_card_derives_keywords_and_captions() {
        let record = ImageRecord::new("images/uploads/1-a.png", "Hu Tao, Cosplay", "Pyro", Utc::now());
        let card = Card::from_record(CardId(1), &record);

        assert_eq!(card.keywords(), "hu tao, cosplay pyro");
        assert_eq!(card.caption.as_deref(), Some("Hu Tao, Cosplay"));
        assert_eq!(card.alt.as_deref(), Some("Hu Tao, Cosplay"));
        assert_eq!(card.origin(), CardOrigin::Dynamic);
        assert!(card.has_class(DYNAMIC_CARD_CLASS));
        assert!(card.is_visible());
    }

    #[test]
    fn static_card_keywords_are_lowercased() {
        let card = Card::from_static(CardId(0), StaticCard::new("a.png", "Venti ANEMO").featured());
        assert_eq!(card.keywords(), "venti anemo");
        assert!(card.has_class(FEATURED_CLASS));
        assert!(!card.has_class(DYNAMIC_CARD_CLASS));
    }
}
