use std::collections::HashMap;

use gallery_storage::ImageRecord;
use rand::Rng;
use tracing::debug;

use crate::card::{Card, CardId, CardOrigin, StaticCard};

/// Marks static cards that already received their cosmetic classes.
pub const STYLED_MARKER: &str = "bento-styled";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeClass {
    Large,
    Tall,
    Wide,
}

impl SizeClass {
    pub const ALL: [SizeClass; 3] = [SizeClass::Large, SizeClass::Tall, SizeClass::Wide];

    pub fn as_class(self) -> &'static str {
        match self {
            SizeClass::Large => "card-large",
            SizeClass::Tall => "card-tall",
            SizeClass::Wide => "card-wide",
        }
    }
}

/// Maps a roll in `[0, 1)` to a size band; the lower half keeps the default size.
pub fn size_class_for(roll: f64) -> Option<SizeClass> {
    if roll > 0.85 {
        Some(SizeClass::Large)
    } else if roll > 0.65 {
        Some(SizeClass::Tall)
    } else if roll > 0.5 {
        Some(SizeClass::Wide)
    } else {
        None
    }
}

pub fn roll_size_class<R: Rng + ?Sized>(rng: &mut R) -> Option<SizeClass> {
    size_class_for(rng.gen::<f64>())
}

pub fn glow_class(element: &str) -> String {
    format!("glow-{}", element.trim().to_lowercase())
}

/// Ordered card container; order is display order.
#[derive(Debug, Clone, Default)]
pub struct Gallery {
    cards: Vec<Card>,
    next_id: u64,
}

impl Gallery {
    pub fn new(static_cards: impl IntoIterator<Item = StaticCard>) -> Self {
        let mut gallery = Self::default();
        for authored in static_cards {
            let id = gallery.allocate_id();
            gallery.cards.push(Card::from_static(id, authored));
        }
        gallery
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub(crate) fn cards_mut(&mut self) -> &mut [Card] {
        &mut self.cards
    }

    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.cards.iter().find(|c| c.id() == id)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Ids of the currently visible cards in display order.
    pub fn visible_ids(&self) -> Vec<CardId> {
        self.cards
            .iter()
            .filter(|c| c.is_visible())
            .map(Card::id)
            .collect()
    }

    /// Replaces all dynamic cards with fresh ones built from `records`.
    ///
    /// Dynamic cards are placed ahead of the static ones, newest record first.
    /// A record already on screen keeps its card id, so an open lightbox
    /// survives a refresh. Static cards get their cosmetic classes once; repeat
    /// calls leave them alone.
    pub fn render_dynamic<R: Rng + ?Sized>(&mut self, records: &[ImageRecord], rng: &mut R) {
        let mut previous: HashMap<String, CardId> = self
            .cards
            .iter()
            .filter(|c| c.origin() == CardOrigin::Dynamic)
            .map(|c| (c.src.clone(), c.id()))
            .collect();
        self.cards.retain(|c| c.origin() == CardOrigin::Static);

        for card in self.cards.iter_mut().filter(|c| !c.has_class(STYLED_MARKER)) {
            card.add_class(STYLED_MARKER);
            if let Some(element) = card.element.clone() {
                card.add_class(glow_class(&element));
            }
            if card.is_featured() {
                card.add_class(SizeClass::Large.as_class());
            } else if let Some(size) = roll_size_class(rng) {
                card.add_class(size.as_class());
            }
        }

        let mut fresh: Vec<Card> = records
            .iter()
            .map(|record| {
                let id = match previous.remove(&record.url) {
                    Some(id) => id,
                    None => self.allocate_id(),
                };
                let mut card = Card::from_record(id, record);
                if let Some(size) = roll_size_class(rng) {
                    card.add_class(size.as_class());
                }
                card.add_class(glow_class(&record.element));
                card
            })
            .collect();
        fresh.reverse();

        debug!(dynamic = fresh.len(), total = self.cards.len() + fresh.len(), "rendered gallery");
        self.cards.splice(0..0, fresh);
    }

    fn allocate_id(&mut self) -> CardId {
        let id = CardId(self.next_id);
        self.next_id += 1;
        id
    }
}
