use crate::card::CardId;

/// Keyboard input relevant to the lightbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    ArrowLeft,
    ArrowRight,
    Other,
}

/// Where a click inside the open lightbox landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalTarget {
    Backdrop,
    Image,
}

/// Lightbox navigation state.
///
/// The snapshot is the set of visible cards at the moment the lightbox opened;
/// navigation walks it without re-checking visibility.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Modal {
    #[default]
    Closed,
    Open {
        snapshot: Vec<CardId>,
        index: usize,
    },
}

impl Modal {
    /// Opens on `card`. Returns false and stays closed when `card` is not in `snapshot`.
    pub fn open(&mut self, card: CardId, snapshot: Vec<CardId>) -> bool {
        match snapshot.iter().position(|id| *id == card) {
            Some(index) => {
                *self = Modal::Open { snapshot, index };
                true
            }
            None => false,
        }
    }

    pub fn close(&mut self) {
        *self = Modal::Closed;
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Modal::Open { .. })
    }

    pub fn index(&self) -> Option<usize> {
        match self {
            Modal::Open { index, .. } => Some(*index),
            Modal::Closed => None,
        }
    }

    pub fn snapshot(&self) -> &[CardId] {
        match self {
            Modal::Open { snapshot, .. } => snapshot.as_slice(),
            Modal::Closed => &[],
        }
    }

    pub fn current(&self) -> Option<CardId> {
        match self {
            Modal::Open { snapshot, index } => snapshot.get(*index).copied(),
            Modal::Closed => None,
        }
    }

    pub fn next(&mut self) {
        if let Modal::Open { snapshot, index } = self {
            *index = (*index + 1) % snapshot.len();
        }
    }

    pub fn previous(&mut self) {
        if let Modal::Open { snapshot, index } = self {
            *index = (*index + snapshot.len() - 1) % snapshot.len();
        }
    }

    /// Applies a key press; keys are ignored while closed.
    pub fn handle_key(&mut self, key: Key) {
        if !self.is_open() {
            return;
        }
        match key {
            Key::Escape => self.close(),
            Key::ArrowLeft => self.previous(),
            Key::ArrowRight => self.next(),
            Key::Other => {}
        }
    }

    pub fn handle_click(&mut self, target: ModalTarget) {
        if target == ModalTarget::Backdrop {
            self.close();
        }
    }
}

/// What the lightbox currently displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalFrame {
    pub src: String,
    pub alt: String,
    pub caption: String,
    pub position: usize,
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: u64) -> Vec<CardId> {
        (0..n).map(CardId).collect()
    }

    #[test]
    fn open_captures_position_in_snapshot() {
        let mut modal = Modal::default();
        assert!(modal.open(CardId(2), ids(4)));
        assert_eq!(modal.index(), Some(2));
        assert_eq!(modal.current(), Some(CardId(2)));
    }

    #[test]
    fn open_ignores_cards_outside_snapshot() {
        let mut modal = Modal::default();
        assert!(!modal.open(CardId(9), ids(3)));
        assert!(!modal.is_open());
    }

    #[test]
    fn next_n_times_returns_to_start() {
        for n in 1..6u64 {
            for start in 0..n {
                let mut modal = Modal::default();
                modal.open(CardId(start), ids(n));
                for _ in 0..n {
                    modal.next();
                }
                assert_eq!(modal.index(), Some(start as usize));
            }
        }
    }

    #[test]
    fn previous_from_first_wraps_to_last() {
        let mut modal = Modal::default();
        modal.open(CardId(0), ids(5));
        modal.previous();
        assert_eq!(modal.index(), Some(4));
        modal.next();
        assert_eq!(modal.index(), Some(0));
    }

    #[test]
    fn single_card_snapshot_stays_put() {
        let mut modal = Modal::default();
        modal.open(CardId(0), ids(1));
        modal.next();
        modal.previous();
        assert_eq!(modal.index(), Some(0));
    }

    #[test]
    fn keys_navigate_and_escape_closes() {
        let mut modal = Modal::default();
        modal.handle_key(Key::ArrowRight);
        assert!(!modal.is_open());

        modal.open(CardId(1), ids(3));
        modal.handle_key(Key::ArrowRight);
        assert_eq!(modal.index(), Some(2));
        modal.handle_key(Key::ArrowLeft);
        modal.handle_key(Key::ArrowLeft);
        assert_eq!(modal.index(), Some(0));
        modal.handle_key(Key::Other);
        assert!(modal.is_open());
        modal.handle_key(Key::Escape);
        assert_eq!(modal, Modal::Closed);
        assert!(modal.snapshot().is_empty());
    }

    #[test]
    fn only_backdrop_clicks_close() {
        let mut modal = Modal::default();
        modal.open(CardId(0), ids(2));
        modal.handle_click(ModalTarget::Image);
        assert!(modal.is_open());
        modal.handle_click(ModalTarget::Backdrop);
        assert!(!modal.is_open());
    }
}
