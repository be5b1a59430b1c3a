use gallery_storage::ImageRecord;
use rand::Rng;

use crate::card::{CardId, StaticCard};
use crate::filter::{FilterOutcome, FilterState};
use crate::modal::{Key, Modal, ModalFrame, ModalTarget};
use crate::render::Gallery;
use crate::suggest::Suggestions;
use crate::upload::UploadDialog;

const FALLBACK_ALT: &str = "Gallery image";
const FALLBACK_CAPTION: &str = "Gallery Image";

/// Everything the gallery page shows, driven by explicit user events.
#[derive(Debug, Clone)]
pub struct ViewState {
    gallery: Gallery,
    filter: FilterState,
    suggestions: Suggestions,
    names: Vec<String>,
    modal: Modal,
    upload: UploadDialog,
    last_outcome: FilterOutcome,
}

impl ViewState {
    /// First render: every static card is shown and the empty indicator stays hidden.
    pub fn new(static_cards: impl IntoIterator<Item = StaticCard>) -> Self {
        let mut state = Self {
            gallery: Gallery::new(static_cards),
            filter: FilterState::default(),
            suggestions: Suggestions::default(),
            names: Vec::new(),
            modal: Modal::default(),
            upload: UploadDialog::default(),
            last_outcome: FilterOutcome {
                visible_count: 0,
                show_empty_state: false,
            },
        };
        state.apply_filters();
        state
    }

    pub fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn suggestions(&self) -> &Suggestions {
        &self.suggestions
    }

    pub fn modal(&self) -> &Modal {
        &self.modal
    }

    pub fn upload(&self) -> &UploadDialog {
        &self.upload
    }

    pub fn upload_mut(&mut self) -> &mut UploadDialog {
        &mut self.upload
    }

    pub fn visible_count(&self) -> usize {
        self.last_outcome.visible_count
    }

    pub fn empty_state_visible(&self) -> bool {
        self.last_outcome.show_empty_state
    }

    /// Page scrolling is frozen while any overlay is up.
    pub fn page_scroll_locked(&self) -> bool {
        self.modal.is_open() || self.upload.is_open()
    }

    pub fn character_names(&self) -> &[String] {
        &self.names
    }

    /// Replaces the autocomplete list; visible suggestions are not recomputed.
    pub fn set_character_names(&mut self, names: Vec<String>) {
        self.names = names;
    }

    /// Replaces dynamic cards with `records` and re-applies the current filter.
    ///
    /// An open lightbox keeps its snapshot; it closes only if a card in the
    /// snapshot no longer exists.
    pub fn load_images<R: Rng + ?Sized>(&mut self, records: &[ImageRecord], rng: &mut R) {
        self.gallery.render_dynamic(records, rng);
        self.apply_filters();

        let stale = self
            .modal
            .snapshot()
            .iter()
            .any(|id| self.gallery.card(*id).is_none());
        if stale {
            self.modal.close();
        }
    }

    pub fn select_category(&mut self, key: &str) {
        self.filter.select_category(key);
        self.suggestions.hide();
        self.apply_filters();
    }

    pub fn input_query(&mut self, raw: &str) {
        self.filter.set_query(raw);
        self.apply_filters();
        self.suggestions.update(raw, &self.names);
    }

    /// Fills the search box with suggestion `index`. Returns false when there is no such entry.
    pub fn pick_suggestion(&mut self, index: usize) -> bool {
        let Some(name) = self.suggestions.get(index).map(str::to_string) else {
            return false;
        };
        self.filter.set_query(&name);
        self.suggestions.hide();
        self.apply_filters();
        true
    }

    /// Opens the lightbox on `card`, snapshotting the cards visible right now.
    pub fn click_image(&mut self, card: CardId) -> bool {
        let snapshot = self.gallery.visible_ids();
        self.modal.open(card, snapshot)
    }

    pub fn click_modal(&mut self, target: ModalTarget) {
        self.modal.handle_click(target);
    }

    pub fn close_modal(&mut self) {
        self.modal.close();
    }

    pub fn next_image(&mut self) {
        self.modal.next();
    }

    pub fn previous_image(&mut self) {
        self.modal.previous();
    }

    pub fn press_key(&mut self, key: Key) {
        self.modal.handle_key(key);
    }

    pub fn modal_frame(&self) -> Option<ModalFrame> {
        let index = self.modal.index()?;
        let card = self.gallery.card(self.modal.current()?)?;
        Some(ModalFrame {
            src: card.src.clone(),
            alt: card
                .alt
                .clone()
                .filter(|a| !a.is_empty())
                .unwrap_or_else(|| FALLBACK_ALT.to_string()),
            caption: card
                .caption
                .clone()
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| FALLBACK_CAPTION.to_string()),
            position: index,
            total: self.modal.snapshot().len(),
        })
    }

    fn apply_filters(&mut self) {
        self.last_outcome = self.filter.apply(self.gallery.cards_mut());
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn statics() -> Vec<StaticCard> {
        vec![
            StaticCard::new("hutao.png", "hu tao pyro").caption("Hu Tao").element("Pyro"),
            StaticCard::new("xq.png", "xingqiu hydro").element("Hydro"),
            StaticCard::new("venti.png", "venti anemo").caption("Venti"),
        ]
    }

    fn record(n: i64, tags: &str, element: &str) -> ImageRecord {
        ImageRecord::new(
            format!("images/uploads/{n}.png"),
            tags,
            element,
            Utc.timestamp_millis_opt(n).unwrap(),
        )
    }

    fn visible_srcs(state: &ViewState) -> Vec<String> {
        state
            .gallery()
            .cards()
            .iter()
            .filter(|c| c.is_visible())
            .map(|c| c.src.clone())
            .collect()
    }

    #[test]
    fn first_render_never_shows_empty_state() {
        let state = ViewState::new(Vec::new());
        assert_eq!(state.visible_count(), 0);
        assert!(!state.empty_state_visible());

        let state = ViewState::new(statics());
        assert_eq!(state.visible_count(), 3);
        assert!(!state.empty_state_visible());
    }

    #[test]
    fn category_then_query() {
        let mut state = ViewState::new(statics());

        state.select_category("Pyro");
        assert_eq!(visible_srcs(&state), vec!["hutao.png"]);

        state.input_query("venti");
        assert!(visible_srcs(&state).is_empty());
        assert!(state.empty_state_visible());

        state.select_category("all");
        assert_eq!(state.filter().query(), "");
        assert_eq!(state.visible_count(), 3);
        assert!(!state.empty_state_visible());
    }

    #[test]
    fn typing_offers_suggestions_and_picking_filters() {
        let mut state = ViewState::new(statics());
        state.set_character_names(vec!["Hu Tao".into(), "Venti".into(), "Xingqiu".into()]);

        state.input_query("Ven");
        assert_eq!(state.suggestions().items(), &["Venti".to_string()][..]);

        assert!(state.pick_suggestion(0));
        assert_eq!(state.filter().query(), "Venti");
        assert!(!state.suggestions().is_visible());
        assert_eq!(visible_srcs(&state), vec!["venti.png"]);

        assert!(!state.pick_suggestion(3));
    }

    #[test]
    fn clearing_query_hides_suggestions() {
        let mut state = ViewState::new(statics());
        state.set_character_names(vec!["Hu Tao".into()]);
        state.input_query("hu");
        assert!(state.suggestions().is_visible());
        state.input_query("");
        assert!(!state.suggestions().is_visible());
        assert_eq!(state.visible_count(), 3);
    }

    #[test]
    fn selecting_category_hides_suggestions() {
        let mut state = ViewState::new(statics());
        state.set_character_names(vec!["Hu Tao".into()]);
        state.input_query("hu");
        state.select_category("hydro");
        assert!(!state.suggestions().is_visible());
    }

    #[test]
    fn modal_walks_the_snapshot_taken_at_open() {
        let mut state = ViewState::new(statics());
        state.select_category("o");
        let ids = state.gallery().visible_ids();
        assert_eq!(ids.len(), 3);

        assert!(state.click_image(ids[2]));
        assert!(state.page_scroll_locked());
        let frame = state.modal_frame().unwrap();
        assert_eq!(frame.src, "venti.png");
        assert_eq!(frame.caption, "Venti");
        assert_eq!(frame.alt, "Gallery image");

        // Narrowing the filter while open does not change navigation.
        state.input_query("pyro");
        state.next_image();
        assert_eq!(state.modal_frame().unwrap().src, "hutao.png");
        state.previous_image();
        state.previous_image();
        let frame = state.modal_frame().unwrap();
        assert_eq!(frame.src, "xq.png");
        assert_eq!(frame.caption, "Gallery Image");
        assert_eq!((frame.position, frame.total), (1, 3));
    }

    #[test]
    fn hidden_cards_cannot_open_the_modal() {
        let mut state = ViewState::new(statics());
        let hidden = state.gallery().cards()[1].id();
        state.select_category("pyro");
        assert!(!state.click_image(hidden));
        assert!(state.modal_frame().is_none());
    }

    #[test]
    fn closing_paths_clear_the_frame() {
        let mut state = ViewState::new(statics());
        let first = state.gallery().cards()[0].id();

        state.click_image(first);
        state.click_modal(ModalTarget::Image);
        assert!(state.modal().is_open());
        state.click_modal(ModalTarget::Backdrop);
        assert!(state.modal_frame().is_none());
        assert!(!state.page_scroll_locked());

        state.click_image(first);
        state.press_key(Key::Escape);
        assert!(!state.modal().is_open());

        state.click_image(first);
        state.close_modal();
        assert!(state.modal().snapshot().is_empty());
    }

    #[test]
    fn loading_images_respects_active_filter() {
        let mut state = ViewState::new(statics());
        let mut rng = StdRng::seed_from_u64(11);
        state.select_category("pyro");

        state.load_images(
            &[record(1, "Klee", "Pyro"), record(2, "Ayaka", "Cryo")],
            &mut rng,
        );

        assert_eq!(
            visible_srcs(&state),
            vec!["images/uploads/1.png", "hutao.png"]
        );
        assert_eq!(state.gallery().len(), 5);
    }

    #[test]
    fn loading_images_does_not_count_as_interaction() {
        let mut state = ViewState::new(Vec::new());
        let mut rng = StdRng::seed_from_u64(2);
        state.load_images(&[], &mut rng);
        assert!(!state.empty_state_visible());
        assert!(!state.filter().has_interacted());
    }

    #[test]
    fn refresh_while_lightbox_is_open_keeps_the_frame() {
        let mut state = ViewState::new(statics());
        let mut rng = StdRng::seed_from_u64(4);
        let records = vec![record(1, "Klee", "Pyro")];
        state.load_images(&records, &mut rng);

        let klee = state.gallery().cards()[0].id();
        assert!(state.click_image(klee));

        state.load_images(&[record(1, "Klee", "Pyro"), record(2, "Ayaka", "Cryo")], &mut rng);

        assert!(state.modal().is_open());
        let frame = state.modal_frame().unwrap();
        assert_eq!(frame.src, "images/uploads/1.png");
        assert_eq!((frame.position, frame.total), (0, 4));

        state.next_image();
        assert_eq!(state.modal_frame().unwrap().src, "hutao.png");
    }

    #[test]
    fn refresh_that_drops_a_shown_card_closes_the_lightbox() {
        let mut state = ViewState::new(statics());
        let mut rng = StdRng::seed_from_u64(8);
        state.load_images(&[record(1, "Klee", "Pyro")], &mut rng);
        let klee = state.gallery().cards()[0].id();
        state.click_image(klee);

        state.load_images(&[], &mut rng);

        assert!(!state.modal().is_open());
        assert!(!state.page_scroll_locked());
    }

    #[test]
    fn upload_dialog_locks_scroll() {
        let mut state = ViewState::new(statics());
        state.upload_mut().open();
        assert!(state.page_scroll_locked());
        state.upload_mut().click_backdrop();
        assert!(!state.page_scroll_locked());
    }
}
