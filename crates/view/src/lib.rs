//! Gallery page view model.
//!
//! Cards, filtering, autocomplete, the lightbox and the upload dialog are plain
//! state driven through [`ViewState`], so the page logic runs (and is tested)
//! without a browser. [`client`] connects it to the backend API.

pub mod card;
pub mod client;
pub mod filter;
pub mod modal;
pub mod render;
pub mod state;
pub mod suggest;
pub mod upload;

pub use card::{Card, CardId, CardOrigin, StaticCard};
pub use client::{load_character_names, refresh_gallery, submit_upload, GalleryClient};
pub use filter::{FilterOutcome, FilterState, ALL_CATEGORY};
pub use modal::{Key, Modal, ModalFrame, ModalTarget};
pub use render::{Gallery, SizeClass};
pub use state::ViewState;
pub use suggest::{Suggestions, MAX_SUGGESTIONS};
pub use upload::{SelectedFile, UploadDialog, UploadForm, UploadRequest, UploadStatus, AUTO_CLOSE_DELAY};
