//! marksync-core - Core library for marksync
//!
//! Bookmark tree model, selection rules, the native store facade and the
//! outbound sync pipeline shared by every marksync front end.

pub mod config;
pub mod dnd;
pub mod error;
pub mod models;
pub mod selection;
pub mod settings;
pub mod state;
pub mod store;
pub mod sync;
pub mod tree;
pub mod util;

pub use error::{Error, Result};
pub use models::{BookmarkFolder, BookmarkItem, BookmarkTree, BookmarkUrl, WireNode};
pub use selection::Selection;
pub use state::{Action, PopupController, PopupState};
