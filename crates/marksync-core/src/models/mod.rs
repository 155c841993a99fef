//! Data models for marksync

mod bookmark;
mod wire;

pub use bookmark::{
    BookmarkChanges, BookmarkFolder, BookmarkItem, BookmarkTree, BookmarkUrl, MoveDestination,
};
pub use wire::{WireNode, UNTITLED_FOLDER};
