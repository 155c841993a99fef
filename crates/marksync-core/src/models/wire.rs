//! Outbound wire format shared with the notebook backend

use serde::{Deserialize, Serialize};

/// Title sent for folders whose name is empty.
pub const UNTITLED_FOLDER: &str = "No Title";

/// Unified folder/URL node used only for outbound payloads.
///
/// Ids are sent as strings, exactly as the native store issued them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireNode {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub children: Vec<WireNode>,
}

impl WireNode {
    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        self.url.is_some()
    }

    /// Number of nodes in this subtree, including `self`.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Self::node_count).sum::<usize>()
    }
}
