//! Events emitted while reducing a node.

use serde::Serialize;
use std::path::PathBuf;

/// Where a rendered link points to.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LinkDestination {
    /// A node in a loaded guide.
    Node {
        /// Canonical path of the guide.
        file: PathBuf,
        /// Lowercase node name.
        node: String,
    },
    /// A file that is not an Amigaguide document.
    ExternalFile {
        /// Path of the file.
        path: PathBuf,
    },
}

/// Result of reading the file named by `@embed`.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EmbedContent {
    /// Text of the embedded file.
    Contents {
        /// Path the text was read from.
        path: PathBuf,
        /// Decoded file text.
        text: String,
    },
    /// The file could not be read. Renderers show a caution instead.
    Failed {
        /// Path that was attempted.
        path: PathBuf,
        /// Human readable reason.
        message: String,
    },
}

/// A single step of a node's content, in document order.
///
/// Renderers append [`RenderEvent::Text`], [`RenderEvent::Link`] and
/// [`RenderEvent::AmigaguideBadge`] to the current paragraph and start a new
/// one on [`RenderEvent::FlushParagraph`]. [`RenderEvent::Embed`] always
/// stands between paragraphs.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RenderEvent {
    /// Literal text, possibly containing newlines.
    Text {
        /// The text.
        text: String,
    },
    /// End of the current paragraph.
    FlushParagraph,
    /// A followable link.
    Link {
        /// Link target.
        destination: LinkDestination,
        /// Visible label.
        label: String,
    },
    /// Contents of an `@embed` file.
    Embed {
        /// File text or failure notice.
        content: EmbedContent,
    },
    /// The `@{amigaguide}` marker.
    AmigaguideBadge,
}

impl RenderEvent {
    /// Creates a text event.
    pub fn text(text: impl Into<String>) -> Self {
        RenderEvent::Text { text: text.into() }
    }

    /// Returns true if this event ends a paragraph.
    pub fn is_flush(&self) -> bool {
        matches!(self, RenderEvent::FlushParagraph)
    }
}
