//! Links found in a guide and their resolution state.

use crate::error::SourceLocation;
use crate::item::Command;
use serde::Serialize;
use std::path::PathBuf;

/// Resolution state of a link.
///
/// Links start as [`LinkState::Unchecked`]. Loading the pile moves links to
/// other documents to one of the intermediate states, and validating the pile
/// turns [`LinkState::ValidGuideUncheckedNode`] into [`LinkState::Valid`] or
/// [`LinkState::ValidGuideBrokenNode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LinkState {
    /// Not looked at yet.
    Unchecked,
    /// The target guide is loaded, the node is not checked yet.
    ValidGuideUncheckedNode,
    /// The target exists but is not a guide.
    ValidOtherFile,
    /// The target file does not exist or cannot be read.
    Broken,
    /// The link type cannot be followed, for example `system` or `beep`.
    Unsupported,
    /// Target guide and node exist.
    Valid,
    /// The target guide exists but has no such node.
    ValidGuideBrokenNode,
}

/// Where a followable link points to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    /// A node of the same document.
    SameFile {
        /// Node name in lower case.
        node: String,
    },
    /// A node in another file.
    OtherFile {
        /// Amiga path of the file relative to the linking document.
        amiga_path: String,
        /// Node name in lower case.
        node: String,
    },
}

impl LinkTarget {
    /// Split `target` at the last `/` into path and node.
    pub fn parse(target: &str) -> Self {
        match target.rsplit_once('/') {
            Some((amiga_path, node)) => LinkTarget::OtherFile {
                amiga_path: amiga_path.to_string(),
                node: node.to_lowercase(),
            },
            None => LinkTarget::SameFile {
                node: target.to_lowercase(),
            },
        }
    }

    /// Target node name.
    pub fn node(&self) -> &str {
        match self {
            LinkTarget::SameFile { node } | LinkTarget::OtherFile { node, .. } => node,
        }
    }
}

/// A link command of a guide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Index of the link command in the guide's items.
    pub item_index: usize,
    /// Label shown for the link.
    pub label: String,
    /// Link type in lower case, for example `link` or `system`.
    pub link_type: String,
    /// Target as written, empty for types without one.
    pub raw_target: String,
    /// Parsed target of followable links.
    pub target: Option<LinkTarget>,
    /// Resolution state.
    pub state: LinkState,
    /// Local file the link resolves to.
    pub resolved_file: Option<PathBuf>,
    /// Node the link resolves to.
    pub resolved_node: Option<String>,
    /// Location of the link command.
    pub location: SourceLocation,
}

impl Link {
    /// Link for a validated link command.
    pub fn from_command(command: &Command, item_index: usize, location: SourceLocation) -> Self {
        let link_type = command.option(0).unwrap_or_default().to_lowercase();
        let raw_target = command.option(1).unwrap_or_default().to_string();
        let followable = is_followable(&link_type) && !raw_target.is_empty();
        let target = followable.then(|| LinkTarget::parse(&raw_target));
        Self {
            item_index,
            label: command.label().unwrap_or_default().to_string(),
            state: if followable {
                LinkState::Unchecked
            } else {
                LinkState::Unsupported
            },
            resolved_node: None,
            resolved_file: None,
            link_type,
            raw_target,
            target,
            location,
        }
    }

    /// Whether a renderer can connect the link to its target.
    pub fn is_valid(&self) -> bool {
        matches!(self.state, LinkState::Valid | LinkState::ValidOtherFile)
    }
}

/// Whether links of `link_type` point to a file and node.
pub fn is_followable(link_type: &str) -> bool {
    matches!(link_type, "link" | "alink")
}
