//! A single Amigaguide document and the pipeline that builds it.
//!
//! [`Guide::create`] runs these steps in order, each one producing a new item
//! vector from the previous one:
//!
//! 1. read the items of the source
//! 2. define macros from `@macro` commands
//! 3. expand macro calls
//! 4. pair `@node` and `@endnode` and make node names unique
//! 5. validate commands against the tag registry
//!
//! Document metadata, node ranges and links are collected from the final
//! items, so their item indices stay valid for the lifetime of the guide.

mod info;
mod link;
mod macros;
mod nodes;
mod validate;

pub use info::{DatabaseInfo, Font, NodeInfo, Wrap};
pub use link::{Link, LinkState, LinkTarget, is_followable};

use crate::config::PileOptions;
use crate::error::{Diagnostics, GuideError};
use crate::item::{Item, write_pretty};
use crate::reader;
use crate::source::Source;
use crate::tags::TagPool;
use std::sync::Arc;

/// A parsed and validated Amigaguide document.
#[derive(Debug, Clone)]
pub struct Guide {
    source: Arc<Source>,
    items: Vec<Item>,
    tags: TagPool,
    database: DatabaseInfo,
    nodes: Vec<NodeInfo>,
    links: Vec<Link>,
}

impl Guide {
    /// Read and validate the document in `source`.
    ///
    /// Only failing to read `source` is an error. Everything wrong inside the
    /// document is repaired and reported to `diagnostics`.
    pub fn create(
        source: Arc<Source>,
        options: &PileOptions,
        diagnostics: &mut Diagnostics,
    ) -> Result<Self, GuideError> {
        log::debug!("reading {}", source.full_name());
        let items = reader::read(&source, diagnostics)?;

        let mut tags = TagPool::new();
        macros::define_macros(&items, &mut tags, diagnostics);
        let limits = macros::MacroLimits::from_options(options);
        let items = macros::resolve_macros(items, &tags, limits, diagnostics);
        let items = nodes::collect_nodes(&source, items, diagnostics);
        let items = validate::validate_commands(items, &tags, diagnostics);

        let (database, nodes) = info::collect_info(&source, &items);
        let links = items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| {
                let command = item.as_command().filter(|command| command.is_link())?;
                Some(Link::from_command(command, index, item.source_location()))
            })
            .collect();

        log::debug!(
            "{}: {} items, {} nodes",
            source.name(),
            items.len(),
            nodes.len()
        );
        Ok(Self {
            source,
            items,
            tags,
            database,
            nodes,
            links,
        })
    }

    /// Source the guide was read from.
    pub fn source(&self) -> &Arc<Source> {
        &self.source
    }

    /// Items after all repairs.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Tags known to this guide, including its macros.
    pub fn tag_pool(&self) -> &TagPool {
        &self.tags
    }

    /// Document metadata.
    pub fn database_info(&self) -> &DatabaseInfo {
        &self.database
    }

    /// Nodes in document order.
    pub fn nodes(&self) -> &[NodeInfo] {
        &self.nodes
    }

    /// Node called `name`, ignoring case.
    pub fn node(&self, name: &str) -> Option<&NodeInfo> {
        let name = name.to_lowercase();
        self.nodes.iter().find(|node| node.name == name)
    }

    /// Content items of `node`, without `@node` and `@endnode`.
    pub fn node_items(&self, node: &NodeInfo) -> &[Item] {
        self.items.get(node.content_range()).unwrap_or_default()
    }

    /// Links in document order.
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub(crate) fn links_mut(&mut self) -> &mut [Link] {
        &mut self.links
    }

    /// Link whose command is the item at `item_index`.
    pub fn link_at(&self, item_index: usize) -> Option<&Link> {
        self.links
            .binary_search_by_key(&item_index, |link| link.item_index)
            .ok()
            .map(|index| &self.links[index])
    }

    /// Amigaguide source of the repaired document.
    pub fn to_pretty_source(&self) -> String {
        write_pretty(&self.items)
    }
}
