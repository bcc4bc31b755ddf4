#![deny(missing_docs)]
//! Reduction of Amigaguide nodes into a format neutral stream of render
//! events. Concrete renderers map the events to their own markup.

/// Parallel reduction over a whole pile.
pub mod batch;
/// The wrap-aware reducer.
pub mod context;
/// Render events.
pub mod events;

pub use batch::{BatchOptions, NodeRendering, reduce_guides, reduce_pile, reduce_pile_with};
pub use context::{Context, RenderSink, node_events, reduce_node};
pub use events::{EmbedContent, LinkDestination, RenderEvent};
