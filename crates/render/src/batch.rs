//! Parallel reduction of every node in a pile.

use crate::context::node_events;
use crate::events::RenderEvent;
use amigaguide_core::{AmigaPaths, Guide, GuidePile, NodeInfo};
use rayon::prelude::*;
use serde::Serialize;

/// Events of one node together with where they came from.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NodeRendering {
    /// Full name of the guide's source.
    pub guide: String,
    /// Lowercase node name.
    pub node: String,
    /// Node title.
    pub title: String,
    /// Reduced content.
    pub events: Vec<RenderEvent>,
}

/// Options for batch reduction.
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Maximum number of threads to use. Defaults to number of CPU cores.
    pub max_threads: Option<usize>,
}

/// Reduces every node of every guide in `pile`.
///
/// Results are in load order of the guides and document order of the nodes.
pub fn reduce_pile(pile: &GuidePile) -> Vec<NodeRendering> {
    reduce_pile_with(pile, &BatchOptions::default())
}

/// Same as [`reduce_pile`] with explicit options.
pub fn reduce_pile_with(pile: &GuidePile, options: &BatchOptions) -> Vec<NodeRendering> {
    reduce_guides(pile.guides(), pile.paths(), options)
}

/// Reduces every node of `guides`.
pub fn reduce_guides(
    guides: &[Guide],
    paths: &AmigaPaths,
    options: &BatchOptions,
) -> Vec<NodeRendering> {
    let jobs: Vec<(&Guide, &NodeInfo)> = guides
        .iter()
        .flat_map(|guide| guide.nodes().iter().map(move |node| (guide, node)))
        .collect();
    log::debug!("reducing {} nodes of {} guides", jobs.len(), guides.len());

    // Configure thread pool if max_threads is specified
    let pool = options.max_threads.and_then(|max_threads| {
        rayon::ThreadPoolBuilder::new()
            .num_threads(max_threads)
            .build()
            .ok()
    });

    let reduce = |(guide, node): (&Guide, &NodeInfo)| NodeRendering {
        guide: guide.source().full_name(),
        node: node.name.clone(),
        title: node.title.clone(),
        events: node_events(guide, node, paths),
    };

    match pool {
        Some(pool) => pool.install(|| jobs.into_par_iter().map(reduce).collect()),
        None => jobs.into_par_iter().map(reduce).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use amigaguide_core::{Diagnostics, PileOptions, Source};

    #[test]
    fn keeps_document_order() {
        let options = PileOptions::default();
        let mut diagnostics = Diagnostics::new();
        let text: String = (0..20)
            .map(|n| format!("@node n{n} \"Node {n}\"\ntext {n}\n@endnode\n"))
            .collect();
        let guide = Guide::create(Source::memory("many.guide", text), &options, &mut diagnostics)
            .unwrap();
        let paths = AmigaPaths::new(&options);

        let renderings = reduce_guides(
            std::slice::from_ref(&guide),
            &paths,
            &BatchOptions {
                max_threads: Some(2),
            },
        );

        assert_eq!(renderings.len(), 20);
        for (n, rendering) in renderings.iter().enumerate() {
            assert_eq!(rendering.guide, "many.guide");
            assert_eq!(rendering.node, format!("n{n}"));
            assert_eq!(rendering.title, format!("Node {n}"));
            assert_eq!(rendering.events[0], RenderEvent::text(format!("text {n}")));
        }
    }
}
