//! Wrap-aware reduction of a node's items into render events.

use crate::events::{EmbedContent, LinkDestination, RenderEvent};
use amigaguide_core::{
    AmigaPaths, Command, Guide, ItemKind, LinkState, NodeInfo, Source, Wrap, find_case_insensitive,
};

/// Receives the events of a node in document order.
pub trait RenderSink {
    /// Handles one event.
    fn emit(&mut self, event: RenderEvent);
}

impl RenderSink for Vec<RenderEvent> {
    fn emit(&mut self, event: RenderEvent) {
        self.push(event);
    }
}

/// Reducer state for one node.
///
/// Text accumulates until a newline, link, embed or the end of the node
/// decides what to do with it. The wrap mode decides whether newlines stay in
/// the text or end paragraphs.
pub struct Context<'a, S: RenderSink> {
    guide: &'a Guide,
    paths: &'a AmigaPaths,
    sink: &'a mut S,
    wrap: Wrap,
    /// Text not emitted yet.
    text: String,
    last_was_new_line: bool,
    /// Whether anything was emitted since the last paragraph flush.
    has_content: bool,
}

impl<'a, S: RenderSink> Context<'a, S> {
    /// Creates a context that renders `node` of `guide` into `sink`.
    pub fn new(guide: &'a Guide, node: &NodeInfo, paths: &'a AmigaPaths, sink: &'a mut S) -> Self {
        Self {
            guide,
            paths,
            sink,
            wrap: node.effective_wrap(guide.database_info()),
            text: String::new(),
            last_was_new_line: false,
            has_content: false,
        }
    }

    /// Current wrap mode.
    pub fn wrap(&self) -> Wrap {
        self.wrap
    }

    /// Appends text to the pending buffer.
    pub fn push_text(&mut self, text: &str) {
        self.text.push_str(text);
        self.last_was_new_line = false;
    }

    /// Handles the end of a source line.
    pub fn new_line(&mut self) {
        match self.wrap {
            Wrap::None => self.text.push('\n'),
            Wrap::Smart => {
                if self.last_was_new_line {
                    self.flush_text(true);
                    self.flush_paragraph();
                    self.last_was_new_line = false;
                } else {
                    self.text.push('\n');
                    self.last_was_new_line = true;
                }
            }
            Wrap::Word => {
                self.flush_text(true);
                self.flush_paragraph();
            }
        }
    }

    /// Emits the pending text, dropping one trailing newline if `strip` is set.
    pub fn flush_text(&mut self, strip: bool) {
        let mut text = std::mem::take(&mut self.text);
        if strip && text.ends_with('\n') {
            text.pop();
        }
        if !text.is_empty() {
            self.emit(RenderEvent::Text { text });
        }
    }

    /// Ends the current paragraph unless it is empty.
    pub fn flush_paragraph(&mut self) {
        if self.has_content {
            self.sink.emit(RenderEvent::FlushParagraph);
            self.has_content = false;
        }
    }

    fn emit(&mut self, event: RenderEvent) {
        self.sink.emit(event);
        self.has_content = true;
    }

    /// Handles the command at `item_index` of the guide.
    pub fn command(&mut self, item_index: usize, command: &Command) {
        if command.is_link() {
            self.link(item_index, command);
            return;
        }
        match command.name() {
            "amigaguide" => {
                self.flush_text(false);
                self.emit(RenderEvent::AmigaguideBadge);
            }
            "embed" => self.embed(command),
            _ => {}
        }
    }

    fn link(&mut self, item_index: usize, command: &Command) {
        let label = command.label().unwrap_or_default();
        let destination = self
            .guide
            .link_at(item_index)
            .and_then(|link| match link.state {
                LinkState::Valid => Some(LinkDestination::Node {
                    file: link.resolved_file.clone()?,
                    node: link.resolved_node.clone()?,
                }),
                LinkState::ValidOtherFile => Some(LinkDestination::ExternalFile {
                    path: link.resolved_file.clone()?,
                }),
                LinkState::Unsupported => {
                    log::debug!("kept label of unsupported link: {}", command.to_source());
                    None
                }
                state => {
                    log::warn!("skipped link with state {:?}: {}", state, command.to_source());
                    None
                }
            });

        match destination {
            Some(destination) => {
                self.flush_text(false);
                self.emit(RenderEvent::Link {
                    destination,
                    label: label.to_string(),
                });
            }
            None => self.push_text(label),
        }
    }

    fn embed(&mut self, command: &Command) {
        self.flush_text(true);
        self.flush_paragraph();

        let Some(amiga_path) = command.option(0) else {
            log::warn!("skipped @embed without file");
            return;
        };
        let directory = self.guide.source().directory();
        let resolved = self.paths.resolve(amiga_path, &directory);
        if let Some(volume) = &resolved.unresolved_volume {
            log::warn!("cannot resolve Amiga volume \"{}:\" for @embed", volume);
        }
        let path = find_case_insensitive(&resolved.path);
        log::debug!("embed {}", path.display());

        let content = match Source::file(&path).read_text() {
            Ok(text) => EmbedContent::Contents { path, text },
            Err(error) => {
                log::warn!("@embed for {} failed: {}", path.display(), error);
                EmbedContent::Failed {
                    path,
                    message: error.to_string(),
                }
            }
        };
        // Embedded text stands on its own, not inside a paragraph.
        self.sink.emit(RenderEvent::Embed { content });
    }

    /// Emits what is left and closes the last paragraph.
    pub fn finish(mut self) {
        self.flush_text(true);
        self.flush_paragraph();
    }
}

/// Reduces `node` of `guide` into `sink`.
pub fn reduce_node<S: RenderSink>(guide: &Guide, node: &NodeInfo, paths: &AmigaPaths, sink: &mut S) {
    let range = node.content_range();
    let first = range.start;
    let mut context = Context::new(guide, node, paths, sink);

    for (offset, item) in guide.node_items(node).iter().enumerate() {
        match &item.kind {
            ItemKind::Text(value) | ItemKind::Space(value) | ItemKind::StringLiteral(value) => {
                context.push_text(value)
            }
            ItemKind::NewLine => context.new_line(),
            ItemKind::Command(command) => context.command(first + offset, command),
        }
    }
    context.finish();
}

/// Events of `node` in `guide`.
pub fn node_events(guide: &Guide, node: &NodeInfo, paths: &AmigaPaths) -> Vec<RenderEvent> {
    let mut events = Vec::new();
    reduce_node(guide, node, paths, &mut events);
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use amigaguide_core::{Diagnostics, PileOptions};

    fn events(text: &str) -> Vec<RenderEvent> {
        let options = PileOptions::default();
        let mut diagnostics = Diagnostics::new();
        let guide = Guide::create(Source::memory("test.guide", text), &options, &mut diagnostics)
            .unwrap();
        let paths = AmigaPaths::new(&options);
        node_events(&guide, &guide.nodes()[0], &paths)
    }

    #[test]
    fn no_wrap_keeps_newlines_in_one_paragraph() {
        let events = events("@node a\nfirst line\nsecond line\n\nthird\n@endnode\n");
        insta::assert_debug_snapshot!(events, @r#"
        [
            Text {
                text: "first line\nsecond line\n\nthird",
            },
            FlushParagraph,
        ]
        "#);
    }

    #[test]
    fn smart_wrap_breaks_paragraphs_at_blank_lines() {
        let events = events("@smartwrap\n@node a\none\ntwo\n\nthree\n@endnode\n");
        insta::assert_debug_snapshot!(events, @r#"
        [
            Text {
                text: "one\ntwo",
            },
            FlushParagraph,
            Text {
                text: "three",
            },
            FlushParagraph,
        ]
        "#);
    }

    #[test]
    fn word_wrap_breaks_every_line() {
        let events = events("@node a\n@wordwrap\none\n\ntwo\n@endnode\n");
        assert_eq!(
            events,
            vec![
                RenderEvent::text("one"),
                RenderEvent::FlushParagraph,
                RenderEvent::text("two"),
                RenderEvent::FlushParagraph,
            ]
        );
    }

    #[test]
    fn empty_paragraphs_are_not_flushed() {
        assert!(events("@node a\n@wordwrap\n\n\n@endnode\n").is_empty());
        assert!(events("@node a\n@endnode\n").is_empty());
    }

    #[test]
    fn unresolved_links_render_their_label() {
        let events = events("@node a\nsee @{\"other\" link b} here\n@endnode\n@node b\n@endnode\n");
        assert_eq!(
            events,
            vec![RenderEvent::text("see other here"), RenderEvent::FlushParagraph]
        );
    }

    #[test]
    fn unsupported_links_render_their_label() {
        let events = events("@node a\n@{\"Beep\" beep} and @{\"Run\" system ls}\n@endnode\n");
        assert_eq!(
            events,
            vec![RenderEvent::text("Beep and Run"), RenderEvent::FlushParagraph]
        );
    }

    #[test]
    fn badge_keeps_pending_text() {
        let events = events("@node a\nmade with @{amigaguide}\n@endnode\n");
        insta::assert_debug_snapshot!(events, @r#"
        [
            Text {
                text: "made with ",
            },
            AmigaguideBadge,
            FlushParagraph,
        ]
        "#);
    }

    #[test]
    fn styles_are_ignored() {
        let events = events("@node a\n@{b}bold@{ub} and @{i}italic@{ui}\n@endnode\n");
        assert_eq!(
            events,
            vec![
                RenderEvent::text("bold and italic"),
                RenderEvent::FlushParagraph
            ]
        );
    }

    #[test]
    fn missing_embed_becomes_failure_notice() {
        let events = events("@node a\nbefore\n@embed no-such-file.txt\nafter\n@endnode\n");
        assert_eq!(events.len(), 5);
        assert_eq!(events[0], RenderEvent::text("before"));
        assert!(events[1].is_flush());
        assert!(matches!(
            &events[2],
            RenderEvent::Embed {
                content: EmbedContent::Failed { path, .. }
            } if path.ends_with("no-such-file.txt")
        ));
        assert_eq!(events[3], RenderEvent::text("after"));
        assert!(events[4].is_flush());
    }
}
