use amigaguide_core::{GuidePile, PileOptions};
use amigaguide_render::{EmbedContent, LinkDestination, RenderEvent, node_events, reduce_pile};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(dir: &Path, name: &str, bytes: &[u8]) {
    fs::write(dir.join(name), bytes).expect("write file");
}

fn load(dir: &TempDir) -> GuidePile {
    GuidePile::load(dir.path().join("root.guide"), PileOptions::default()).expect("load pile")
}

#[test]
fn links_point_to_resolved_nodes_and_files() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "root.guide",
        b"@database root\n@node main\nSee @{\"Other\" link other.guide/Intro} or @{\"notes\" link notes.txt/main}.\n@endnode\n",
    );
    write(dir.path(), "other.guide", b"@database other\n@node intro\n@endnode\n");
    write(dir.path(), "notes.txt", b"plain notes\n");

    let pile = load(&dir);
    let root = pile.root().unwrap();
    let events = node_events(root, &root.nodes()[0], pile.paths());

    assert_eq!(events.len(), 6);
    assert_eq!(events[0], RenderEvent::text("See "));
    match &events[1] {
        RenderEvent::Link {
            destination: LinkDestination::Node { file, node },
            label,
        } => {
            assert!(file.ends_with("other.guide"));
            assert_eq!(node, "intro");
            assert_eq!(label, "Other");
        }
        other => panic!("unexpected event {:?}", other),
    }
    assert_eq!(events[2], RenderEvent::text(" or "));
    assert!(matches!(
        &events[3],
        RenderEvent::Link { destination: LinkDestination::ExternalFile { path }, label }
            if path.ends_with("notes.txt") && label == "notes"
    ));
    assert_eq!(events[4], RenderEvent::text("."));
    assert!(events[5].is_flush());
}

#[test]
fn broken_links_keep_their_label() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "root.guide",
        b"@database root\n@node main\nGo @{\"nowhere\" link missing.guide/main} now\n@endnode\n",
    );

    let pile = load(&dir);
    let root = pile.root().unwrap();
    let events = node_events(root, &root.nodes()[0], pile.paths());

    assert_eq!(
        events,
        vec![RenderEvent::text("Go nowhere now"), RenderEvent::FlushParagraph]
    );
}

#[test]
fn embed_reads_latin1_files() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "root.guide",
        b"@database root\n@node main\nIntro\n@embed Greeting.TXT\n@endnode\n",
    );
    write(dir.path(), "greeting.txt", b"Gr\xfc\xdfe\n");

    let pile = load(&dir);
    let root = pile.root().unwrap();
    let events = node_events(root, &root.nodes()[0], pile.paths());

    assert_eq!(events.len(), 3);
    assert_eq!(events[0], RenderEvent::text("Intro"));
    assert!(events[1].is_flush());
    match &events[2] {
        RenderEvent::Embed {
            content: EmbedContent::Contents { path, text },
        } => {
            assert!(path.ends_with("greeting.txt"));
            assert_eq!(text, "Grüße\n");
        }
        other => panic!("unexpected event {:?}", other),
    }
}

#[test]
fn pile_reduction_covers_all_guides() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "root.guide",
        b"@database root\n@smartwrap\n@node main \"Start\"\nfirst\n\nsecond @{\"b\" link b.guide/main}\n@endnode\n@node extra\n@endnode\n",
    );
    write(
        dir.path(),
        "b.guide",
        b"@database b\n@node main\n@{amigaguide}\n@endnode\n",
    );

    let pile = load(&dir);
    let renderings = reduce_pile(&pile);

    let names: Vec<(&str, &str)> = renderings
        .iter()
        .map(|rendering| (rendering.node.as_str(), rendering.title.as_str()))
        .collect();
    assert_eq!(names, vec![("main", "Start"), ("extra", "extra"), ("main", "main")]);

    let start = &renderings[0].events;
    assert_eq!(start[0], RenderEvent::text("first"));
    assert!(start[1].is_flush());
    assert_eq!(start[2], RenderEvent::text("second "));
    assert!(matches!(start[3], RenderEvent::Link { .. }));
    assert!(start[4].is_flush());
    assert_eq!(start.len(), 5);

    assert!(renderings[1].events.is_empty());
    assert_eq!(
        renderings[2].events,
        vec![RenderEvent::AmigaguideBadge, RenderEvent::FlushParagraph]
    );
}
