use amigaguide_core::{GuidePile, LinkState, PileOptions, Severity};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(dir: &Path, name: &str, text: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create dir");
    }
    fs::write(path, text).expect("write guide");
}

fn link_states(pile: &GuidePile, guide: usize) -> Vec<LinkState> {
    pile.guides()[guide]
        .links()
        .iter()
        .map(|link| link.state)
        .collect()
}

#[test]
fn cyclic_links_load_each_guide_once() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "root.guide",
        "@database root\n@node main\nGo to @{\"B\" link b.guide/main}.\n@endnode\n",
    );
    write(
        dir.path(),
        "b.guide",
        "@database b\n@node main\nBack to @{\"root\" link root.guide/MAIN}.\n@endnode\n",
    );

    let pile = GuidePile::load(dir.path().join("root.guide"), PileOptions::default()).unwrap();

    assert_eq!(pile.guides().len(), 2);
    assert_eq!(link_states(&pile, 0), vec![LinkState::Valid]);
    assert_eq!(link_states(&pile, 1), vec![LinkState::Valid]);
    assert!(pile.diagnostics().is_empty(), "{:?}", pile.diagnostics());
    assert_eq!(pile.root().unwrap().database_info().name, "root");
    assert!(pile.guide(dir.path().join("b.guide")).is_some());
}

#[test]
fn missing_file_breaks_link_only() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "root.guide",
        "@database root\n@node main\n@{\"intro\" link \"nonexistent.guide/nohere\"}\n@endnode\n@node other\n@endnode\n",
    );

    let pile = GuidePile::load(dir.path().join("root.guide"), PileOptions::default()).unwrap();

    assert_eq!(pile.guides().len(), 1);
    assert_eq!(link_states(&pile, 0), vec![LinkState::Broken]);
    let root = pile.root().unwrap();
    assert_eq!(root.nodes().len(), 2);
    assert_eq!(pile.diagnostics().count(Severity::Error), 1);
    assert!(pile
        .diagnostics()
        .contains_message("ignored link to file that does not exist"));
}

#[test]
fn missing_node_is_reported_after_loading() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "root.guide",
        "@database root\n@node main\n@{\"a\" link other} @{\"b\" link sub/b.guide/gone}\n@endnode\n",
    );
    write(dir.path(), "sub/b.guide", "@database b\n@node main\n@endnode\n");

    let pile = GuidePile::load(dir.path().join("root.guide"), PileOptions::default()).unwrap();

    assert_eq!(
        link_states(&pile, 0),
        vec![LinkState::ValidGuideBrokenNode, LinkState::ValidGuideBrokenNode]
    );
    assert!(pile.diagnostics().contains_message("cannot find node \"other\""));
    assert!(pile.diagnostics().contains_message("cannot find node \"gone\""));
}

#[test]
fn non_guide_files_are_other_files() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "root.guide",
        "@database root\n@node main\n@{\"readme\" link ReadMe.txt/main} @{\"beep\" beep}\n@endnode\n",
    );
    write(dir.path(), "readme.txt", "Just some text.\n");

    let pile = GuidePile::load(dir.path().join("root.guide"), PileOptions::default()).unwrap();

    assert_eq!(pile.guides().len(), 1);
    assert_eq!(
        link_states(&pile, 0),
        vec![LinkState::ValidOtherFile, LinkState::Unsupported]
    );
    let link = &pile.root().unwrap().links()[0];
    assert!(link.is_valid());
    assert!(link.resolved_file.as_ref().unwrap().ends_with("readme.txt"));
}

#[test]
fn volumes_resolve_through_aliases() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "root.guide",
        "@database root\n@node main\n@{\"help\" link Help:manual.guide/main} @{\"x\" link Nowhere:x.guide/main}\n@endnode\n",
    );
    write(dir.path(), "help/manual.guide", "@database manual\n@node main\n@endnode\n");

    let options = PileOptions::default().with_alias("HELP", dir.path().join("help"));
    let pile = GuidePile::load(dir.path().join("root.guide"), options).unwrap();

    assert_eq!(pile.guides().len(), 2);
    assert_eq!(link_states(&pile, 0), vec![LinkState::Valid, LinkState::Broken]);
    assert!(pile
        .diagnostics()
        .contains_message("cannot resolve Amiga volume \"Nowhere:\""));
}

#[test]
fn missing_root_is_an_error() {
    let dir = TempDir::new().unwrap();
    let error = GuidePile::load(dir.path().join("nothing.guide"), PileOptions::default()).unwrap_err();
    assert!(error.is_not_found());
}

#[test]
fn repaired_guides_stay_balanced_and_unique() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "root.guide",
        "@database root\n@node main\n@title a\n@title b\n@node main\n@endnode\n@endnode\n@node\n",
    );

    let pile = GuidePile::load(dir.path().join("root.guide"), PileOptions::default()).unwrap();
    let root = pile.root().unwrap();
    let count = |name: &str| {
        root.items()
            .iter()
            .filter(|item| item.is_line_command(name))
            .count()
    };

    assert_eq!(count("node"), count("endnode"));
    assert_eq!(count("node"), 3);
    assert_eq!(count("title"), 1);
    let names: Vec<&str> = root.nodes().iter().map(|node| node.name.as_str()).collect();
    assert_eq!(names, vec!["main", "unnamed.1", "unnamed.2"]);
}

#[test]
fn unreadable_target_breaks_link_with_io_detail() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "root.guide",
        "@database root\n@node main\n@{\"folder\" link folder.guide/main}\n@endnode\n",
    );
    fs::create_dir(dir.path().join("folder.guide")).unwrap();

    let pile = GuidePile::load(dir.path().join("root.guide"), PileOptions::default()).unwrap();

    assert_eq!(pile.guides().len(), 1);
    assert_eq!(link_states(&pile, 0), vec![LinkState::Broken]);
    let diagnostic = pile
        .diagnostics()
        .iter()
        .find(|diagnostic| diagnostic.message.contains("cannot read linked file"))
        .unwrap();
    assert_eq!(diagnostic.severity, Severity::Error);
    assert!(diagnostic.message.contains("folder.guide/main"));
    let see_also = diagnostic.see_also.as_ref().unwrap();
    assert!(see_also.message.starts_with("related input/output error: "));
    assert!(!pile.diagnostics().contains_message("does not exist"));
}
