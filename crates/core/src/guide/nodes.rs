//! Pairing of `@node` and `@endnode`.

use crate::error::{Diagnostics, Severity, SourceLocation};
use crate::item::{Command, Item, ItemKind, ItemLocation};
use crate::source::Source;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

struct NodeNames {
    taken: HashSet<String>,
    seen: HashMap<String, SourceLocation>,
    counter: usize,
}

impl NodeNames {
    fn new(items: &[Item]) -> Self {
        let taken = items
            .iter()
            .filter(|item| item.is_line_command("node"))
            .filter_map(|item| item.as_command()?.option(0).map(str::to_lowercase))
            .collect();
        Self {
            taken,
            seen: HashMap::new(),
            counter: 0,
        }
    }

    fn unique(&mut self) -> String {
        loop {
            self.counter += 1;
            let name = format!("unnamed.{}", self.counter);
            if self.taken.insert(name.clone()) {
                return name;
            }
        }
    }
}

/// Make every `@node` have a unique name and a matching `@endnode`.
pub(crate) fn collect_nodes(
    source: &Arc<Source>,
    items: Vec<Item>,
    diagnostics: &mut Diagnostics,
) -> Vec<Item> {
    let mut names = NodeNames::new(&items);
    let mut result = Vec::with_capacity(items.len() + 1);
    let mut open_node: Option<SourceLocation> = None;

    for mut item in items {
        if item.is_line_command("node") {
            let location = item.location.clone();
            let node_location = item.source_location();
            if let Some(previous) = open_node.take() {
                result.push(Item::command(Command::line("endnode"), location.clone()));
                diagnostics.record_with_see_also(
                    node_location.clone(),
                    Severity::Warning,
                    "added missing @endnode before @node",
                    previous,
                    "previous @node",
                );
            }
            if let ItemKind::Command(command) = &mut item.kind {
                name_node(command, &location, &mut names, diagnostics);
            }
            open_node = Some(node_location);
        } else if item.is_line_command("endnode") && open_node.take().is_none() {
            diagnostics.record(item.source_location(), Severity::Warning, "removed dangling @endnode");
            continue;
        }
        result.push(item);
    }

    if let Some(previous) = open_node {
        let location = match result.last() {
            Some(last) => last.location.clone(),
            None => ItemLocation::new(Arc::clone(source), 1, 1),
        };
        diagnostics.record_with_see_also(
            location.to_source_location(),
            Severity::Warning,
            "added missing @endnode at end of file",
            previous,
            "previous @node",
        );
        result.push(Item::command(Command::line("endnode"), location));
    }
    result
}

fn name_node(
    command: &mut Command,
    location: &ItemLocation,
    names: &mut NodeNames,
    diagnostics: &mut Diagnostics,
) {
    let here = location.to_source_location();
    match command.option(0).map(str::to_lowercase) {
        Some(name) => {
            if let Some(existing) = names.seen.get(&name).cloned() {
                let unique = names.unique();
                command.set_option(0, &unique, location);
                diagnostics.record_with_see_also(
                    here.clone(),
                    Severity::Warning,
                    format!("changed duplicate node name \"{}\" to \"{}\"", name, unique),
                    existing,
                    "existing node with same name",
                );
                names.seen.insert(unique, here);
            } else {
                names.seen.insert(name, here);
            }
        }
        None => {
            let unique = names.unique();
            command.set_option(0, &unique, location);
            diagnostics.record(
                here.clone(),
                Severity::Warning,
                format!("assigned name \"{}\" to unnamed node", unique),
            );
            names.seen.insert(unique, here);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::write_pretty;
    use crate::reader;

    fn collect(text: &str) -> (String, Diagnostics) {
        let source = Source::memory("test", text);
        let mut diagnostics = Diagnostics::new();
        let items = reader::read(&source, &mut diagnostics).unwrap();
        let items = collect_nodes(&source, items, &mut diagnostics);
        (write_pretty(&items), diagnostics)
    }

    #[test]
    fn balanced_nodes_are_untouched() {
        let text = "@node a\nx\n@endnode\n@node b\n@endnode\n";
        let (pretty, diagnostics) = collect(text);
        assert_eq!(pretty, text);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn adds_missing_endnodes() {
        let (pretty, diagnostics) = collect("@node a\nx\n@node b\ny\n");
        assert_eq!(pretty, "@node a\nx\n@endnode\n@node b\ny\n@endnode\n");
        assert!(diagnostics.contains_message("added missing @endnode before @node"));
        assert!(diagnostics.contains_message("added missing @endnode at end of file"));
        let before = diagnostics.iter().next().unwrap();
        assert_eq!(before.see_also.as_ref().unwrap().location.line, 1);
    }

    #[test]
    fn removes_dangling_endnode() {
        let (pretty, diagnostics) = collect("@endnode\n@node a\n@endnode\n@endnode\n");
        assert_eq!(pretty, "@node a\n@endnode\n");
        assert_eq!(diagnostics.len(), 2);
    }

    #[test]
    fn renames_duplicate_nodes() {
        let (pretty, diagnostics) = collect("@node main\n@endnode\n@node Main\n@endnode\n");
        assert_eq!(pretty, "@node main\n@endnode\n@node unnamed.1\n@endnode\n");
        let renamed = diagnostics.iter().next().unwrap();
        assert_eq!(renamed.message, "changed duplicate node name \"main\" to \"unnamed.1\"");
        let see_also = renamed.see_also.as_ref().unwrap();
        assert_eq!(see_also.message, "existing node with same name");
        assert_eq!(see_also.location.line, 1);
    }

    #[test]
    fn unnamed_nodes_avoid_existing_names() {
        let (pretty, diagnostics) = collect("@node\n@endnode\n@node unnamed.1\n@endnode\n");
        assert_eq!(pretty, "@node unnamed.2\n@endnode\n@node unnamed.1\n@endnode\n");
        assert!(diagnostics.contains_message("assigned name \"unnamed.2\" to unnamed node"));
    }
}
