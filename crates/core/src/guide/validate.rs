//! Checking commands against the tag registry.

use crate::error::{Diagnostics, Severity, SourceLocation};
use crate::item::{Command, Item, ItemLocation};
use crate::tags::{Scope, TagPool, TagSpec};
use std::collections::HashMap;

enum Verdict {
    Keep,
    Remove,
    Replace(Item),
}

#[derive(Default)]
struct UniqueTags {
    global: HashMap<String, SourceLocation>,
    node: HashMap<String, SourceLocation>,
}

/// Validate all commands, removing or repairing the broken ones.
pub(crate) fn validate_commands(
    items: Vec<Item>,
    tags: &TagPool,
    diagnostics: &mut Diagnostics,
) -> Vec<Item> {
    let mut result = Vec::with_capacity(items.len());
    let mut unique = UniqueTags::default();
    let mut inside_node = false;

    for mut item in items {
        if item.as_command().is_none() {
            result.push(item);
            continue;
        }
        let location = item.source_location();
        let item_location = item.location.clone();
        let Some(command) = item.as_command_mut() else {
            continue;
        };

        if !command.is_inline() {
            match command.name() {
                "node" => inside_node = true,
                "endnode" => {
                    inside_node = false;
                    unique.node.clear();
                }
                _ => {}
            }
        }

        let verdict = if command.is_link() {
            validate_link(command, tags, item_location, diagnostics)
        } else {
            let scope = if command.is_inline() {
                Scope::Inline
            } else if inside_node {
                Scope::Node
            } else {
                Scope::Global
            };
            validate_command(command, scope, tags, &mut unique, &location, diagnostics)
        };

        match verdict {
            Verdict::Keep => result.push(item),
            Verdict::Remove => {}
            Verdict::Replace(replacement) => result.push(replacement),
        }
    }
    result
}

fn validate_command(
    command: &mut Command,
    scope: Scope,
    tags: &TagPool,
    unique: &mut UniqueTags,
    location: &SourceLocation,
    diagnostics: &mut Diagnostics,
) -> Verdict {
    let Some(tag) = tags.get_tag(command.name(), scope) else {
        diagnostics.record(
            location.clone(),
            Severity::Error,
            format!("removed unknown command {}", command.to_short_source()),
        );
        return Verdict::Remove;
    };

    if tag.unique {
        let (seen, within) = match tag.scope {
            Scope::Node => (&mut unique.node, "node"),
            _ => (&mut unique.global, "document"),
        };
        if let Some(previous) = seen.get(&tag.name) {
            diagnostics.record_with_see_also(
                location.clone(),
                Severity::Error,
                format!(
                    "removed duplicate {} because it must be unique within {}",
                    command.to_short_source(),
                    within
                ),
                previous.clone(),
                "previous occurrence",
            );
            return Verdict::Remove;
        }
        seen.insert(tag.name.clone(), location.clone());
    }

    let reason = if tag.obsolete {
        Some("obsolete")
    } else if tag.unused {
        Some("unused")
    } else {
        None
    };
    if let Some(reason) = reason {
        diagnostics.record(
            location.clone(),
            Severity::Info,
            format!("ignored {} command {}", reason, command.to_short_source()),
        );
    }

    match check_options(command, tag, 0, location, diagnostics) {
        Ok(()) => Verdict::Keep,
        Err((at, error)) => {
            diagnostics.record(
                at,
                Severity::Error,
                format!("removed {} because {}", command.to_short_source(), error),
            );
            Verdict::Remove
        }
    }
}

fn validate_link(
    command: &mut Command,
    tags: &TagPool,
    item_location: ItemLocation,
    diagnostics: &mut Diagnostics,
) -> Verdict {
    let location = item_location.to_source_location();
    let text = command.to_source();
    let message = match command.option(0).map(str::to_lowercase) {
        None => format!("replaced empty link by its text: {}", text),
        Some(link_type) => match tags.get_tag(&link_type, Scope::Link) {
            None => format!(
                "replaced unknown link \"{}\" by its text: {}; valid link types are {}",
                link_type,
                text,
                tags.valid_link_types()
            ),
            Some(tag) => match check_options(command, tag, 1, &location, diagnostics) {
                Ok(()) => return Verdict::Keep,
                Err((_, error)) => {
                    format!("replaced link by its text because {}: {}", error, text)
                }
            },
        },
    };
    diagnostics.record(location, Severity::Error, message);
    Verdict::Replace(Item::text(text, item_location))
}

/// Check the options of `command` from option `first` on against `tag`.
/// Unexpected trailing options are dropped with a warning.
fn check_options(
    command: &mut Command,
    tag: &TagSpec,
    first: usize,
    location: &SourceLocation,
    diagnostics: &mut Diagnostics,
) -> Result<(), (SourceLocation, String)> {
    for (offset, option_type) in tag.options.iter().enumerate() {
        let index = first + offset;
        if let Some(error) = option_type.validation_error(command.option(index)) {
            let at = command
                .option_item(index)
                .map(Item::source_location)
                .unwrap_or_else(|| location.clone());
            return Err((at, format!("option #{} is broken: {}", index + 1, error)));
        }
    }

    if !tag.is_variadic() {
        let extra = first + tag.options.len();
        if let Some(item) = command.option_item(extra) {
            diagnostics.record(
                item.source_location(),
                Severity::Warning,
                format!(
                    "ignored unexpected option #{} (and possible further options) for {}: {:?}",
                    extra + 1,
                    command.to_short_source(),
                    item.value().unwrap_or_default()
                ),
            );
            command.truncate_options(extra);
        }
    }
    Ok(())
}
