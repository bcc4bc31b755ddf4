//! `@macro` definitions and their expansion.

use crate::config::PileOptions;
use crate::error::{Diagnostics, Severity};
use crate::item::{Command, Item, ItemKind};
use crate::reader;
use crate::source::{Source, split_lines};
use crate::tags::{MacroBody, Scope, TagPool, TagSpec};
use std::collections::VecDeque;

/// Register every `@macro` line command of `items` in `tags`.
pub(crate) fn define_macros(items: &[Item], tags: &mut TagPool, diagnostics: &mut Diagnostics) {
    for item in items {
        if !item.is_line_command("macro") {
            continue;
        }
        let Some(command) = item.as_command() else {
            continue;
        };
        let Some(original_name) = command.option(0) else {
            continue;
        };
        let text = match command.option_item(1).map(|option| &option.kind) {
            Some(ItemKind::Text(text) | ItemKind::StringLiteral(text)) => text.clone(),
            _ => String::new(),
        };
        let location = item.source_location();
        let name = original_name.to_lowercase();

        match tags.get_tag(&name, Scope::Inline) {
            Some(existing) if existing.is_macro() => {
                let previous = existing
                    .macro_body
                    .as_ref()
                    .map(|body| body.location.clone())
                    .unwrap_or_else(|| location.clone());
                diagnostics.record_with_see_also(
                    location,
                    Severity::Warning,
                    format!("ignored duplicate definition of macro \"{}\"", name),
                    previous,
                    "previous definition of macro",
                );
                continue;
            }
            Some(existing) => {
                diagnostics.record(
                    location.clone(),
                    Severity::Info,
                    format!("replaced standard tag \"{}\" with macro", existing.name),
                );
            }
            None => {}
        }
        log::debug!("defined macro {}: {:?}", name, text);
        tags.add_tag(TagSpec::macro_definition(
            &name,
            MacroBody {
                original_name: original_name.to_string(),
                text,
                location,
            },
        ));
    }
}

/// Bounds for macro expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MacroLimits {
    /// How deeply calls may nest.
    pub max_depth: usize,
    /// How many calls may be expanded or removed in one document.
    pub max_expansions: usize,
}

impl MacroLimits {
    pub(crate) fn from_options(options: &PileOptions) -> Self {
        Self {
            max_depth: options.max_macro_depth,
            max_expansions: options.max_macro_expansions,
        }
    }
}

/// Replace every macro call by the items its expansion reads as.
///
/// Expanded items are scanned again, so macros may call other macros. Calls
/// nested deeper than `max_depth` are removed. Once `max_expansions` calls
/// were handled, all remaining calls are removed with a single error, which
/// bounds macros that call themselves more than once.
pub(crate) fn resolve_macros(
    items: Vec<Item>,
    tags: &TagPool,
    limits: MacroLimits,
    diagnostics: &mut Diagnostics,
) -> Vec<Item> {
    let mut result = Vec::with_capacity(items.len());
    let mut pending: VecDeque<(Item, usize)> = items.into_iter().map(|item| (item, 0)).collect();
    let mut handled = 0usize;
    let mut exhausted = false;

    while let Some((item, depth)) = pending.pop_front() {
        let body = item
            .as_command()
            .filter(|command| command.is_inline() && !command.is_link())
            .and_then(|command| tags.get_macro(command.name()))
            .and_then(|tag| tag.macro_body.as_ref());
        let Some(body) = body else {
            result.push(item);
            continue;
        };
        let Some(command) = item.as_command() else {
            continue;
        };

        if handled >= limits.max_expansions {
            if !exhausted {
                diagnostics.record(
                    item.source_location(),
                    Severity::Error,
                    format!(
                        "removed {} and all further macro calls after {} expansions",
                        command.to_short_source(),
                        limits.max_expansions
                    ),
                );
                exhausted = true;
            }
            continue;
        }
        handled += 1;

        if depth >= limits.max_depth {
            diagnostics.record(
                item.source_location(),
                Severity::Error,
                format!(
                    "removed {} because macros are nested deeper than {} levels",
                    command.to_short_source(),
                    limits.max_depth
                ),
            );
            continue;
        }

        let text = substitute(&body.text, command);
        log::debug!("expanded {} to {:?}", command.to_short_source(), text);
        let source = Source::memory(
            format!("{} ({})", command.to_short_source(), item.source_location()),
            text.clone(),
        );
        let mut expanded = reader::read_lines(&source, &split_lines(&text), diagnostics);
        if expanded.last().is_some_and(Item::is_new_line) {
            expanded.pop();
        }
        for expanded_item in expanded.into_iter().rev() {
            pending.push_front((expanded_item, depth + 1));
        }
    }
    result
}

/// Replace `$1`..`$n` in `body` by the options of `call`. Missing options
/// are replaced by nothing.
pub(crate) fn substitute(body: &str, call: &Command) -> String {
    let mut result = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' || !chars.peek().is_some_and(char::is_ascii_digit) {
            result.push(ch);
            continue;
        }
        let mut number = 0usize;
        while let Some(digit) = chars.peek().and_then(|c| c.to_digit(10)) {
            number = number.saturating_mul(10).saturating_add(digit as usize);
            chars.next();
        }
        if let Some(value) = number.checked_sub(1).and_then(|index| call.option(index)) {
            result.push_str(value);
        }
    }
    result
}
