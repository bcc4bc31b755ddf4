//! The item model: the token stream a guide is made of.

use crate::error::SourceLocation;
use crate::source::Source;
use crate::tokenizer::is_blank;
use std::sync::Arc;

/// Where an item was read from. Line and column are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemLocation {
    /// Source the item was read from.
    pub source: Arc<Source>,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
}

impl ItemLocation {
    /// Create a new item location.
    pub fn new(source: Arc<Source>, line: usize, column: usize) -> Self {
        Self {
            source,
            line,
            column,
        }
    }

    /// Location for diagnostics.
    pub fn to_source_location(&self) -> SourceLocation {
        SourceLocation::with_file(self.source.full_name(), self.line, self.column)
    }
}

/// The five kinds of items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemKind {
    /// Text with escape sequences resolved.
    Text(String),
    /// White space, kept literally.
    Space(String),
    /// A quoted string from inside a command, without the quotes.
    StringLiteral(String),
    /// End of a line of text.
    NewLine,
    /// A line, inline or link command.
    Command(Command),
}

/// A single item with its location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// What the item is.
    pub kind: ItemKind,
    /// Where the item came from.
    pub location: ItemLocation,
}

impl Item {
    /// Create a new item.
    pub fn new(kind: ItemKind, location: ItemLocation) -> Self {
        Self { kind, location }
    }

    /// Text item at `location`.
    pub fn text(value: impl Into<String>, location: ItemLocation) -> Self {
        Self::new(ItemKind::Text(value.into()), location)
    }

    /// Space item at `location`.
    pub fn space(value: impl Into<String>, location: ItemLocation) -> Self {
        Self::new(ItemKind::Space(value.into()), location)
    }

    /// New line item at `location`.
    pub fn new_line(location: ItemLocation) -> Self {
        Self::new(ItemKind::NewLine, location)
    }

    /// Command item at `location`.
    pub fn command(command: Command, location: ItemLocation) -> Self {
        Self::new(ItemKind::Command(command), location)
    }

    /// Text of a Text, Space or StringLiteral item.
    pub fn value(&self) -> Option<&str> {
        match &self.kind {
            ItemKind::Text(value) | ItemKind::Space(value) | ItemKind::StringLiteral(value) => {
                Some(value)
            }
            ItemKind::NewLine | ItemKind::Command(_) => None,
        }
    }

    /// The command, if this is a command item.
    pub fn as_command(&self) -> Option<&Command> {
        match &self.kind {
            ItemKind::Command(command) => Some(command),
            _ => None,
        }
    }

    /// Mutable access to the command, if this is a command item.
    pub fn as_command_mut(&mut self) -> Option<&mut Command> {
        match &mut self.kind {
            ItemKind::Command(command) => Some(command),
            _ => None,
        }
    }

    /// Whether this is a line command named `name`.
    pub fn is_line_command(&self, name: &str) -> bool {
        self.as_command()
            .is_some_and(|command| !command.is_inline() && command.name() == name)
    }

    /// Whether this is a white space item.
    pub fn is_space(&self) -> bool {
        matches!(self.kind, ItemKind::Space(_))
    }

    /// Whether this is a new line item.
    pub fn is_new_line(&self) -> bool {
        matches!(self.kind, ItemKind::NewLine)
    }

    /// Location for diagnostics.
    pub fn source_location(&self) -> SourceLocation {
        self.location.to_source_location()
    }

    /// Amigaguide source text of the item.
    pub fn to_source(&self) -> String {
        match &self.kind {
            ItemKind::Text(value) => escaped(value),
            ItemKind::Space(value) => value.clone(),
            ItemKind::StringLiteral(value) => format!("\"{}\"", value),
            ItemKind::NewLine => "\n".to_string(),
            ItemKind::Command(command) => command.to_source(),
        }
    }
}

/// An Amigaguide command with its options.
///
/// Options are kept as items, white space included, so the command can be
/// written back exactly. Option `n` is the `n`-th item that is not white
/// space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    raw_name: String,
    name: String,
    inline: bool,
    link: bool,
    items: Vec<Item>,
}

impl Command {
    /// Create a command. `raw_name` is the name as written, which for a link
    /// is the quoted label.
    pub fn new(raw_name: impl Into<String>, inline: bool, link: bool, items: Vec<Item>) -> Self {
        let raw_name = raw_name.into();
        Self {
            name: raw_name.to_lowercase(),
            raw_name,
            inline,
            link: link && inline,
            items,
        }
    }

    /// Line command without options, as synthesized by repairs.
    pub fn line(name: &str) -> Self {
        Self::new(name, false, false, Vec::new())
    }

    /// Command name in lower case.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Command name as written in the document.
    pub fn raw_name(&self) -> &str {
        &self.raw_name
    }

    /// Whether the command was written as `@{...}`.
    pub fn is_inline(&self) -> bool {
        self.inline
    }

    /// Whether the command is a link `@{"label" type target}`.
    pub fn is_link(&self) -> bool {
        self.link
    }

    /// Label of a link without the quotes.
    pub fn label(&self) -> Option<&str> {
        if !self.link {
            return None;
        }
        let label = self.raw_name.strip_prefix('"').unwrap_or(&self.raw_name);
        Some(label.strip_suffix('"').unwrap_or(label))
    }

    /// All option items including white space.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Number of options, white space not counted.
    pub fn option_count(&self) -> usize {
        self.items.iter().filter(|item| !item.is_space()).count()
    }

    fn option_position(&self, index: usize) -> Option<usize> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| !item.is_space())
            .nth(index)
            .map(|(position, _)| position)
    }

    /// Option `index`, or `None` if there are not enough options.
    pub fn option(&self, index: usize) -> Option<&str> {
        self.option_item(index).and_then(Item::value)
    }

    /// Item of option `index`.
    pub fn option_item(&self, index: usize) -> Option<&Item> {
        self.option_position(index).map(|position| &self.items[position])
    }

    /// Options from `index` on, joined by a single blank.
    pub fn options_from(&self, index: usize) -> Option<String> {
        let options: Vec<&str> = (index..self.option_count())
            .filter_map(|i| self.option(i))
            .collect();
        if options.is_empty() {
            None
        } else {
            Some(options.join(" "))
        }
    }

    /// Set option `index` to `value`, appending blanks and empty options as
    /// needed.
    pub fn set_option(&mut self, index: usize, value: &str, location: &ItemLocation) {
        while self.option_count() <= index {
            self.items.push(Item::space(" ", location.clone()));
            self.items.push(Item::text("", location.clone()));
        }
        let kind = if value.chars().any(is_blank) {
            ItemKind::StringLiteral(value.to_string())
        } else {
            ItemKind::Text(value.to_string())
        };
        if let Some(position) = self.option_position(index) {
            let old_location = self.items[position].location.clone();
            self.items[position] = Item::new(kind, old_location);
        }
    }

    /// Drop option `index` and everything after it, including the white
    /// space leading up to it.
    pub fn truncate_options(&mut self, index: usize) {
        if let Some(mut position) = self.option_position(index) {
            while position > 0 && self.items[position - 1].is_space() {
                position -= 1;
            }
            self.items.truncate(position);
        }
    }

    /// Amigaguide source text of the command.
    pub fn to_source(&self) -> String {
        let mut result = String::from("@");
        if self.inline {
            result.push('{');
        }
        result.push_str(&self.raw_name);
        for item in &self.items {
            result.push_str(&item.to_source());
        }
        if self.inline {
            result.push('}');
        } else {
            result.push('\n');
        }
        result
    }

    /// Short form for messages, for example `@node` or `@{b}`.
    pub fn to_short_source(&self) -> String {
        if self.inline {
            format!("@{{{}}}", self.raw_name)
        } else {
            format!("@{}", self.raw_name)
        }
    }
}

/// Escape `\` and `@` for use in Amigaguide text.
pub fn escaped(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => result.push_str("\\\\"),
            '@' => result.push_str("\\@"),
            _ => result.push(ch),
        }
    }
    result
}

/// Resolve escape sequences as left by the tokenizer.
pub fn unescaped(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some(escaped) => result.push(escaped),
                None => result.push(ch),
            }
        } else {
            result.push(ch);
        }
    }
    result
}

/// Concatenated source text of `items`.
pub fn write_pretty(items: &[Item]) -> String {
    items.iter().map(Item::to_source).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at() -> ItemLocation {
        ItemLocation::new(Source::memory("test", ""), 1, 1)
    }

    fn node_command() -> Command {
        Command::new(
            "Node",
            false,
            false,
            vec![
                Item::space(" ", at()),
                Item::text("main", at()),
                Item::space(" ", at()),
                Item::new(ItemKind::StringLiteral("Main Title".to_string()), at()),
            ],
        )
    }

    #[test]
    fn options_skip_white_space() {
        let command = node_command();
        assert_eq!(command.name(), "node");
        assert_eq!(command.raw_name(), "Node");
        assert_eq!(command.option_count(), 2);
        assert_eq!(command.option(0), Some("main"));
        assert_eq!(command.option(1), Some("Main Title"));
        assert_eq!(command.option(2), None);
        assert_eq!(command.options_from(0).as_deref(), Some("main Main Title"));
    }

    #[test]
    fn set_option_appends_missing_options() {
        let mut command = Command::line("node");
        command.set_option(0, "unnamed.1", &at());
        assert_eq!(command.to_source(), "@node unnamed.1\n");

        let mut command = node_command();
        command.set_option(1, "Other", &at());
        assert_eq!(command.to_source(), "@Node main Other\n");
        command.set_option(0, "two words", &at());
        assert_eq!(command.option(0), Some("two words"));
        assert_eq!(command.to_source(), "@Node \"two words\" Other\n");
    }

    #[test]
    fn truncate_drops_leading_space() {
        let mut command = node_command();
        command.truncate_options(1);
        assert_eq!(command.to_source(), "@Node main\n");
    }

    #[test]
    fn link_label_strips_quotes() {
        let link = Command::new("\"Intro\"", true, true, Vec::new());
        assert!(link.is_link());
        assert_eq!(link.label(), Some("Intro"));
        assert_eq!(link.to_short_source(), "@{\"Intro\"}");
        assert_eq!(node_command().label(), None);
    }

    #[test]
    fn escape_round_trip() {
        assert_eq!(unescaped("a\\\\b\\@"), "a\\b@");
        assert_eq!(escaped("a\\b@"), "a\\\\b\\@");
        assert_eq!(Item::text("@", at()).to_source(), "\\@");
    }
}
