//! Turn the lines of a [`Source`] into [`Item`]s.

use crate::error::{Diagnostics, GuideError, Severity, SourceLocation};
use crate::item::{Command, Item, ItemKind, ItemLocation, unescaped};
use crate::source::Source;
use crate::tokenizer::{LineTokenizer, Token, TokenKind, trim_blank_end};
use std::sync::Arc;

/// Read all items of `source`. Only failing to read the source is an error;
/// tokenizer repairs end up in `diagnostics`.
pub fn read(source: &Arc<Source>, diagnostics: &mut Diagnostics) -> Result<Vec<Item>, GuideError> {
    let lines = source.read_lines()?;
    Ok(read_lines(source, &lines, diagnostics))
}

/// Read items from `lines` that were taken from `source`.
pub fn read_lines(
    source: &Arc<Source>,
    lines: &[String],
    diagnostics: &mut Diagnostics,
) -> Vec<Item> {
    let mut reader = ItemReader {
        source,
        diagnostics,
        items: Vec::new(),
    };
    for (index, line) in lines.iter().enumerate() {
        reader.read_line(index + 1, line);
    }
    log::debug!("read {} items from {}", reader.items.len(), source.name());
    reader.items
}

struct ItemReader<'a> {
    source: &'a Arc<Source>,
    diagnostics: &'a mut Diagnostics,
    items: Vec<Item>,
}

impl ItemReader<'_> {
    fn read_line(&mut self, line_number: usize, line: &str) {
        let mut tokenizer = LineTokenizer::new(line);
        let first_of_line = self.items.len();

        while let Some(token) = tokenizer.advance() {
            let item = if token.kind == TokenKind::Command {
                self.read_command(&mut tokenizer, line_number, token.column)
            } else {
                self.plain_item(token, line_number)
            };
            self.items.push(item);
        }

        for repair in tokenizer.take_repairs() {
            self.diagnostics.record(
                SourceLocation::with_file(self.source.full_name(), line_number, repair.column + 1),
                Severity::Warning,
                repair.message,
            );
        }

        let ends_with_line_command = self.items[first_of_line..]
            .last()
            .and_then(Item::as_command)
            .is_some_and(|command| !command.is_inline());
        if !ends_with_line_command {
            let end = trim_blank_end(line).chars().count();
            self.items.push(Item::new_line(self.location(line_number, end)));
        }
    }

    fn read_command(
        &mut self,
        tokenizer: &mut LineTokenizer,
        line_number: usize,
        at_column: usize,
    ) -> Item {
        let location = self.location(line_number, at_column);
        let mut inline = false;
        let mut name_token = tokenizer.advance();
        if name_token.as_ref().map(|token| token.kind) == Some(TokenKind::OpenBrace) {
            inline = true;
            name_token = tokenizer.advance();
        }

        let (raw_name, link, mut closed) = match name_token {
            Some(token) => match token.kind {
                TokenKind::StringLiteral => (token.text, inline, false),
                TokenKind::CloseBrace if inline => (String::new(), false, true),
                TokenKind::Text => (unescaped(&token.text), false, false),
                _ => (token.text, false, false),
            },
            None => (String::new(), false, false),
        };

        let mut options = Vec::new();
        while !closed {
            let Some(token) = tokenizer.advance() else {
                break;
            };
            if inline && token.kind == TokenKind::CloseBrace {
                closed = true;
            } else {
                options.push(self.option_item(token, line_number));
            }
        }

        Item::command(Command::new(raw_name, inline, link, options), location)
    }

    fn option_item(&self, token: Token, line_number: usize) -> Item {
        let location = self.location(line_number, token.column);
        match token.kind {
            TokenKind::StringLiteral => {
                let inner = token.text[1..token.text.len() - 1].to_string();
                Item::new(ItemKind::StringLiteral(inner), location)
            }
            _ => self.plain_item(token, line_number),
        }
    }

    fn plain_item(&self, token: Token, line_number: usize) -> Item {
        let location = self.location(line_number, token.column);
        match token.kind {
            TokenKind::Space => Item::space(token.text, location),
            TokenKind::Text => Item::text(unescaped(&token.text), location),
            _ => Item::text(token.text, location),
        }
    }

    fn location(&self, line_number: usize, column: usize) -> ItemLocation {
        ItemLocation::new(Arc::clone(self.source), line_number, column + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::write_pretty;

    fn read_text(text: &str) -> (Vec<Item>, Diagnostics) {
        let source = Source::memory("test", text);
        let mut diagnostics = Diagnostics::new();
        let items = read(&source, &mut diagnostics).unwrap();
        (items, diagnostics)
    }

    #[test]
    fn lone_at_sign_is_text() {
        let (items, diagnostics) = read_text("@");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].kind, ItemKind::Text("@".to_string()));
        assert!(items[1].is_new_line());
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics.contains_message("inserted backslash before dangling @"));
    }

    #[test]
    fn line_command_keeps_original_name() {
        let (items, diagnostics) = read_text("@dAtAbAsE hugo");
        assert!(diagnostics.is_empty());
        assert_eq!(items.len(), 1);
        let command = items[0].as_command().unwrap();
        assert_eq!(command.name(), "database");
        assert_eq!(command.raw_name(), "dAtAbAsE");
        assert!(!command.is_inline());
        assert_eq!(command.items().len(), 2);
        assert_eq!(command.option(0), Some("hugo"));
    }

    #[test]
    fn inline_commands_and_links() {
        let (items, _) = read_text("see @{\"Intro\" link intro} or @{b}bold");
        let link = items[2].as_command().unwrap();
        assert!(link.is_link());
        assert!(link.is_inline());
        assert_eq!(link.label(), Some("Intro"));
        assert_eq!(link.option(0), Some("link"));
        assert_eq!(link.option(1), Some("intro"));
        let bold = items[6].as_command().unwrap();
        assert_eq!(bold.name(), "b");
        assert!(!bold.is_link());
        assert_eq!(items[7].kind, ItemKind::Text("bold".to_string()));
        assert!(items[8].is_new_line());
    }

    #[test]
    fn string_options_drop_quotes() {
        let (items, _) = read_text("@node main \"Main Page\"");
        let command = items[0].as_command().unwrap();
        assert_eq!(command.option(1), Some("Main Page"));
        assert_eq!(
            command.option_item(1).map(|item| &item.kind),
            Some(&ItemKind::StringLiteral("Main Page".to_string()))
        );
    }

    #[test]
    fn new_line_after_text_and_inline_command_only() {
        let (items, _) = read_text("@node a\ntext\n\n@{b}\n@endnode");
        let new_lines = items.iter().filter(|item| item.is_new_line()).count();
        assert_eq!(new_lines, 3);
    }

    #[test]
    fn locations_are_one_based() {
        let (items, _) = read_text("ab @{b}");
        assert_eq!((items[0].location.line, items[0].location.column), (1, 1));
        assert_eq!(items[2].location.column, 4);
        let option = read_text("@node main").0;
        let command = option[0].as_command().unwrap();
        assert_eq!(command.option_item(0).unwrap().location.column, 7);
    }

    #[test]
    fn pretty_printing_reproduces_well_formed_input() {
        let text = "@database test\n@node main \"Main\"\nA \\@ and \\\\ @{\"x\" link other/main}.\n\t@{b}bold@{ub}\n@endnode\n";
        let (items, diagnostics) = read_text(text);
        assert!(diagnostics.is_empty());
        assert_eq!(write_pretty(&items), text);
    }

    #[test]
    fn unterminated_inline_command_is_closed() {
        let (items, diagnostics) = read_text("x @{b");
        assert!(diagnostics.is_empty());
        assert_eq!(write_pretty(&items), "x @{b}\n");
    }
}
