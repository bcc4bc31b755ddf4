//! Tokenizer for a single line of an Amigaguide document.
//!
//! The tokenizer repairs what it cannot make sense of instead of failing:
//! strings in commands always get a closing quote, inline commands always get
//! a closing brace and every escape sequence ends up well formed. Each repair
//! is recorded as a [`Repair`] the caller turns into a diagnostic.

/// Whether `ch` is white space in an Amigaguide line: a control character or
/// a space. Latin-1 characters such as no-break space are text.
pub fn is_blank(ch: char) -> bool {
    ch <= ' '
}

/// `line` without trailing white space.
pub fn trim_blank_end(line: &str) -> &str {
    line.trim_end_matches(is_blank)
}

/// Token types produced by [`LineTokenizer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A run of white space, kept literally.
    Space,
    /// Text outside quotes.
    Text,
    /// A quoted string inside a command, quotes included.
    StringLiteral,
    /// The `@` introducing a command.
    Command,
    /// The `{` after `@` of an inline command.
    OpenBrace,
    /// The `}` ending an inline command, possibly synthesized.
    CloseBrace,
}

/// Parser state carried while tokenizing a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenizerState {
    /// Plain text.
    #[default]
    InText,
    /// After the `@` of a line command.
    InCommand,
    /// After `@{`.
    InCommandBrace,
}

/// A single token with the column (0-based, in characters) it starts at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Token type.
    pub kind: TokenKind,
    /// Token text after repairs.
    pub text: String,
    /// Start column.
    pub column: usize,
}

/// A repair applied to the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repair {
    /// Column (0-based) the repair refers to.
    pub column: usize,
    /// What was changed.
    pub message: String,
}

/// Stateful lexer for one line.
#[derive(Debug, Clone)]
pub struct LineTokenizer {
    chars: Vec<char>,
    column: usize,
    state: TokenizerState,
    insert_close_brace: bool,
    repairs: Vec<Repair>,
}

impl LineTokenizer {
    /// Tokenizer for `line` starting in plain text.
    pub fn new(line: &str) -> Self {
        Self::with_state(line, TokenizerState::InText)
    }

    /// Tokenizer for `line` starting in `state`.
    pub fn with_state(line: &str, state: TokenizerState) -> Self {
        Self {
            chars: trim_blank_end(line).chars().collect(),
            column: 0,
            state,
            insert_close_brace: false,
            repairs: Vec::new(),
        }
    }

    /// Whether another token is available.
    pub fn has_next(&self) -> bool {
        self.has_chars() || self.insert_close_brace
    }

    /// Current column, i.e. the column the next token starts at.
    pub fn column(&self) -> usize {
        self.column
    }

    /// Current parser state.
    pub fn state(&self) -> TokenizerState {
        self.state
    }

    /// Repairs applied so far.
    pub fn repairs(&self) -> &[Repair] {
        &self.repairs
    }

    /// Remove and return the repairs applied so far.
    pub fn take_repairs(&mut self) -> Vec<Repair> {
        std::mem::take(&mut self.repairs)
    }

    /// Read the next token, or `None` past the end of the line.
    pub fn advance(&mut self) -> Option<Token> {
        if !self.has_next() {
            return None;
        }

        let column = self.column;
        let some = if self.insert_close_brace {
            self.insert_close_brace = false;
            '}'
        } else {
            let ch = self.chars[self.column];
            self.column += 1;
            ch
        };
        let mut text = String::from(some);

        let kind = if is_blank(some) {
            while self.has_chars() && is_blank(self.peek()) {
                text.push(self.peek());
                self.column += 1;
            }
            TokenKind::Space
        } else if self.state == TokenizerState::InText
            && some == '@'
            && self.at_sign_is_command(column)
        {
            self.state = TokenizerState::InCommand;
            TokenKind::Command
        } else if self.state == TokenizerState::InCommand
            && some == '{'
            && column > 0
            && self.chars[column - 1] == '@'
        {
            self.state = TokenizerState::InCommandBrace;
            TokenKind::OpenBrace
        } else if self.state != TokenizerState::InText && some == '"' {
            self.read_string(column, &mut text);
            TokenKind::StringLiteral
        } else if self.state == TokenizerState::InCommandBrace && some == '}' {
            self.state = TokenizerState::InText;
            TokenKind::CloseBrace
        } else {
            self.read_text(column, some, &mut text);
            TokenKind::Text
        };

        if !self.has_chars() && self.state == TokenizerState::InCommandBrace {
            self.insert_close_brace = true;
        }

        Some(Token { kind, text, column })
    }

    fn read_string(&mut self, quote_column: usize, text: &mut String) {
        while self.has_chars() && self.peek() != '"' {
            text.push(self.peek());
            self.column += 1;
        }
        if self.has_chars() {
            self.column += 1;
        } else {
            self.repair(quote_column, "appended missing trailing quote");
        }
        text.push('"');
    }

    fn read_text(&mut self, column: usize, some: char, text: &mut String) {
        let mut after_backslash = some == '\\';

        if some == '@' {
            self.repair(column, "inserted backslash before dangling @");
            text.clear();
            text.push_str("\\@");
        }
        while self.has_chars() {
            let ch = self.peek();
            if is_blank(ch)
                || (self.state == TokenizerState::InCommandBrace && ch == '}')
                || (self.state == TokenizerState::InText
                    && ch == '@'
                    && !after_backslash
                    && self.at_sign_is_command(self.column))
            {
                break;
            }
            if after_backslash {
                if ch != '\\' && ch != '@' {
                    self.repair(
                        self.column,
                        format!("inserted backslash before dangling backslash with {:?}", ch),
                    );
                    text.push('\\');
                }
                text.push(ch);
                after_backslash = false;
            } else if ch == '\\' {
                text.push(ch);
                after_backslash = true;
            } else if ch == '@' {
                self.repair(self.column, "inserted backslash before dangling @");
                text.push_str("\\@");
            } else {
                text.push(ch);
            }
            self.column += 1;
        }

        if after_backslash {
            self.repair(self.column, "appended backslash after dangling backslash");
            text.push('\\');
        }
    }

    /// An `@` opens a command at column 0 when followed by a non-blank, or
    /// anywhere when followed by `{` and a non-blank. Mid-line `@x` is text so
    /// that addresses like `user@host` survive.
    fn at_sign_is_command(&self, at_column: usize) -> bool {
        let len = self.chars.len();
        if at_column + 1 >= len {
            return false;
        }
        let next = self.chars[at_column + 1];
        let is_brace = next == '{';
        if at_column > 0 || is_brace {
            is_brace && at_column + 2 < len && !is_blank(self.chars[at_column + 2])
        } else {
            !is_blank(next)
        }
    }

    fn repair(&mut self, column: usize, message: impl Into<String>) {
        self.repairs.push(Repair {
            column,
            message: message.into(),
        });
    }

    fn has_chars(&self) -> bool {
        self.column < self.chars.len()
    }

    fn peek(&self) -> char {
        self.chars[self.column]
    }
}

impl Iterator for LineTokenizer {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.advance()
    }
}
