//! Document and node metadata collected from line commands.

use crate::item::{Command, Item};
use crate::source::Source;
use serde::Serialize;

/// How line breaks in a node are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Wrap {
    /// Line breaks are kept.
    #[default]
    None,
    /// A single line break joins lines, an empty line ends a paragraph.
    Smart,
    /// Every line break ends a paragraph.
    Word,
}

/// Font set with `@font name size`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Font {
    /// Font name, for example `topaz.font`.
    pub name: String,
    /// Size in pixels.
    pub size: i64,
}

impl Font {
    fn from_command(command: &Command) -> Option<Self> {
        let name = command.option(0)?.to_string();
        let size = command.option(1)?.parse().ok()?;
        Some(Self { name, size })
    }
}

/// Metadata of a whole document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct DatabaseInfo {
    /// Name from `@database`, or the file name.
    pub name: String,
    /// `@author`.
    pub author: Option<String>,
    /// `@(c)`.
    pub copyright: Option<String>,
    /// `@$VER:`.
    pub version: Option<String>,
    /// `@font`.
    pub font: Option<Font>,
    /// `@wordwrap` or `@smartwrap`.
    pub wrap: Wrap,
    /// `@index` node.
    pub index: Option<String>,
    /// `@help` node.
    pub help: Option<String>,
    /// `@master` file.
    pub master: Option<String>,
}

/// Metadata of a single node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeInfo {
    /// Node name in lower case.
    pub name: String,
    /// Second `@node` option or `@title`, else the name as written.
    pub title: String,
    /// Wrap mode if the node sets one.
    pub wrap: Option<Wrap>,
    /// Font if the node sets one.
    pub font: Option<Font>,
    /// `@proportional`.
    pub proportional: bool,
    /// `@next` node.
    pub next: Option<String>,
    /// `@prev` node.
    pub prev: Option<String>,
    /// `@toc` node.
    pub toc: Option<String>,
    /// `@help` node.
    pub help: Option<String>,
    /// `@index` node.
    pub index: Option<String>,
    /// Index of the `@node` item.
    pub start: usize,
    /// Index of the matching `@endnode` item.
    pub end: usize,
}

impl NodeInfo {
    fn new(command: &Command, start: usize) -> Self {
        let written_name = command.option(0).unwrap_or_default();
        Self {
            name: written_name.to_lowercase(),
            title: command.option(1).unwrap_or(written_name).to_string(),
            wrap: None,
            font: None,
            proportional: false,
            next: None,
            prev: None,
            toc: None,
            help: None,
            index: None,
            start,
            end: start,
        }
    }

    /// Wrap mode of the node, else of the document.
    pub fn effective_wrap(&self, database: &DatabaseInfo) -> Wrap {
        self.wrap.unwrap_or(database.wrap)
    }

    /// Font of the node, else of the document.
    pub fn effective_font<'a>(&'a self, database: &'a DatabaseInfo) -> Option<&'a Font> {
        self.font.as_ref().or(database.font.as_ref())
    }

    /// Help node of the node, else of the document.
    pub fn effective_help<'a>(&'a self, database: &'a DatabaseInfo) -> Option<&'a str> {
        self.help.as_deref().or(database.help.as_deref())
    }

    /// Index node of the node, else of the document.
    pub fn effective_index<'a>(&'a self, database: &'a DatabaseInfo) -> Option<&'a str> {
        self.index.as_deref().or(database.index.as_deref())
    }

    /// Range of the content items, excluding `@node` and `@endnode`.
    pub fn content_range(&self) -> std::ops::Range<usize> {
        self.start + 1..self.end
    }

    fn apply(&mut self, command: &Command) {
        let first = || command.option(0).map(str::to_string);
        match command.name() {
            "title" => {
                if let Some(title) = first() {
                    self.title = title;
                }
            }
            "wordwrap" => self.wrap = Some(Wrap::Word),
            "smartwrap" => self.wrap = Some(Wrap::Smart),
            "font" => self.font = Font::from_command(command),
            "proportional" => self.proportional = true,
            "next" => self.next = first().map(|name| name.to_lowercase()),
            "prev" => self.prev = first().map(|name| name.to_lowercase()),
            "toc" => self.toc = first().map(|name| name.to_lowercase()),
            "help" => self.help = first().map(|name| name.to_lowercase()),
            "index" => self.index = first().map(|name| name.to_lowercase()),
            _ => {}
        }
    }
}

impl DatabaseInfo {
    fn apply(&mut self, command: &Command) {
        let all = || command.options_from(0);
        match command.name() {
            "database" => {
                if let Some(name) = command.option(0) {
                    self.name = name.to_string();
                }
            }
            "author" => self.author = all(),
            "(c)" => self.copyright = all(),
            "$ver:" => self.version = all(),
            "font" => self.font = Font::from_command(command),
            "wordwrap" => self.wrap = Wrap::Word,
            "smartwrap" => self.wrap = Wrap::Smart,
            "index" => self.index = command.option(0).map(str::to_lowercase),
            "help" => self.help = command.option(0).map(str::to_lowercase),
            "master" => self.master = command.option(0).map(str::to_string),
            _ => {}
        }
    }
}

/// Collect document and node metadata from validated `items`.
pub(crate) fn collect_info(source: &Source, items: &[Item]) -> (DatabaseInfo, Vec<NodeInfo>) {
    let mut database = DatabaseInfo {
        name: source.name().to_string(),
        ..DatabaseInfo::default()
    };
    let mut nodes = Vec::new();
    let mut current: Option<NodeInfo> = None;

    for (index, item) in items.iter().enumerate() {
        let Some(command) = item.as_command().filter(|command| !command.is_inline()) else {
            continue;
        };
        match command.name() {
            "node" => current = Some(NodeInfo::new(command, index)),
            "endnode" => {
                if let Some(mut node) = current.take() {
                    node.end = index;
                    nodes.push(node);
                }
            }
            _ => match current.as_mut() {
                Some(node) => node.apply(command),
                None => database.apply(command),
            },
        }
    }
    (database, nodes)
}
