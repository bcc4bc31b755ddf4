//! Tag registry: which commands exist, where they may appear and which
//! options they take.

pub mod defaults;

use crate::error::SourceLocation;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Where a command may appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Line command outside of any node.
    Global,
    /// Line command inside a node.
    Node,
    /// Inline command `@{...}`.
    Inline,
    /// Link type in `@{"label" type ...}`.
    Link,
}

/// Amigaguide version a tag was introduced with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Version {
    /// Workbench 1.3 and 2.x.
    V34,
    /// Workbench 3.0.
    V39,
    /// Workbench 3.1.
    V40,
}

/// Colors accepted by `@{fg}` and `@{bg}`.
pub const COLORS: [&str; 8] = [
    "back",
    "background",
    "fill",
    "filltext",
    "highlight",
    "shadow",
    "shine",
    "text",
];

/// Type of a single tag option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    /// Any number of options including none. Must be last.
    Any,
    /// One of [`COLORS`].
    Color,
    /// An Amiga path to a file.
    File,
    /// An Amiga path to a guide, a slash and a node name.
    FileNode,
    /// A node of the current document.
    Node,
    /// An integer.
    Number,
    /// At least one option. Must be last.
    Some,
    /// Arbitrary text.
    Text,
}

impl OptionType {
    /// Whether the type absorbs all remaining options.
    pub fn is_variadic(self) -> bool {
        matches!(self, OptionType::Any | OptionType::Some)
    }

    /// Describe what is wrong with `value`, or `None` if it is acceptable.
    pub fn validation_error(self, value: Option<&str>) -> Option<String> {
        let Some(value) = value else {
            return match self {
                OptionType::Any => None,
                _ => Some("option must be specified".to_string()),
            };
        };
        match self {
            OptionType::Number => match value.parse::<i64>() {
                Ok(_) => None,
                Err(_) => Some(format!("option is {:?} but must be a number", value)),
            },
            OptionType::Color => {
                if COLORS.contains(&value) {
                    None
                } else {
                    Some(format!(
                        "option is {:?} but must be one of: {}",
                        value,
                        COLORS.join(", ")
                    ))
                }
            }
            _ => None,
        }
    }
}

/// Body of a user defined macro.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroBody {
    /// Name as written in `@macro`.
    pub original_name: String,
    /// Text with `$1`..`$n` placeholders.
    pub text: String,
    /// Location of the defining `@macro`.
    pub location: SourceLocation,
}

/// Definition of a tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSpec {
    /// Name in lower case.
    pub name: String,
    /// Where the tag may appear.
    pub scope: Scope,
    /// Version that introduced the tag.
    pub version: Version,
    /// Option types in order.
    pub options: Vec<OptionType>,
    /// At most one occurrence per document or node.
    pub unique: bool,
    /// Recognized but replaced by something else.
    pub obsolete: bool,
    /// Recognized but without effect in any viewer.
    pub unused: bool,
    /// Set for macros defined by the document.
    pub macro_body: Option<MacroBody>,
}

impl TagSpec {
    /// Tag without options.
    pub fn new(name: &str, version: Version, scope: Scope) -> Self {
        Self {
            name: name.to_string(),
            scope,
            version,
            options: Vec::new(),
            unique: false,
            obsolete: false,
            unused: false,
            macro_body: None,
        }
    }

    /// Link type without options.
    pub fn link(name: &str, version: Version) -> Self {
        Self::new(name, version, Scope::Link)
    }

    /// Inline tag expanding to `body`.
    pub fn macro_definition(name: &str, body: MacroBody) -> Self {
        // Macros expand before validation, so the version is the oldest.
        let mut result = Self::new(&name.to_lowercase(), Version::V34, Scope::Inline);
        result.macro_body = Some(body);
        result
    }

    /// Set the option types.
    pub fn with_options(mut self, options: &[OptionType]) -> Self {
        self.options = options.to_vec();
        self
    }

    /// Mark the tag as unique within its scope.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Mark the tag as obsolete.
    pub fn obsolete(mut self) -> Self {
        self.obsolete = true;
        self
    }

    /// Mark the tag as unused.
    pub fn unused(mut self) -> Self {
        self.unused = true;
        self
    }

    /// Whether the tag is a macro.
    pub fn is_macro(&self) -> bool {
        self.macro_body.is_some()
    }

    /// Whether the last option absorbs all remaining options.
    pub fn is_variadic(&self) -> bool {
        self.options.last().is_some_and(|option| option.is_variadic())
    }
}

/// Lookup table of tags and link types.
#[derive(Debug, Clone, Default)]
pub struct TagPool {
    tags: BTreeMap<(Scope, String), TagSpec>,
    links: BTreeMap<String, TagSpec>,
}

impl TagPool {
    /// Pool seeded with all built-in tags.
    pub fn new() -> Self {
        defaults::BUILTIN_TAGS.clone()
    }

    /// Pool without any tags.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Add `tag`, replacing any tag with the same name and scope.
    pub fn add_tag(&mut self, tag: TagSpec) {
        debug_assert!(
            tag.options
                .iter()
                .rev()
                .skip(1)
                .all(|option| !option.is_variadic()),
            "variadic option must be last: {}",
            tag.name
        );
        if tag.scope == Scope::Link {
            self.links.insert(tag.name.clone(), tag);
        } else {
            self.tags.insert((tag.scope, tag.name.clone()), tag);
        }
    }

    /// Tag `name` in `scope`. Node scope falls back to global tags.
    pub fn get_tag(&self, name: &str, scope: Scope) -> Option<&TagSpec> {
        let name = name.to_lowercase();
        if scope == Scope::Link {
            return self.links.get(&name);
        }
        self.tags.get(&(scope, name.clone())).or_else(|| {
            if scope == Scope::Node {
                self.tags.get(&(Scope::Global, name))
            } else {
                None
            }
        })
    }

    /// Macro `name`, if one was defined.
    pub fn get_macro(&self, name: &str) -> Option<&TagSpec> {
        self.get_tag(name, Scope::Inline).filter(|tag| tag.is_macro())
    }

    /// Link type names, sorted and quoted, for messages.
    pub fn valid_link_types(&self) -> String {
        self.links
            .keys()
            .map(|name| format!("\"{}\"", name))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Number of tags including link types.
    pub fn len(&self) -> usize {
        self.tags.len() + self.links.len()
    }

    /// Whether the pool holds no tags at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
