use crate::error::GuideError;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Options controlling how guides are loaded and linked.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PileOptions {
    /// Amiga volume or assign name mapped to a local directory, for example
    /// `"Work" -> "/home/amiga/work"`. Names are matched case-insensitively.
    #[serde(default)]
    pub aliases: BTreeMap<String, PathBuf>,
    /// Directory for volumes without an alias. Defaults to the directory of
    /// the document containing the link.
    #[serde(default)]
    pub default_dir: Option<PathBuf>,
    /// How deeply macro calls may expand into further macro calls.
    #[serde(default = "default_max_macro_depth")]
    pub max_macro_depth: usize,
    /// How many macro calls one document may expand in total.
    #[serde(default = "default_max_macro_expansions")]
    pub max_macro_expansions: usize,
    /// Only parse linked files starting with `@database` as guides.
    #[serde(default = "default_strict_guides")]
    pub strict_guides: bool,
}

impl PileOptions {
    /// Read options from JSON.
    pub fn from_json(json: &str) -> Result<Self, GuideError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Add an alias for an Amiga volume or assign.
    pub fn with_alias(mut self, volume: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        self.aliases.insert(volume.into(), dir.into());
        self
    }
}

fn default_max_macro_depth() -> usize {
    64
}

fn default_max_macro_expansions() -> usize {
    10_000
}

fn default_strict_guides() -> bool {
    true
}

impl Default for PileOptions {
    fn default() -> Self {
        Self {
            aliases: BTreeMap::new(),
            default_dir: None,
            max_macro_depth: default_max_macro_depth(),
            max_macro_expansions: default_max_macro_expansions(),
            strict_guides: default_strict_guides(),
        }
    }
}
