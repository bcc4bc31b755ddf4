//! Mapping Amiga paths to local files.
//!
//! Amiga paths look like `Volume:dir/file`. A leading `/` refers to the
//! parent directory, `//` inside a path climbs one directory and file names
//! are case-insensitive.

use crate::config::PileOptions;
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

/// Result of resolving an Amiga path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    /// Local path.
    pub path: PathBuf,
    /// Volume that had no alias and fell back to the default directory.
    pub unresolved_volume: Option<String>,
}

/// Resolver for Amiga paths using a table of volume aliases.
#[derive(Debug, Clone, Default)]
pub struct AmigaPaths {
    aliases: BTreeMap<String, PathBuf>,
    default_dir: Option<PathBuf>,
}

impl AmigaPaths {
    /// Resolver using the aliases and default directory of `options`.
    pub fn new(options: &PileOptions) -> Self {
        Self {
            aliases: options.aliases.clone(),
            default_dir: options.default_dir.clone(),
        }
    }

    /// Local directory for `volume`, ignoring case.
    pub fn alias(&self, volume: &str) -> Option<&Path> {
        self.aliases
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(volume))
            .map(|(_, dir)| dir.as_path())
    }

    /// Resolve `amiga_path` relative to `current_dir`.
    pub fn resolve(&self, amiga_path: &str, current_dir: &Path) -> ResolvedPath {
        let mut unresolved_volume = None;
        let (mut result, rest) = match amiga_path.split_once(':') {
            Some((volume, rest)) => match self.alias(volume) {
                Some(dir) => (dir.to_path_buf(), rest),
                None => {
                    unresolved_volume = Some(volume.to_string());
                    let fallback = self.default_dir.as_deref().unwrap_or(current_dir);
                    (fallback.to_path_buf(), rest)
                }
            },
            None => (current_dir.to_path_buf(), amiga_path),
        };

        let relative = rest.trim_start_matches('/');
        for _ in 0..rest.len() - relative.len() {
            result.pop();
        }

        let mut segment = String::new();
        let mut last_was_slash = false;
        for ch in relative.chars() {
            if ch == '/' {
                if last_was_slash {
                    result.pop();
                } else {
                    result.push(std::mem::take(&mut segment));
                    last_was_slash = true;
                }
            } else {
                last_was_slash = false;
                segment.push(ch);
            }
        }
        if last_was_slash {
            result.pop();
        } else if !segment.is_empty() {
            result.push(segment);
        }

        ResolvedPath {
            path: result,
            unresolved_volume,
        }
    }
}

/// `path` itself if it exists, otherwise the path whose components match
/// existing directory entries ignoring case. Components without a match are
/// kept as they are.
pub fn find_case_insensitive(path: &Path) -> PathBuf {
    if path.exists() {
        return path.to_path_buf();
    }
    let mut result = PathBuf::new();
    for component in path.components() {
        let Component::Normal(name) = component else {
            result.push(component);
            continue;
        };
        let candidate = result.join(name);
        if candidate.exists() {
            result = candidate;
            continue;
        }
        let wanted = name.to_string_lossy().to_lowercase();
        let dir = if result.as_os_str().is_empty() {
            Path::new(".")
        } else {
            result.as_path()
        };
        let found = std::fs::read_dir(dir).ok().and_then(|entries| {
            entries
                .filter_map(Result::ok)
                .map(|entry| entry.file_name())
                .find(|entry| entry.to_string_lossy().to_lowercase() == wanted)
        });
        match found {
            Some(actual) => result.push(actual),
            None => result.push(name),
        }
    }
    result
}
