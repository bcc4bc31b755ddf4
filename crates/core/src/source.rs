//! Named, line-readable inputs.
//!
//! A [`Source`] is either a file on disk or a synthetic in-memory buffer, for
//! example the text a macro call expands to. Items and diagnostics refer to
//! their source through a shared [`Arc`].

use crate::error::GuideError;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Origin {
    File(PathBuf),
    Memory(String),
}

/// An immutable, named input that can be read line by line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    name: String,
    origin: Origin,
}

impl Source {
    /// A source backed by the file at `path`.
    pub fn file(path: impl Into<PathBuf>) -> Arc<Self> {
        let path = path.into();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Arc::new(Self {
            name,
            origin: Origin::File(path),
        })
    }

    /// A synthetic source holding `text`.
    pub fn memory(name: impl Into<String>, text: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            origin: Origin::Memory(text.into()),
        })
    }

    /// Short name: the file name, or the synthetic id.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full name used to identify the source in diagnostics.
    pub fn full_name(&self) -> String {
        match &self.origin {
            Origin::File(path) => absolute(path).to_string_lossy().into_owned(),
            Origin::Memory(_) => self.name.clone(),
        }
    }

    /// Path of a file source.
    pub fn path(&self) -> Option<&Path> {
        match &self.origin {
            Origin::File(path) => Some(path),
            Origin::Memory(_) => None,
        }
    }

    /// Directory relative links of this source are resolved against.
    pub fn directory(&self) -> PathBuf {
        match &self.origin {
            Origin::File(path) => absolute(path)
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
            Origin::Memory(_) => std::env::current_dir().unwrap_or_default(),
        }
    }

    /// Read the whole source as text.
    ///
    /// Files are decoded as ISO-8859-1, the encoding of AmigaOS text files.
    pub fn read_text(&self) -> Result<String, GuideError> {
        match &self.origin {
            Origin::File(path) => {
                let bytes = std::fs::read(path).map_err(|err| GuideError::io(path, err))?;
                Ok(decode_latin1(&bytes))
            }
            Origin::Memory(text) => Ok(text.clone()),
        }
    }

    /// Read the source split into lines without their terminators.
    pub fn read_lines(&self) -> Result<Vec<String>, GuideError> {
        Ok(split_lines(&self.read_text()?))
    }

    /// Whether the first non-blank line is a `@database` command.
    pub fn looks_like_guide(&self) -> Result<bool, GuideError> {
        let text = self.read_text()?;
        let first = split_lines(&text)
            .into_iter()
            .find(|line| !line.trim().is_empty());
        Ok(match first {
            Some(line) => line
                .trim_start()
                .get(.."@database".len())
                .is_some_and(|head| head.eq_ignore_ascii_case("@database")),
            None => false,
        })
    }
}

/// Decode ISO-8859-1 bytes; every byte maps to the code point of the same value.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Split text at `\n`, `\r\n` or `\r`. A trailing terminator does not start
/// another line.
pub fn split_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();
    let mut pending = false;

    while let Some(ch) = chars.next() {
        match ch {
            '\n' => {
                lines.push(std::mem::take(&mut current));
                pending = false;
            }
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                lines.push(std::mem::take(&mut current));
                pending = false;
            }
            _ => {
                current.push(ch);
                pending = true;
            }
        }
    }
    if pending {
        lines.push(current);
    }
    lines
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|dir| dir.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_all_line_terminators() {
        assert_eq!(split_lines("a\nb\r\nc\rd"), vec!["a", "b", "c", "d"]);
        assert_eq!(split_lines("a\n"), vec!["a"]);
        assert_eq!(split_lines("a\n\n"), vec!["a", ""]);
        assert!(split_lines("").is_empty());
    }

    #[test]
    fn decodes_latin1() {
        assert_eq!(decode_latin1(&[0x41, 0xe4, 0xa9]), "A\u{e4}\u{a9}");
    }

    #[test]
    fn memory_source_sniffs_database() {
        let guide = Source::memory("a", "\n  @DataBase test\n@node main\n");
        assert!(guide.looks_like_guide().unwrap());
        let other = Source::memory("b", "just some text\n");
        assert!(!other.looks_like_guide().unwrap());
    }

    #[test]
    fn missing_file_is_not_found() {
        let source = Source::file("/definitely/not/here.guide");
        let error = source.read_lines().unwrap_err();
        assert!(error.is_not_found());
        assert_eq!(source.name(), "here.guide");
    }
}
