use std::path::PathBuf;
use thiserror::Error;

/// Source location information for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceLocation {
    /// Optional full name of the source (absolute path or synthetic id).
    pub file: Option<String>,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

impl SourceLocation {
    /// Create a new source location
    pub fn new(line: usize, column: usize) -> Self {
        Self {
            file: None,
            line,
            column,
        }
    }

    /// Create a source location with file information
    pub fn with_file(file: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            file: Some(file.into()),
            line,
            column,
        }
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(file) = &self.file {
            write!(f, "{}:{}:{}", file, self.line, self.column)
        } else {
            write!(f, "{}:{}", self.line, self.column)
        }
    }
}

/// Errors that abort loading a document.
///
/// Everything wrong *inside* a document is reported as a [`Diagnostic`]
/// instead; only failing to read the input at all ends up here.
#[derive(Debug, Error)]
pub enum GuideError {
    /// The input could not be opened or read.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The file exists but does not look like an Amigaguide document.
    #[error("not an Amigaguide document: {}", path.display())]
    NotAGuide {
        /// Path of the rejected file.
        path: PathBuf,
    },
    /// Options could not be deserialized.
    #[error("invalid options: {0}")]
    Options(#[from] serde_json::Error),
}

impl GuideError {
    /// Create an I/O error for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the error means the file does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Something was rejected or could not be resolved.
    Error,
    /// Something was repaired.
    Warning,
    /// Informational note, nothing was changed.
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        };
        f.write_str(text)
    }
}

/// A non-fatal problem found while processing a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Where the problem was found.
    pub location: SourceLocation,
    /// How serious it is.
    pub severity: Severity,
    /// Human readable message.
    pub message: String,
    /// Related location, for example the first of two duplicates.
    pub see_also: Option<Box<Diagnostic>>,
}

impl Diagnostic {
    /// Create a new diagnostic without a related location.
    pub fn new(location: SourceLocation, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            location,
            severity,
            message: message.into(),
            see_also: None,
        }
    }

    /// Attach a related location.
    pub fn with_see_also(mut self, location: SourceLocation, message: impl Into<String>) -> Self {
        self.see_also = Some(Box::new(Diagnostic::new(
            location,
            Severity::Info,
            message,
        )));
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}: {}", self.location, self.severity, self.message)?;
        if let Some(see_also) = &self.see_also {
            write!(f, "; see also: {}: {}", see_also.location, see_also.message)?;
        }
        Ok(())
    }
}

/// Accumulating sink for diagnostics of one top-level invocation.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create a new empty diagnostics collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fully built diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        log::debug!("{}", diagnostic);
        self.items.push(diagnostic);
    }

    /// Add a diagnostic at `location`.
    pub fn record(
        &mut self,
        location: SourceLocation,
        severity: Severity,
        message: impl Into<String>,
    ) {
        self.push(Diagnostic::new(location, severity, message));
    }

    /// Add a diagnostic at `location` that refers to a related location.
    pub fn record_with_see_also(
        &mut self,
        location: SourceLocation,
        severity: Severity,
        message: impl Into<String>,
        related: SourceLocation,
        related_message: impl Into<String>,
    ) {
        self.push(Diagnostic::new(location, severity, message).with_see_also(related, related_message));
    }

    /// All diagnostics in the order they were recorded.
    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.items.iter()
    }

    /// Number of diagnostics recorded.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if no diagnostics have been recorded
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of diagnostics with the given severity.
    pub fn count(&self, severity: Severity) -> usize {
        self.items
            .iter()
            .filter(|diagnostic| diagnostic.severity == severity)
            .count()
    }

    /// Whether any recorded message contains `needle`.
    pub fn contains_message(&self, needle: &str) -> bool {
        self.items.iter().any(|d| d.message.contains(needle))
    }

    /// Diagnostics ordered by file, line and column.
    pub fn sorted(&self) -> Vec<&Diagnostic> {
        let mut result: Vec<&Diagnostic> = self.items.iter().collect();
        result.sort_by(|a, b| a.location.cmp(&b.location));
        result
    }

    /// Move all diagnostics of `other` into this collection.
    pub fn extend(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
