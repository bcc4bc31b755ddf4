#![deny(missing_docs)]
//! Amigaguide core: tokenizer, item model, tag registry, document pipeline
//! and cross-document link resolution.

/// Amiga path resolution.
pub mod amiga;
/// Loading options.
pub mod config;
/// Core error and diagnostic types.
pub mod error;
/// Parsed documents, their nodes and links.
pub mod guide;
/// The item model.
pub mod item;
/// Guides linked from a root document.
pub mod pile;
/// Reading items from a source.
pub mod reader;
/// Named inputs.
pub mod source;
/// Tag and link type registry.
pub mod tags;
/// Single line tokenizer.
pub mod tokenizer;

pub use amiga::{AmigaPaths, ResolvedPath, find_case_insensitive};
pub use config::PileOptions;
pub use error::{Diagnostic, Diagnostics, GuideError, Severity, SourceLocation};
pub use guide::{DatabaseInfo, Font, Guide, Link, LinkState, LinkTarget, NodeInfo, Wrap};
pub use item::{Command, Item, ItemKind, ItemLocation, write_pretty};
pub use pile::GuidePile;
pub use source::Source;
pub use tags::{OptionType, Scope, TagPool, TagSpec, Version};
pub use tokenizer::{LineTokenizer, Token, TokenKind, TokenizerState};
