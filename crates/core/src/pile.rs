//! All guides reachable from a root document through links.

use crate::amiga::{AmigaPaths, find_case_insensitive};
use crate::config::PileOptions;
use crate::error::{Diagnostics, GuideError, Severity, SourceLocation};
use crate::guide::{Guide, LinkState, LinkTarget};
use crate::source::Source;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A set of guides loaded by following links from a root guide.
///
/// Loading happens in two phases. [`GuidePile::add_recursive`] loads guides
/// and marks links into loaded guides as
/// [`LinkState::ValidGuideUncheckedNode`]. [`GuidePile::validate_links`] then
/// checks the target nodes once every guide is complete, which makes links
/// into guides that were still loading, including cycles, work.
#[derive(Debug)]
pub struct GuidePile {
    options: PileOptions,
    paths: AmigaPaths,
    guides: Vec<Guide>,
    index: HashMap<PathBuf, usize>,
    scheduled: Vec<(usize, usize)>,
    diagnostics: Diagnostics,
}

enum Loaded {
    Guide(usize),
    OtherFile,
}

impl GuidePile {
    /// Empty pile.
    pub fn new(options: PileOptions) -> Self {
        Self {
            paths: AmigaPaths::new(&options),
            options,
            guides: Vec::new(),
            index: HashMap::new(),
            scheduled: Vec::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    /// Load `root` and everything it links to, then validate all links.
    pub fn load(root: impl AsRef<Path>, options: PileOptions) -> Result<Self, GuideError> {
        let mut pile = Self::new(options);
        pile.add_recursive(root)?;
        pile.validate_links();
        Ok(pile)
    }

    /// Load the guide at `path` and, recursively, the guides it links to.
    ///
    /// Returns the index of the guide in [`GuidePile::guides`]. Only failing
    /// to read `path` itself is an error; problems with linked files are
    /// reported as diagnostics.
    pub fn add_recursive(&mut self, path: impl AsRef<Path>) -> Result<usize, GuideError> {
        match self.add(path.as_ref(), false)? {
            Loaded::Guide(index) => Ok(index),
            Loaded::OtherFile => Err(GuideError::NotAGuide {
                path: path.as_ref().to_path_buf(),
            }),
        }
    }

    fn add(&mut self, path: &Path, require_database: bool) -> Result<Loaded, GuideError> {
        let canonical = std::fs::canonicalize(path).map_err(|err| GuideError::io(path, err))?;
        if let Some(&index) = self.index.get(&canonical) {
            return Ok(Loaded::Guide(index));
        }

        let source = Source::file(&canonical);
        if require_database && self.options.strict_guides && !source.looks_like_guide()? {
            return Ok(Loaded::OtherFile);
        }

        let guide = Guide::create(source, &self.options, &mut self.diagnostics)?;
        let guide_index = self.guides.len();
        log::info!("loaded guide {}", canonical.display());
        self.guides.push(guide);
        self.index.insert(canonical.clone(), guide_index);

        let targets: Vec<(usize, LinkTarget)> = self.guides[guide_index]
            .links()
            .iter()
            .enumerate()
            .filter_map(|(link_index, link)| Some((link_index, link.target.clone()?)))
            .collect();
        let directory = canonical
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        for (link_index, target) in targets {
            match target {
                LinkTarget::SameFile { node } => {
                    self.resolve(guide_index, link_index, canonical.clone(), node);
                }
                LinkTarget::OtherFile { amiga_path, node } => {
                    self.follow(guide_index, link_index, &amiga_path, node, &directory);
                }
            }
        }
        Ok(Loaded::Guide(guide_index))
    }

    fn follow(
        &mut self,
        guide_index: usize,
        link_index: usize,
        amiga_path: &str,
        node: String,
        directory: &Path,
    ) {
        let location = self.guides[guide_index].links()[link_index].location.clone();
        let resolved = self.paths.resolve(amiga_path, directory);
        if let Some(volume) = &resolved.unresolved_volume {
            self.diagnostics.record(
                location.clone(),
                Severity::Warning,
                format!(
                    "cannot resolve Amiga volume \"{}:\", looking in {}",
                    volume,
                    resolved.path.parent().unwrap_or(directory).display()
                ),
            );
        }
        let file = find_case_insensitive(&resolved.path);

        match self.add(&file, true) {
            Ok(Loaded::Guide(target_index)) => {
                let target_file = self.guide_file(target_index).unwrap_or(file);
                self.resolve(guide_index, link_index, target_file, node);
            }
            Ok(Loaded::OtherFile) => {
                log::warn!("skipped non-guide {}", file.display());
                let link = &mut self.guides[guide_index].links_mut()[link_index];
                link.state = LinkState::ValidOtherFile;
                link.resolved_file = Some(file);
            }
            Err(error) if error.is_not_found() => {
                self.diagnostics.record(
                    location,
                    Severity::Error,
                    format!("ignored link to file that does not exist: \"{}\"", file.display()),
                );
                self.mark_broken(guide_index, link_index, file);
            }
            Err(error) => {
                let raw_target = self.guides[guide_index].links()[link_index].raw_target.clone();
                self.diagnostics.record_with_see_also(
                    location,
                    Severity::Error,
                    format!("cannot read linked file for \"{}\"", raw_target),
                    SourceLocation::with_file(file.display().to_string(), 1, 1),
                    format!("related input/output error: {}", error),
                );
                self.mark_broken(guide_index, link_index, file);
            }
        }
    }

    fn resolve(&mut self, guide_index: usize, link_index: usize, file: PathBuf, node: String) {
        let link = &mut self.guides[guide_index].links_mut()[link_index];
        link.state = LinkState::ValidGuideUncheckedNode;
        link.resolved_file = Some(file);
        link.resolved_node = Some(node);
        self.scheduled.push((guide_index, link_index));
    }

    fn mark_broken(&mut self, guide_index: usize, link_index: usize, file: PathBuf) {
        let link = &mut self.guides[guide_index].links_mut()[link_index];
        link.state = LinkState::Broken;
        link.resolved_file = Some(file);
    }

    fn guide_file(&self, index: usize) -> Option<PathBuf> {
        self.guides[index].source().path().map(Path::to_path_buf)
    }

    /// Check that every link into a loaded guide points to an existing node.
    pub fn validate_links(&mut self) {
        for (guide_index, link_index) in std::mem::take(&mut self.scheduled) {
            let link = &self.guides[guide_index].links()[link_index];
            if link.state != LinkState::ValidGuideUncheckedNode {
                continue;
            }
            let (Some(file), Some(node)) = (link.resolved_file.clone(), link.resolved_node.clone())
            else {
                continue;
            };
            let location = link.location.clone();
            let exists = self
                .index
                .get(&file)
                .is_some_and(|&target| self.guides[target].node(&node).is_some());

            let state = if exists {
                LinkState::Valid
            } else {
                self.diagnostics.record(
                    location,
                    Severity::Error,
                    format!("cannot find node \"{}\" in \"{}\"", node, file.display()),
                );
                LinkState::ValidGuideBrokenNode
            };
            self.guides[guide_index].links_mut()[link_index].state = state;
        }
    }

    /// Guides in the order they were loaded, the root first.
    pub fn guides(&self) -> &[Guide] {
        &self.guides
    }

    /// Guide loaded from `path`.
    pub fn guide(&self, path: impl AsRef<Path>) -> Option<&Guide> {
        let path = path.as_ref();
        let canonical = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        self.index.get(&canonical).map(|&index| &self.guides[index])
    }

    /// The first guide added.
    pub fn root(&self) -> Option<&Guide> {
        self.guides.first()
    }

    /// Options the pile was created with.
    pub fn options(&self) -> &PileOptions {
        &self.options
    }

    /// Resolver for Amiga paths.
    pub fn paths(&self) -> &AmigaPaths {
        &self.paths
    }

    /// Diagnostics of all guides and links.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Take the diagnostics.
    pub fn into_diagnostics(self) -> Diagnostics {
        self.diagnostics
    }
}
