//! Per-entry include/exclude decisions.

use std::path::Path;

use treeload_core::{LoadConfig, Loader};

use crate::enumerate::{DirEntry, EntryKind};

/// Why an entry was left out of the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum SkipReason {
    /// Directory found while not recursing.
    NotRecursive,
    /// File extension not handled by the loader.
    UnrecognizedExtension,
    /// Rejected by an include or exclude pattern.
    Pattern,
    /// The file that requested the load.
    Caller,
    /// Neither a file nor a directory.
    UnsupportedKind,
}

/// Outcome of evaluating one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Include,
    Exclude(SkipReason),
}

impl Decision {
    /// Check if the entry is included.
    pub fn is_include(&self) -> bool {
        matches!(self, Decision::Include)
    }
}

/// Decides which entries of a directory become part of the tree.
pub struct Filter<'a, T, L> {
    config: &'a LoadConfig<T>,
    loader: &'a L,
    caller: Option<&'a Path>,
}

impl<'a, T, L: Loader> Filter<'a, T, L> {
    /// Create a filter. `caller` should already be canonical.
    pub fn new(config: &'a LoadConfig<T>, loader: &'a L, caller: Option<&'a Path>) -> Self {
        Self {
            config,
            loader,
            caller,
        }
    }

    /// Evaluate one entry.
    pub fn evaluate(&self, entry: &DirEntry) -> Decision {
        match entry.kind {
            EntryKind::File => self.evaluate_file(entry),
            EntryKind::Directory => self.evaluate_dir(entry),
            EntryKind::Other => Decision::Exclude(SkipReason::UnsupportedKind),
        }
    }

    fn evaluate_file(&self, entry: &DirEntry) -> Decision {
        if !entry
            .extension()
            .is_some_and(|ext| self.loader.recognizes(ext))
        {
            return Decision::Exclude(SkipReason::UnrecognizedExtension);
        }
        if self.caller.is_some_and(|caller| is_same_file(caller, &entry.path)) {
            return Decision::Exclude(SkipReason::Caller);
        }
        if !self.config.accepts_file_name(&entry.name) {
            return Decision::Exclude(SkipReason::Pattern);
        }
        Decision::Include
    }

    fn evaluate_dir(&self, entry: &DirEntry) -> Decision {
        if !self.config.recursive {
            return Decision::Exclude(SkipReason::NotRecursive);
        }
        if !self.config.accepts_dir_name(&entry.name) {
            return Decision::Exclude(SkipReason::Pattern);
        }
        Decision::Include
    }
}

/// Compare `entry` with an already canonical `caller`, resolving links.
fn is_same_file(caller: &Path, entry: &Path) -> bool {
    caller == entry || entry.canonicalize().is_ok_and(|resolved| resolved == caller)
}
