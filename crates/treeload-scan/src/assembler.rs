//! Recursive tree assembly.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use compact_str::CompactString;
use tracing::{debug, trace};

use treeload_core::{Branch, LoadConfig, LoadError, LoadedTree, Loader, Node, TreeStats};

use crate::enumerate::{DirEntry, EntryKind, list_directory};
use crate::filter::{Decision, Filter};

/// Key of the file that stands in for its directory with `index_as_parent`.
const INDEX_KEY: &str = "index";

/// Builds trees of loaded files using a single [`Loader`].
pub struct TreeLoader<L> {
    loader: L,
}

impl<L: Loader> TreeLoader<L> {
    /// Create a tree loader.
    pub fn new(loader: L) -> Self {
        Self { loader }
    }

    /// Get the underlying loader.
    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Load every matching file under `root` into a tree.
    pub fn load(
        &self,
        root: impl AsRef<Path>,
        config: &LoadConfig<L::Payload>,
    ) -> Result<LoadedTree<L::Payload>, LoadError> {
        let start = Instant::now();
        let root = root.as_ref();
        let root_path = canonical_or_given(root);
        let caller = config.caller.as_deref().map(canonical_or_given);

        let mut assembly = Assembly {
            loader: &self.loader,
            config,
            filter: Filter::new(config, &self.loader, caller.as_deref()),
            stats: TreeStats::new(),
            ancestors: Vec::new(),
        };
        let root_branch = assembly.assemble(&root_path, 0)?.branch;
        let stats = assembly.stats;

        let load_duration = start.elapsed();
        debug!(
            root = %root_path.display(),
            files = stats.files_loaded,
            dirs = stats.dirs_visited,
            skipped = stats.entries_skipped,
            elapsed_ms = load_duration.as_millis() as u64,
            "tree loaded"
        );

        Ok(LoadedTree::new(root_branch, root_path, stats, load_duration))
    }
}

/// Load every matching file under `root` and return the root mapping.
///
/// Pass a [`ModuleCache`](crate::ModuleCache) by reference to keep payload
/// identity with direct loads of the same files.
pub fn load_tree<L: Loader>(
    root: impl AsRef<Path>,
    config: &LoadConfig<L::Payload>,
    loader: L,
) -> Result<Branch<L::Payload>, LoadError> {
    TreeLoader::new(loader)
        .load(root, config)
        .map(LoadedTree::into_root)
}

/// State of one traversal.
struct Assembly<'a, L: Loader> {
    loader: &'a L,
    config: &'a LoadConfig<L::Payload>,
    filter: Filter<'a, L::Payload, L>,
    stats: TreeStats,
    /// Canonical directories on the current recursion path.
    ancestors: Vec<PathBuf>,
}

/// One assembled directory level.
struct Assembled<T> {
    branch: Branch<T>,
    index: Option<Arc<T>>,
}

impl<T> Assembled<T> {
    fn empty() -> Self {
        Self {
            branch: Branch::new(),
            index: None,
        }
    }

    fn into_node(self) -> Node<T> {
        match self.index {
            Some(index) => Node::Leaf(index),
            None => Node::Branch(self.branch),
        }
    }
}

impl<L: Loader> Assembly<'_, L> {
    fn assemble(&mut self, dir: &Path, depth: u32) -> Result<Assembled<L::Payload>, LoadError> {
        let entries = match list_directory(dir) {
            Ok(entries) => entries,
            Err(err) if self.is_missing_dir(&err, dir) => {
                debug!(dir = %dir.display(), "directory missing, using empty branch");
                return Ok(Assembled::empty());
            }
            Err(err) => return Err(err),
        };
        let canonical = canonical_or_given(dir);
        if self.ancestors.contains(&canonical) {
            return Err(LoadError::SymlinkCycle {
                path: dir.to_path_buf(),
            });
        }
        self.ancestors.push(canonical);
        let assembled = self.assemble_entries(dir, depth, entries);
        self.ancestors.pop();
        assembled
    }

    /// Only the directory itself being absent is tolerated.
    fn is_missing_dir(&self, err: &LoadError, dir: &Path) -> bool {
        !self.config.throw_no_dir && err.is_not_found() && err.path().is_some_and(|p| p == dir)
    }

    fn assemble_entries(
        &mut self,
        dir: &Path,
        depth: u32,
        entries: Vec<DirEntry>,
    ) -> Result<Assembled<L::Payload>, LoadError> {
        self.stats.record_dir(depth);
        debug!(dir = %dir.display(), depth, entries = entries.len(), "assembling directory");

        let mut assembled = Assembled::empty();
        for entry in entries {
            if let Decision::Exclude(reason) = self.filter.evaluate(&entry) {
                trace!(path = %entry.path.display(), %reason, "skipping entry");
                self.stats.record_skip();
                continue;
            }

            let key = entry.key();
            let (key, node) = match entry.kind {
                EntryKind::File => {
                    let payload = self.loader.load(&entry.path)?;
                    self.stats.record_file();
                    if self.config.index_as_parent && depth > 0 && key == INDEX_KEY {
                        assembled.index = Some(Arc::clone(&payload));
                    }
                    self.transform(key, Node::Leaf(payload))
                }
                EntryKind::Directory => {
                    let child = self.assemble(&entry.path, depth + 1)?.into_node();
                    if self.config.map_dirs {
                        self.transform(key, child)
                    } else {
                        (key, child)
                    }
                }
                EntryKind::Other => continue,
            };

            self.insert(&mut assembled.branch, dir, key, node);
        }

        Ok(assembled)
    }

    fn transform(
        &self,
        key: CompactString,
        node: Node<L::Payload>,
    ) -> (CompactString, Node<L::Payload>) {
        match &self.config.map {
            Some(map) => map.apply(key, node),
            None => (key, node),
        }
    }

    /// Later entries win on key collisions.
    fn insert(
        &mut self,
        branch: &mut Branch<L::Payload>,
        dir: &Path,
        key: CompactString,
        node: Node<L::Payload>,
    ) {
        if branch.contains_key(&key) {
            debug!(dir = %dir.display(), key = %key, "duplicate key, replacing earlier entry");
            self.stats.record_collision();
        }
        branch.insert(key, node);
    }
}

/// Canonical form of `path` when it exists.
pub(crate) fn canonical_or_given(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
