//! Loaded tree container and statistics.

use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

use crate::node::Branch;

/// Summary statistics for one tree load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeStats {
    /// Number of files loaded into the tree.
    pub files_loaded: u64,
    /// Number of directories enumerated (root included).
    pub dirs_visited: u64,
    /// Number of entries excluded by filtering.
    pub entries_skipped: u64,
    /// Number of insertions that replaced an existing key.
    pub key_collisions: u64,
    /// Maximum directory depth reached (root is 0).
    pub max_depth: u32,
}

impl TreeStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a loaded file.
    pub fn record_file(&mut self) {
        self.files_loaded += 1;
    }

    /// Record an enumerated directory.
    pub fn record_dir(&mut self, depth: u32) {
        self.dirs_visited += 1;
        self.max_depth = self.max_depth.max(depth);
    }

    /// Record an excluded entry.
    pub fn record_skip(&mut self) {
        self.entries_skipped += 1;
    }

    /// Record a key overwrite.
    pub fn record_collision(&mut self) {
        self.key_collisions += 1;
    }
}

/// Complete loaded tree with metadata.
#[derive(Debug)]
pub struct LoadedTree<T> {
    /// Root mapping of the tree.
    pub root: Branch<T>,

    /// Root path that was loaded.
    pub root_path: PathBuf,

    /// When this load was performed.
    pub loaded_at: SystemTime,

    /// Duration of the load.
    pub load_duration: Duration,

    /// Summary statistics.
    pub stats: TreeStats,
}

impl<T> LoadedTree<T> {
    /// Create a new loaded tree.
    pub fn new(root: Branch<T>, root_path: PathBuf, stats: TreeStats, load_duration: Duration) -> Self {
        Self {
            root,
            root_path,
            loaded_at: SystemTime::now(),
            load_duration,
            stats,
        }
    }

    /// Discard metadata and keep the root mapping.
    pub fn into_root(self) -> Branch<T> {
        self.root
    }

    /// Get the total number of loaded files.
    pub fn files_loaded(&self) -> u64 {
        self.stats.files_loaded
    }

    /// Check if nothing was loaded at the top level.
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }
}
