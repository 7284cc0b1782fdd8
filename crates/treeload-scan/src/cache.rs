//! Path-keyed module cache preserving payload identity.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use treeload_core::{LoadError, Loader};

/// Memoizing wrapper around a [`Loader`].
///
/// Each canonical path is loaded at most once; every later load of the same
/// file, through a tree or directly, returns the identical `Arc`. Entries are
/// never evicted. Wrap the cache in a `static` (for example with
/// `std::sync::LazyLock`) to share it across the whole process.
pub struct ModuleCache<L: Loader> {
    loader: L,
    modules: DashMap<PathBuf, Arc<L::Payload>>,
}

impl<L: Loader> ModuleCache<L> {
    /// Create an empty cache in front of `loader`.
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            modules: DashMap::new(),
        }
    }

    /// Get a cached payload without loading.
    pub fn get(&self, path: &Path) -> Option<Arc<L::Payload>> {
        let key = path.canonicalize().ok()?;
        self.modules.get(&key).map(|entry| Arc::clone(entry.value()))
    }

    /// Check if a path has been loaded.
    pub fn contains(&self, path: &Path) -> bool {
        self.get(path).is_some()
    }

    /// Get the number of cached modules.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Check if nothing has been loaded yet.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Get the wrapped loader.
    pub fn inner(&self) -> &L {
        &self.loader
    }
}

impl<L: Loader + Default> Default for ModuleCache<L> {
    fn default() -> Self {
        Self::new(L::default())
    }
}

impl<L: Loader + fmt::Debug> fmt::Debug for ModuleCache<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleCache")
            .field("loader", &self.loader)
            .field("modules", &self.modules.len())
            .finish()
    }
}

impl<L: Loader> Loader for ModuleCache<L> {
    type Payload = L::Payload;

    fn recognizes(&self, extension: &str) -> bool {
        self.loader.recognizes(extension)
    }

    fn load(&self, path: &Path) -> Result<Arc<Self::Payload>, LoadError> {
        let key = path.canonicalize().map_err(|e| LoadError::io(path, e))?;
        if let Some(hit) = self.modules.get(&key) {
            return Ok(Arc::clone(hit.value()));
        }

        // Loaders may be reentrant, so no shard lock is held while loading.
        let payload = self.loader.load(&key)?;
        let entry = self.modules.entry(key).or_insert(payload);
        Ok(Arc::clone(entry.value()))
    }
}
