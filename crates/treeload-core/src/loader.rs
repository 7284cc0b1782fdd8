//! The load primitive consumed by tree assembly.

use std::path::Path;
use std::sync::Arc;

use crate::error::LoadError;

/// Loads the payload of a single file.
///
/// Implementations decide which files are loadable through
/// [`recognizes`](Loader::recognizes). A loader that must preserve identity
/// across repeated loads of one path (so that the same `Arc` comes back every
/// time) should be wrapped in a caching layer rather than re-reading the file.
pub trait Loader {
    /// Value produced by loading a file.
    type Payload;

    /// Check whether files with this extension (without the dot) are loadable.
    fn recognizes(&self, extension: &str) -> bool;

    /// Load the file at `path`.
    ///
    /// Failures of the file's own content are reported as [`LoadError::Load`].
    fn load(&self, path: &Path) -> Result<Arc<Self::Payload>, LoadError>;
}

impl<L: Loader + ?Sized> Loader for &L {
    type Payload = L::Payload;

    fn recognizes(&self, extension: &str) -> bool {
        (**self).recognizes(extension)
    }

    fn load(&self, path: &Path) -> Result<Arc<Self::Payload>, LoadError> {
        (**self).load(path)
    }
}

impl<L: Loader + ?Sized> Loader for Arc<L> {
    type Payload = L::Payload;

    fn recognizes(&self, extension: &str) -> bool {
        (**self).recognizes(extension)
    }

    fn load(&self, path: &Path) -> Result<Arc<Self::Payload>, LoadError> {
        (**self).load(path)
    }
}
