//! Built-in file loaders.
//!
//! These read a file fresh on every call. Put them behind a
//! [`ModuleCache`](crate::ModuleCache) when repeated loads must return the
//! same payload.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use compact_str::CompactString;
use treeload_core::{LoadError, Loader};

/// Loads `.json` files as [`serde_json::Value`].
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLoader;

impl Loader for JsonLoader {
    type Payload = serde_json::Value;

    fn recognizes(&self, extension: &str) -> bool {
        extension == "json"
    }

    fn load(&self, path: &Path) -> Result<Arc<Self::Payload>, LoadError> {
        let bytes = fs::read(path).map_err(|e| LoadError::io(path, e))?;
        let value = serde_json::from_slice(&bytes).map_err(|e| LoadError::load(path, e))?;
        Ok(Arc::new(value))
    }
}

/// Loads `.toml` files as [`serde_json::Value`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlLoader;

impl Loader for TomlLoader {
    type Payload = serde_json::Value;

    fn recognizes(&self, extension: &str) -> bool {
        extension == "toml"
    }

    fn load(&self, path: &Path) -> Result<Arc<Self::Payload>, LoadError> {
        let text = fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
        let value = toml::from_str(&text).map_err(|e| LoadError::load(path, e))?;
        Ok(Arc::new(value))
    }
}

/// Loads files with any of a set of extensions as UTF-8 text.
#[derive(Debug, Clone)]
pub struct TextLoader {
    extensions: Vec<CompactString>,
}

impl TextLoader {
    /// Create a loader for the given extensions, written without the dot.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<CompactString>,
    {
        Self {
            extensions: extensions.into_iter().map(Into::into).collect(),
        }
    }

    /// Extensions this loader accepts.
    pub fn extensions(&self) -> &[CompactString] {
        &self.extensions
    }
}

impl Default for TextLoader {
    fn default() -> Self {
        Self::new(["txt"])
    }
}

impl Loader for TextLoader {
    type Payload = String;

    fn recognizes(&self, extension: &str) -> bool {
        self.extensions.iter().any(|ext| ext == extension)
    }

    fn load(&self, path: &Path) -> Result<Arc<Self::Payload>, LoadError> {
        let bytes = fs::read(path).map_err(|e| LoadError::io(path, e))?;
        let text = String::from_utf8(bytes).map_err(|e| LoadError::load(path, e))?;
        Ok(Arc::new(text))
    }
}
