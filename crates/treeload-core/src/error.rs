//! Error types for tree loading.

use std::path::PathBuf;

use thiserror::Error;

/// Boxed error returned by a loader when a file's own content fails.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while loading a tree.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Path not found.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Path exists but is not a directory.
    #[error("Not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A symbolic link leads back into a directory already being loaded.
    #[error("Directory cycle through symlink: {path}")]
    SymlinkCycle { path: PathBuf },

    /// A file was found but its content failed to load.
    #[error("Failed to load {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    /// A configured pattern is malformed.
    #[error(transparent)]
    Pattern(#[from] PatternError),

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl LoadError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            std::io::ErrorKind::NotADirectory => Self::NotADirectory { path },
            _ => Self::Io { path, source },
        }
    }

    /// Wrap a loader failure for `path`.
    pub fn load(path: impl Into<PathBuf>, source: impl Into<BoxError>) -> Self {
        Self::Load {
            path: path.into(),
            source: source.into(),
        }
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// The path this error refers to, if any.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::NotFound { path }
            | Self::NotADirectory { path }
            | Self::PermissionDenied { path }
            | Self::Io { path, .. }
            | Self::SymlinkCycle { path }
            | Self::Load { path, .. } => Some(path),
            Self::Pattern(_) | Self::InvalidConfig { .. } => None,
        }
    }

    /// Whether this error means the path does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Syntax of a pattern that failed to compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum PatternSyntax {
    Regex,
    Glob,
}

/// A malformed include/exclude pattern.
#[derive(Debug, Error)]
#[error("Invalid {syntax} pattern `{pattern}`: {message}")]
pub struct PatternError {
    /// Pattern source text.
    pub pattern: String,
    /// Syntax the pattern was parsed as.
    pub syntax: PatternSyntax,
    /// Parser message.
    pub message: String,
}

impl PatternError {
    /// Create a new pattern error.
    pub fn new(pattern: impl Into<String>, syntax: PatternSyntax, message: impl ToString) -> Self {
        Self {
            pattern: pattern.into(),
            syntax,
            message: message.to_string(),
        }
    }
}
