//! Load configuration types.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use compact_str::CompactString;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::{LoadError, PatternError};
use crate::node::Node;
use crate::pattern::Pattern;

type MapFn<T> = dyn Fn(CompactString, Node<T>) -> (CompactString, Node<T>) + Send + Sync;

/// Caller-supplied hook that may rename an entry and replace its value
/// before it is inserted into the tree.
pub struct Transform<T> {
    f: Arc<MapFn<T>>,
}

impl<T> Transform<T> {
    /// Create a transform from a function of `(name, value)`.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(CompactString, Node<T>) -> (CompactString, Node<T>) + Send + Sync + 'static,
    {
        Self { f: Arc::new(f) }
    }

    /// Create a transform that only renames keys.
    pub fn rename<F>(f: F) -> Self
    where
        F: Fn(&str) -> CompactString + Send + Sync + 'static,
    {
        Self::new(move |name, value| (f(&name), value))
    }

    /// Apply the transform to one entry.
    pub fn apply(&self, name: CompactString, value: Node<T>) -> (CompactString, Node<T>) {
        (self.f)(name, value)
    }
}

impl<T> Clone for Transform<T> {
    fn clone(&self) -> Self {
        Self {
            f: Arc::clone(&self.f),
        }
    }
}

impl<T> fmt::Debug for Transform<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Transform(..)")
    }
}

/// Configuration for one tree load. Every option defaults to off.
#[derive(Debug, Builder)]
#[builder(pattern = "owned", setter(into), build_fn(validate = "Self::validate"))]
pub struct LoadConfig<T> {
    /// Descend into subdirectories.
    #[builder(default = "false")]
    pub recursive: bool,

    /// Only load files whose name matches.
    #[builder(setter(into, strip_option), default)]
    pub include_files: Option<Pattern>,

    /// Never load files whose name matches.
    #[builder(setter(into, strip_option), default)]
    pub exclude_files: Option<Pattern>,

    /// Only descend into directories whose name matches.
    #[builder(setter(into, strip_option), default)]
    pub include_dirs: Option<Pattern>,

    /// Never descend into directories whose name matches.
    #[builder(setter(into, strip_option), default)]
    pub exclude_dirs: Option<Pattern>,

    /// Rename or rewrap each accepted entry before insertion.
    #[builder(setter(into, strip_option), default)]
    pub map: Option<Transform<T>>,

    /// Also pass directory branches through `map`.
    #[builder(default = "false")]
    pub map_dirs: bool,

    /// File that requested the load; it is never part of the tree.
    #[builder(setter(into, strip_option), default)]
    pub caller: Option<PathBuf>,

    /// Fail when a directory does not exist (otherwise it yields an empty branch).
    #[builder(default = "true")]
    pub throw_no_dir: bool,

    /// Represent a subdirectory holding an `index` file by that file's payload.
    #[builder(default = "false")]
    pub index_as_parent: bool,
}

impl<T> LoadConfigBuilder<T> {
    fn validate(&self) -> Result<(), String> {
        if let Some(Some(caller)) = &self.caller {
            if caller.as_os_str().is_empty() {
                return Err("Caller path cannot be empty".to_string());
            }
        }
        if self.map_dirs == Some(true) && !matches!(self.map, Some(Some(_))) {
            return Err("map_dirs requires a map transform".to_string());
        }
        if self.index_as_parent == Some(true) && self.recursive != Some(true) {
            return Err("index_as_parent requires recursive".to_string());
        }
        Ok(())
    }
}

impl<T> LoadConfig<T> {
    /// Create a new load config builder.
    pub fn builder() -> LoadConfigBuilder<T> {
        LoadConfigBuilder::default()
    }

    /// Create a config with every option off.
    pub fn new() -> Self {
        Self {
            recursive: false,
            include_files: None,
            exclude_files: None,
            include_dirs: None,
            exclude_dirs: None,
            map: None,
            map_dirs: false,
            caller: None,
            throw_no_dir: true,
            index_as_parent: false,
        }
    }

    /// Create a config that descends into every subdirectory.
    pub fn recursive() -> Self {
        Self {
            recursive: true,
            ..Self::new()
        }
    }

    /// Check a file name against the file include/exclude patterns.
    pub fn accepts_file_name(&self, name: &str) -> bool {
        passes(self.include_files.as_ref(), self.exclude_files.as_ref(), name)
    }

    /// Check a directory name against the directory include/exclude patterns.
    pub fn accepts_dir_name(&self, name: &str) -> bool {
        passes(self.include_dirs.as_ref(), self.exclude_dirs.as_ref(), name)
    }
}

fn passes(include: Option<&Pattern>, exclude: Option<&Pattern>, name: &str) -> bool {
    include.is_none_or(|p| p.is_match(name)) && !exclude.is_some_and(|p| p.is_match(name))
}

impl<T> Default for LoadConfig<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for LoadConfig<T> {
    fn clone(&self) -> Self {
        Self {
            recursive: self.recursive,
            include_files: self.include_files.clone(),
            exclude_files: self.exclude_files.clone(),
            include_dirs: self.include_dirs.clone(),
            exclude_dirs: self.exclude_dirs.clone(),
            map: self.map.clone(),
            map_dirs: self.map_dirs,
            caller: self.caller.clone(),
            throw_no_dir: self.throw_no_dir,
            index_as_parent: self.index_as_parent,
        }
    }
}

impl From<LoadConfigBuilderError> for LoadError {
    fn from(err: LoadConfigBuilderError) -> Self {
        LoadError::invalid_config(err.to_string())
    }
}

/// Serializable form of a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternSpec {
    /// Regular expression.
    Regex(String),
    /// Single glob.
    Glob(String),
    /// Any of several globs.
    Globs(Vec<String>),
}

impl PatternSpec {
    /// Compile into a [`Pattern`].
    pub fn compile(&self) -> Result<Pattern, PatternError> {
        match self {
            PatternSpec::Regex(source) => Pattern::regex(source),
            PatternSpec::Glob(source) => Pattern::glob(source),
            PatternSpec::Globs(sources) => Pattern::globs(sources),
        }
    }
}

/// Declarative load options, e.g. read from a TOML file.
///
/// ```toml
/// recursive = true
/// include_files = { glob = "*.json" }
/// exclude_dirs = { regex = "^excluded" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    pub recursive: bool,
    pub include_files: Option<PatternSpec>,
    pub exclude_files: Option<PatternSpec>,
    pub include_dirs: Option<PatternSpec>,
    pub exclude_dirs: Option<PatternSpec>,
    pub caller: Option<PathBuf>,
    #[serde(default = "default_true")]
    pub throw_no_dir: bool,
    pub index_as_parent: bool,
}

fn default_true() -> bool {
    true
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            recursive: false,
            include_files: None,
            exclude_files: None,
            include_dirs: None,
            exclude_dirs: None,
            caller: None,
            throw_no_dir: true,
            index_as_parent: false,
        }
    }
}

impl LoadOptions {
    /// Parse options from TOML.
    pub fn from_toml(source: &str) -> Result<Self, LoadError> {
        toml::from_str(source).map_err(|e| LoadError::invalid_config(e.to_string()))
    }

    /// Render options as TOML.
    pub fn to_toml(&self) -> Result<String, LoadError> {
        toml::to_string(self).map_err(|e| LoadError::invalid_config(e.to_string()))
    }

    /// Compile every pattern and build a [`LoadConfig`].
    pub fn into_config<T>(self) -> Result<LoadConfig<T>, LoadError> {
        let mut builder = LoadConfig::builder()
            .recursive(self.recursive)
            .throw_no_dir(self.throw_no_dir)
            .index_as_parent(self.index_as_parent);
        if let Some(spec) = &self.include_files {
            builder = builder.include_files(spec.compile()?);
        }
        if let Some(spec) = &self.exclude_files {
            builder = builder.exclude_files(spec.compile()?);
        }
        if let Some(spec) = &self.include_dirs {
            builder = builder.include_dirs(spec.compile()?);
        }
        if let Some(spec) = &self.exclude_dirs {
            builder = builder.exclude_dirs(spec.compile()?);
        }
        if let Some(caller) = self.caller {
            builder = builder.caller(caller);
        }
        Ok(builder.build()?)
    }
}
