//! treeload - load every file under a directory into one nested tree.
//!
//! Each loadable file becomes a leaf keyed by its name without extension, and
//! each subdirectory becomes a nested [`Branch`] keyed by its verbatim name.
//!
//! ```rust,no_run
//! use treeload::prelude::*;
//!
//! let config = LoadConfig::builder()
//!     .recursive(true)
//!     .exclude_dirs(Pattern::regex("^excluded").unwrap())
//!     .build()
//!     .unwrap();
//!
//! let modules = load_tree("modules", &config, JsonLoader).unwrap();
//! if let Some(module5) = modules.lookup(["dir.a.b.c", "module5"]) {
//!     println!("{}", serde_json::to_string(module5).unwrap());
//! }
//! ```
//!
//! See [`treeload_scan`] for the traversal engine and [`treeload_core`] for
//! the shared types.

pub use treeload_core::{
    BoxError, Branch, LoadConfig, LoadConfigBuilder, LoadConfigBuilderError, LoadError,
    LoadOptions, LoadedTree, Loader, NameMatcher, Node, Pattern, PatternError, PatternSpec,
    PatternSyntax, Transform, TreeStats,
};
pub use treeload_scan::{
    Decision, DirEntry, EntryKind, Filter, JsonLoader, ModuleCache, SkipReason, TextLoader,
    TomlLoader, TreeLoader, list_directory, load_tree,
};

/// Commonly used items.
pub mod prelude {
    pub use treeload_core::{
        Branch, LoadConfig, LoadError, LoadOptions, Loader, Node, Pattern, Transform,
    };
    pub use treeload_scan::{
        JsonLoader, ModuleCache, TextLoader, TomlLoader, TreeLoader, load_tree,
    };
}
