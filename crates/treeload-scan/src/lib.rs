//! Directory-to-tree loading engine for treeload.
//!
//! This crate walks a directory and assembles every loadable file beneath it
//! into a single [`Branch`], keyed by file and directory names.
//!
//! # Overview
//!
//! - **Enumeration** of one directory level at a time, sorted by name
//! - **Filtering** by extension, include/exclude patterns and recursion
//! - **Assembly** of nested branches, with an optional rename/rewrap hook
//! - **Identity**: a [`ModuleCache`] loads each file once and hands out the
//!   same `Arc` on every later load
//!
//! # Example
//!
//! ```rust,no_run
//! use treeload_scan::{JsonLoader, LoadConfig, ModuleCache, Pattern, load_tree};
//!
//! let cache = ModuleCache::new(JsonLoader);
//! let config = LoadConfig::builder()
//!     .recursive(true)
//!     .exclude_dirs(Pattern::regex("^excluded").unwrap())
//!     .build()
//!     .unwrap();
//!
//! let tree = load_tree("config/modules", &config, &cache).unwrap();
//! for key in tree.keys() {
//!     println!("{key}");
//! }
//! ```

mod assembler;
mod cache;
mod enumerate;
mod filter;
mod loaders;

pub use assembler::{TreeLoader, load_tree};
pub use cache::ModuleCache;
pub use enumerate::{DirEntry, EntryKind, list_directory};
pub use filter::{Decision, Filter, SkipReason};
pub use loaders::{JsonLoader, TextLoader, TomlLoader};

// Re-export core types for convenience
pub use treeload_core::{
    Branch, LoadConfig, LoadError, LoadOptions, LoadedTree, Loader, Node, Pattern, PatternError,
    Transform, TreeStats,
};
