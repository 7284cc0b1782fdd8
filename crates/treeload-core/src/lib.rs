//! Core types and traits for treeload.
//!
//! This crate provides the data structures shared by the treeload crates:
//! tree nodes, load configuration, name patterns, the [`Loader`] trait and
//! error types.

mod config;
mod error;
mod loader;
mod node;
mod pattern;
mod tree;

pub use config::{LoadConfig, LoadConfigBuilder, LoadConfigBuilderError, LoadOptions, PatternSpec, Transform};
pub use error::{BoxError, LoadError, PatternError, PatternSyntax};
pub use loader::Loader;
pub use node::{Branch, Node};
pub use pattern::{NameMatcher, Pattern};
pub use tree::{LoadedTree, TreeStats};
