//! git-committers core library.
//!
//! Annotates documentation pages with their git contributors: commit
//! authors are resolved to GitHub profiles through the GraphQL search API,
//! resolutions are memoized and persisted across builds, and each page gets
//! an ordered contributor list plus its last commit date.

pub mod collector;
pub mod config;
pub mod errors;
pub mod git;
pub mod github;
pub mod identity;
pub mod plugin;

// Re-exports for convenience.
pub use collector::{Contribution, PageCollector, PageMeta};
pub use config::PluginConfig;
pub use identity::{AuthorMemo, Identity};
pub use plugin::{CommittersPlugin, PageContext};
