//! Local Git history access.
//!
//! The collector only needs the commits that touched one path, newest
//! first; [`CommitHistory`] is that seam and [`GitClient`] implements it
//! over `git2`.

pub mod client;

use serde::{Deserialize, Serialize};

use crate::errors::GitError;

pub use client::GitClient;

/// The author-side facts of one commit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommitRecord {
    pub sha: String,
    pub author_name: String,
    pub author_email: String,
    /// Authored time, seconds since the Unix epoch.
    pub authored_at: i64,
}

/// Source of per-path commit history.
pub trait CommitHistory {
    /// Commits that touched `path`, most recent first. A path with no
    /// history yields an empty list.
    fn commits_for_path(&self, path: &str) -> Result<Vec<CommitRecord>, GitError>;
}
