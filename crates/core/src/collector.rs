//! Per-page contributor collection.
//!
//! [`PageCollector`] turns the history of one documentation page into an
//! ordered, de-duplicated list of GitHub profiles plus the date of the most
//! recent commit.

use std::collections::HashSet;

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::errors::GitError;
use crate::git::CommitHistory;
use crate::github::UserSearch;
use crate::identity::{normalize_email, AuthorMemo, Identity};

/// Page metadata the collector reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    /// Comma-separated GitHub user names credited in addition to committers.
    #[serde(default)]
    pub contributors: Option<String>,
}

impl PageMeta {
    pub fn with_contributors(contributors: impl Into<String>) -> Self {
        Self {
            contributors: Some(contributors.into()),
        }
    }

    /// Declared contributor names, trimmed, in listed order.
    pub fn contributor_names(&self) -> Vec<&str> {
        self.contributors
            .as_deref()
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Contributors of one page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Contribution {
    /// Unique profiles, most recent committer first, then declared
    /// contributors.
    pub committers: Vec<Identity>,
    /// `YYYY-MM-DD` (UTC) of the newest commit, if the page has history.
    pub last_commit_date: Option<String>,
}

/// Collects page contributors from a [`CommitHistory`].
pub struct PageCollector<H> {
    history: H,
}

impl<H: CommitHistory> PageCollector<H> {
    pub fn new(history: H) -> Self {
        Self { history }
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    /// Collect the contributors of the repository path `path`.
    ///
    /// Authors that cannot be resolved are left out. Only a failure to read
    /// the history itself is an error.
    #[instrument(skip(self, memo, meta))]
    pub async fn collect<S: UserSearch>(
        &self,
        memo: &mut AuthorMemo<S>,
        path: &str,
        meta: &PageMeta,
    ) -> Result<Contribution, GitError> {
        let commits = self.history.commits_for_path(path)?;

        let mut result = Contribution {
            committers: Vec::new(),
            last_commit_date: commits.first().and_then(|c| format_date(c.authored_at)),
        };
        let mut seen = HashSet::new();

        for commit in &commits {
            let email = normalize_email(&commit.author_email);
            let resolved = memo
                .resolve_author(Some(commit.author_name.as_str()), Some(email.as_str()))
                .await;
            if let Some((key, identity)) = resolved {
                if seen.insert(key) {
                    result.committers.push(identity);
                }
            }
        }

        for name in meta.contributor_names() {
            match memo.resolve_author(Some(name), None).await {
                Some((key, identity)) => {
                    debug!(name, "declared contributor found");
                    if seen.insert(key) {
                        result.committers.push(identity);
                    }
                }
                None => debug!(name, "declared contributor not found"),
            }
        }

        debug!(
            path,
            logins = ?result.committers.iter().map(|c| c.login.as_str()).collect::<Vec<_>>(),
            "contributors for page"
        );
        Ok(result)
    }
}

/// Format a Unix timestamp as a UTC calendar date.
pub fn format_date(timestamp: i64) -> Option<String> {
    DateTime::from_timestamp(timestamp, 0).map(|dt| dt.format("%Y-%m-%d").to_string())
}
