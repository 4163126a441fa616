//! Build lifecycle driver.
//!
//! A host build calls [`CommittersPlugin`] at three points:
//! - `on_pre_build`: seed the author memo from `authors.json`
//! - `on_page_context`: collect the contributors of one page
//! - `on_post_build`: write the memo back to `authors.json`
//!
//! The plugin owns all state that lives for the duration of a build.

use std::path::Path;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::collector::{PageCollector, PageMeta};
use crate::config::PluginConfig;
use crate::errors::{CacheError, CoreError, GitError};
use crate::git::{CommitHistory, GitClient};
use crate::github::{GraphQlResolver, UserSearch};
use crate::identity::{AuthorMemo, Identity};

/// Context additions for one rendered page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContext {
    pub committers: Vec<Identity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_commit_date: Option<String>,
}

/// Per-build state: configuration, author memo, history source and timer.
pub struct CommittersPlugin<S, H> {
    config: PluginConfig,
    memo: AuthorMemo<S>,
    collector: Option<PageCollector<H>>,
    total_time: Duration,
}

impl CommittersPlugin<GraphQlResolver, GitClient> {
    /// Build the plugin for the repository at `repo_path`.
    ///
    /// When disabled, the repository is not opened. The token is taken as
    /// configured; call [`PluginConfig::resolve_token`] first to honour the
    /// environment fallback.
    pub fn from_config(config: PluginConfig, repo_path: &Path) -> Result<Self, CoreError> {
        if !config.enabled {
            info!("git-committers plugin DISABLED");
            let search = GraphQlResolver::from_config(&config);
            return Ok(Self::disabled(config, search));
        }

        info!("git-committers plugin ENABLED");
        let search = GraphQlResolver::from_config(&config);
        let git = GitClient::open(repo_path, config.branch.clone())?;
        Ok(Self::new(config, search, git))
    }
}

impl<S: UserSearch, H: CommitHistory> CommittersPlugin<S, H> {
    /// Assemble a plugin from its parts. Enablement follows
    /// `config.enabled` alone; `history` is dropped when disabled.
    pub fn new(config: PluginConfig, search: S, history: H) -> Self {
        let collector = config.enabled.then(|| PageCollector::new(history));
        Self {
            config,
            memo: AuthorMemo::new(search),
            collector,
            total_time: Duration::ZERO,
        }
    }

    /// A plugin with no history source. `config.enabled` is forced off, so
    /// no page is collected and the cache is never read or written.
    pub fn disabled(mut config: PluginConfig, search: S) -> Self {
        config.enabled = false;
        Self {
            config,
            memo: AuthorMemo::new(search),
            collector: None,
            total_time: Duration::ZERO,
        }
    }

    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn memo(&self) -> &AuthorMemo<S> {
        &self.memo
    }

    pub fn memo_mut(&mut self) -> &mut AuthorMemo<S> {
        &mut self.memo
    }

    /// Time spent collecting page contributors so far.
    pub fn total_time(&self) -> Duration {
        self.total_time
    }

    /// Load the authors cache, if one exists.
    pub fn on_pre_build(&mut self) -> Result<(), CacheError> {
        if !self.is_enabled() {
            return Ok(());
        }
        let path = self.config.cache_file();
        let count = self.memo.load(&path)?;
        debug!(path = %path.display(), count, "pre-build cache load");
        Ok(())
    }

    /// Collect the contributors of the page at `src_path` (relative to the
    /// docs directory).
    pub async fn on_page_context(
        &mut self,
        src_path: &str,
        meta: &PageMeta,
    ) -> Result<PageContext, GitError> {
        let Some(collector) = self.collector.as_ref() else {
            return Ok(PageContext::default());
        };

        let start = Instant::now();
        let git_path = self.config.git_path(src_path);
        let contribution = collector.collect(&mut self.memo, &git_path, meta).await?;
        self.total_time += start.elapsed();

        Ok(PageContext {
            committers: contribution.committers,
            last_commit_date: contribution.last_commit_date,
        })
    }

    /// Persist the memo to the authors cache.
    pub fn on_post_build(&self) -> Result<(), CacheError> {
        if !self.is_enabled() {
            return Ok(());
        }
        info!(
            total_secs = self.total_time.as_secs_f64(),
            authors = self.memo.len(),
            "git-committers: saving authors cache file"
        );
        self.memo.save(&self.config.cache_file())
    }
}
