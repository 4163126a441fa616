//! Local Git repository history via `git2`.

use std::path::{Path, PathBuf};

use git2::{BranchType, Commit, Oid, Repository, Sort, Tree};
use tracing::{debug, info, instrument, warn};

use super::{CommitHistory, CommitRecord};
use crate::errors::GitError;

/// Read-only view of a repository's history on one branch.
pub struct GitClient {
    repo: Repository,
    repo_path: PathBuf,
    branch: String,
}

impl GitClient {
    /// Open an existing Git repository at `repo_path`, walking `branch`.
    pub fn open<P: AsRef<Path>>(repo_path: P, branch: impl Into<String>) -> Result<Self, GitError> {
        let path = repo_path.as_ref();
        let branch = branch.into();
        info!(path = %path.display(), branch = %branch, "opening git repository");
        let repo = Repository::open(path)
            .map_err(|_| GitError::RepositoryNotFound(path.display().to_string()))?;
        Ok(Self {
            repo,
            repo_path: path.to_path_buf(),
            branch,
        })
    }

    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// Resolve the commit history is walked from: the configured branch,
    /// falling back to `HEAD` when the branch does not exist.
    pub fn start_commit(&self) -> Result<Oid, GitError> {
        match self.repo.find_branch(&self.branch, BranchType::Local) {
            Ok(branch) => return Ok(branch.get().peel_to_commit()?.id()),
            Err(e) => warn!(branch = %self.branch, error = %e, "branch not found, using HEAD"),
        }
        self.repo
            .head()
            .and_then(|head| head.peel_to_commit())
            .map(|commit| commit.id())
            .map_err(|_| GitError::RefNotFound(self.branch.clone()))
    }

    /// Walk the history of `path`, newest first.
    #[instrument(skip(self))]
    pub fn history_for_path(&self, path: &str) -> Result<Vec<CommitRecord>, GitError> {
        let start = match self.start_commit() {
            Ok(oid) => oid,
            Err(GitError::RefNotFound(branch)) => {
                warn!(branch = %branch, "repository has no commits to walk");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        let mut revwalk = self.repo.revwalk()?;
        revwalk.push(start)?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;

        let target = Path::new(path);
        let mut commits = Vec::new();
        for oid_result in revwalk {
            let commit = self.repo.find_commit(oid_result?)?;
            if !touches_path(&commit, target)? {
                continue;
            }
            let author = commit.author();
            commits.push(CommitRecord {
                sha: commit.id().to_string(),
                author_name: author.name().unwrap_or("").to_string(),
                author_email: author.email().unwrap_or("").to_string(),
                authored_at: author.when().seconds(),
            });
        }
        debug!(path, count = commits.len(), "collected path history");
        Ok(commits)
    }
}

impl CommitHistory for GitClient {
    fn commits_for_path(&self, path: &str) -> Result<Vec<CommitRecord>, GitError> {
        self.history_for_path(path)
    }
}

fn entry_id(tree: &Tree<'_>, path: &Path) -> Option<Oid> {
    tree.get_path(path).ok().map(|entry| entry.id())
}

/// Whether `commit` changed `path` relative to every parent. A root commit
/// touches the path if it contains it.
fn touches_path(commit: &Commit<'_>, path: &Path) -> Result<bool, GitError> {
    let current = entry_id(&commit.tree()?, path);
    if commit.parent_count() == 0 {
        return Ok(current.is_some());
    }
    for parent in commit.parents() {
        if entry_id(&parent.tree()?, path) == current {
            return Ok(false);
        }
    }
    Ok(true)
}
