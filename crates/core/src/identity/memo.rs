//! Process-lifetime memo of resolved commit authors.
//!
//! [`AuthorMemo`] decides which searches to run for a commit author and
//! remembers every successful resolution under a single author key.

use std::path::Path;

use tracing::{debug, info};

use super::cache_file::{AuthorMap, AuthorsCache};
use super::record::Identity;
use crate::errors::CacheError;
use crate::github::{SearchKind, UserSearch};

/// Author key -> profile memo in front of a [`UserSearch`].
///
/// Entries are never removed or overwritten. Failed lookups are not
/// recorded, so the same miss is searched again every time it is seen.
pub struct AuthorMemo<S> {
    authors: AuthorMap,
    search: S,
}

impl<S: UserSearch> AuthorMemo<S> {
    /// Create an empty memo.
    pub fn new(search: S) -> Self {
        Self::with_authors(search, AuthorMap::new())
    }

    /// Create a memo seeded with previously resolved authors.
    pub fn with_authors(search: S, authors: AuthorMap) -> Self {
        Self { authors, search }
    }

    /// Replace the memo contents with the cache file at `path`, if present.
    ///
    /// Returns the number of entries loaded; a missing file leaves the memo
    /// untouched and returns 0.
    pub fn load(&mut self, path: &Path) -> Result<usize, CacheError> {
        match AuthorsCache::load(path)? {
            Some(authors) => {
                let count = authors.len();
                self.authors = authors;
                info!(count, "loaded authors cache");
                Ok(count)
            }
            None => Ok(0),
        }
    }

    /// Write the entire memo to `path`.
    pub fn save(&self, path: &Path) -> Result<(), CacheError> {
        AuthorsCache::save(path, &self.authors)
    }

    pub fn get(&self, key: &str) -> Option<&Identity> {
        self.authors.get(key)
    }

    pub fn authors(&self) -> &AuthorMap {
        &self.authors
    }

    pub fn len(&self) -> usize {
        self.authors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.authors.is_empty()
    }

    pub fn searcher(&self) -> &S {
        &self.search
    }

    /// Resolve a commit author to `(author key, profile)`.
    ///
    /// If either the username or the email is already a key, that entry is
    /// returned without searching (the username wins when both are). Otherwise
    /// the searches run in order:
    /// 1. email as `in:email`
    /// 2. email as `in:user`
    /// 3. username as `in:user`
    ///
    /// A hit is stored under the email when one was given, else under the
    /// username. Empty strings count as absent.
    pub async fn resolve_author(
        &mut self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Option<(String, Identity)> {
        let username = username.filter(|u| !u.is_empty());
        let email = email.filter(|e| !e.is_empty());

        let known = [username, email]
            .into_iter()
            .flatten()
            .find(|key| self.authors.contains_key(*key));
        if let Some(key) = known {
            debug!(key, "author already known");
            return self
                .authors
                .get(key)
                .map(|identity| (key.to_string(), identity.clone()));
        }

        let mut found = None;
        if let Some(email) = email {
            debug!(email, "looking for email");
            found = self.search.search(SearchKind::Email, email).await;
            if found.is_none() {
                debug!(email, "looking for email as user");
                found = self.search.search(SearchKind::User, email).await;
            }
        }
        if found.is_none() {
            if let Some(username) = username {
                debug!(username, "looking for user");
                found = self.search.search(SearchKind::User, username).await;
            }
        }

        let Some(identity) = found else {
            debug!(?username, ?email, "author not found");
            return None;
        };
        let key = email.or(username)?.to_string();
        debug!(key = %key, login = %identity.login, "registered author");
        let stored = self
            .authors
            .entry(key.clone())
            .or_insert(identity)
            .clone();
        Some((key, stored))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::testing::FakeSearch;

    #[tokio::test]
    async fn test_both_absent_is_not_found() {
        let mut memo = AuthorMemo::new(FakeSearch::new());
        assert!(memo.resolve_author(None, None).await.is_none());
        assert!(memo.resolve_author(Some(""), Some("")).await.is_none());
        assert_eq!(memo.searcher().call_count(), 0);
    }

    #[tokio::test]
    async fn test_email_hit_stored_under_email() {
        let search = FakeSearch::new().with_hit(SearchKind::Email, "alice@example.com", "alice");
        let mut memo = AuthorMemo::new(search);

        let (key, identity) = memo
            .resolve_author(Some("Alice Smith"), Some("alice@example.com"))
            .await
            .unwrap();
        assert_eq!(key, "alice@example.com");
        assert_eq!(identity.login, "alice");
        assert_eq!(memo.searcher().call_count(), 1);
        assert!(memo.get("Alice Smith").is_none());
    }

    #[tokio::test]
    async fn test_fallback_order() {
        let search = FakeSearch::new().with_hit(SearchKind::User, "bob", "bob");
        let mut memo = AuthorMemo::new(search);

        let (key, identity) = memo
            .resolve_author(Some("bob"), Some("bob@corp.example"))
            .await
            .unwrap();
        assert_eq!(key, "bob@corp.example");
        assert_eq!(identity.login, "bob");
        assert_eq!(
            memo.searcher().calls(),
            vec![
                (SearchKind::Email, "bob@corp.example".to_string()),
                (SearchKind::User, "bob@corp.example".to_string()),
                (SearchKind::User, "bob".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_email_tried_as_user_handle() {
        // A normalized noreply address is a bare handle.
        let search = FakeSearch::new().with_hit(SearchKind::User, "carol", "carol");
        let mut memo = AuthorMemo::new(search);

        let (key, _) = memo.resolve_author(Some("Carol"), Some("carol")).await.unwrap();
        assert_eq!(key, "carol");
        assert_eq!(memo.searcher().call_count(), 2);
    }

    #[tokio::test]
    async fn test_username_only_stored_under_username() {
        let search = FakeSearch::new().with_hit(SearchKind::User, "dave", "dave");
        let mut memo = AuthorMemo::new(search);

        let (key, _) = memo.resolve_author(Some("dave"), None).await.unwrap();
        assert_eq!(key, "dave");
        assert_eq!(memo.searcher().calls(), vec![(SearchKind::User, "dave".to_string())]);
    }

    #[tokio::test]
    async fn test_known_key_skips_search() {
        let search = FakeSearch::new().with_hit(SearchKind::Email, "alice@example.com", "alice");
        let mut memo = AuthorMemo::new(search);

        memo.resolve_author(Some("Alice"), Some("alice@example.com")).await.unwrap();
        for _ in 0..3 {
            let (key, identity) = memo
                .resolve_author(Some("Alice"), Some("alice@example.com"))
                .await
                .unwrap();
            assert_eq!(key, "alice@example.com");
            assert_eq!(identity.login, "alice");
        }
        // A new username paired with a known email resolves to the known entry.
        let (key, _) = memo
            .resolve_author(Some("A. Smith"), Some("alice@example.com"))
            .await
            .unwrap();
        assert_eq!(key, "alice@example.com");
        assert_eq!(memo.searcher().call_count(), 1);
    }

    #[tokio::test]
    async fn test_username_key_wins_when_both_known() {
        let mut authors = AuthorMap::new();
        authors.insert("eve".into(), Identity::new("eve", None, "https://github.com/eve"));
        authors.insert(
            "eve@example.com".into(),
            Identity::new("eve-work", None, "https://github.com/eve-work"),
        );
        let mut memo = AuthorMemo::with_authors(FakeSearch::new(), authors);

        let (key, identity) = memo
            .resolve_author(Some("eve"), Some("eve@example.com"))
            .await
            .unwrap();
        assert_eq!(key, "eve");
        assert_eq!(identity.login, "eve");
        assert_eq!(memo.searcher().call_count(), 0);
    }

    #[tokio::test]
    async fn test_misses_are_retried() {
        let mut memo = AuthorMemo::new(FakeSearch::new());

        assert!(memo.resolve_author(Some("ghost"), None).await.is_none());
        assert!(memo.resolve_author(Some("ghost"), None).await.is_none());
        assert_eq!(memo.searcher().call_count(), 2);
        assert!(memo.is_empty());
    }

    #[tokio::test]
    async fn test_load_and_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache/authors.json");
        let search = FakeSearch::new()
            .with_hit(SearchKind::Email, "alice@example.com", "alice")
            .with_hit(SearchKind::User, "bob", "bob");
        let mut memo = AuthorMemo::new(search);
        memo.resolve_author(None, Some("alice@example.com")).await.unwrap();
        memo.resolve_author(Some("bob"), None).await.unwrap();
        memo.save(&path).unwrap();

        let mut reloaded = AuthorMemo::new(FakeSearch::new());
        assert_eq!(reloaded.load(&path).unwrap(), 2);
        assert_eq!(reloaded.authors(), memo.authors());

        let (_, identity) = reloaded.resolve_author(Some("bob"), None).await.unwrap();
        assert_eq!(identity.login, "bob");
        assert_eq!(reloaded.searcher().call_count(), 0);
    }

    #[test]
    fn test_load_missing_keeps_entries() {
        let mut authors = AuthorMap::new();
        authors.insert("x".into(), Identity::new("x", None, "https://github.com/x"));
        let mut memo = AuthorMemo::with_authors(FakeSearch::new(), authors);

        assert_eq!(memo.load(Path::new("/nonexistent/authors.json")).unwrap(), 0);
        assert_eq!(memo.len(), 1);
    }
}
