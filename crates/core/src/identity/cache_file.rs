//! JSON-based author cache reader/writer.
//!
//! The cache file maps author keys (normalized emails or user names) to
//! resolved profiles:
//!
//! ```json
//! {
//!   "alice@example.com": {
//!     "login": "alice",
//!     "name": "Alice Smith",
//!     "url": "https://github.com/alice",
//!     "avatar": "https://github.com/alice.png"
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, info};

use super::record::Identity;
use crate::errors::CacheError;

/// Author key -> resolved profile.
pub type AuthorMap = BTreeMap<String, Identity>;

/// Utilities for loading and saving the authors cache file.
pub struct AuthorsCache;

impl AuthorsCache {
    /// Load the cache file if it exists.
    ///
    /// A missing file yields `None`. A file that exists but does not parse
    /// is an error.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Option<AuthorMap>, CacheError> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "no authors cache file");
            return Ok(None);
        }

        info!(path = %path.display(), "loading authors cache file");
        let contents = std::fs::read_to_string(path)?;
        let authors: AuthorMap =
            serde_json::from_str(&contents).map_err(|e| CacheError::Malformed {
                path: path.display().to_string(),
                detail: e.to_string(),
            })?;

        debug!(count = authors.len(), "loaded cached authors");
        Ok(Some(authors))
    }

    /// Write the whole map to disk, creating the parent directory if needed.
    pub fn save<P: AsRef<Path>>(path: P, authors: &AuthorMap) -> Result<(), CacheError> {
        let path = path.as_ref();
        info!(path = %path.display(), "saving authors cache file");

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string(authors).map_err(|e| CacheError::Serialize(e.to_string()))?;
        std::fs::write(path, json)?;

        debug!(count = authors.len(), "saved cached authors");
        Ok(())
    }
}
