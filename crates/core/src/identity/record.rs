//! The resolved profile of a contributor.

use serde::{Deserialize, Serialize};

/// A GitHub user profile resolved from a commit author.
///
/// Serialized with the field names used by the `authors.json` cache.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    /// Platform handle.
    pub login: String,
    /// Display name, if the user set one.
    pub name: Option<String>,
    /// Profile page URL.
    pub url: String,
    /// Avatar image URL.
    pub avatar: String,
}

impl Identity {
    /// Build a record from a profile URL, deriving the avatar URL from it.
    pub fn new(login: impl Into<String>, name: Option<String>, url: impl Into<String>) -> Self {
        let url = url.into();
        let avatar = format!("{}.png", url);
        Self {
            login: login.into(),
            name,
            url,
            avatar,
        }
    }
}
