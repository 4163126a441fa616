//! GitHub user search over the GraphQL API.
//!
//! [`UserSearch`] is the seam the author memo calls through; the production
//! implementation is [`GraphQlResolver`].

pub mod graphql;

use std::fmt;
use std::future::Future;

use crate::identity::Identity;

pub use graphql::GraphQlResolver;

/// Which GitHub search qualifier a lookup uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchKind {
    /// `in:email <value>`
    Email,
    /// `in:user <value>`
    User,
}

impl SearchKind {
    /// The search qualifier prefix.
    pub fn qualifier(self) -> &'static str {
        match self {
            Self::Email => "in:email",
            Self::User => "in:user",
        }
    }
}

impl fmt::Display for SearchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Email => write!(f, "email"),
            Self::User => write!(f, "user"),
        }
    }
}

/// A single stateless user lookup.
///
/// `None` means "not found" for any reason: no match, no token, or a failed
/// request. Implementations do not retry or cache.
pub trait UserSearch {
    fn search(
        &self,
        kind: SearchKind,
        value: &str,
    ) -> impl Future<Output = Option<Identity>> + Send;
}
