//! Author identity resolution for commit authors.
//!
//! A commit author (name and email) is resolved to a GitHub profile in
//! this order:
//! 1. The in-memory [`AuthorMemo`], seeded from `authors.json`
//! 2. Search by email, then the email string as a user handle
//! 3. Search by the author name as a user handle
//!
//! Only successful lookups are memoized; misses are retried every time.

pub mod cache_file;
pub mod email;
pub mod memo;
pub mod record;

pub use cache_file::AuthorsCache;
pub use email::normalize_email;
pub use memo::AuthorMemo;
pub use record::Identity;
