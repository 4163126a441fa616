//! Error types for the git-committers core library.
//!
//! Each subsystem has its own error type derived with `thiserror`, and a
//! top-level [`CoreError`] enum unifies them all for callers that want a
//! single error type.
//!
//! "Author not found" is never an error: lookups return `Option` at every
//! layer. These types cover the failures that actually abort a hook.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Unified error type for the entire core library.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    GitHub(#[from] GitHubError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Cache(#[from] CacheError),
}

// ---------------------------------------------------------------------------
// Git errors
// ---------------------------------------------------------------------------

/// Errors from local Git repository operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// The repository path does not exist or is not a git repo.
    #[error("git repository not found at '{0}'")]
    RepositoryNotFound(String),

    /// A `git2` library error.
    #[error("git2 error: {0}")]
    Git2Error(#[from] git2::Error),

    /// Neither the configured branch nor `HEAD` could be resolved to a commit.
    #[error("git ref not found: {0}")]
    RefNotFound(String),
}

// ---------------------------------------------------------------------------
// GitHub errors
// ---------------------------------------------------------------------------

/// Errors from the GitHub GraphQL endpoint.
///
/// The resolver logs these and reports the lookup as not found; they are
/// exposed so the lower-level request path can be tested on its own.
#[derive(Debug, Error)]
pub enum GitHubError {
    /// HTTP-level transport error (network, TLS, etc.).
    #[error("GitHub HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The endpoint returned a non-200 status code.
    #[error("GitHub API error (HTTP {status})")]
    ApiError { status: u16 },

    /// The payload carried a top-level `errors` array.
    #[error("error from GitHub GraphQL call: {0}")]
    GraphQl(String),

    /// JSON deserialization failure.
    #[error("GitHub response parse error: {0}")]
    ParseError(String),
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors from configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file not found.
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// TOML parse error.
    #[error("configuration parse error: {0}")]
    ParseError(String),

    /// A config value is invalid.
    #[error("invalid configuration value for '{field}': {detail}")]
    InvalidValue { field: String, detail: String },

    /// Generic I/O error reading the config file.
    #[error("configuration I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Cache errors
// ---------------------------------------------------------------------------

/// Errors from reading or writing the persisted authors cache.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The cache file exists but is not a valid author map.
    #[error("authors cache at '{path}' is malformed: {detail}")]
    Malformed { path: String, detail: String },

    /// Serializing the in-memory map failed.
    #[error("failed to serialize authors cache: {0}")]
    Serialize(String),

    /// Generic I/O error.
    #[error("authors cache I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
