//! TOML-based configuration for the committers plugin.
//!
//! The options mirror the host build configuration's plugin block. The API
//! token may be left empty in the file and supplied through the
//! `MKDOCS_GIT_COMMITTERS_APIKEY` environment variable instead; see
//! [`PluginConfig::resolve_token`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::ConfigError;

/// Environment variable consulted when `token` is empty.
pub const TOKEN_ENV_VAR: &str = "MKDOCS_GIT_COMMITTERS_APIKEY";

/// Public GitHub GraphQL endpoint, used unless `enterprise_hostname` is set.
pub const DEFAULT_API_ENDPOINT: &str = "https://api.github.com/graphql";

/// File name of the persisted author map inside `cache_dir`.
pub const AUTHORS_CACHE_FILE: &str = "authors.json";

/// Plugin options recognized from the host build configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PluginConfig {
    /// GitHub Enterprise host name. Empty means github.com.
    #[serde(default)]
    pub enterprise_hostname: String,

    /// Repository in `owner/repo` format. Accepted but not used for lookups.
    #[serde(default)]
    pub repository: String,

    /// Branch whose history is walked (default `master`).
    #[serde(default = "default_branch")]
    pub branch: String,

    /// Prefix prepended to each page's source path before the history lookup.
    #[serde(default = "default_docs_path")]
    pub docs_path: String,

    /// GitHub token. Falls back to [`TOKEN_ENV_VAR`] when empty.
    #[serde(default)]
    pub token: String,

    /// Master switch for the whole plugin.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Directory holding `authors.json`.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
}

fn default_branch() -> String {
    "master".into()
}
fn default_docs_path() -> String {
    "docs/".into()
}
fn default_true() -> bool {
    true
}
fn default_cache_dir() -> PathBuf {
    PathBuf::from(".cache/plugin/git-committers")
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            enterprise_hostname: String::new(),
            repository: String::new(),
            branch: default_branch(),
            docs_path: default_docs_path(),
            token: String::new(),
            enabled: true,
            cache_dir: default_cache_dir(),
        }
    }
}

impl PluginConfig {
    /// Load a [`PluginConfig`] from a TOML file at the given path.
    ///
    /// This does **not** consult the environment -- call
    /// [`resolve_token`](Self::resolve_token) afterwards.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading configuration");

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let contents = std::fs::read_to_string(path)?;
        let config: PluginConfig =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        debug!("configuration parsed successfully");
        Ok(config)
    }

    /// Fill an empty `token` from [`TOKEN_ENV_VAR`].
    ///
    /// A missing token is not an error: remote resolution is disabled and a
    /// warning is logged. Does nothing when the plugin is disabled.
    pub fn resolve_token(&mut self) {
        if !self.enabled {
            return;
        }
        if self.token.is_empty() {
            match std::env::var(TOKEN_ENV_VAR) {
                Ok(val) if !val.is_empty() => {
                    debug!(env_name = TOKEN_ENV_VAR, "resolved token from environment");
                    self.token = val;
                }
                _ => {}
            }
        }
        if self.token.is_empty() {
            warn!(
                env_name = TOKEN_ENV_VAR,
                "no git token provided and environment variable is not defined"
            );
        }
    }

    /// The configured token, if any.
    pub fn token(&self) -> Option<&str> {
        if self.token.is_empty() {
            None
        } else {
            Some(&self.token)
        }
    }

    /// The GraphQL endpoint derived from `enterprise_hostname`.
    pub fn api_endpoint(&self) -> String {
        if self.enterprise_hostname.is_empty() {
            DEFAULT_API_ENDPOINT.to_string()
        } else {
            format!("https://{}/api/graphql", self.enterprise_hostname)
        }
    }

    /// Full path of the persisted author map.
    pub fn cache_file(&self) -> PathBuf {
        self.cache_dir.join(AUTHORS_CACHE_FILE)
    }

    /// Repository-relative path of a page, given its path under the docs dir.
    pub fn git_path(&self, src_path: &str) -> String {
        format!("{}{}", self.docs_path, src_path)
    }

    /// Validate that the values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.branch.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "branch".into(),
                detail: "branch must not be empty".into(),
            });
        }
        if self.enterprise_hostname.contains('/') {
            return Err(ConfigError::InvalidValue {
                field: "enterprise_hostname".into(),
                detail: "expected a bare host name, not a URL".into(),
            });
        }
        if !self.repository.is_empty() && !self.repository.contains('/') {
            return Err(ConfigError::InvalidValue {
                field: "repository".into(),
                detail: "repository must be in 'owner/repo' format".into(),
            });
        }
        Ok(())
    }

    /// Convenience: load, resolve the token, and validate in one call.
    pub fn load_and_resolve<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut config = Self::load_from_file(path)?;
        config.resolve_token();
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_toml() -> &'static str {
        r#"
enterprise_hostname = "github.example.com"
repository = "acme/docs"
branch = "main"
docs_path = "site/docs/"
token = "ghp_inline"
enabled = true
cache_dir = "/tmp/committers-cache"
"#
    }

    #[test]
    fn test_parse_full_config() {
        let config: PluginConfig = toml::from_str(sample_toml()).expect("failed to parse toml");
        assert_eq!(config.branch, "main");
        assert_eq!(config.docs_path, "site/docs/");
        assert_eq!(config.token(), Some("ghp_inline"));
        assert_eq!(config.api_endpoint(), "https://github.example.com/api/graphql");
        assert_eq!(
            config.cache_file(),
            PathBuf::from("/tmp/committers-cache/authors.json")
        );
    }

    #[test]
    fn test_defaults() {
        let config: PluginConfig = toml::from_str("").unwrap();
        assert_eq!(config.enterprise_hostname, "");
        assert_eq!(config.repository, "");
        assert_eq!(config.branch, "master");
        assert_eq!(config.docs_path, "docs/");
        assert!(config.enabled);
        assert_eq!(config.api_endpoint(), DEFAULT_API_ENDPOINT);
        assert_eq!(
            config.cache_file(),
            PathBuf::from(".cache/plugin/git-committers/authors.json")
        );
        assert_eq!(config.git_path("guide/index.md"), "docs/guide/index.md");
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result: Result<PluginConfig, _> = toml::from_str("brnach = \"main\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("committers.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(sample_toml().as_bytes()).unwrap();

        let config = PluginConfig::load_from_file(&path).expect("load_from_file failed");
        assert_eq!(config.repository, "acme/docs");
    }

    #[test]
    fn test_file_not_found() {
        let result = PluginConfig::load_from_file("/nonexistent/committers.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_validate_rejects_url_hostname() {
        let config = PluginConfig {
            enterprise_hostname: "https://github.example.com".into(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "enterprise_hostname"
        ));
    }

    #[test]
    fn test_resolve_token_from_env() {
        std::env::set_var(TOKEN_ENV_VAR, "ghp_from_env");

        let mut config = PluginConfig::default();
        config.resolve_token();
        assert_eq!(config.token(), Some("ghp_from_env"));

        // An explicit token wins over the environment.
        let mut config = PluginConfig {
            token: "ghp_inline".into(),
            ..Default::default()
        };
        config.resolve_token();
        assert_eq!(config.token(), Some("ghp_inline"));

        // A disabled plugin never consults the environment.
        let mut config = PluginConfig {
            enabled: false,
            ..Default::default()
        };
        config.resolve_token();
        assert_eq!(config.token(), None);

        std::env::remove_var(TOKEN_ENV_VAR);
    }
}
