//! GitHub GraphQL user search client.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use super::{SearchKind, UserSearch};
use crate::config::PluginConfig;
use crate::errors::GitHubError;
use crate::identity::Identity;

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<SearchData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct SearchData {
    search: SearchConnection,
}

#[derive(Debug, Deserialize)]
struct SearchConnection {
    #[serde(default)]
    edges: Vec<SearchEdge>,
}

#[derive(Debug, Deserialize)]
struct SearchEdge {
    node: Option<UserNode>,
}

/// `... on User` yields an empty object for organizations, so every field
/// is optional here.
#[derive(Debug, Deserialize)]
struct UserNode {
    login: Option<String>,
    name: Option<String>,
    url: Option<String>,
}

/// Asynchronous GitHub GraphQL search client.
#[derive(Clone)]
pub struct GraphQlResolver {
    http: reqwest::Client,
    endpoint: String,
    token: Option<String>,
}

impl GraphQlResolver {
    /// Create a resolver for `endpoint`. Without a token every lookup
    /// reports not found and no request is sent.
    pub fn new(endpoint: impl Into<String>, token: Option<String>) -> Self {
        let endpoint = endpoint.into();
        let token = token.filter(|t| !t.is_empty());
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("git-committers/0.1"));
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .expect("failed to build reqwest client");
        info!(endpoint = %endpoint, has_token = token.is_some(), "created GraphQlResolver");
        Self {
            http,
            endpoint,
            token,
        }
    }

    /// Create a resolver from the plugin configuration.
    pub fn from_config(config: &PluginConfig) -> Self {
        Self::new(config.api_endpoint(), config.token().map(str::to_string))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Build the single-field search query for `value`.
    pub fn build_query(kind: SearchKind, value: &str) -> String {
        let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
        format!(
            "{{ search(type:USER, query:\"{} {}\", first:1) {{ edges {{ node {{ ... on User {{ login name url }} }} }} }} }}",
            kind.qualifier(),
            escaped
        )
    }

    /// Run one search and decode the first hit.
    ///
    /// `Ok(None)` is an empty result; `Err` covers transport failures,
    /// non-200 statuses, GraphQL `errors` and undecodable payloads.
    #[instrument(skip(self, token))]
    pub async fn search_user(
        &self,
        token: &str,
        kind: SearchKind,
        value: &str,
    ) -> Result<Option<Identity>, GitHubError> {
        let body = serde_json::json!({ "query": Self::build_query(kind, value) });
        let resp = self
            .http
            .post(&self.endpoint)
            .header(AUTHORIZATION, format!("token {}", token))
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        debug!(status = status.as_u16(), body = %text, "GraphQL response");
        if status != StatusCode::OK {
            return Err(GitHubError::ApiError {
                status: status.as_u16(),
            });
        }

        let parsed: GraphQlResponse =
            serde_json::from_str(&text).map_err(|e| GitHubError::ParseError(e.to_string()))?;
        if let Some(first) = parsed.errors.into_iter().next() {
            return Err(GitHubError::GraphQl(first.message));
        }

        let node = parsed
            .data
            .and_then(|d| d.search.edges.into_iter().next())
            .and_then(|edge| edge.node);
        Ok(match node {
            Some(UserNode {
                login: Some(login),
                name,
                url: Some(url),
            }) => Some(Identity::new(login, name, url)),
            _ => None,
        })
    }
}

impl UserSearch for GraphQlResolver {
    async fn search(&self, kind: SearchKind, value: &str) -> Option<Identity> {
        let token = self.token.as_deref()?;
        match self.search_user(token, kind, value).await {
            Ok(found) => found,
            Err(GitHubError::GraphQl(message)) => {
                warn!(%message, "error from GitHub GraphQL call");
                None
            }
            Err(GitHubError::ApiError { status }) => {
                debug!(status, %kind, value, "search returned non-200 status");
                None
            }
            Err(e) => {
                warn!(error = %e, %kind, value, "GitHub user search failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn user_payload(login: &str, name: Option<&str>) -> serde_json::Value {
        serde_json::json!({
            "data": { "search": { "edges": [
                { "node": { "login": login, "name": name, "url": format!("https://github.com/{login}") } }
            ] } }
        })
    }

    fn resolver_for(server: &MockServer, token: Option<&str>) -> GraphQlResolver {
        GraphQlResolver::new(
            format!("{}/graphql", server.uri()),
            token.map(str::to_string),
        )
    }

    #[test]
    fn test_build_query() {
        let q = GraphQlResolver::build_query(SearchKind::Email, "alice@example.com");
        assert_eq!(
            q,
            "{ search(type:USER, query:\"in:email alice@example.com\", first:1) { edges { node { ... on User { login name url } } } } }"
        );
        let q = GraphQlResolver::build_query(SearchKind::User, "say \"hi\"");
        assert!(q.contains("query:\"in:user say \\\"hi\\\"\""));
    }

    #[test]
    fn test_endpoint_from_config() {
        let config = PluginConfig {
            enterprise_hostname: "ghe.example.com".into(),
            ..Default::default()
        };
        let resolver = GraphQlResolver::from_config(&config);
        assert_eq!(resolver.endpoint(), "https://ghe.example.com/api/graphql");
        assert!(!resolver.has_token());
    }

    #[tokio::test]
    async fn test_search_found() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(header("authorization", "token ghp_test"))
            .and(body_string_contains("in:email alice@example.com"))
            .respond_with(ResponseTemplate::new(200).set_body_json(user_payload("alice", Some("Alice"))))
            .expect(1)
            .mount(&server)
            .await;

        let resolver = resolver_for(&server, Some("ghp_test"));
        let found = resolver
            .search(SearchKind::Email, "alice@example.com")
            .await
            .expect("alice should resolve");
        assert_eq!(found.login, "alice");
        assert_eq!(found.name.as_deref(), Some("Alice"));
        assert_eq!(found.url, "https://github.com/alice");
        assert_eq!(found.avatar, "https://github.com/alice.png");
    }

    #[tokio::test]
    async fn test_search_no_edges() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": { "search": { "edges": [] } }
            })))
            .mount(&server)
            .await;

        let resolver = resolver_for(&server, Some("ghp_test"));
        assert!(resolver.search(SearchKind::User, "nobody").await.is_none());
    }

    #[tokio::test]
    async fn test_search_organization_node_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": { "search": { "edges": [ { "node": {} } ] } }
            })))
            .mount(&server)
            .await;

        let resolver = resolver_for(&server, Some("ghp_test"));
        assert!(resolver.search(SearchKind::User, "acme").await.is_none());
    }

    #[tokio::test]
    async fn test_graphql_errors_are_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "errors": [ { "message": "Something went wrong" } ]
            })))
            .mount(&server)
            .await;

        let resolver = resolver_for(&server, Some("ghp_test"));
        let err = resolver
            .search_user("ghp_test", SearchKind::User, "alice")
            .await
            .unwrap_err();
        assert!(matches!(err, GitHubError::GraphQl(ref m) if m == "Something went wrong"));
        assert!(resolver.search(SearchKind::User, "alice").await.is_none());
    }

    #[tokio::test]
    async fn test_non_200_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "message": "Bad credentials"
            })))
            .mount(&server)
            .await;

        let resolver = resolver_for(&server, Some("bad"));
        let err = resolver
            .search_user("bad", SearchKind::User, "alice")
            .await
            .unwrap_err();
        assert!(matches!(err, GitHubError::ApiError { status: 401 }));
        assert!(resolver.search(SearchKind::User, "alice").await.is_none());
    }

    #[tokio::test]
    async fn test_no_token_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(user_payload("alice", None)))
            .expect(0)
            .mount(&server)
            .await;

        let resolver = resolver_for(&server, None);
        assert!(resolver.search(SearchKind::Email, "alice@example.com").await.is_none());
        assert!(resolver.search(SearchKind::User, "alice").await.is_none());
    }
}
