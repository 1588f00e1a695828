//! reqwest-backed [`UpstreamClient`] for a GitHub-style REST API.

use std::fmt;

use async_trait::async_trait;
use http::{header::ACCEPT, HeaderValue};
use serde_json::Value;
use toolgate_toolsets::{ScopeFilter, UpstreamClient, UpstreamError, UpstreamRequest};
use tracing::{debug, info, warn};
use url::Url;

const SCOPES_HEADER: &str = "x-oauth-scopes";
const ACCEPT_JSON: &str = "application/vnd.github+json";

#[derive(Clone)]
pub struct HttpUpstream {
    client: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl fmt::Debug for HttpUpstream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpUpstream")
            .field("base_url", &self.base_url.as_str())
            .field("authenticated", &self.token.is_some())
            .finish()
    }
}

impl HttpUpstream {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, UpstreamError> {
        // Url::join drops the last path segment unless the base ends with '/'
        let mut base = base_url.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url =
            Url::parse(&base).map_err(|e| UpstreamError::Transport(format!("{}: {}", base, e)))?;

        let client = reqwest::Client::builder()
            .user_agent(concat!("toolgate/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            token: token.filter(|t| !t.is_empty()),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url, UpstreamError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| UpstreamError::Transport(format!("invalid path '{}': {}", path, e)))
    }

    fn request(&self, method: http::Method, url: Url) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .request(method, url)
            .header(ACCEPT, HeaderValue::from_static(ACCEPT_JSON));
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// Read the token's granted scopes from the `X-OAuth-Scopes` header.
    ///
    /// `None` when the upstream does not report scopes (e.g. fine-grained
    /// tokens).
    pub async fn fetch_scopes(&self) -> Result<Option<String>, UpstreamError> {
        let response = self
            .request(http::Method::GET, self.url("user")?)
            .send()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::status(status.as_u16(), error_message(&body)));
        }

        Ok(response
            .headers()
            .get(SCOPES_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string))
    }

    /// Scope filter for this token. Falls back to no filtering when the
    /// scopes cannot be determined.
    pub async fn scope_filter(&self) -> ScopeFilter {
        if self.token.is_none() {
            debug!("No upstream token, scope filtering disabled");
            return ScopeFilter::unrestricted();
        }
        match self.fetch_scopes().await {
            Ok(Some(header)) => {
                let filter = ScopeFilter::from_header(&header);
                info!(scopes = %header, "Discovered token scopes");
                filter
            }
            Ok(None) => {
                info!("Token reports no OAuth scopes, scope filtering disabled");
                ScopeFilter::unrestricted()
            }
            Err(e) => {
                warn!("Failed to fetch token scopes, scope filtering disabled: {}", e);
                ScopeFilter::unrestricted()
            }
        }
    }
}

/// Prefer the API's `message` field over the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

#[async_trait]
impl UpstreamClient for HttpUpstream {
    async fn send(&self, request: UpstreamRequest) -> Result<Value, UpstreamError> {
        let url = self.url(&request.path)?;
        debug!(method = %request.method, url = %url, "Upstream request");

        let mut builder = self.request(request.method.clone(), url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        if !status.is_success() {
            let body = String::from_utf8_lossy(&bytes);
            return Err(UpstreamError::status(status.as_u16(), error_message(&body)));
        }
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|e| UpstreamError::InvalidResponse(e.to_string()))
    }
}
