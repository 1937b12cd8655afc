//! Authenticated request gateway.
//!
//! Every backend call flows through [`Gateway::execute`], which:
//! - attaches the stored access token as a bearer header, except on the
//!   login and register paths which never carry one
//! - drops query parameters whose value is `None`, so optional filters
//!   disappear from the URL instead of arriving as empty strings
//! - on a 401, refreshes the token pair once and retries the request once
//!   with the new access token; a second 401 is returned to the caller
//! - folds non-success statuses into [`ApiError`] with the backend's
//!   `detail` message extracted from the body
//!
//! Refresh is single-flight: concurrent 401s coalesce on one refresh call
//! and the losers reuse the pair the winner stored. A failed refresh tears
//! the session down (tokens cleared, session logged out) before the error
//! is propagated.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::ApiError;
use crate::models::TokenPair;
use crate::session::SessionStore;
use crate::tokens::TokenStore;

/// Paths that never carry a bearer token and never trigger refresh handling.
const EXEMPT_PATHS: &[&str] = &["/auth/login", "/auth/register"];

/// Token refresh endpoint. Called directly by the refresh routine; a failure
/// here is terminal and never re-enters the 401 handling.
const REFRESH_PATH: &str = "/auth/refresh";

/// A request to the backend, relative to the configured base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, Option<String>)>,
    headers: Vec<(String, String)>,
    body: Option<Value>,
    cancel: Option<CancellationToken>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        ApiRequest {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
            cancel: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    /// Adds a query parameter. A `None` value is dropped from the URL
    /// entirely; `Some` values are sent verbatim, including empty strings
    /// and `"0"`.
    pub fn query(mut self, name: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        self.query.push((name.into(), value.map(Into::into)));
        self
    }

    /// Adds a header. Caller headers override the `Content-Type` default but
    /// not the bearer `Authorization` header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the JSON request body.
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Aborts the request when the token fires. A cancelled request returns
    /// [`ApiError::Cancelled`] and never triggers a token refresh.
    pub fn cancel_on(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Query pairs with `None` values stripped, ready for the URL.
    fn query_pairs(&self) -> Vec<(&str, &str)> {
        self.query
            .iter()
            .filter_map(|(name, value)| value.as_deref().map(|v| (name.as_str(), v)))
            .collect()
    }
}

/// The gateway owning the HTTP client and the token/session stores.
#[derive(Debug)]
pub struct Gateway {
    http: reqwest::Client,
    base_url: Option<String>,
    tokens: Arc<TokenStore>,
    session: Arc<SessionStore>,
    refresh_gate: Mutex<()>,
}

impl Gateway {
    /// Builds the gateway from configuration. The base URL may be absent;
    /// requests then fail with [`ApiError::MissingBaseUrl`].
    pub fn new(
        config: &Config,
        tokens: Arc<TokenStore>,
        session: Arc<SessionStore>,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.http.connect_timeout_secs))
            .timeout(Duration::from_secs(config.http.request_timeout_secs))
            .build()?;
        let base_url = config
            .api_url
            .as_ref()
            .map(|url| url.trim_end_matches('/').to_string());
        Ok(Gateway {
            http,
            base_url,
            tokens,
            session,
            refresh_gate: Mutex::new(()),
        })
    }

    /// Executes a request with bearer attachment and one-shot 401 recovery.
    /// Returns the decoded JSON body; empty success bodies decode to `null`.
    pub async fn execute(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let base = self.base_url.as_deref().ok_or(ApiError::MissingBaseUrl)?;

        if is_exempt(&request.path) {
            let response = self.send(base, &request, None).await?;
            return handle_response(response).await;
        }

        let mut attempt: u8 = 0;
        loop {
            let access = self.tokens.access_token();
            let response = self.send(base, &request, access.as_deref()).await?;

            if response.status() == StatusCode::UNAUTHORIZED && attempt == 0 {
                attempt += 1;
                debug!(path = %request.path, "got 401, refreshing tokens");
                self.refresh(access.as_deref()).await?;
                continue;
            }
            return handle_response(response).await;
        }
    }

    fn send_raw(
        &self,
        base: &str,
        request: &ApiRequest,
        bearer: Option<&str>,
    ) -> reqwest::RequestBuilder {
        let url = format!("{base}{}", request.path);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for (name, value) in &request.headers {
            match (
                HeaderName::try_from(name.as_str()),
                HeaderValue::try_from(value.as_str()),
            ) {
                (Ok(parsed_name), Ok(parsed_value)) => {
                    headers.insert(parsed_name, parsed_value);
                }
                _ => warn!("skipping invalid header {name}"),
            }
        }

        let mut builder = self
            .http
            .request(request.method.clone(), &url)
            .headers(headers);

        let query = request.query_pairs();
        if !query.is_empty() {
            builder = builder.query(&query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    async fn send(
        &self,
        base: &str,
        request: &ApiRequest,
        bearer: Option<&str>,
    ) -> Result<reqwest::Response, ApiError> {
        let builder = self.send_raw(base, request, bearer);
        match &request.cancel {
            Some(cancel) => tokio::select! {
                () = cancel.cancelled() => Err(ApiError::Cancelled),
                result = builder.send() => Ok(result?),
            },
            None => Ok(builder.send().await?),
        }
    }

    /// Refreshes the token pair, coalescing concurrent callers.
    ///
    /// `sent_access` is the access token the failing request carried. When
    /// the stored token already differs, another caller refreshed while this
    /// one waited for the gate and there is nothing left to do.
    async fn refresh(&self, sent_access: Option<&str>) -> Result<(), ApiError> {
        let _guard = self.refresh_gate.lock().await;

        if let Some(current) = self.tokens.access_token() {
            if Some(current.as_str()) != sent_access {
                debug!("tokens already refreshed by a concurrent request");
                return Ok(());
            }
        }

        let Some(refresh_token) = self.tokens.refresh_token() else {
            warn!("401 with no refresh token stored, signing out");
            self.teardown();
            return Err(ApiError::NoRefreshToken);
        };

        let pair = match self.request_new_pair(&refresh_token).await {
            Ok(pair) => pair,
            Err(e) => {
                warn!("token refresh failed, signing out: {e}");
                self.teardown();
                return Err(e);
            }
        };

        self.tokens.save(&pair.access_token, &pair.refresh_token)?;
        self.session.update_access_token(&pair.access_token);
        debug!("token pair refreshed");
        Ok(())
    }

    async fn request_new_pair(&self, refresh_token: &str) -> Result<TokenPair, ApiError> {
        let base = self.base_url.as_deref().ok_or(ApiError::MissingBaseUrl)?;
        let request = ApiRequest::post(REFRESH_PATH)
            .json(serde_json::json!({ "refresh_token": refresh_token }));
        let access = self.tokens.access_token();
        let response = self.send(base, &request, access.as_deref()).await?;
        let value = handle_response(response).await?;

        let pair: TokenPair = serde_json::from_value(value)
            .map_err(|e| ApiError::Decode(format!("refresh response: {e}")))?;
        if pair.access_token.is_empty() || pair.refresh_token.is_empty() {
            return Err(ApiError::Decode(
                "refresh response missing token values".into(),
            ));
        }
        Ok(pair)
    }

    /// Clears stored tokens, then logs the session out. Both steps run even
    /// when one has nothing to do.
    fn teardown(&self) {
        self.tokens.clear();
        self.session.logout();
    }
}

fn is_exempt(path: &str) -> bool {
    EXEMPT_PATHS.contains(&path)
}

async fn handle_response(response: reqwest::Response) -> Result<Value, ApiError> {
    let status = response.status();
    let body = response.text().await?;

    if status.is_success() {
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        return serde_json::from_str(&body)
            .map_err(|e| ApiError::Decode(format!("response body: {e}")));
    }
    Err(ApiError::from_status(status.as_u16(), extract_detail(&body)))
}

/// Pulls the backend's `detail` field out of an error body. Non-string
/// details (validation error lists) are reported as compact JSON; bodies
/// without one fall back to the raw text.
fn extract_detail(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        match value.get("detail") {
            Some(Value::String(s)) => return s.clone(),
            Some(Value::Null) | None => {}
            Some(other) => return other.to_string(),
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "(no detail)".to_string()
    } else {
        trimmed.to_string()
    }
}
