//! High-level backend client.
//!
//! [`DomoClient`] bundles the request gateway with the token and session
//! stores and exposes one method per backend endpoint (grouped under
//! `api/`), plus the orchestrated sign-in and sign-out flows that touch
//! several stores at once.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::{self, Config};
use crate::error::ApiError;
use crate::gateway::{ApiRequest, Gateway};
use crate::models::{Credentials, UserInfo};
use crate::session::SessionStore;
use crate::tokens::TokenStore;

/// Client facade over the backend REST API.
///
/// Cloning is cheap; clones share the same stores and HTTP client.
#[derive(Debug, Clone)]
pub struct DomoClient {
    gateway: Arc<Gateway>,
    tokens: Arc<TokenStore>,
    session: Arc<SessionStore>,
}

impl DomoClient {
    /// Builds a client with stores under the default state directory.
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let state_dir = config::state_dir();
        let tokens = Arc::new(TokenStore::open(&state_dir));
        let session = Arc::new(SessionStore::open(&state_dir));
        Self::with_stores(config, tokens, session)
    }

    /// Builds a client around existing stores. This is the seam for swapping
    /// in isolated stores, e.g. pointing at a scratch directory.
    pub fn with_stores(
        config: &Config,
        tokens: Arc<TokenStore>,
        session: Arc<SessionStore>,
    ) -> Result<Self, ApiError> {
        let gateway = Gateway::new(config, Arc::clone(&tokens), Arc::clone(&session))?;
        Ok(DomoClient {
            gateway: Arc::new(gateway),
            tokens,
            session,
        })
    }

    pub fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Signs in end to end: exchanges credentials for tokens, persists them,
    /// fetches the account, and marks the session authenticated.
    ///
    /// The authenticated flag is only raised once every step has succeeded.
    /// When the account fetch fails the freshly-saved tokens are kept, but
    /// the session stays signed out and the error is returned.
    pub async fn sign_in(&self, login: &str, password: &str) -> Result<UserInfo, ApiError> {
        let pair = self
            .login(Credentials {
                login: login.to_string(),
                password: password.to_string(),
            })
            .await?;
        self.tokens.save(&pair.access_token, &pair.refresh_token)?;

        let user = match self.me().await {
            Ok(user) => user,
            Err(e) => {
                warn!("signed in but failed to fetch account: {e}");
                return Err(e);
            }
        };

        self.session
            .login(&pair.access_token, &pair.refresh_token, user.clone());
        debug!(login = %user.login, "signed in");
        Ok(user)
    }

    /// Signs out locally: stored tokens removed, session reset. The backend
    /// has no sign-out endpoint; dropped refresh tokens simply expire.
    pub fn sign_out(&self) {
        self.tokens.clear();
        self.session.logout();
        debug!("signed out");
    }

    /// Executes a request and returns the raw JSON body.
    pub(crate) async fn execute(&self, request: ApiRequest) -> Result<Value, ApiError> {
        self.gateway.execute(request).await
    }

    /// Executes a request and decodes the body into `T`.
    pub(crate) async fn fetch<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> Result<T, ApiError> {
        let path = request.path().to_string();
        let value = self.gateway.execute(request).await?;
        serde_json::from_value(value).map_err(|e| ApiError::Decode(format!("{path}: {e}")))
    }
}
