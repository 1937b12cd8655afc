//! `/auth` endpoints: credentials, account, and profile.

use serde_json::json;

use crate::client::DomoClient;
use crate::error::ApiError;
use crate::gateway::ApiRequest;
use crate::models::{
    ChangePasswordRequest, Credentials, Profile, ProfileUpdate, RegisterRequest, TokenPair,
    UserInfo,
};

impl DomoClient {
    /// `POST /auth/login` — exchange credentials for a token pair.
    ///
    /// This is the raw endpoint call; it does not persist anything. Use
    /// [`DomoClient::sign_in`] for the full flow.
    pub async fn login(&self, credentials: Credentials) -> Result<TokenPair, ApiError> {
        self.fetch(ApiRequest::post("/auth/login").json(json!(credentials)))
            .await
    }

    /// `POST /auth/register` — create an account, returning it. Does not
    /// sign in.
    ///
    /// Rejected with `detail: "User with this login already exists"` when
    /// the login is taken.
    pub async fn register(&self, request: RegisterRequest) -> Result<UserInfo, ApiError> {
        self.fetch(ApiRequest::post("/auth/register").json(json!(request)))
            .await
    }

    /// `GET /auth/me` — the authenticated account with its application flags.
    pub async fn me(&self) -> Result<UserInfo, ApiError> {
        self.fetch(ApiRequest::get("/auth/me")).await
    }

    /// `GET /auth/profile` — extended profile with provisioning counters.
    pub async fn profile(&self) -> Result<Profile, ApiError> {
        self.fetch(ApiRequest::get("/auth/profile")).await
    }

    /// `PUT /auth/profile` — update name fields; unset fields are left alone.
    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<Profile, ApiError> {
        self.fetch(ApiRequest::put("/auth/profile").json(json!(update)))
            .await
    }

    /// `POST /auth/change-password` — rejected with `detail` containing
    /// `"Old password is incorrect"` when the old password does not match.
    pub async fn change_password(
        &self,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), ApiError> {
        self.execute(
            ApiRequest::post("/auth/change-password").json(json!(ChangePasswordRequest {
                old_password: old_password.to_string(),
                new_password: new_password.to_string(),
            })),
        )
        .await
        .map(|_| ())
    }
}
