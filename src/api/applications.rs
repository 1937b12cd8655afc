//! `/applications` endpoints: provisioning applications and their review.

use serde_json::json;

use crate::client::DomoClient;
use crate::error::ApiError;
use crate::gateway::ApiRequest;
use crate::models::{Application, ApplicationCreate, Dictionaries, StatusUpdate};

impl DomoClient {
    /// `POST /applications` — submit a provisioning application.
    ///
    /// Admins cannot apply; invalid ids are rejected with `detail` messages
    /// `"Invalid room ID"`, `"Invalid sensor ID"`, or
    /// `"Room not in selected rooms"`.
    pub async fn create_application(
        &self,
        application: ApplicationCreate,
    ) -> Result<Application, ApiError> {
        self.fetch(ApiRequest::post("/applications").json(json!(application)))
            .await
    }

    /// `GET /applications/my` — own applications, newest first.
    pub async fn my_applications(&self) -> Result<Vec<Application>, ApiError> {
        self.fetch(ApiRequest::get("/applications/my")).await
    }

    /// `GET /applications/dictionaries` — selectable room and sensor catalogs.
    pub async fn dictionaries(&self) -> Result<Dictionaries, ApiError> {
        self.fetch(ApiRequest::get("/applications/dictionaries"))
            .await
    }

    /// `GET /applications/admin/all` — every application (admin only).
    /// Unset paging parameters are omitted from the query string.
    pub async fn admin_applications(
        &self,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<Application>, ApiError> {
        self.fetch(
            ApiRequest::get("/applications/admin/all")
                .query("limit", limit.map(|v| v.to_string()))
                .query("offset", offset.map(|v| v.to_string())),
        )
        .await
    }

    /// `GET /applications/{id}` — one application with its room config.
    pub async fn application(&self, id: u64) -> Result<Application, ApiError> {
        self.fetch(ApiRequest::get(format!("/applications/{id}")))
            .await
    }

    /// `PUT /applications/{id}` — approve or reject an application
    /// (admin only). The rejection comment is omitted when absent.
    pub async fn process_application(
        &self,
        id: u64,
        update: StatusUpdate,
    ) -> Result<Application, ApiError> {
        self.fetch(ApiRequest::put(format!("/applications/{id}")).json(json!(update)))
            .await
    }

    /// `GET /applications/admin/{user_id}/applications` — one user's
    /// applications (admin only).
    pub async fn user_applications(&self, user_id: i64) -> Result<Vec<Application>, ApiError> {
        self.fetch(ApiRequest::get(format!(
            "/applications/admin/{user_id}/applications"
        )))
        .await
    }
}
