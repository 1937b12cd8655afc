//! `/users` endpoints: account administration.

use crate::client::DomoClient;
use crate::error::ApiError;
use crate::gateway::ApiRequest;
use crate::models::AdminUser;

impl DomoClient {
    /// `GET /users/admin/list` — every account with application counters
    /// (admin only). Unset paging parameters are omitted from the query.
    pub async fn admin_users(
        &self,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<AdminUser>, ApiError> {
        self.fetch(
            ApiRequest::get("/users/admin/list")
                .query("limit", limit.map(|v| v.to_string()))
                .query("offset", offset.map(|v| v.to_string())),
        )
        .await
    }
}
