//! `/outdoor-temperature` endpoints.

use crate::client::DomoClient;
use crate::error::ApiError;
use crate::gateway::ApiRequest;
use crate::models::OutdoorTemperature;

impl DomoClient {
    /// `GET /outdoor-temperature/latest` — the most recent aggregate of
    /// per-side outdoor readings.
    pub async fn outdoor_temperature(&self) -> Result<OutdoorTemperature, ApiError> {
        self.fetch(ApiRequest::get("/outdoor-temperature/latest"))
            .await
    }
}
