//! `/rooms` endpoints: provisioned rooms and their devices.

use crate::client::DomoClient;
use crate::error::ApiError;
use crate::gateway::ApiRequest;
use crate::models::{Room, SensorRef};

impl DomoClient {
    /// `GET /rooms/user-rooms` — the caller's provisioned rooms with their
    /// installed sensors. Empty until an application has been approved.
    pub async fn user_rooms(&self) -> Result<Vec<Room>, ApiError> {
        self.fetch(ApiRequest::get("/rooms/user-rooms")).await
    }

    /// `GET /rooms/{room_id}/devices` — the sensors installed in one room.
    pub async fn room_devices(&self, room_id: u64) -> Result<Vec<SensorRef>, ApiError> {
        self.fetch(ApiRequest::get(format!("/rooms/{room_id}/devices")))
            .await
    }
}
