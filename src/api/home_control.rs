//! `/home-control` endpoints: manual mode and device switching.

use serde_json::json;

use crate::client::DomoClient;
use crate::error::ApiError;
use crate::gateway::ApiRequest;
use crate::models::{ControlMode, ToggleDeviceRequest};

impl DomoClient {
    /// `GET /home-control/mode` — whether the house is under manual control.
    pub async fn control_mode(&self) -> Result<ControlMode, ApiError> {
        self.fetch(ApiRequest::get("/home-control/mode")).await
    }

    /// `PATCH /home-control/mode` — switch between automation and manual
    /// control, returning the resulting mode. Devices can only be toggled
    /// while manual control is on.
    pub async fn set_control_mode(&self, is_manual: bool) -> Result<ControlMode, ApiError> {
        self.fetch(ApiRequest::patch("/home-control/mode").json(json!({ "is_manual": is_manual })))
            .await
    }

    /// `PATCH /home-control/toggle-device` — switch a light or ventilation
    /// device on or off.
    pub async fn toggle_device(&self, request: ToggleDeviceRequest) -> Result<(), ApiError> {
        self.execute(ApiRequest::patch("/home-control/toggle-device").json(json!(request)))
            .await
            .map(|_| ())
    }
}
