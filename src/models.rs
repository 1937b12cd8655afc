//! Wire types for the backend REST API.
//!
//! Field names mirror the backend's JSON exactly; renames happen here, not at
//! call sites. Optional request fields carry `skip_serializing_if` so absent
//! values are omitted from the payload rather than sent as `null`.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

/// Login request body.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

/// Access/refresh token pair as issued by login and refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Registration request body.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub login: String,
    pub password: String,
}

/// The authenticated account, as returned by `GET /auth/me`.
///
/// `has_pending_application` and `application_submitted` together drive what
/// a non-admin account is allowed to do: neither set means no application
/// exists yet, the first alone means one is awaiting review, both mean the
/// home is provisioned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: i64,
    pub login: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub has_pending_application: bool,
    #[serde(default)]
    pub application_submitted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Extended profile with application and provisioning counters.
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub middle_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub total_applications: u64,
    #[serde(default)]
    pub pending_applications: u64,
    #[serde(default)]
    pub approved_applications: u64,
    #[serde(default)]
    pub rejected_applications: u64,
    #[serde(default)]
    pub total_rooms: Option<u64>,
    #[serde(default)]
    pub total_sensors: Option<u64>,
}

/// Partial profile update; omitted fields are left untouched by the backend.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none() && self.middle_name.is_none()
    }
}

/// Password change request body.
#[derive(Debug, Clone, Serialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

// ---------------------------------------------------------------------------
// Applications
// ---------------------------------------------------------------------------

/// Review status of a provisioning application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One requested room with the sensors to install in it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomConfig {
    pub room_id: u64,
    #[serde(default)]
    pub sensor_ids: Vec<u64>,
}

/// Request body for `POST /applications`.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationCreate {
    pub rooms_config: Vec<RoomConfig>,
}

/// A provisioning application as stored by the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct Application {
    pub id: u64,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub user_login: Option<String>,
    #[serde(default)]
    pub rooms_config: Vec<RoomConfig>,
    pub status: ApplicationStatus,
    #[serde(default)]
    pub rejection_comment: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Admin decision on an application. The comment only accompanies rejections
/// and is omitted from the payload when absent.
#[derive(Debug, Clone, Serialize)]
pub struct StatusUpdate {
    pub status: ApplicationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_comment: Option<String>,
}

/// Room and sensor catalogs keyed by numeric id.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Dictionaries {
    #[serde(default)]
    pub rooms: BTreeMap<u64, String>,
    #[serde(default)]
    pub sensors: BTreeMap<u64, String>,
}

impl Dictionaries {
    pub fn room_name(&self, id: u64) -> String {
        self.rooms
            .get(&id)
            .cloned()
            .unwrap_or_else(|| format!("room {id}"))
    }

    pub fn sensor_name(&self, id: u64) -> String {
        self.sensors
            .get(&id)
            .cloned()
            .unwrap_or_else(|| format!("sensor {id}"))
    }
}

// ---------------------------------------------------------------------------
// Rooms and sensors
// ---------------------------------------------------------------------------

/// The five sensor kinds the backend knows about. The kind selects both the
/// reading endpoint path and the shape of the returned payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorKind {
    Temperature,
    Light,
    Gas,
    Humidity,
    Ventilation,
}

impl SensorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SensorKind::Temperature => "temperature",
            SensorKind::Light => "light",
            SensorKind::Gas => "gas",
            SensorKind::Humidity => "humidity",
            SensorKind::Ventilation => "ventilation",
        }
    }

    /// True for kinds that represent a switchable device.
    pub fn is_switchable(self) -> bool {
        matches!(self, SensorKind::Light | SensorKind::Ventilation)
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SensorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "temperature" => Ok(SensorKind::Temperature),
            "light" => Ok(SensorKind::Light),
            "gas" => Ok(SensorKind::Gas),
            "humidity" => Ok(SensorKind::Humidity),
            "ventilation" => Ok(SensorKind::Ventilation),
            other => Err(format!(
                "unknown sensor kind '{other}' (expected temperature, light, gas, humidity or ventilation)"
            )),
        }
    }
}

/// A sensor as listed inside a room.
#[derive(Debug, Clone, Deserialize)]
pub struct SensorRef {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: SensorKind,
}

/// A provisioned room with its installed sensors.
#[derive(Debug, Clone, Deserialize)]
pub struct Room {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub sensors: Vec<SensorRef>,
}

/// Temperature reading in degrees Celsius.
#[derive(Debug, Clone, Deserialize)]
pub struct TemperatureReading {
    pub value: f64,
}

/// On/off state of a light or ventilation device.
#[derive(Debug, Clone, Deserialize)]
pub struct SwitchReading {
    pub sensor_id: u64,
    pub room_id: u64,
    pub is_on: bool,
}

/// Gas alarm state. `value` is `None` while the sensor has not yet reported;
/// `status` is the backend's human-readable summary.
#[derive(Debug, Clone, Deserialize)]
pub struct GasReading {
    #[serde(default)]
    pub value: Option<bool>,
    pub status: String,
}

/// Relative humidity in percent.
#[derive(Debug, Clone, Deserialize)]
pub struct HumidityReading {
    pub humidity_level: f64,
}

/// A decoded sensor reading. The payload shape depends on the kind in the
/// request path, not on anything in the body, so decoding is dispatched on
/// [`SensorKind`] rather than left to serde.
#[derive(Debug, Clone)]
pub enum SensorReading {
    Temperature(TemperatureReading),
    Light(SwitchReading),
    Gas(GasReading),
    Humidity(HumidityReading),
    Ventilation(SwitchReading),
}

impl SensorReading {
    /// Decodes a raw reading body according to the sensor kind.
    pub fn decode(kind: SensorKind, value: Value) -> Result<Self, ApiError> {
        fn parse<T: serde::de::DeserializeOwned>(
            kind: SensorKind,
            value: Value,
        ) -> Result<T, ApiError> {
            serde_json::from_value(value)
                .map_err(|e| ApiError::Decode(format!("{kind} reading: {e}")))
        }

        Ok(match kind {
            SensorKind::Temperature => SensorReading::Temperature(parse(kind, value)?),
            SensorKind::Light => SensorReading::Light(parse(kind, value)?),
            SensorKind::Gas => SensorReading::Gas(parse(kind, value)?),
            SensorKind::Humidity => SensorReading::Humidity(parse(kind, value)?),
            SensorKind::Ventilation => SensorReading::Ventilation(parse(kind, value)?),
        })
    }
}

// ---------------------------------------------------------------------------
// Home control
// ---------------------------------------------------------------------------

/// Whether the house is under manual control or automation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ControlMode {
    pub is_manual: bool,
}

/// Request body for `PATCH /home-control/toggle-device`.
#[derive(Debug, Clone, Serialize)]
pub struct ToggleDeviceRequest {
    #[serde(rename = "type")]
    pub kind: SensorKind,
    pub room_id: u64,
    pub sensor_id: u64,
    pub is_on: bool,
}

// ---------------------------------------------------------------------------
// Outdoor temperature
// ---------------------------------------------------------------------------

/// One reading from a side of the house.
#[derive(Debug, Clone, Deserialize)]
pub struct SideTemperature {
    pub side: String,
    pub value: f64,
}

/// Latest outdoor temperature aggregate.
#[derive(Debug, Clone, Deserialize)]
pub struct OutdoorTemperature {
    pub min_temperature: f64,
    pub max_temperature: f64,
    #[serde(default)]
    pub temperatures: Vec<SideTemperature>,
}

// ---------------------------------------------------------------------------
// Admin users
// ---------------------------------------------------------------------------

/// Per-user summary row from `GET /users/admin/list`.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminUser {
    pub id: i64,
    pub login: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub applications_count: u64,
    #[serde(default)]
    pub pending_applications: u64,
    #[serde(default)]
    pub approved_applications: u64,
    #[serde(default)]
    pub rejected_applications: u64,
    #[serde(default)]
    pub created_at: Option<String>,
}
