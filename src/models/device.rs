use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::Reading;

/// Location given to devices that announce themselves before anyone registers them.
pub const PLACEHOLDER_LOCATION: &str = "Unassigned";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: Uuid,
    pub device_id: String,
    pub device_name: String,
    pub location: String,
    pub owner_id: Option<Uuid>,
    pub organization_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewDevice {
    pub device_id: String,
    pub device_name: String,
    pub location: String,
    pub owner_id: Option<Uuid>,
    pub organization_id: Option<Uuid>,
}

impl NewDevice {
    /// Placeholder record for a device first seen through ingestion.
    pub fn provisioned(device_id: &str) -> Self {
        Self {
            device_id: device_id.to_string(),
            device_name: format!("Device {}", device_id),
            location: PLACEHOLDER_LOCATION.to_string(),
            owner_id: None,
            organization_id: None,
        }
    }
}

/// Partial update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceConfigUpdate {
    pub device_name: Option<String>,
    pub location: Option<String>,
}

/// A device joined with its most recent reading and derived presence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceView {
    #[serde(flatten)]
    pub device: Device,
    pub latest_reading: Option<Reading>,
    pub online: bool,
}
