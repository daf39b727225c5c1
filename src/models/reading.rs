use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    pub id: Uuid,
    pub device_id: String,
    pub packet_number: Option<i64>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub door_status: Option<i32>,
    pub power_status: Option<i32>,
    pub sensor_timestamp: DateTime<Utc>,
    pub received_timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewReading {
    pub device_id: String,
    pub packet_number: Option<i64>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub door_status: Option<i32>,
    pub power_status: Option<i32>,
    pub sensor_timestamp: DateTime<Utc>,
    pub received_timestamp: DateTime<Utc>,
}

/// Scope of a history lookup. Bounds are inclusive and apply to `sensor_timestamp`.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryFilter {
    pub device_id: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub limit: i64,
}

impl HistoryFilter {
    pub fn is_empty_window(&self) -> bool {
        matches!((self.start, self.end), (Some(start), Some(end)) if start > end)
    }
}
