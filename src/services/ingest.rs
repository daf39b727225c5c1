use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::{
    error::{AppError, AppResult},
    models::{NewDevice, NewReading, Reading},
    storage::{DeviceRepository, ReadingRepository},
};

/// A canonical reading field and the payload keys accepted for it, in
/// lookup order. The first key holding a non-null value wins.
#[derive(Debug, Clone, Copy)]
pub struct FieldAliases {
    pub canonical: &'static str,
    pub accepted: &'static [&'static str],
}

pub const DEVICE_ID: FieldAliases = FieldAliases {
    canonical: "device_id",
    accepted: &["id", "deviceId", "device_id"],
};

pub const PACKET_NUMBER: FieldAliases = FieldAliases {
    canonical: "packet_number",
    accepted: &["packet_number"],
};

// The ESP32 firmware reports in Spanish; its spelling is checked first.
pub const TEMPERATURE: FieldAliases = FieldAliases {
    canonical: "temperature",
    accepted: &["temperatura", "temperature"],
};

pub const HUMIDITY: FieldAliases = FieldAliases {
    canonical: "humidity",
    accepted: &["humedad", "humidity"],
};

pub const DOOR_STATUS: FieldAliases = FieldAliases {
    canonical: "door_status",
    accepted: &["puerta", "door", "door_status"],
};

pub const POWER_STATUS: FieldAliases = FieldAliases {
    canonical: "power_status",
    accepted: &["voltage", "power_status"],
};

pub const SENSOR_TIMESTAMP: FieldAliases = FieldAliases {
    canonical: "timestamp",
    accepted: &["timestamp"],
};

impl FieldAliases {
    fn resolve<'a>(&self, payload: &'a Map<String, Value>) -> Option<&'a Value> {
        self.accepted
            .iter()
            .filter_map(|key| payload.get(*key))
            .find(|value| !value.is_null())
    }
}

/// Turns a raw device payload into a reading ready to store.
///
/// `received` is the ingestion time; it also stands in for the sensor time
/// when the payload carries none.
pub fn normalize(payload: &Value, received: DateTime<Utc>) -> AppResult<NewReading> {
    let payload = payload
        .as_object()
        .ok_or_else(|| AppError::validation("Payload must be a JSON object"))?;

    let device_id = DEVICE_ID
        .resolve(payload)
        .and_then(coerce_device_id)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::validation("Missing deviceId"))?;

    let sensor_timestamp = match SENSOR_TIMESTAMP.resolve(payload) {
        Some(value) => epoch_seconds(value, received)?,
        None => received,
    };

    Ok(NewReading {
        device_id,
        packet_number: optional(payload, PACKET_NUMBER, integer)?,
        temperature: optional(payload, TEMPERATURE, number)?,
        humidity: optional(payload, HUMIDITY, number)?,
        door_status: optional(payload, DOOR_STATUS, flag)?,
        power_status: optional(payload, POWER_STATUS, flag)?,
        sensor_timestamp,
        received_timestamp: received,
    })
}

fn optional<T>(
    payload: &Map<String, Value>,
    field: FieldAliases,
    coerce: fn(&str, &Value) -> AppResult<T>,
) -> AppResult<Option<T>> {
    field
        .resolve(payload)
        .map(|value| coerce(field.canonical, value))
        .transpose()
}

fn coerce_device_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn number(field: &str, value: &Value) -> AppResult<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    parsed
        .filter(|n| n.is_finite())
        .ok_or_else(|| AppError::validation(format!("{} must be numeric", field)))
}

fn integer(field: &str, value: &Value) -> AppResult<i64> {
    if let Some(n) = value.as_i64() {
        return Ok(n);
    }

    let n = number(field, value)?;
    if n.fract() != 0.0 || n < i64::MIN as f64 || n > i64::MAX as f64 {
        return Err(AppError::validation(format!("{} must be an integer", field)));
    }
    Ok(n as i64)
}

fn flag(field: &str, value: &Value) -> AppResult<i32> {
    if let Value::Bool(b) = value {
        return Ok(i32::from(*b));
    }

    let n = integer(field, value)?;
    i32::try_from(n).map_err(|_| AppError::validation(format!("{} is out of range", field)))
}

fn epoch_seconds(value: &Value, received: DateTime<Utc>) -> AppResult<DateTime<Utc>> {
    let seconds = number("timestamp", value)?;

    // Firmware without a clock fix reports 0.
    if seconds == 0.0 {
        return Ok(received);
    }

    let millis = (seconds * 1000.0).round();
    if millis < i64::MIN as f64 || millis > i64::MAX as f64 {
        return Err(AppError::validation("timestamp is out of range"));
    }

    DateTime::from_timestamp_millis(millis as i64)
        .ok_or_else(|| AppError::validation("timestamp is out of range"))
}

pub struct IngestService {
    devices: Arc<dyn DeviceRepository>,
    readings: Arc<dyn ReadingRepository>,
}

impl IngestService {
    pub fn new(devices: Arc<dyn DeviceRepository>, readings: Arc<dyn ReadingRepository>) -> Self {
        Self { devices, readings }
    }

    /// Stores one reading, registering the device first if it has never
    /// been seen.
    ///
    /// There is no idempotency key: a device retrying after a failure whose
    /// write actually committed produces a duplicate reading.
    pub async fn ingest(&self, payload: &Value) -> AppResult<Reading> {
        let reading = normalize(payload, Utc::now())?;

        let (device, created) = self
            .devices
            .get_or_create_device(NewDevice::provisioned(&reading.device_id))
            .await?;
        if created {
            info!(device_id = %device.device_id, "Auto-provisioned device on first reading");
        }

        let stored = self.readings.insert_reading(reading).await?;
        debug!(
            device_id = %stored.device_id,
            packet_number = ?stored.packet_number,
            "Stored sensor reading"
        );

        Ok(stored)
    }
}
