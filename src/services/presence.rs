use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use futures::future::try_join_all;
use tracing::debug;

use crate::{
    error::AppResult,
    models::{Device, DeviceView, Reading},
    storage::{DeviceRepository, ReadingRepository},
};

/// A device is online while its latest reading is younger than this.
pub const ONLINE_WINDOW_SECS: i64 = 60;

pub fn is_online(latest: Option<&Reading>, now: DateTime<Utc>) -> bool {
    latest.map_or(false, |reading| {
        now.signed_duration_since(reading.received_timestamp)
            < Duration::seconds(ONLINE_WINDOW_SECS)
    })
}

pub struct PresenceService {
    devices: Arc<dyn DeviceRepository>,
    readings: Arc<dyn ReadingRepository>,
}

impl PresenceService {
    pub fn new(devices: Arc<dyn DeviceRepository>, readings: Arc<dyn ReadingRepository>) -> Self {
        Self { devices, readings }
    }

    pub async fn list_devices(&self) -> AppResult<Vec<DeviceView>> {
        let devices = self.devices.list_devices().await?;
        self.enrich(devices, Utc::now()).await
    }

    /// Pairs each device with its latest reading. Lookups run concurrently,
    /// one per device; output order follows `devices`.
    pub async fn enrich(
        &self,
        devices: Vec<Device>,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<DeviceView>> {
        let lookups = devices.into_iter().map(|device| async move {
            let latest_reading = self.readings.latest_reading(&device.device_id).await?;
            let online = is_online(latest_reading.as_ref(), now);
            AppResult::Ok(DeviceView {
                device,
                latest_reading,
                online,
            })
        });

        let views = try_join_all(lookups).await?;
        debug!(
            count = views.len(),
            online = views.iter().filter(|v| v.online).count(),
            "Computed device presence"
        );
        Ok(views)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MockDeviceRepository, MockReadingRepository};
    use chrono::TimeZone;
    use uuid::Uuid;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn reading_at(device_id: &str, received: DateTime<Utc>) -> Reading {
        Reading {
            id: Uuid::new_v4(),
            device_id: device_id.to_string(),
            packet_number: Some(1),
            temperature: Some(22.0),
            humidity: Some(45.0),
            door_status: Some(0),
            power_status: Some(1),
            sensor_timestamp: received,
            received_timestamp: received,
        }
    }

    fn device(device_id: &str) -> Device {
        Device {
            id: Uuid::new_v4(),
            device_id: device_id.to_string(),
            device_name: format!("Device {}", device_id),
            location: "Unassigned".to_string(),
            owner_id: None,
            organization_id: None,
            created_at: now(),
        }
    }

    #[test]
    fn no_reading_means_offline() {
        assert!(!is_online(None, now()));
    }

    #[test]
    fn threshold_is_strict() {
        let fresh = reading_at("X", now() - Duration::milliseconds(59_999));
        let stale = reading_at("X", now() - Duration::seconds(60));

        assert!(is_online(Some(&fresh), now()));
        assert!(!is_online(Some(&stale), now()));
    }

    #[test]
    fn presence_uses_received_time_not_sensor_time() {
        let mut reading = reading_at("X", now() - Duration::seconds(5));
        reading.sensor_timestamp = now() - Duration::days(3);
        assert!(is_online(Some(&reading), now()));
    }

    #[tokio::test]
    async fn enrich_attaches_latest_reading_per_device() {
        let mut readings = MockReadingRepository::new();
        readings
            .expect_latest_reading()
            .withf(|device_id: &str| device_id == "A")
            .times(1)
            .returning(|_| Ok(Some(reading_at("A", now() - Duration::seconds(10)))));
        readings
            .expect_latest_reading()
            .withf(|device_id: &str| device_id == "B")
            .times(1)
            .returning(|_| Ok(None));

        let service =
            PresenceService::new(Arc::new(MockDeviceRepository::new()), Arc::new(readings));
        let views = service
            .enrich(vec![device("A"), device("B")], now())
            .await
            .unwrap();

        assert_eq!(views.len(), 2);
        assert_eq!(views[0].device.device_id, "A");
        assert!(views[0].online);
        assert!(views[0].latest_reading.is_some());
        assert_eq!(views[1].device.device_id, "B");
        assert!(!views[1].online);
        assert!(views[1].latest_reading.is_none());
    }

    #[tokio::test]
    async fn list_devices_reads_every_device() {
        let mut devices = MockDeviceRepository::new();
        devices
            .expect_list_devices()
            .times(1)
            .returning(|| Ok(vec![device("A")]));

        let mut readings = MockReadingRepository::new();
        readings.expect_latest_reading().returning(|_| Ok(None));

        let service = PresenceService::new(Arc::new(devices), Arc::new(readings));
        let views = service.list_devices().await.unwrap();

        assert_eq!(views.len(), 1);
        assert!(!views[0].online);
    }
}
