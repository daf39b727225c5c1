use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{Device, DeviceConfigUpdate, NewDevice},
    storage::{DeviceRepository, UserRepository},
};

pub struct DeviceService {
    devices: Arc<dyn DeviceRepository>,
    users: Arc<dyn UserRepository>,
}

impl DeviceService {
    pub fn new(devices: Arc<dyn DeviceRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { devices, users }
    }

    /// Registers a device on behalf of `owner_id`, inheriting the owner's
    /// organization.
    pub async fn create_device(
        &self,
        owner_id: Uuid,
        device_id: Option<&str>,
        device_name: Option<&str>,
        location: Option<&str>,
    ) -> AppResult<Device> {
        let device_id = device_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AppError::validation("deviceId required"))?;

        let owner = self
            .users
            .find_user(owner_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        let device = self
            .devices
            .create_device(NewDevice {
                device_id: device_id.to_string(),
                device_name: device_name.unwrap_or_default().to_string(),
                location: location.unwrap_or_default().to_string(),
                owner_id: Some(owner.id),
                organization_id: owner.organization_id,
            })
            .await?;

        info!(device_id = %device.device_id, owner_id = %owner.id, "Device created");
        Ok(device)
    }

    /// `id` is the storage id; anything that is not a UUID cannot match.
    pub async fn get_device(&self, id: &str) -> AppResult<Device> {
        let id = parse_id(id)?;
        self.devices
            .find_device(id)
            .await?
            .ok_or(AppError::DeviceNotFound)
    }

    pub async fn update_config(&self, id: &str, update: DeviceConfigUpdate) -> AppResult<Device> {
        let id = parse_id(id)?;
        let device = self
            .devices
            .update_device_config(id, update)
            .await?
            .ok_or(AppError::DeviceNotFound)?;

        info!(device_id = %device.device_id, "Device configuration updated");
        Ok(device)
    }
}

fn parse_id(id: &str) -> AppResult<Uuid> {
    Uuid::parse_str(id).map_err(|_| AppError::DeviceNotFound)
}
