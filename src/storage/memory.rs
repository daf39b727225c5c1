//! In-process store used by the HTTP tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{DeviceRepository, OrganizationRepository, ReadingRepository, Store, UserRepository};
use crate::{
    error::{AppError, AppResult},
    models::{
        Device, DeviceConfigUpdate, HistoryFilter, NewDevice, NewReading, NewUser, Organization,
        Reading, Role, User,
    },
};

#[derive(Default)]
pub struct MemoryStore {
    devices: Mutex<Vec<Device>>,
    readings: Mutex<Vec<Reading>>,
    users: Mutex<Vec<User>>,
    organizations: Mutex<Vec<Organization>>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn devices(&self) -> Vec<Device> {
        self.devices.lock().unwrap().clone()
    }

    pub fn readings(&self) -> Vec<Reading> {
        self.readings.lock().unwrap().clone()
    }

    pub fn push_reading(&self, reading: Reading) {
        self.readings.lock().unwrap().push(reading);
    }

    fn device_from(input: NewDevice) -> Device {
        Device {
            id: Uuid::new_v4(),
            device_id: input.device_id,
            device_name: input.device_name,
            location: input.location,
            owner_id: input.owner_id,
            organization_id: input.organization_id,
            created_at: Utc::now(),
        }
    }
}

pub fn into_reading(input: NewReading, id: Uuid) -> Reading {
    Reading {
        id,
        device_id: input.device_id,
        packet_number: input.packet_number,
        temperature: input.temperature,
        humidity: input.humidity,
        door_status: input.door_status,
        power_status: input.power_status,
        sensor_timestamp: input.sensor_timestamp,
        received_timestamp: input.received_timestamp,
    }
}

fn in_scope(filter: &HistoryFilter, reading: &Reading) -> bool {
    filter
        .device_id
        .as_deref()
        .map_or(true, |id| reading.device_id == id)
        && filter.start.map_or(true, |start| reading.sensor_timestamp >= start)
        && filter.end.map_or(true, |end| reading.sensor_timestamp <= end)
}

impl Store {
    pub fn in_memory(memory: Arc<MemoryStore>) -> Self {
        Self {
            devices: memory.clone(),
            readings: memory.clone(),
            users: memory.clone(),
            organizations: memory,
        }
    }
}

#[async_trait]
impl DeviceRepository for MemoryStore {
    async fn find_device(&self, id: Uuid) -> AppResult<Option<Device>> {
        let devices = self.devices.lock().unwrap();
        Ok(devices.iter().find(|d| d.id == id).cloned())
    }

    async fn list_devices(&self) -> AppResult<Vec<Device>> {
        Ok(self.devices())
    }

    async fn create_device(&self, input: NewDevice) -> AppResult<Device> {
        let mut devices = self.devices.lock().unwrap();
        if devices.iter().any(|d| d.device_id == input.device_id) {
            return Err(AppError::DeviceAlreadyExists);
        }
        let device = Self::device_from(input);
        devices.push(device.clone());
        Ok(device)
    }

    async fn get_or_create_device(&self, input: NewDevice) -> AppResult<(Device, bool)> {
        let mut devices = self.devices.lock().unwrap();
        if let Some(existing) = devices.iter().find(|d| d.device_id == input.device_id) {
            return Ok((existing.clone(), false));
        }
        let device = Self::device_from(input);
        devices.push(device.clone());
        Ok((device, true))
    }

    async fn update_device_config(
        &self,
        id: Uuid,
        update: DeviceConfigUpdate,
    ) -> AppResult<Option<Device>> {
        let mut devices = self.devices.lock().unwrap();
        Ok(devices.iter_mut().find(|d| d.id == id).map(|device| {
            if let Some(name) = update.device_name {
                device.device_name = name;
            }
            if let Some(location) = update.location {
                device.location = location;
            }
            device.clone()
        }))
    }
}

#[async_trait]
impl ReadingRepository for MemoryStore {
    async fn insert_reading(&self, input: NewReading) -> AppResult<Reading> {
        let reading = into_reading(input, Uuid::new_v4());
        self.push_reading(reading.clone());
        Ok(reading)
    }

    async fn latest_reading(&self, device_id: &str) -> AppResult<Option<Reading>> {
        let readings = self.readings.lock().unwrap();
        Ok(readings
            .iter()
            .filter(|r| r.device_id == device_id)
            .max_by_key(|r| r.received_timestamp)
            .cloned())
    }

    async fn history(&self, filter: HistoryFilter) -> AppResult<Vec<Reading>> {
        let readings = self.readings.lock().unwrap();
        let mut matching: Vec<Reading> = readings
            .iter()
            .filter(|r| in_scope(&filter, r))
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            (b.sensor_timestamp, b.received_timestamp, b.id).cmp(&(
                a.sensor_timestamp,
                a.received_timestamp,
                a.id,
            ))
        });
        matching.truncate(filter.limit.max(0) as usize);
        Ok(matching)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn create_user(&self, input: NewUser) -> AppResult<User> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == input.email) {
            return Err(AppError::EmailAlreadyRegistered);
        }
        let user = User {
            id: Uuid::new_v4(),
            name: input.name,
            email: input.email,
            password_hash: input.password_hash,
            organization_id: None,
            role: Role::Member,
            created_at: Utc::now(),
        };
        users.push(user.clone());
        Ok(user)
    }
}

#[async_trait]
impl OrganizationRepository for MemoryStore {
    async fn create_organization(&self, name: &str, owner_id: Uuid) -> AppResult<Organization> {
        let mut users = self.users.lock().unwrap();
        let owner = users
            .iter_mut()
            .find(|u| u.id == owner_id)
            .ok_or(AppError::UserNotFound)?;
        if owner.organization_id.is_some() {
            return Err(AppError::AlreadyInOrganization);
        }

        let organization = Organization {
            id: Uuid::new_v4(),
            name: name.to_string(),
            created_by: Some(owner_id),
            created_at: Utc::now(),
        };
        owner.organization_id = Some(organization.id);
        owner.role = Role::Owner;
        self.organizations.lock().unwrap().push(organization.clone());
        Ok(organization)
    }

    async fn find_organization(&self, id: Uuid) -> AppResult<Option<Organization>> {
        let organizations = self.organizations.lock().unwrap();
        Ok(organizations.iter().find(|o| o.id == id).cloned())
    }
}
