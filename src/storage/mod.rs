use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        Device, DeviceConfigUpdate, HistoryFilter, NewDevice, NewReading, NewUser, Organization,
        Reading, User,
    },
};

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgStore;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeviceRepository: Send + Sync {
    async fn find_device(&self, id: Uuid) -> AppResult<Option<Device>>;

    /// All devices, oldest first.
    async fn list_devices(&self) -> AppResult<Vec<Device>>;

    /// Fails with `DeviceAlreadyExists` when the vendor id is taken.
    async fn create_device(&self, input: NewDevice) -> AppResult<Device>;

    /// Atomic get-or-create keyed by the vendor id. The flag is true when
    /// this call inserted the row.
    async fn get_or_create_device(&self, input: NewDevice) -> AppResult<(Device, bool)>;

    async fn update_device_config(
        &self,
        id: Uuid,
        update: DeviceConfigUpdate,
    ) -> AppResult<Option<Device>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReadingRepository: Send + Sync {
    async fn insert_reading(&self, input: NewReading) -> AppResult<Reading>;

    /// Most recent reading by `received_timestamp`.
    async fn latest_reading(&self, device_id: &str) -> AppResult<Option<Reading>>;

    /// Newest first by `sensor_timestamp`, at most `filter.limit` rows.
    async fn history(&self, filter: HistoryFilter) -> AppResult<Vec<Reading>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Fails with `EmailAlreadyRegistered` when the email is taken.
    async fn create_user(&self, input: NewUser) -> AppResult<User>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    /// Creates the organization and makes `owner_id` its owner in one step.
    /// Fails with `AlreadyInOrganization` if the user already belongs to one.
    async fn create_organization(&self, name: &str, owner_id: Uuid) -> AppResult<Organization>;

    async fn find_organization(&self, id: Uuid) -> AppResult<Option<Organization>>;
}

/// Repositories shared by every handler, built once at startup.
#[derive(Clone)]
pub struct Store {
    pub devices: Arc<dyn DeviceRepository>,
    pub readings: Arc<dyn ReadingRepository>,
    pub users: Arc<dyn UserRepository>,
    pub organizations: Arc<dyn OrganizationRepository>,
}

impl Store {
    pub fn postgres(db: sqlx::PgPool) -> Self {
        let pg = Arc::new(PgStore::new(db));
        Self {
            devices: pg.clone(),
            readings: pg.clone(),
            users: pg.clone(),
            organizations: pg,
        }
    }
}
