use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::{DeviceRepository, OrganizationRepository, ReadingRepository, UserRepository};
use crate::{
    error::{AppError, AppResult},
    models::{
        Device, DeviceConfigUpdate, HistoryFilter, NewDevice, NewReading, NewUser, Organization,
        Reading, Role, User,
    },
};

#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

#[async_trait]
impl DeviceRepository for PgStore {
    async fn find_device(&self, id: Uuid) -> AppResult<Option<Device>> {
        let device = sqlx::query_as("SELECT * FROM devices WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(device)
    }

    async fn list_devices(&self) -> AppResult<Vec<Device>> {
        let devices = sqlx::query_as("SELECT * FROM devices ORDER BY created_at ASC, id ASC")
            .fetch_all(&self.db)
            .await?;
        Ok(devices)
    }

    async fn create_device(&self, input: NewDevice) -> AppResult<Device> {
        let result = sqlx::query_as(
            r#"
            INSERT INTO devices (id, device_id, device_name, location, owner_id, organization_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&input.device_id)
        .bind(&input.device_name)
        .bind(&input.location)
        .bind(input.owner_id)
        .bind(input.organization_id)
        .fetch_one(&self.db)
        .await;

        match result {
            Ok(device) => Ok(device),
            Err(e) if is_unique_violation(&e) => Err(AppError::DeviceAlreadyExists),
            Err(e) => Err(e.into()),
        }
    }

    async fn get_or_create_device(&self, input: NewDevice) -> AppResult<(Device, bool)> {
        let inserted: Option<Device> = sqlx::query_as(
            r#"
            INSERT INTO devices (id, device_id, device_name, location, owner_id, organization_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (device_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&input.device_id)
        .bind(&input.device_name)
        .bind(&input.location)
        .bind(input.owner_id)
        .bind(input.organization_id)
        .fetch_optional(&self.db)
        .await?;

        if let Some(device) = inserted {
            return Ok((device, true));
        }

        let existing = sqlx::query_as("SELECT * FROM devices WHERE device_id = $1")
            .bind(&input.device_id)
            .fetch_one(&self.db)
            .await?;
        Ok((existing, false))
    }

    async fn update_device_config(
        &self,
        id: Uuid,
        update: DeviceConfigUpdate,
    ) -> AppResult<Option<Device>> {
        let device = sqlx::query_as(
            r#"
            UPDATE devices
            SET device_name = COALESCE($1, device_name),
                location = COALESCE($2, location)
            WHERE id = $3
            RETURNING *
            "#,
        )
        .bind(&update.device_name)
        .bind(&update.location)
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(device)
    }
}

#[async_trait]
impl ReadingRepository for PgStore {
    async fn insert_reading(&self, input: NewReading) -> AppResult<Reading> {
        let reading = sqlx::query_as(
            r#"
            INSERT INTO readings (
                id, device_id, packet_number, temperature, humidity,
                door_status, power_status, sensor_timestamp, received_timestamp
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&input.device_id)
        .bind(input.packet_number)
        .bind(input.temperature)
        .bind(input.humidity)
        .bind(input.door_status)
        .bind(input.power_status)
        .bind(input.sensor_timestamp)
        .bind(input.received_timestamp)
        .fetch_one(&self.db)
        .await?;
        Ok(reading)
    }

    async fn latest_reading(&self, device_id: &str) -> AppResult<Option<Reading>> {
        let reading = sqlx::query_as(
            r#"
            SELECT * FROM readings
            WHERE device_id = $1
            ORDER BY received_timestamp DESC
            LIMIT 1
            "#,
        )
        .bind(device_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(reading)
    }

    async fn history(&self, filter: HistoryFilter) -> AppResult<Vec<Reading>> {
        let readings: Vec<Reading> = sqlx::query_as(
            r#"
            SELECT * FROM readings
            WHERE ($1::text IS NULL OR device_id = $1)
              AND ($2::timestamptz IS NULL OR sensor_timestamp >= $2)
              AND ($3::timestamptz IS NULL OR sensor_timestamp <= $3)
            ORDER BY sensor_timestamp DESC, received_timestamp DESC, id DESC
            LIMIT $4
            "#,
        )
        .bind(&filter.device_id)
        .bind(filter.start)
        .bind(filter.end)
        .bind(filter.limit)
        .fetch_all(&self.db)
        .await?;

        debug!(count = readings.len(), device_id = ?filter.device_id, "Loaded reading history");
        Ok(readings)
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
        let user = sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    async fn create_user(&self, input: NewUser) -> AppResult<User> {
        let result = sqlx::query_as(
            r#"
            INSERT INTO users (id, name, email, password_hash, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.password_hash)
        .bind(Role::Member)
        .fetch_one(&self.db)
        .await;

        match result {
            Ok(user) => Ok(user),
            Err(e) if is_unique_violation(&e) => Err(AppError::EmailAlreadyRegistered),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl OrganizationRepository for PgStore {
    async fn create_organization(&self, name: &str, owner_id: Uuid) -> AppResult<Organization> {
        let mut tx = self.db.begin().await?;

        let organization: Organization = sqlx::query_as(
            r#"
            INSERT INTO organizations (id, name, created_by)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(owner_id)
        .fetch_one(&mut *tx)
        .await?;

        let promoted = sqlx::query(
            r#"
            UPDATE users
            SET organization_id = $1, role = $2
            WHERE id = $3 AND organization_id IS NULL
            "#,
        )
        .bind(organization.id)
        .bind(Role::Owner)
        .bind(owner_id)
        .execute(&mut *tx)
        .await?;

        if promoted.rows_affected() == 0 {
            // dropping the transaction rolls the organization insert back
            return Err(AppError::AlreadyInOrganization);
        }

        tx.commit().await?;

        Ok(organization)
    }

    async fn find_organization(&self, id: Uuid) -> AppResult<Option<Organization>> {
        let organization = sqlx::query_as("SELECT * FROM organizations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(organization)
    }
}
