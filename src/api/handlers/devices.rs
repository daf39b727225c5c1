use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    api::extract::AppJson,
    error::AppResult,
    models::{Device, DeviceConfigUpdate, DeviceView},
    services::{auth::Claims, devices::DeviceService, presence::PresenceService},
    AppState,
};

use super::super::middleware::get_user_id;

#[derive(Debug, Deserialize)]
pub struct CreateDeviceRequest {
    #[serde(rename = "deviceId", alias = "device_id")]
    pub device_id: Option<String>,
    #[serde(rename = "deviceName", alias = "device_name")]
    pub device_name: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeviceResponse {
    pub message: String,
    pub device: Device,
}

pub async fn create_device(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    AppJson(req): AppJson<CreateDeviceRequest>,
) -> AppResult<(StatusCode, Json<DeviceResponse>)> {
    let user_id = get_user_id(&claims)?;

    let device_service = DeviceService::new(state.store.devices, state.store.users);
    let device = device_service
        .create_device(
            user_id,
            req.device_id.as_deref(),
            req.device_name.as_deref(),
            req.location.as_deref(),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(DeviceResponse {
            message: "Device created".to_string(),
            device,
        }),
    ))
}

/// Every device with its latest reading and online flag.
pub async fn list_devices(State(state): State<AppState>) -> AppResult<Json<Vec<DeviceView>>> {
    let presence_service = PresenceService::new(state.store.devices, state.store.readings);
    let devices = presence_service.list_devices().await?;

    Ok(Json(devices))
}

pub async fn get_device(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Device>> {
    let device_service = DeviceService::new(state.store.devices, state.store.users);
    let device = device_service.get_device(&id).await?;

    Ok(Json(device))
}

#[derive(Debug, Deserialize)]
pub struct UpdateConfigRequest {
    #[serde(rename = "deviceName", alias = "device_name")]
    pub device_name: Option<String>,
    pub location: Option<String>,
}

pub async fn update_config(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(req): AppJson<UpdateConfigRequest>,
) -> AppResult<Json<DeviceResponse>> {
    let device_service = DeviceService::new(state.store.devices, state.store.users);
    let device = device_service
        .update_config(
            &id,
            DeviceConfigUpdate {
                device_name: req.device_name,
                location: req.location,
            },
        )
        .await?;

    Ok(Json(DeviceResponse {
        message: "Configuration updated".to_string(),
        device,
    }))
}
