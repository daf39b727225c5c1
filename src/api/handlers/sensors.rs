use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    api::extract::{AppJson, AppQuery},
    error::AppResult,
    models::Reading,
    services::{history::HistoryService, ingest::IngestService},
    AppState,
};

use super::MessageResponse;

/// Device-facing endpoint; unauthenticated.
pub async fn ingest(
    State(state): State<AppState>,
    AppJson(payload): AppJson<Value>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    let ingest_service = IngestService::new(state.store.devices, state.store.readings);
    ingest_service.ingest(&payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Sensor data stored")),
    ))
}

#[derive(Debug, Default, Deserialize)]
pub struct HistoryParams {
    #[serde(rename = "startDate", alias = "start_date")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate", alias = "end_date")]
    pub end_date: Option<String>,
    pub limit: Option<i64>,
}

pub async fn device_history(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
    AppQuery(params): AppQuery<HistoryParams>,
) -> AppResult<Json<Vec<Reading>>> {
    history(state, Some(device_id), params).await
}

pub async fn all_history(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<HistoryParams>,
) -> AppResult<Json<Vec<Reading>>> {
    history(state, None, params).await
}

async fn history(
    state: AppState,
    device_id: Option<String>,
    params: HistoryParams,
) -> AppResult<Json<Vec<Reading>>> {
    let history_service =
        HistoryService::new(state.store.readings, state.config.api.history_max_limit);
    let filter = history_service.filter(
        device_id,
        params.start_date.as_deref(),
        params.end_date.as_deref(),
        params.limit,
    )?;

    let readings = history_service.history(filter).await?;
    Ok(Json(readings))
}

pub async fn latest_reading(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
) -> AppResult<Json<Reading>> {
    let history_service =
        HistoryService::new(state.store.readings, state.config.api.history_max_limit);
    let reading = history_service.latest(&device_id).await?;

    Ok(Json(reading))
}
