use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use crate::{
    api::extract::AppJson, error::AppResult, models::AccessToken, services::auth::AuthService,
    AppState,
};

use super::MessageResponse;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

pub async fn register(
    State(state): State<AppState>,
    AppJson(req): AppJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    let auth_service = AuthService::new(state.store.users, state.config);
    auth_service
        .register(&req.name, &req.email, &req.password)
        .await?;

    Ok((StatusCode::CREATED, Json(MessageResponse::new("User registered"))))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    AppJson(req): AppJson<LoginRequest>,
) -> AppResult<Json<AccessToken>> {
    let auth_service = AuthService::new(state.store.users, state.config);
    let token = auth_service.login(&req.email, &req.password).await?;

    Ok(Json(token))
}
