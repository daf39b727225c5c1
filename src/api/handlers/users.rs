use axum::{extract::State, Extension, Json};

use crate::{
    error::AppResult,
    models::User,
    services::auth::{AuthService, Claims},
    AppState,
};

use super::super::middleware::get_user_id;

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<User>> {
    let user_id = get_user_id(&claims)?;

    let auth_service = AuthService::new(state.store.users, state.config);
    let user = auth_service.profile(user_id).await?;

    Ok(Json(user))
}
