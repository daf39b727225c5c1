use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::{
    api::extract::AppJson,
    error::AppResult,
    models::{Membership, Organization},
    services::{auth::Claims, organizations::OrganizationService},
    AppState,
};

use super::super::middleware::get_user_id;

#[derive(Debug, Deserialize)]
pub struct CreateOrganizationRequest {
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OrganizationResponse {
    pub message: String,
    pub organization: Organization,
}

pub async fn create_organization(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    AppJson(req): AppJson<CreateOrganizationRequest>,
) -> AppResult<(StatusCode, Json<OrganizationResponse>)> {
    let user_id = get_user_id(&claims)?;

    let org_service = OrganizationService::new(state.store.users, state.store.organizations);
    let organization = org_service.create(user_id, req.name.as_deref()).await?;

    Ok((
        StatusCode::CREATED,
        Json(OrganizationResponse {
            message: "Organization created".to_string(),
            organization,
        }),
    ))
}

pub async fn my_organization(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<Membership>> {
    let user_id = get_user_id(&claims)?;

    let org_service = OrganizationService::new(state.store.users, state.store.organizations);
    let membership = org_service.membership(user_id).await?;

    Ok(Json(membership))
}
