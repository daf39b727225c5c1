use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{MemberSummary, Membership, Organization},
    storage::{OrganizationRepository, UserRepository},
};

pub struct OrganizationService {
    users: Arc<dyn UserRepository>,
    organizations: Arc<dyn OrganizationRepository>,
}

impl OrganizationService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        organizations: Arc<dyn OrganizationRepository>,
    ) -> Self {
        Self {
            users,
            organizations,
        }
    }

    /// Creates an organization owned by `user_id`. A user belongs to at most one.
    pub async fn create(&self, user_id: Uuid, name: Option<&str>) -> AppResult<Organization> {
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| AppError::validation("Organization name required"))?;

        let user = self
            .users
            .find_user(user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;
        if user.organization_id.is_some() {
            return Err(AppError::AlreadyInOrganization);
        }

        let organization = self.organizations.create_organization(name, user.id).await?;
        info!(organization_id = %organization.id, owner_id = %user.id, "Organization created");

        Ok(organization)
    }

    pub async fn membership(&self, user_id: Uuid) -> AppResult<Membership> {
        let user = self
            .users
            .find_user(user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        let organization_id = user.organization_id.ok_or(AppError::NotInOrganization)?;
        let organization = self
            .organizations
            .find_organization(organization_id)
            .await?
            .ok_or(AppError::NotInOrganization)?;

        Ok(Membership {
            user: MemberSummary::from(&user),
            organization,
        })
    }
}
