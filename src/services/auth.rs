use std::sync::Arc;

use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::{AccessToken, NewUser, User},
    storage::UserRepository,
};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // user_id
    pub iss: String, // issuer
    pub exp: i64,    // expiry
    pub iat: i64,    // issued at
}

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    config: Arc<Config>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, config: Arc<Config>) -> Self {
        Self { users, config }
    }

    // User Registration
    pub async fn register(&self, name: &str, email: &str, password: &str) -> AppResult<User> {
        let name = name.trim();
        let email = normalize_email(email);
        if name.is_empty() || email.is_empty() || password.is_empty() {
            return Err(AppError::validation("Name, email and password are required"));
        }

        if self.users.find_user_by_email(&email).await?.is_some() {
            return Err(AppError::EmailAlreadyRegistered);
        }

        let password_hash = self.hash_password(password).await?;
        let user = self
            .users
            .create_user(NewUser {
                name: name.to_string(),
                email,
                password_hash,
            })
            .await?;

        info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    // User Login
    pub async fn login(&self, email: &str, password: &str) -> AppResult<AccessToken> {
        let user = self
            .users
            .find_user_by_email(&normalize_email(email))
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !self.verify_password(password, &user.password_hash).await? {
            return Err(AppError::InvalidCredentials);
        }

        let token = self.issue_token(user.id)?;
        Ok(AccessToken { token })
    }

    pub async fn profile(&self, user_id: Uuid) -> AppResult<User> {
        self.users
            .find_user(user_id)
            .await?
            .ok_or(AppError::UserNotFound)
    }

    // Token validation
    pub fn validate_token(&self, token: &str) -> AppResult<Claims> {
        let key = DecodingKey::from_secret(self.config.jwt.secret.as_bytes());
        let mut validation = Validation::default();
        validation.leeway = 0;
        validation.set_issuer(&[&self.config.jwt.issuer]);

        let token_data = decode::<Claims>(token, &key, &validation)?;
        Ok(token_data.claims)
    }

    pub fn issue_token(&self, user_id: Uuid) -> AppResult<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.config.jwt.access_token_ttl.as_secs() as i64);

        let claims = Claims {
            sub: user_id.to_string(),
            iss: self.config.jwt.issuer.clone(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        let key = EncodingKey::from_secret(self.config.jwt.secret.as_bytes());
        Ok(encode(&Header::default(), &claims, &key)?)
    }

    async fn hash_password(&self, password: &str) -> AppResult<String> {
        let password = password.to_string();
        let cost = self.config.password.bcrypt_cost;

        let hashed = tokio::task::spawn_blocking(move || hash(password, cost))
            .await
            .map_err(|e| anyhow::anyhow!("Hash task failed: {}", e))?
            .map_err(|e| anyhow::anyhow!("Hash error: {}", e))?;
        Ok(hashed)
    }

    async fn verify_password(&self, password: &str, password_hash: &str) -> AppResult<bool> {
        let password = password.to_string();
        let password_hash = password_hash.to_string();

        let valid = tokio::task::spawn_blocking(move || verify(password, &password_hash))
            .await
            .map_err(|e| anyhow::anyhow!("Verify task failed: {}", e))?
            .map_err(|e| anyhow::anyhow!("Verify error: {}", e))?;
        Ok(valid)
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
