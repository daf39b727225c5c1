use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    // Auth errors
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Token not provided")]
    Unauthorized,
    #[error("Invalid token")]
    InvalidToken,

    // User errors
    #[error("User not found")]
    UserNotFound,
    #[error("Email already registered")]
    EmailAlreadyRegistered,

    // Organization errors
    #[error("User not in an organization")]
    NotInOrganization,
    #[error("User already in organization")]
    AlreadyInOrganization,

    // Device errors
    #[error("Device not found")]
    DeviceNotFound,
    #[error("Device ID already exists")]
    DeviceAlreadyExists,

    // Reading errors
    #[error("No readings for device")]
    ReadingNotFound,

    // Validation errors
    #[error("{0}")]
    Validation(String),

    // Database errors
    #[error("{0}")]
    Database(#[from] sqlx::Error),

    // JWT errors
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    // Internal errors
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::Validation(_)
            | AppError::InvalidCredentials
            | AppError::EmailAlreadyRegistered
            | AppError::AlreadyInOrganization
            | AppError::DeviceAlreadyExists => StatusCode::BAD_REQUEST,

            // 401 Unauthorized
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            AppError::InvalidToken | AppError::Jwt(_) => StatusCode::FORBIDDEN,

            // 404 Not Found
            AppError::UserNotFound
            | AppError::NotInOrganization
            | AppError::DeviceNotFound
            | AppError::ReadingNotFound => StatusCode::NOT_FOUND,

            // 500 Internal Server Error
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Jwt(_) => AppError::InvalidToken.to_string(),
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                e.to_string()
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {:#}", e);
                self.to_string()
            }
            _ => self.to_string(),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let message = match rejection {
            JsonRejection::JsonDataError(err) => format!("Invalid JSON: {}", err),
            JsonRejection::JsonSyntaxError(err) => format!("JSON syntax error: {}", err),
            JsonRejection::MissingJsonContentType(_) => {
                "Missing 'Content-Type: application/json' header".to_string()
            }
            _ => "Invalid request body".to_string(),
        };
        AppError::Validation(message)
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

pub type AppResult<T> = Result<T, AppError>;
