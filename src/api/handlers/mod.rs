use serde::Serialize;

pub mod auth;
pub mod devices;
pub mod orgs;
pub mod sensors;
pub mod users;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}
