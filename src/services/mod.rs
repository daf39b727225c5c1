pub mod auth;
pub mod devices;
pub mod history;
pub mod ingest;
pub mod organizations;
pub mod presence;
