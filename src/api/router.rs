use axum::{
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use super::{handlers, middleware::auth_middleware};
use crate::AppState;

pub fn create_router(state: AppState) -> Router<AppState> {
    // Device ingestion (public)
    let ingest_routes = Router::new().route("/", post(handlers::sensors::ingest));

    // Sensor history routes (protected)
    let sensor_routes = Router::new()
        .route("/history/all", get(handlers::sensors::all_history))
        .route("/:device_id/history", get(handlers::sensors::device_history))
        .route("/:device_id/latest", get(handlers::sensors::latest_reading))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Public auth routes
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    // User routes (protected)
    let user_routes = Router::new()
        .route("/profile", get(handlers::users::get_profile))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Organization routes (protected)
    let org_routes = Router::new()
        .route("/", post(handlers::orgs::create_organization))
        .route("/me", get(handlers::orgs::my_organization))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Device routes (protected)
    let device_routes = Router::new()
        .route(
            "/",
            get(handlers::devices::list_devices).post(handlers::devices::create_device),
        )
        .route("/:id", get(handlers::devices::get_device))
        .route("/:id/config", put(handlers::devices::update_config))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Combine all routes
    Router::new()
        .nest("/sensors", ingest_routes.merge(sensor_routes))
        .nest("/auth", auth_routes)
        .nest("/user", user_routes)
        .nest("/orgs", org_routes)
        .nest("/devices", device_routes)
        .with_state(state)
}

/// Full application: API under `/api` plus liveness endpoints and shared layers.
pub fn create_app(state: AppState) -> Router {
    let max_body_bytes = state.config.api.max_body_bytes;

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api", create_router(state.clone()))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Data + Web server online" }))
}

async fn health_check() -> &'static str {
    "OK"
}
