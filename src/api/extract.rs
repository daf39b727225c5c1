//! Extractors whose rejections render through `AppError`, so malformed bodies
//! and query strings get the same `{"error": ...}` shape as everything else.

use axum::extract::{FromRequest, FromRequestParts, Query};

use crate::error::AppError;

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);
