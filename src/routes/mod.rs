/**
 * Routes Module
 * API route handlers and the helpers they share
 */
pub mod applications;
pub mod auth;
pub mod careers;
pub mod contacts;
pub mod health;
pub mod investments;
pub mod projects;
pub mod services;
pub mod team;
pub mod upload;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;

use crate::db;
use crate::error::ApiError;
use crate::models::Envelope;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

/// Wraps `data` in a success envelope.
pub fn respond<T: Serialize>(status: StatusCode, message: &str, data: T) -> Response {
    (status, Json(Envelope::success(message, data))).into_response()
}

pub fn require_pool() -> Result<Arc<PgPool>, ApiError> {
    db::get_pool().ok_or(ApiError::ServiceUnavailable)
}

/// Rejects blank required text fields with `"{label} is required"`.
pub fn required(label: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::BadRequest(format!("{label} is required")));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ApiError> {
    required("Email", email)?;
    if !EMAIL_REGEX.is_match(email.trim()) {
        return Err(ApiError::BadRequest("Invalid email format".to_string()));
    }
    Ok(())
}

/// Blank optional strings are stored as NULL.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_rejects_whitespace() {
        let err = required("Title", "   ").unwrap_err();
        assert_eq!(err.to_string(), "Title is required");
        assert!(required("Title", "DevOps").is_ok());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("a@b.com").is_ok());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("a@b").is_err());
    }

    #[test]
    fn test_non_empty_trims_and_drops_blank() {
        assert_eq!(non_empty(Some("  x ".to_string())), Some("x".to_string()));
        assert_eq!(non_empty(Some("   ".to_string())), None);
        assert_eq!(non_empty(None), None);
    }

    #[test]
    fn test_require_pool_without_database() {
        assert!(matches!(require_pool(), Err(ApiError::ServiceUnavailable)));
    }
}
