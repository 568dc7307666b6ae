/**
 * Contact Routes
 * Messages from the public contact form
 */
use axum::{
    extract::Path,
    http::{HeaderMap, StatusCode},
    response::Response,
    Json,
};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{ContactMessage, ContactPayload};
use crate::routes::auth::require_admin;
use crate::routes::{require_pool, required, respond, validate_email};

const CONTACT_COLUMNS: &str = "id, name, email, message, created_at";
const MAX_MESSAGE_LENGTH: usize = 5000;

fn validate(payload: &ContactPayload) -> Result<(), ApiError> {
    required("Name", &payload.name)?;
    validate_email(&payload.email)?;
    required("Message", &payload.message)?;
    if payload.message.chars().count() > MAX_MESSAGE_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Message must be at most {MAX_MESSAGE_LENGTH} characters"
        )));
    }
    Ok(())
}

/// POST /api/contacts (public)
pub async fn create_contact(Json(payload): Json<ContactPayload>) -> Result<Response, ApiError> {
    validate(&payload)?;
    let pool = require_pool()?;

    let contact = sqlx::query_as::<_, ContactMessage>(&format!(
        "INSERT INTO contacts (name, email, message) VALUES ($1, $2, $3) \
         RETURNING {CONTACT_COLUMNS}"
    ))
    .bind(payload.name.trim())
    .bind(payload.email.trim())
    .bind(payload.message.trim())
    .fetch_one(pool.as_ref())
    .await?;

    tracing::info!("Contact message from {}", contact.email);
    Ok(respond(StatusCode::CREATED, "Message sent", contact))
}

/// GET /api/contacts (auth required)
pub async fn list_contacts(headers: HeaderMap) -> Result<Response, ApiError> {
    require_admin(&headers)?;
    let pool = require_pool()?;

    let contacts = sqlx::query_as::<_, ContactMessage>(&format!(
        "SELECT {CONTACT_COLUMNS} FROM contacts ORDER BY created_at DESC"
    ))
    .fetch_all(pool.as_ref())
    .await?;

    Ok(respond(StatusCode::OK, "Contacts retrieved", contacts))
}

/// DELETE /api/contacts/{id} (auth required)
pub async fn delete_contact(
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    require_admin(&headers)?;
    let pool = require_pool()?;

    let result = sqlx::query("DELETE FROM contacts WHERE id = $1")
        .bind(id)
        .execute(pool.as_ref())
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Contact"));
    }

    Ok(respond(StatusCode::OK, "Contact deleted", ()))
}
