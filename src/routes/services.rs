/**
 * Service Routes
 * CRUD endpoints for the services offered on the public site
 */
use axum::{
    extract::Path,
    http::{HeaderMap, StatusCode},
    response::Response,
    Json,
};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{Service, ServicePayload};
use crate::routes::auth::require_admin;
use crate::routes::{require_pool, required, respond};

const SERVICE_COLUMNS: &str = "id, title, description, icon";

fn validate(payload: &ServicePayload) -> Result<(), ApiError> {
    required("Title", &payload.title)?;
    required("Description", &payload.description)?;
    if !payload.icon.is_known() {
        return Err(ApiError::BadRequest(format!(
            "Unknown icon '{}'",
            payload.icon
        )));
    }
    Ok(())
}

/// GET /api/services
pub async fn list_services() -> Result<Response, ApiError> {
    let pool = require_pool()?;
    let services = sqlx::query_as::<_, Service>(&format!(
        "SELECT {SERVICE_COLUMNS} FROM services ORDER BY created_at ASC"
    ))
    .fetch_all(pool.as_ref())
    .await?;

    Ok(respond(StatusCode::OK, "Services retrieved", services))
}

/// GET /api/services/{id}
pub async fn get_service(Path(id): Path<Uuid>) -> Result<Response, ApiError> {
    let pool = require_pool()?;
    let service = sqlx::query_as::<_, Service>(&format!(
        "SELECT {SERVICE_COLUMNS} FROM services WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool.as_ref())
    .await?
    .ok_or(ApiError::NotFound("Service"))?;

    Ok(respond(StatusCode::OK, "Service retrieved", service))
}

/// POST /api/services (auth required)
pub async fn create_service(
    headers: HeaderMap,
    Json(payload): Json<ServicePayload>,
) -> Result<Response, ApiError> {
    require_admin(&headers)?;
    validate(&payload)?;
    let pool = require_pool()?;

    let service = sqlx::query_as::<_, Service>(&format!(
        "INSERT INTO services (title, description, icon) VALUES ($1, $2, $3) \
         RETURNING {SERVICE_COLUMNS}"
    ))
    .bind(payload.title.trim())
    .bind(payload.description.trim())
    .bind(payload.icon.as_str())
    .fetch_one(pool.as_ref())
    .await?;

    tracing::info!("Service created: {} ({})", service.title, service.id);
    Ok(respond(StatusCode::CREATED, "Service created", service))
}

/// PUT /api/services/{id} (auth required)
pub async fn update_service(
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(payload): Json<ServicePayload>,
) -> Result<Response, ApiError> {
    require_admin(&headers)?;
    validate(&payload)?;
    let pool = require_pool()?;

    let service = sqlx::query_as::<_, Service>(&format!(
        "UPDATE services SET title = $1, description = $2, icon = $3 WHERE id = $4 \
         RETURNING {SERVICE_COLUMNS}"
    ))
    .bind(payload.title.trim())
    .bind(payload.description.trim())
    .bind(payload.icon.as_str())
    .bind(id)
    .fetch_optional(pool.as_ref())
    .await?
    .ok_or(ApiError::NotFound("Service"))?;

    Ok(respond(StatusCode::OK, "Service updated", service))
}

/// DELETE /api/services/{id} (auth required)
pub async fn delete_service(
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    require_admin(&headers)?;
    let pool = require_pool()?;

    let result = sqlx::query("DELETE FROM services WHERE id = $1")
        .bind(id)
        .execute(pool.as_ref())
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Service"));
    }

    tracing::info!("Service deleted: {}", id);
    Ok(respond(StatusCode::OK, "Service deleted", ()))
}
