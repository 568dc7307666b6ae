/**
 * Career Routes
 * Job openings with their application counts
 */
use axum::{
    extract::Path,
    http::{HeaderMap, StatusCode},
    response::Response,
    Json,
};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{Career, CareerPayload};
use crate::routes::auth::require_admin;
use crate::routes::{non_empty, require_pool, required, respond};

const CAREER_SELECT: &str = r#"
    SELECT c.id, c.title, c.department, c.job_type, c.location, c.salary, c.experience,
           c.posted, c.description, c.requirements, c.responsibilities,
           (SELECT COUNT(*) FROM applications a WHERE a.career_id = c.id) AS application_count
    FROM careers c
"#;

/// Normalized copy of a payload: trimmed text, blank optionals dropped,
/// empty list entries removed.
fn clean(payload: CareerPayload) -> Result<CareerPayload, ApiError> {
    required("Title", &payload.title)?;
    required("Department", &payload.department)?;
    required("Type", &payload.kind)?;
    required("Location", &payload.location)?;
    required("Description", &payload.description)?;

    let lines = |items: Vec<String>| -> Vec<String> {
        items
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    };

    Ok(CareerPayload {
        title: payload.title.trim().to_string(),
        department: payload.department.trim().to_string(),
        kind: payload.kind.trim().to_string(),
        location: payload.location.trim().to_string(),
        salary: non_empty(payload.salary),
        experience: non_empty(payload.experience),
        posted: non_empty(payload.posted),
        description: payload.description.trim().to_string(),
        requirements: lines(payload.requirements),
        responsibilities: lines(payload.responsibilities),
    })
}

async fn fetch_career(id: Uuid) -> Result<Career, ApiError> {
    let pool = require_pool()?;
    sqlx::query_as::<_, Career>(&format!("{CAREER_SELECT} WHERE c.id = $1"))
        .bind(id)
        .fetch_optional(pool.as_ref())
        .await?
        .ok_or(ApiError::NotFound("Career"))
}

/// GET /api/careers
pub async fn list_careers() -> Result<Response, ApiError> {
    let pool = require_pool()?;
    let careers = sqlx::query_as::<_, Career>(&format!("{CAREER_SELECT} ORDER BY c.created_at DESC"))
        .fetch_all(pool.as_ref())
        .await?;

    Ok(respond(StatusCode::OK, "Careers retrieved", careers))
}

/// GET /api/careers/{id}
pub async fn get_career(Path(id): Path<Uuid>) -> Result<Response, ApiError> {
    let career = fetch_career(id).await?;
    Ok(respond(StatusCode::OK, "Career retrieved", career))
}

/// POST /api/careers (auth required)
pub async fn create_career(
    headers: HeaderMap,
    Json(payload): Json<CareerPayload>,
) -> Result<Response, ApiError> {
    require_admin(&headers)?;
    let payload = clean(payload)?;
    let pool = require_pool()?;

    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO careers (title, department, job_type, location, salary, experience, posted,
                             description, requirements, responsibilities)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING id
        "#,
    )
    .bind(&payload.title)
    .bind(&payload.department)
    .bind(&payload.kind)
    .bind(&payload.location)
    .bind(&payload.salary)
    .bind(&payload.experience)
    .bind(&payload.posted)
    .bind(&payload.description)
    .bind(&payload.requirements)
    .bind(&payload.responsibilities)
    .fetch_one(pool.as_ref())
    .await?;

    tracing::info!("Career created: {} ({})", payload.title, id);
    let career = fetch_career(id).await?;
    Ok(respond(StatusCode::CREATED, "Career created", career))
}

/// PUT /api/careers/{id} (auth required)
pub async fn update_career(
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(payload): Json<CareerPayload>,
) -> Result<Response, ApiError> {
    require_admin(&headers)?;
    let payload = clean(payload)?;
    let pool = require_pool()?;

    let result = sqlx::query(
        r#"
        UPDATE careers
        SET title = $1, department = $2, job_type = $3, location = $4, salary = $5,
            experience = $6, posted = $7, description = $8, requirements = $9,
            responsibilities = $10
        WHERE id = $11
        "#,
    )
    .bind(&payload.title)
    .bind(&payload.department)
    .bind(&payload.kind)
    .bind(&payload.location)
    .bind(&payload.salary)
    .bind(&payload.experience)
    .bind(&payload.posted)
    .bind(&payload.description)
    .bind(&payload.requirements)
    .bind(&payload.responsibilities)
    .bind(id)
    .execute(pool.as_ref())
    .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Career"));
    }

    let career = fetch_career(id).await?;
    Ok(respond(StatusCode::OK, "Career updated", career))
}

/// DELETE /api/careers/{id} (auth required)
/// Applications for the opening survive with `career_id` set to NULL.
pub async fn delete_career(
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    require_admin(&headers)?;
    let pool = require_pool()?;

    let result = sqlx::query("DELETE FROM careers WHERE id = $1")
        .bind(id)
        .execute(pool.as_ref())
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Career"));
    }

    tracing::info!("Career deleted: {}", id);
    Ok(respond(StatusCode::OK, "Career deleted", ()))
}
