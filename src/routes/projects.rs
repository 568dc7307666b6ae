/**
 * Project Routes
 * Portfolio projects, as JSON or as multipart with image files
 */
use axum::{
    extract::{Multipart, Path, State},
    http::{HeaderMap, StatusCode},
    response::Response,
    Json,
};
use sqlx::types::Json as Jsonb;
use uuid::Uuid;

use crate::db::models::{ProjectRow, PROJECT_COLUMNS};
use crate::error::ApiError;
use crate::models::{Project, ProjectPayload};
use crate::routes::auth::require_admin;
use crate::routes::upload::{
    discard_stored, persist_with_uploads, store_file, FileKind, MultipartForm,
    MAX_PROJECT_IMAGE_SIZE,
};
use crate::routes::{non_empty, require_pool, required, respond};
use crate::state::AppState;

const IMAGE_FOLDER: &str = "projects";

fn clean(payload: ProjectPayload) -> Result<ProjectPayload, ApiError> {
    required("Title", &payload.title)?;
    required("Description", &payload.description)?;
    required("Category", &payload.category)?;
    required("Date", &payload.date)?;

    let lines = |items: Vec<String>| -> Vec<String> {
        items
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    };

    if payload
        .results
        .iter()
        .any(|r| r.metric.trim().is_empty() || r.label.trim().is_empty())
    {
        return Err(ApiError::BadRequest(
            "Each result needs a metric and a label".to_string(),
        ));
    }

    Ok(ProjectPayload {
        title: payload.title.trim().to_string(),
        description: payload.description.trim().to_string(),
        full_description: non_empty(payload.full_description),
        category: payload.category.trim().to_string(),
        date: payload.date.trim().to_string(),
        duration: non_empty(payload.duration),
        images: lines(payload.images),
        features: lines(payload.features),
        tags: lines(payload.tags),
        team: lines(payload.team),
        client: payload.client,
        external_links: crate::models::ExternalLinks {
            live: non_empty(payload.external_links.live),
            github: non_empty(payload.external_links.github),
        },
        download_links: crate::models::DownloadLinks {
            ios: non_empty(payload.download_links.ios),
            android: non_empty(payload.download_links.android),
        },
        results: payload.results,
    })
}

/// Builds a payload from multipart parts; images are filled in separately.
fn payload_from_form(form: &MultipartForm) -> Result<ProjectPayload, ApiError> {
    Ok(ProjectPayload {
        title: form.text("title").unwrap_or_default().to_string(),
        description: form.text("description").unwrap_or_default().to_string(),
        full_description: form.optional_text("fullDescription"),
        category: form.text("category").unwrap_or_default().to_string(),
        date: form.text("date").unwrap_or_default().to_string(),
        duration: form.optional_text("duration"),
        images: Vec::new(),
        features: form.json("features")?,
        tags: form.json("tags")?,
        team: form.json("team")?,
        client: form.json("client")?,
        external_links: form.json("externalLinks")?,
        download_links: form.json("downloadLinks")?,
        results: form.json("results")?,
    })
}

async fn store_images(state: &AppState, form: &MultipartForm) -> Result<Vec<String>, ApiError> {
    let mut urls = Vec::new();
    for file in form.files("images") {
        match store_file(
            state.store.as_ref(),
            IMAGE_FOLDER,
            file,
            FileKind::Image,
            MAX_PROJECT_IMAGE_SIZE,
        )
        .await
        {
            Ok(url) => urls.push(url),
            Err(e) => {
                discard_stored(state.store.as_ref(), &urls).await;
                return Err(e);
            }
        }
    }
    Ok(urls)
}

async fn insert_project(payload: &ProjectPayload) -> Result<Project, ApiError> {
    let pool = require_pool()?;
    let row = sqlx::query_as::<_, ProjectRow>(&format!(
        r#"
        INSERT INTO projects (title, description, full_description, category, date, duration,
                              images, features, tags, team, client, external_links,
                              download_links, results)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        RETURNING {PROJECT_COLUMNS}
        "#
    ))
    .bind(&payload.title)
    .bind(&payload.description)
    .bind(&payload.full_description)
    .bind(&payload.category)
    .bind(&payload.date)
    .bind(&payload.duration)
    .bind(&payload.images)
    .bind(&payload.features)
    .bind(&payload.tags)
    .bind(&payload.team)
    .bind(Jsonb(&payload.client))
    .bind(Jsonb(&payload.external_links))
    .bind(Jsonb(&payload.download_links))
    .bind(Jsonb(&payload.results))
    .fetch_one(pool.as_ref())
    .await?;

    tracing::info!("Project created: {} ({})", row.title, row.id);
    Ok(row.into())
}

async fn update_project_row(id: Uuid, payload: &ProjectPayload) -> Result<Project, ApiError> {
    let pool = require_pool()?;
    let row = sqlx::query_as::<_, ProjectRow>(&format!(
        r#"
        UPDATE projects
        SET title = $1, description = $2, full_description = $3, category = $4, date = $5,
            duration = $6, images = $7, features = $8, tags = $9, team = $10, client = $11,
            external_links = $12, download_links = $13, results = $14
        WHERE id = $15
        RETURNING {PROJECT_COLUMNS}
        "#
    ))
    .bind(&payload.title)
    .bind(&payload.description)
    .bind(&payload.full_description)
    .bind(&payload.category)
    .bind(&payload.date)
    .bind(&payload.duration)
    .bind(&payload.images)
    .bind(&payload.features)
    .bind(&payload.tags)
    .bind(&payload.team)
    .bind(Jsonb(&payload.client))
    .bind(Jsonb(&payload.external_links))
    .bind(Jsonb(&payload.download_links))
    .bind(Jsonb(&payload.results))
    .bind(id)
    .fetch_optional(pool.as_ref())
    .await?
    .ok_or(ApiError::NotFound("Project"))?;

    Ok(row.into())
}

async fn fetch_project(id: Uuid) -> Result<Project, ApiError> {
    let pool = require_pool()?;
    let row = sqlx::query_as::<_, ProjectRow>(&format!(
        "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool.as_ref())
    .await?
    .ok_or(ApiError::NotFound("Project"))?;
    Ok(row.into())
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/projects
pub async fn list_projects() -> Result<Response, ApiError> {
    let pool = require_pool()?;
    let rows = sqlx::query_as::<_, ProjectRow>(&format!(
        "SELECT {PROJECT_COLUMNS} FROM projects ORDER BY created_at DESC"
    ))
    .fetch_all(pool.as_ref())
    .await?;

    let projects: Vec<Project> = rows.into_iter().map(Project::from).collect();
    Ok(respond(StatusCode::OK, "Projects retrieved", projects))
}

/// GET /api/projects/{id}
pub async fn get_project(Path(id): Path<Uuid>) -> Result<Response, ApiError> {
    let project = fetch_project(id).await?;
    Ok(respond(StatusCode::OK, "Project retrieved", project))
}

/// POST /api/projects (auth required)
pub async fn create_project(
    headers: HeaderMap,
    Json(payload): Json<ProjectPayload>,
) -> Result<Response, ApiError> {
    require_admin(&headers)?;
    let payload = clean(payload)?;
    let project = insert_project(&payload).await?;
    Ok(respond(StatusCode::CREATED, "Project created", project))
}

/// PUT /api/projects/{id} (auth required)
pub async fn update_project(
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProjectPayload>,
) -> Result<Response, ApiError> {
    require_admin(&headers)?;
    let payload = clean(payload)?;
    let project = update_project_row(id, &payload).await?;
    Ok(respond(StatusCode::OK, "Project updated", project))
}

/// POST /api/projects/upload (auth required, multipart)
pub async fn create_project_upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    require_admin(&headers)?;
    let form = MultipartForm::read(multipart).await?;
    let mut payload = clean(payload_from_form(&form)?)?;
    require_pool()?;

    let uploaded = store_images(&state, &form).await?;
    payload.images = uploaded.clone();
    let project =
        persist_with_uploads(state.store.as_ref(), &uploaded, insert_project(&payload)).await?;
    Ok(respond(StatusCode::CREATED, "Project created", project))
}

/// PUT /api/projects/{id}/upload (auth required, multipart)
/// Stored images stay as they are unless new files are sent, which replace them.
pub async fn update_project_upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    require_admin(&headers)?;
    let form = MultipartForm::read(multipart).await?;
    let mut payload = clean(payload_from_form(&form)?)?;

    let existing = fetch_project(id).await?;
    let uploaded = store_images(&state, &form).await?;
    payload.images = if uploaded.is_empty() {
        existing.images
    } else {
        uploaded.clone()
    };

    let project =
        persist_with_uploads(state.store.as_ref(), &uploaded, update_project_row(id, &payload))
            .await?;
    Ok(respond(StatusCode::OK, "Project updated", project))
}

/// DELETE /api/projects/{id} (auth required)
pub async fn delete_project(
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    require_admin(&headers)?;
    let pool = require_pool()?;

    let result = sqlx::query("DELETE FROM projects WHERE id = $1")
        .bind(id)
        .execute(pool.as_ref())
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Project"));
    }

    tracing::info!("Project deleted: {}", id);
    Ok(respond(StatusCode::OK, "Project deleted", ()))
}
