/**
 * Team Routes
 * Team members, with optional photo upload
 */
use axum::{
    extract::{Multipart, Path, State},
    http::{HeaderMap, StatusCode},
    response::Response,
    Json,
};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{TeamMember, TeamMemberPayload};
use crate::routes::auth::require_admin;
use crate::routes::upload::{
    persist_with_uploads, store_file, FileKind, MultipartForm, MAX_PHOTO_SIZE,
};
use crate::routes::{non_empty, require_pool, required, respond, validate_email};
use crate::state::AppState;

const TEAM_COLUMNS: &str = "id, name, role, bio, email, linkedin, github, image";
const PHOTO_FOLDER: &str = "team";

fn clean(payload: TeamMemberPayload) -> Result<TeamMemberPayload, ApiError> {
    required("Name", &payload.name)?;
    required("Role", &payload.role)?;
    let email = non_empty(payload.email);
    if let Some(email) = &email {
        validate_email(email)?;
    }

    Ok(TeamMemberPayload {
        name: payload.name.trim().to_string(),
        role: payload.role.trim().to_string(),
        bio: non_empty(payload.bio),
        email,
        linkedin: non_empty(payload.linkedin),
        github: non_empty(payload.github),
        image: non_empty(payload.image),
    })
}

fn payload_from_form(form: &MultipartForm) -> TeamMemberPayload {
    TeamMemberPayload {
        name: form.text("name").unwrap_or_default().to_string(),
        role: form.text("role").unwrap_or_default().to_string(),
        bio: form.optional_text("bio"),
        email: form.optional_text("email"),
        linkedin: form.optional_text("linkedin"),
        github: form.optional_text("github"),
        image: form.optional_text("image"),
    }
}

async fn store_photo(state: &AppState, form: &MultipartForm) -> Result<Option<String>, ApiError> {
    match form.file("image") {
        Some(file) => Ok(Some(
            store_file(
                state.store.as_ref(),
                PHOTO_FOLDER,
                file,
                FileKind::Image,
                MAX_PHOTO_SIZE,
            )
            .await?,
        )),
        None => Ok(None),
    }
}

async fn insert_member(payload: &TeamMemberPayload) -> Result<TeamMember, ApiError> {
    let pool = require_pool()?;
    let member = sqlx::query_as::<_, TeamMember>(&format!(
        "INSERT INTO team_members (name, role, bio, email, linkedin, github, image) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {TEAM_COLUMNS}"
    ))
    .bind(&payload.name)
    .bind(&payload.role)
    .bind(&payload.bio)
    .bind(&payload.email)
    .bind(&payload.linkedin)
    .bind(&payload.github)
    .bind(&payload.image)
    .fetch_one(pool.as_ref())
    .await?;

    tracing::info!("Team member created: {} ({})", member.name, member.id);
    Ok(member)
}

async fn update_member(id: Uuid, payload: &TeamMemberPayload) -> Result<TeamMember, ApiError> {
    let pool = require_pool()?;
    sqlx::query_as::<_, TeamMember>(&format!(
        "UPDATE team_members SET name = $1, role = $2, bio = $3, email = $4, linkedin = $5, \
         github = $6, image = $7 WHERE id = $8 RETURNING {TEAM_COLUMNS}"
    ))
    .bind(&payload.name)
    .bind(&payload.role)
    .bind(&payload.bio)
    .bind(&payload.email)
    .bind(&payload.linkedin)
    .bind(&payload.github)
    .bind(&payload.image)
    .bind(id)
    .fetch_optional(pool.as_ref())
    .await?
    .ok_or(ApiError::NotFound("Team member"))
}

/// GET /api/team
pub async fn list_team() -> Result<Response, ApiError> {
    let pool = require_pool()?;
    let members = sqlx::query_as::<_, TeamMember>(&format!(
        "SELECT {TEAM_COLUMNS} FROM team_members ORDER BY created_at ASC"
    ))
    .fetch_all(pool.as_ref())
    .await?;

    Ok(respond(StatusCode::OK, "Team retrieved", members))
}

/// GET /api/team/{id}
pub async fn get_member(Path(id): Path<Uuid>) -> Result<Response, ApiError> {
    let pool = require_pool()?;
    let member = sqlx::query_as::<_, TeamMember>(&format!(
        "SELECT {TEAM_COLUMNS} FROM team_members WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool.as_ref())
    .await?
    .ok_or(ApiError::NotFound("Team member"))?;

    Ok(respond(StatusCode::OK, "Team member retrieved", member))
}

/// POST /api/team (auth required)
pub async fn create_member(
    headers: HeaderMap,
    Json(payload): Json<TeamMemberPayload>,
) -> Result<Response, ApiError> {
    require_admin(&headers)?;
    let payload = clean(payload)?;
    let member = insert_member(&payload).await?;
    Ok(respond(StatusCode::CREATED, "Team member created", member))
}

/// PUT /api/team/{id} (auth required)
pub async fn update_member_json(
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(payload): Json<TeamMemberPayload>,
) -> Result<Response, ApiError> {
    require_admin(&headers)?;
    let payload = clean(payload)?;
    let member = update_member(id, &payload).await?;
    Ok(respond(StatusCode::OK, "Team member updated", member))
}

/// POST /api/team/upload (auth required, multipart)
pub async fn create_member_upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    require_admin(&headers)?;
    let form = MultipartForm::read(multipart).await?;
    let mut payload = clean(payload_from_form(&form))?;
    require_pool()?;

    let uploaded: Vec<String> = store_photo(&state, &form).await?.into_iter().collect();
    if let Some(url) = uploaded.first() {
        payload.image = Some(url.clone());
    }
    let member =
        persist_with_uploads(state.store.as_ref(), &uploaded, insert_member(&payload)).await?;
    Ok(respond(StatusCode::CREATED, "Team member created", member))
}

/// PUT /api/team/{id}/upload (auth required, multipart)
/// Without a new photo the stored one is kept.
pub async fn update_member_upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    require_admin(&headers)?;
    let form = MultipartForm::read(multipart).await?;
    let mut payload = clean(payload_from_form(&form))?;
    let pool = require_pool()?;

    let uploaded: Vec<String> = store_photo(&state, &form).await?.into_iter().collect();
    payload.image = match uploaded.first() {
        Some(url) => Some(url.clone()),
        None => {
            let current: Option<(Option<String>,)> =
                sqlx::query_as("SELECT image FROM team_members WHERE id = $1")
                    .bind(id)
                    .fetch_optional(pool.as_ref())
                    .await?;
            current.ok_or(ApiError::NotFound("Team member"))?.0
        }
    };

    let member =
        persist_with_uploads(state.store.as_ref(), &uploaded, update_member(id, &payload)).await?;
    Ok(respond(StatusCode::OK, "Team member updated", member))
}

/// DELETE /api/team/{id} (auth required)
pub async fn delete_member(
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    require_admin(&headers)?;
    let pool = require_pool()?;

    let result = sqlx::query("DELETE FROM team_members WHERE id = $1")
        .bind(id)
        .execute(pool.as_ref())
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Team member"));
    }

    tracing::info!("Team member deleted: {}", id);
    Ok(respond(StatusCode::OK, "Team member deleted", ()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::{admin_token, send};
    use axum::routing::get;
    use axum::Router;
    use serde_json::json;

    fn router() -> Router {
        Router::new()
            .route("/api/team", get(list_team).post(create_member))
            .route(
                "/api/team/{id}",
                get(get_member).put(update_member_json).delete(delete_member),
            )
    }

    #[test]
    fn test_clean_rejects_bad_email() {
        let payload = TeamMemberPayload {
            name: "Ada".to_string(),
            role: "CTO".to_string(),
            email: Some("nope".to_string()),
            ..Default::default()
        };
        assert!(clean(payload).is_err());
    }

    #[test]
    fn test_clean_drops_blank_links() {
        let payload = TeamMemberPayload {
            name: "Ada".to_string(),
            role: "CTO".to_string(),
            linkedin: Some(" ".to_string()),
            email: Some("".to_string()),
            ..Default::default()
        };
        let cleaned = clean(payload).unwrap();
        assert_eq!(cleaned.linkedin, None);
        assert_eq!(cleaned.email, None);
    }

    #[test]
    fn test_payload_from_form() {
        let form = MultipartForm::from_parts(&[("name", "Ada"), ("role", "CTO"), ("bio", "")], vec![]);
        let payload = payload_from_form(&form);
        assert_eq!(payload.name, "Ada");
        assert_eq!(payload.bio, None);
    }

    #[tokio::test]
    async fn test_create_requires_token() {
        let (status, _) = send(
            router(),
            "POST",
            "/api/team",
            None,
            Some(json!({"name": "Ada", "role": "CTO"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_create_missing_role_is_bad_request() {
        let token = admin_token();
        let (status, body) = send(
            router(),
            "POST",
            "/api/team",
            Some(&token),
            Some(json!({"name": "Ada", "role": ""})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Role is required");
    }
}
