/**
 * Application Routes
 * Public job applications with a PDF resume, and their review workflow
 */
use axum::{
    extract::{Multipart, Path, State},
    http::{HeaderMap, StatusCode},
    response::Response,
};
use uuid::Uuid;

use crate::error::ApiError;
use crate::mailer::OutgoingMail;
use crate::models::{application_target, Application, ApplicationStatus};
use crate::routes::auth::require_admin;
use crate::routes::upload::{
    persist_with_uploads, store_file, FileKind, MultipartForm, MAX_RESUME_SIZE,
};
use crate::routes::{require_pool, respond, validate_email};
use crate::state::AppState;

const APPLICATION_COLUMNS: &str = "id, full_name, email, phone, cover_letter, job_title, \
     career_id, resume_url, status, created_at";

const RESUME_FOLDER: &str = "resumes";

/// Parsed text parts of an application submission.
#[derive(Debug, Clone, PartialEq)]
struct ApplicationForm {
    full_name: String,
    email: String,
    phone: Option<String>,
    cover_letter: Option<String>,
    job_title: Option<String>,
    career_id: Option<Uuid>,
}

impl ApplicationForm {
    fn parse(form: &MultipartForm) -> Result<Self, ApiError> {
        let full_name = form.required_text("fullName", "Full name")?;
        let email = form.required_text("email", "Email")?;
        validate_email(&email)?;

        // "null" is what a stringified JS null looks like on the wire.
        let career_id = match form.optional_text("careerId").as_deref() {
            None | Some("null") | Some("general") => None,
            Some(raw) => Some(
                Uuid::parse_str(raw)
                    .map_err(|_| ApiError::BadRequest("Invalid career id".to_string()))?,
            ),
        };

        Ok(Self {
            full_name,
            email,
            phone: form.optional_text("phone"),
            cover_letter: form.optional_text("coverLetter"),
            job_title: form.optional_text("jobTitle"),
            career_id,
        })
    }
}

async fn fetch_application(id: Uuid) -> Result<Application, ApiError> {
    let pool = require_pool()?;
    sqlx::query_as::<_, Application>(&format!(
        "SELECT {APPLICATION_COLUMNS} FROM applications WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool.as_ref())
    .await?
    .ok_or(ApiError::NotFound("Application"))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/upload-application (public, multipart)
pub async fn submit_application(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let form = MultipartForm::read(multipart).await?;
    let fields = ApplicationForm::parse(&form)?;
    let resume = form
        .file("resume")
        .ok_or_else(|| ApiError::BadRequest("Resume is required".to_string()))?;
    let pool = require_pool()?;

    // Resolve the posted career so the stored title matches the opening.
    let job_title = match fields.career_id {
        Some(career_id) => {
            let title: Option<(String,)> =
                sqlx::query_as("SELECT title FROM careers WHERE id = $1")
                    .bind(career_id)
                    .fetch_optional(pool.as_ref())
                    .await?;
            let (title,) = title.ok_or(ApiError::NotFound("Career"))?;
            Some(title)
        }
        None => fields.job_title.clone(),
    };
    let (career_id, job_title) = application_target(fields.career_id, job_title);

    let resume_url = store_file(
        state.store.as_ref(),
        RESUME_FOLDER,
        resume,
        FileKind::Pdf,
        MAX_RESUME_SIZE,
    )
    .await?;

    let sql = format!(
        r#"
        INSERT INTO applications (full_name, email, phone, cover_letter, job_title, career_id,
                                  resume_url, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, 'Pending')
        RETURNING {APPLICATION_COLUMNS}
        "#
    );
    let insert = sqlx::query_as::<_, Application>(&sql)
        .bind(&fields.full_name)
        .bind(&fields.email)
        .bind(&fields.phone)
        .bind(&fields.cover_letter)
        .bind(&job_title)
        .bind(career_id)
        .bind(&resume_url)
        .fetch_one(pool.as_ref());
    let application = persist_with_uploads(
        state.store.as_ref(),
        std::slice::from_ref(&resume_url),
        async { insert.await.map_err(ApiError::from) },
    )
    .await?;

    tracing::info!(
        "Application received from {} for {}",
        application.email,
        application.display_job_title()
    );
    Ok(respond(
        StatusCode::CREATED,
        "Application submitted successfully",
        application,
    ))
}

/// GET /api/applications (auth required)
pub async fn list_applications(headers: HeaderMap) -> Result<Response, ApiError> {
    require_admin(&headers)?;
    let pool = require_pool()?;

    let applications = sqlx::query_as::<_, Application>(&format!(
        "SELECT {APPLICATION_COLUMNS} FROM applications ORDER BY created_at DESC"
    ))
    .fetch_all(pool.as_ref())
    .await?;

    Ok(respond(StatusCode::OK, "Applications retrieved", applications))
}

/// GET /api/applications/{id} (auth required)
pub async fn get_application(
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    require_admin(&headers)?;
    let application = fetch_application(id).await?;
    Ok(respond(StatusCode::OK, "Application retrieved", application))
}

async fn set_status(
    state: &AppState,
    id: Uuid,
    status: ApplicationStatus,
) -> Result<Application, ApiError> {
    let pool = require_pool()?;
    let application = sqlx::query_as::<_, Application>(&format!(
        "UPDATE applications SET status = $1 WHERE id = $2 RETURNING {APPLICATION_COLUMNS}"
    ))
    .bind(status.as_str())
    .bind(id)
    .fetch_optional(pool.as_ref())
    .await?
    .ok_or(ApiError::NotFound("Application"))?;

    let mail = status_mail(&application);
    if let Err(e) = state.mailer.send(mail).await {
        tracing::error!("Failed to notify applicant {}: {}", application.email, e);
    }

    tracing::info!("Application {} marked {}", id, status);
    Ok(application)
}

fn status_mail(application: &Application) -> OutgoingMail {
    let title = application.display_job_title();
    let body = match application.status {
        ApplicationStatus::Accepted => format!(
            "Dear {},\n\nWe are pleased to let you know that your application for {} has been accepted. \
             Our team will contact you with next steps.\n\nHouse Major Ltd",
            application.full_name, title
        ),
        _ => format!(
            "Dear {},\n\nThank you for applying for {}. After careful review we will not be moving \
             forward with your application at this time.\n\nHouse Major Ltd",
            application.full_name, title
        ),
    };
    OutgoingMail {
        to: application.email.clone(),
        subject: format!("Your application for {title}"),
        body,
    }
}

/// PUT /api/applications/{id}/accept (auth required)
pub async fn accept_application(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    require_admin(&headers)?;
    let application = set_status(&state, id, ApplicationStatus::Accepted).await?;
    Ok(respond(StatusCode::OK, "Application accepted", application))
}

/// PUT /api/applications/{id}/reject (auth required)
pub async fn reject_application(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    require_admin(&headers)?;
    let application = set_status(&state, id, ApplicationStatus::Rejected).await?;
    Ok(respond(StatusCode::OK, "Application rejected", application))
}

/// DELETE /api/applications/{id} (auth required)
pub async fn delete_application(
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    require_admin(&headers)?;
    let pool = require_pool()?;

    let result = sqlx::query("DELETE FROM applications WHERE id = $1")
        .bind(id)
        .execute(pool.as_ref())
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Application"));
    }

    Ok(respond(StatusCode::OK, "Application deleted", ()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GENERAL_APPLICATION_TITLE;
    use crate::routes::test_support::{send, test_state};
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::{get, post, put};
    use axum::Router;
    use chrono::Utc;
    use tower::ServiceExt;

    fn router() -> Router {
        Router::new()
            .route("/api/upload-application", post(submit_application))
            .route("/api/applications", get(list_applications))
            .route(
                "/api/applications/{id}",
                get(get_application).delete(delete_application),
            )
            .route("/api/applications/{id}/accept", put(accept_application))
            .route("/api/applications/{id}/reject", put(reject_application))
            .with_state(test_state())
    }

    fn multipart_body(boundary: &str, parts: &[(&str, &str)], resume: Option<&[u8]>) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, value) in parts {
            body.extend_from_slice(
                format!(
                    "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some(bytes) = resume {
            body.extend_from_slice(
                format!(
                    "--{boundary}\r\nContent-Disposition: form-data; name=\"resume\"; filename=\"cv.pdf\"\r\nContent-Type: application/pdf\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
        body
    }

    async fn post_multipart(parts: &[(&str, &str)], resume: Option<&[u8]>) -> StatusCode {
        let boundary = "X-HOUSEMAJOR-BOUNDARY";
        let req = Request::post("/api/upload-application")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(multipart_body(boundary, parts, resume)))
            .unwrap();
        router().oneshot(req).await.unwrap().status()
    }

    #[test]
    fn test_parse_treats_null_career_as_general() {
        let form = MultipartForm::from_parts(
            &[("fullName", "Ada"), ("email", "ada@example.com"), ("careerId", "null")],
            vec![],
        );
        let parsed = ApplicationForm::parse(&form).unwrap();
        assert!(parsed.career_id.is_none());
        let (career_id, title) = application_target(parsed.career_id, parsed.job_title);
        assert!(career_id.is_none());
        assert_eq!(title, GENERAL_APPLICATION_TITLE);
    }

    #[test]
    fn test_parse_rejects_malformed_career_id() {
        let form = MultipartForm::from_parts(
            &[("fullName", "Ada"), ("email", "ada@example.com"), ("careerId", "42")],
            vec![],
        );
        assert!(ApplicationForm::parse(&form).is_err());
    }

    #[test]
    fn test_status_mail_mentions_job_title() {
        let application = Application {
            id: Uuid::new_v4(),
            full_name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            phone: None,
            cover_letter: None,
            job_title: None,
            career_id: None,
            resume_url: None,
            status: ApplicationStatus::Accepted,
            created_at: Utc::now(),
        };
        let mail = status_mail(&application);
        assert_eq!(mail.to, "ada@example.com");
        assert!(mail.subject.contains(GENERAL_APPLICATION_TITLE));
        assert!(mail.body.contains("accepted"));
    }

    #[tokio::test]
    async fn test_submit_without_resume_is_bad_request() {
        let status = post_multipart(&[("fullName", "Ada"), ("email", "ada@example.com")], None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_submit_missing_name_is_bad_request() {
        let status = post_multipart(&[("email", "ada@example.com")], Some(b"%PDF-1.4")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_submit_valid_without_database_is_unavailable() {
        let status = post_multipart(
            &[("fullName", "Ada"), ("email", "ada@example.com")],
            Some(b"%PDF-1.4"),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_list_requires_token() {
        let (status, _) = send(router(), "GET", "/api/applications", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_accept_requires_token() {
        let uri = format!("/api/applications/{}/accept", Uuid::new_v4());
        let (status, _) = send(router(), "PUT", &uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
