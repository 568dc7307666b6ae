/**
 * Investment Routes
 * Public investment inquiries, reviewed from the dashboard
 */
use axum::{
    extract::Path,
    http::{HeaderMap, StatusCode},
    response::Response,
    Json,
};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{InvestmentInquiry, InvestmentPayload};
use crate::routes::auth::require_admin;
use crate::routes::{require_pool, required, respond, validate_email};

const INVESTMENT_COLUMNS: &str = "id, title, description, email, created_at";

fn validate(payload: &InvestmentPayload) -> Result<(), ApiError> {
    required("Title", &payload.title)?;
    required("Description", &payload.description)?;
    validate_email(&payload.email)
}

/// POST /api/investments (public)
pub async fn create_investment(
    Json(payload): Json<InvestmentPayload>,
) -> Result<Response, ApiError> {
    validate(&payload)?;
    let pool = require_pool()?;

    let inquiry = sqlx::query_as::<_, InvestmentInquiry>(&format!(
        "INSERT INTO investments (title, description, email) VALUES ($1, $2, $3) \
         RETURNING {INVESTMENT_COLUMNS}"
    ))
    .bind(payload.title.trim())
    .bind(payload.description.trim())
    .bind(payload.email.trim())
    .fetch_one(pool.as_ref())
    .await?;

    tracing::info!("Investment inquiry from {}", inquiry.email);
    Ok(respond(
        StatusCode::CREATED,
        "Investment inquiry submitted",
        inquiry,
    ))
}

/// GET /api/investments (auth required)
pub async fn list_investments(headers: HeaderMap) -> Result<Response, ApiError> {
    require_admin(&headers)?;
    let pool = require_pool()?;

    let inquiries = sqlx::query_as::<_, InvestmentInquiry>(&format!(
        "SELECT {INVESTMENT_COLUMNS} FROM investments ORDER BY created_at DESC"
    ))
    .fetch_all(pool.as_ref())
    .await?;

    Ok(respond(StatusCode::OK, "Investments retrieved", inquiries))
}

/// GET /api/investments/{id} (auth required)
pub async fn get_investment(
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    require_admin(&headers)?;
    let pool = require_pool()?;

    let inquiry = sqlx::query_as::<_, InvestmentInquiry>(&format!(
        "SELECT {INVESTMENT_COLUMNS} FROM investments WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool.as_ref())
    .await?
    .ok_or(ApiError::NotFound("Investment"))?;

    Ok(respond(StatusCode::OK, "Investment retrieved", inquiry))
}

/// DELETE /api/investments/{id} (auth required)
pub async fn delete_investment(
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    require_admin(&headers)?;
    let pool = require_pool()?;

    let result = sqlx::query("DELETE FROM investments WHERE id = $1")
        .bind(id)
        .execute(pool.as_ref())
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Investment"));
    }

    Ok(respond(StatusCode::OK, "Investment deleted", ()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InvestmentInquiryForm;
    use crate::routes::test_support::send;
    use axum::routing::get;
    use axum::Router;
    use serde_json::json;

    fn router() -> Router {
        Router::new()
            .route("/api/investments", get(list_investments).post(create_investment))
            .route(
                "/api/investments/{id}",
                get(get_investment).delete(delete_investment),
            )
    }

    #[tokio::test]
    async fn test_public_submit_needs_no_token() {
        let form = InvestmentInquiryForm {
            email: "investor@example.com".to_string(),
            investment_nature: "Equity".to_string(),
            ..Default::default()
        };
        let (status, _) = send(
            router(),
            "POST",
            "/api/investments",
            None,
            Some(serde_json::to_value(form.to_payload()).unwrap()),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_submit_with_invalid_email_is_bad_request() {
        let (status, body) = send(
            router(),
            "POST",
            "/api/investments",
            None,
            Some(json!({"title": "Investment Inquiry - Equity", "description": "x", "email": "nope"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid email format");
    }

    #[tokio::test]
    async fn test_list_requires_token() {
        let (status, _) = send(router(), "GET", "/api/investments", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
