//! HTTP client for the site API.
//!
//! Responses are normalized here: list and record endpoints may answer with a
//! raw JSON value or with a `{status, message, data}` envelope, and callers
//! only ever see the typed value. Non-2xx answers become [`ClientError::Api`]
//! with the server's message. There is no retry and no token refresh.

use async_trait::async_trait;
use reqwest::{multipart, Client, Method, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use super::form::{FileSelection, FormModel, Submission, Target};
use super::forms::{ApplicationForm, ApplicationSubmission};
use super::resources::Resource;
use super::screen::{EditApi, PublicSubmit, ResourceApi, ReviewApi};
use crate::models::{
    AdminUser, Application, ApplicationStatus, ContactMessage, ContactPayload,
    InvestmentInquiry, InvestmentInquiryForm, InvestmentPayload,
};
use crate::routes::auth::{
    ForgotPasswordRequest, LoginData, LoginRequest, ProfileUpdate, ResetPasswordRequest,
};

/// Multipart uploads get a fixed timeout; other calls have none.
pub const UPLOAD_TIMEOUT: Duration = Duration::from_secs(120);

const DEFAULT_API_URL: &str = "http://127.0.0.1:3001/api";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// `HOUSEMAJOR_API_URL`, or the local backend.
    pub fn from_env() -> Self {
        Self::new(std::env::var("HOUSEMAJOR_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()))
    }
}

/// Where the bearer token is read from, on every call.
pub trait TokenStore: Send + Sync {
    fn token(&self) -> Option<String>;
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("You are not signed in")]
    Unauthorized,

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Could not encode request: {0}")]
    Encode(String),

    #[error("{0} records cannot be edited")]
    ReadOnly(&'static str),
}

impl ClientError {
    /// Missing token, or the server refused the one we sent.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            ClientError::Unauthorized | ClientError::Api { status: 401 | 403, .. }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Auth {
    Required,
    IfPresent,
    Anonymous,
}

/// An object carrying `data`, or a `"success"`/`"error"` status next to a
/// `message`. Records with their own `status` field (applications) are not
/// envelopes.
fn is_envelope(map: &serde_json::Map<String, Value>) -> bool {
    if map.contains_key("data") {
        return true;
    }
    let outcome = matches!(
        map.get("status").and_then(Value::as_str),
        Some("success" | "error")
    );
    outcome && map.contains_key("message")
}

/// Unwraps `{status, message, data}`; anything else is already the value.
fn unwrap_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut map) if is_envelope(&map) => map.remove("data").unwrap_or(Value::Null),
        other => other,
    }
}

fn error_message(status: StatusCode, body: &[u8]) -> String {
    serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|v| {
            ["message", "error"].iter().find_map(|key| {
                v.get(*key)
                    .and_then(Value::as_str)
                    .filter(|m| !m.trim().is_empty())
                    .map(str::to_string)
            })
        })
        .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()))
}

fn file_part(file: &FileSelection) -> Result<multipart::Part, ClientError> {
    let content_type = if file.content_type.is_empty() {
        "application/octet-stream"
    } else {
        file.content_type.as_str()
    };
    Ok(multipart::Part::bytes(file.bytes.to_vec())
        .file_name(file.file_name.clone())
        .mime_str(content_type)?)
}

/// Text parts for every payload field (arrays and objects JSON-stringified,
/// nulls left out) followed by the selected files.
fn multipart_form<P: Serialize>(
    payload: &P,
    files: &BTreeMap<String, Vec<FileSelection>>,
) -> Result<multipart::Form, ClientError> {
    let Value::Object(map) =
        serde_json::to_value(payload).map_err(|e| ClientError::Encode(e.to_string()))?
    else {
        return Err(ClientError::Encode("payload is not an object".to_string()));
    };

    let mut form = multipart::Form::new();
    for (name, value) in map {
        form = match value {
            Value::Null => form,
            Value::String(text) => form.text(name, text),
            other => form.text(name, other.to_string()),
        };
    }
    for (field, selected) in files {
        for file in selected {
            form = form.part(field.clone(), file_part(file)?);
        }
    }
    Ok(form)
}

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Arc<str>,
    tokens: Arc<dyn TokenStore>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            http: Client::new(),
            base_url: Arc::from(config.base_url.as_str()),
            tokens,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str, auth: Auth) -> Result<RequestBuilder, ClientError> {
        let builder = self.http.request(method, self.url(path));
        let token = match auth {
            Auth::Anonymous => None,
            Auth::IfPresent => self.tokens.token(),
            Auth::Required => Some(self.tokens.token().ok_or(ClientError::Unauthorized)?),
        };
        Ok(match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<Vec<u8>, ClientError> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            let message = error_message(status, &body);
            tracing::warn!(status = status.as_u16(), %message, "API request failed");
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(body.to_vec())
    }

    async fn fetch<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ClientError> {
        let body = self.execute(builder).await?;
        let value: Value = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).map_err(|e| ClientError::Decode(e.to_string()))?
        };
        serde_json::from_value(unwrap_envelope(value)).map_err(|e| ClientError::Decode(e.to_string()))
    }

    async fn fetch_empty(&self, builder: RequestBuilder) -> Result<(), ClientError> {
        self.execute(builder).await.map(|_| ())
    }

    pub fn resource<T: Resource>(&self) -> ResourceClient<T> {
        ResourceClient {
            api: self.clone(),
            _resource: PhantomData,
        }
    }

    // ------------------------------------------------------------------------
    // Auth
    // ------------------------------------------------------------------------

    pub async fn login(&self, credentials: &LoginRequest) -> Result<LoginData, ClientError> {
        let request = self
            .request(Method::POST, "auth/login", Auth::Anonymous)?
            .json(credentials);
        self.fetch(request).await
    }

    pub async fn logout(&self) -> Result<(), ClientError> {
        let request = self.request(Method::POST, "auth/logout", Auth::IfPresent)?;
        self.fetch_empty(request).await
    }

    pub async fn forgot_password(&self, email: &str) -> Result<(), ClientError> {
        let request = self
            .request(Method::POST, "auth/forgot-password", Auth::Anonymous)?
            .json(&ForgotPasswordRequest {
                email: email.to_string(),
            });
        self.fetch_empty(request).await
    }

    pub async fn reset_password(&self, token: &str, password: &str) -> Result<(), ClientError> {
        let request = self
            .request(Method::POST, "auth/reset-password", Auth::Anonymous)?
            .json(&ResetPasswordRequest {
                token: token.to_string(),
                password: password.to_string(),
            });
        self.fetch_empty(request).await
    }

    pub async fn profile(&self) -> Result<AdminUser, ClientError> {
        let request = self.request(Method::POST, "auth/profile", Auth::Required)?;
        self.fetch(request).await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<AdminUser, ClientError> {
        let request = self
            .request(Method::POST, "auth/profile", Auth::Required)?
            .json(update);
        self.fetch(request).await
    }

    // ------------------------------------------------------------------------
    // Public site forms
    // ------------------------------------------------------------------------

    pub async fn submit_investment_inquiry(
        &self,
        payload: &InvestmentPayload,
    ) -> Result<InvestmentInquiry, ClientError> {
        let request = self
            .request(Method::POST, "investments", Auth::Anonymous)?
            .json(payload);
        self.fetch(request).await
    }

    pub async fn submit_contact(&self, payload: &ContactPayload) -> Result<ContactMessage, ClientError> {
        let request = self
            .request(Method::POST, "contacts", Auth::Anonymous)?
            .json(payload);
        self.fetch(request).await
    }

    pub async fn submit_application(
        &self,
        submission: &Submission<ApplicationSubmission>,
    ) -> Result<Application, ClientError> {
        let form = multipart_form(&submission.payload, &submission.files)?;
        let request = self
            .request(Method::POST, "upload-application", Auth::Anonymous)?
            .multipart(form)
            .timeout(UPLOAD_TIMEOUT);
        self.fetch(request).await
    }
}

/// Typed CRUD over one resource collection.
pub struct ResourceClient<T> {
    api: ApiClient,
    _resource: PhantomData<fn() -> T>,
}

impl<T> Clone for ResourceClient<T> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            _resource: PhantomData,
        }
    }
}

impl<T: Resource> ResourceClient<T> {
    fn read_auth() -> Auth {
        if T::PUBLIC_READ {
            Auth::IfPresent
        } else {
            Auth::Required
        }
    }

    pub async fn list(&self) -> Result<Vec<T>, ClientError> {
        let request = self.api.request(Method::GET, T::PATH, Self::read_auth())?;
        self.api.fetch(request).await
    }

    pub async fn get(&self, id: Uuid) -> Result<T, ClientError> {
        let path = format!("{}/{}", T::PATH, id);
        let request = self.api.request(Method::GET, &path, Self::read_auth())?;
        self.api.fetch(request).await
    }

    pub async fn create<P: Serialize + ?Sized>(&self, payload: &P) -> Result<T, ClientError> {
        let request = self
            .api
            .request(Method::POST, T::PATH, Auth::Required)?
            .json(payload);
        self.api.fetch(request).await
    }

    /// Refused locally, without a request, for resources that have no update route.
    pub async fn update<P: Serialize + ?Sized>(&self, id: Uuid, payload: &P) -> Result<T, ClientError> {
        if !T::UPDATES {
            return Err(ClientError::ReadOnly(T::PATH));
        }
        let path = format!("{}/{}", T::PATH, id);
        let request = self
            .api
            .request(Method::PUT, &path, Auth::Required)?
            .json(payload);
        self.api.fetch(request).await
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), ClientError> {
        let path = format!("{}/{}", T::PATH, id);
        let request = self.api.request(Method::DELETE, &path, Auth::Required)?;
        self.api.fetch_empty(request).await
    }

    /// Create or update from a form submission; file-bearing saves go multipart.
    pub async fn save<P: Serialize>(&self, submission: &Submission<P>) -> Result<T, ClientError> {
        if T::UPLOADS && submission.has_files() {
            let (method, path) = match submission.target {
                Target::Create => (Method::POST, format!("{}/upload", T::PATH)),
                Target::Update(id) => (Method::PUT, format!("{}/{}/upload", T::PATH, id)),
            };
            let form = multipart_form(&submission.payload, &submission.files)?;
            let request = self
                .api
                .request(method, &path, Auth::Required)?
                .multipart(form)
                .timeout(UPLOAD_TIMEOUT);
            return self.api.fetch(request).await;
        }

        match submission.target {
            Target::Create => self.create(&submission.payload).await,
            Target::Update(id) => self.update(id, &submission.payload).await,
        }
    }
}

impl ResourceClient<Application> {
    pub async fn accept_application(&self, id: Uuid) -> Result<Application, ClientError> {
        self.review(id, "accept").await
    }

    pub async fn reject_application(&self, id: Uuid) -> Result<Application, ClientError> {
        self.review(id, "reject").await
    }

    async fn review(&self, id: Uuid, verb: &str) -> Result<Application, ClientError> {
        let path = format!("{}/{}/{}", Application::PATH, id, verb);
        let request = self.api.request(Method::PUT, &path, Auth::Required)?;
        self.api.fetch(request).await
    }
}

// ============================================================================
// Screen seams
// ============================================================================

#[async_trait]
impl<T: Resource> ResourceApi<T> for ResourceClient<T> {
    async fn list(&self) -> Result<Vec<T>, ClientError> {
        ResourceClient::list(self).await
    }

    async fn remove(&self, id: Uuid) -> Result<(), ClientError> {
        ResourceClient::remove(self, id).await
    }
}

#[async_trait]
impl<T: Resource + FormModel> EditApi<T> for ResourceClient<T> {
    async fn save(&self, submission: Submission<T::Payload>) -> Result<(), ClientError> {
        ResourceClient::save(self, &submission).await.map(|_| ())
    }
}

#[async_trait]
impl ReviewApi for ResourceClient<Application> {
    async fn set_status(&self, id: Uuid, status: ApplicationStatus) -> Result<(), ClientError> {
        match status {
            ApplicationStatus::Accepted => self.accept_application(id).await.map(|_| ()),
            ApplicationStatus::Rejected => self.reject_application(id).await.map(|_| ()),
            other => Err(ClientError::Encode(format!(
                "applications cannot be moved to {other}"
            ))),
        }
    }
}

#[async_trait]
impl PublicSubmit<InvestmentInquiryForm> for ApiClient {
    async fn submit(&self, submission: Submission<InvestmentPayload>) -> Result<(), ClientError> {
        self.submit_investment_inquiry(&submission.payload)
            .await
            .map(|_| ())
    }
}

#[async_trait]
impl PublicSubmit<ContactPayload> for ApiClient {
    async fn submit(&self, submission: Submission<ContactPayload>) -> Result<(), ClientError> {
        self.submit_contact(&submission.payload).await.map(|_| ())
    }
}

#[async_trait]
impl PublicSubmit<ApplicationForm> for ApiClient {
    async fn submit(&self, submission: Submission<ApplicationSubmission>) -> Result<(), ClientError> {
        self.submit_application(&submission).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Career, Envelope, Project, Service, ServiceIcon};
    use axum::extract::{Multipart, State};
    use axum::http::HeaderMap;
    use axum::routing::{get, post, put};
    use axum::{Json, Router};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct TestTokens(Mutex<Option<String>>);

    impl TestTokens {
        fn set(&self, token: Option<&str>) {
            *self.0.lock().unwrap() = token.map(str::to_string);
        }
    }

    impl TokenStore for TestTokens {
        fn token(&self) -> Option<String> {
            self.0.lock().unwrap().clone()
        }
    }

    fn service(title: &str) -> Service {
        Service {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: "CI/CD".to_string(),
            icon: ServiceIcon::Megaphone,
        }
    }

    fn bearer(headers: &HeaderMap) -> Option<String> {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::to_string)
    }

    async fn list_applications(
        State(hits): State<Arc<AtomicUsize>>,
        headers: HeaderMap,
    ) -> axum::response::Response {
        use axum::response::IntoResponse;
        hits.fetch_add(1, Ordering::SeqCst);
        match bearer(&headers).as_deref() {
            Some("fresh") => Json(Envelope::success("ok", Vec::<Application>::new())).into_response(),
            _ => (
                axum::http::StatusCode::UNAUTHORIZED,
                Json(Envelope::<()>::error("Invalid or expired token")),
            )
                .into_response(),
        }
    }

    async fn upload_project(mut multipart: Multipart) -> Json<Value> {
        let mut title = String::new();
        let mut features = Vec::<String>::new();
        let mut images = Vec::new();
        while let Some(field) = multipart.next_field().await.unwrap() {
            let name = field.name().unwrap_or_default().to_string();
            if field.file_name().is_some() {
                images.push(format!("/uploads/projects/{}.png", images.len()));
                field.bytes().await.unwrap();
                continue;
            }
            let text = field.text().await.unwrap();
            match name.as_str() {
                "title" => title = text,
                "features" => features = serde_json::from_str(&text).unwrap(),
                _ => {}
            }
        }
        Json(json!({
            "status": "success",
            "message": "Project created",
            "data": {
                "id": Uuid::new_v4(),
                "title": title,
                "description": "d",
                "category": "Web Development",
                "date": "2024",
                "images": images,
                "features": features,
                "tags": [],
                "team": [],
                "client": {},
                "externalLinks": {},
                "downloadLinks": {},
                "results": []
            }
        }))
    }

    async fn spawn_server() -> (String, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route("/api/services", get(|| async { Json(vec![service("DevOps")]) }))
            .route(
                "/api/services/{id}",
                axum::routing::delete(|| async { axum::http::StatusCode::INTERNAL_SERVER_ERROR }),
            )
            .route(
                "/api/careers",
                get(|| async { Json(Envelope::success("Careers retrieved", Vec::<Career>::new())) }),
            )
            .route("/api/applications", get(list_applications))
            .route(
                "/api/applications/{id}",
                get(|axum::extract::Path(id): axum::extract::Path<Uuid>| async move {
                    Json(json!({
                        "id": id,
                        "fullName": "Ada Lovelace",
                        "email": "ada@example.com",
                        "jobTitle": "General Application",
                        "careerId": null,
                        "resumeUrl": "/uploads/resumes/ada.pdf",
                        "status": "Pending",
                        "createdAt": "2024-05-01T10:00:00Z"
                    }))
                }),
            )
            .route(
                "/api/applications/{id}/accept",
                put(|| async {
                    (
                        axum::http::StatusCode::NOT_FOUND,
                        Json(json!({"error": "Application not found"})),
                    )
                }),
            )
            .route(
                "/api/investments",
                post(|Json(payload): Json<InvestmentPayload>| async move {
                    Json(Envelope::success(
                        "Investment inquiry submitted",
                        InvestmentInquiry {
                            id: Uuid::new_v4(),
                            title: payload.title,
                            description: payload.description,
                            email: payload.email,
                            created_at: chrono::Utc::now(),
                        },
                    ))
                }),
            )
            .route("/api/projects/upload", post(upload_project))
            .with_state(hits.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}/api"), hits)
    }

    async fn client() -> (ApiClient, Arc<TestTokens>, Arc<AtomicUsize>) {
        let (base, hits) = spawn_server().await;
        let tokens = Arc::new(TestTokens::default());
        let api = ApiClient::new(&ClientConfig::new(base), tokens.clone());
        (api, tokens, hits)
    }

    #[test]
    fn test_envelope_and_raw_values_normalize() {
        assert_eq!(unwrap_envelope(json!([1, 2])), json!([1, 2]));
        assert_eq!(
            unwrap_envelope(json!({"status": "success", "message": "", "data": [1]})),
            json!([1])
        );
        assert_eq!(
            unwrap_envelope(json!({"status": "success", "message": "Deleted"})),
            Value::Null
        );
        assert_eq!(unwrap_envelope(json!({"id": 1})), json!({"id": 1}));
        let record = json!({"id": 1, "status": "Pending", "fullName": "Ada"});
        assert_eq!(unwrap_envelope(record.clone()), record);
    }

    #[test]
    fn test_error_message_fallback() {
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, br#"{"message":"Title is required"}"#),
            "Title is required"
        );
        assert_eq!(
            error_message(StatusCode::NOT_FOUND, br#"{"error":"Nope"}"#),
            "Nope"
        );
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, b"<html>"),
            "Request failed with status 502"
        );
    }

    #[test]
    fn test_config_trims_trailing_slash() {
        assert_eq!(
            ClientConfig::new("http://localhost:3001/api/").base_url,
            "http://localhost:3001/api"
        );
    }

    #[tokio::test]
    async fn test_raw_array_and_envelope_lists_decode() {
        let (api, _, _) = client().await;
        let services = api.resource::<Service>().list().await.unwrap();
        assert_eq!(services.len(), 1);
        assert_eq!(services[0].title, "DevOps");

        let careers = api.resource::<Career>().list().await.unwrap();
        assert!(careers.is_empty());
    }

    #[tokio::test]
    async fn test_raw_application_record_decodes() {
        let (api, tokens, _) = client().await;
        tokens.set(Some("fresh"));
        let id = Uuid::new_v4();
        let application = api.resource::<Application>().get(id).await.unwrap();
        assert_eq!(application.id, id);
        assert_eq!(application.full_name, "Ada Lovelace");
        assert_eq!(application.status, ApplicationStatus::Pending);
        assert!(application.is_general());
    }

    #[tokio::test]
    async fn test_admin_users_are_never_updated() {
        let (api, tokens, _) = client().await;
        tokens.set(Some("fresh"));
        let submission = Submission {
            target: Target::Update(Uuid::new_v4()),
            payload: crate::models::AdminUserPayload {
                username: "ops".to_string(),
                email: "ops@example.com".to_string(),
                password: "long-enough".to_string(),
            },
            files: BTreeMap::new(),
        };
        let err = api.resource::<AdminUser>().save(&submission).await.unwrap_err();
        assert!(matches!(err, ClientError::ReadOnly("auth/admin/users")));
    }

    #[tokio::test]
    async fn test_missing_token_sends_nothing() {
        let (api, _, hits) = client().await;
        let err = api.resource::<Application>().list().await.unwrap_err();
        assert!(matches!(err, ClientError::Unauthorized));
        assert!(err.is_auth_failure());
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_token_is_read_at_call_time() {
        let (api, tokens, hits) = client().await;
        let applications = api.resource::<Application>();

        tokens.set(Some("stale"));
        let err = applications.list().await.unwrap_err();
        match &err {
            ClientError::Api { status, message } => {
                assert_eq!(*status, 401);
                assert_eq!(message, "Invalid or expired token");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.is_auth_failure());

        tokens.set(Some("fresh"));
        assert!(applications.list().await.unwrap().is_empty());
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_error_without_body_uses_fallback_message() {
        let (api, tokens, _) = client().await;
        tokens.set(Some("fresh"));
        let err = api
            .resource::<Service>()
            .remove(Uuid::new_v4())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Request failed with status 500");
    }

    #[tokio::test]
    async fn test_accept_surfaces_error_field() {
        let (api, tokens, _) = client().await;
        tokens.set(Some("fresh"));
        let err = api
            .resource::<Application>()
            .accept_application(Uuid::new_v4())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Application not found");
    }

    #[tokio::test]
    async fn test_public_investment_submit_needs_no_token() {
        let (api, _, _) = client().await;
        let form = InvestmentInquiryForm {
            email: "a@b.com".to_string(),
            investment_nature: "Angel Investment".to_string(),
            ..Default::default()
        };
        let inquiry = api
            .submit_investment_inquiry(&form.to_payload())
            .await
            .unwrap();
        assert_eq!(inquiry.title, "Investment Inquiry - Angel Investment");
    }

    #[tokio::test]
    async fn test_project_save_with_files_goes_multipart() {
        let (api, tokens, _) = client().await;
        tokens.set(Some("fresh"));

        let mut files = BTreeMap::new();
        files.insert(
            "images".to_string(),
            vec![
                FileSelection::new("a.png", "image/png", vec![0x89, 0x50, 0x4E, 0x47]),
                FileSelection::new("b.png", "image/png", vec![0x89, 0x50, 0x4E, 0x47]),
            ],
        );
        let submission = Submission {
            target: Target::Create,
            payload: crate::models::ProjectPayload {
                title: "Shop".to_string(),
                features: vec!["Cart".to_string()],
                ..Default::default()
            },
            files,
        };
        let project: Project = api.resource::<Project>().save(&submission).await.unwrap();
        assert_eq!(project.title, "Shop");
        assert_eq!(project.images.len(), 2);
        assert_eq!(project.features, vec!["Cart"]);
    }
}
