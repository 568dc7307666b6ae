//! House Major backend - site API and admin dashboard logic

pub mod config;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod logging;
pub mod mailer;
pub mod models;
pub mod routes;
pub mod state;
pub mod storage;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::net::SocketAddr;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, limit::RequestBodyLimitLayer,
    services::ServeDir, trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::state::AppState;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("JWT_SECRET must be set to a secure, unique value in production")]
    InsecureJwtSecret,
    #[error("invalid HOST/PORT configuration: {0}")]
    Address(#[from] std::net::AddrParseError),
    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configure CORS from ALLOWED_ORIGINS (comma-separated) or FRONTEND_ORIGIN,
/// defaulting to the local site and dashboard dev servers.
pub fn configure_cors() -> CorsLayer {
    let allowed_origins = std::env::var("ALLOWED_ORIGINS")
        .ok()
        .and_then(|s| {
            let origins: Vec<HeaderValue> = s
                .split(',')
                .filter_map(|origin| origin.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                None
            } else {
                Some(origins)
            }
        })
        .or_else(|| {
            std::env::var("FRONTEND_ORIGIN")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(|origin| vec![origin])
        })
        .unwrap_or_else(|| {
            vec![
                HeaderValue::from_static("http://localhost:3000"),
                HeaderValue::from_static("http://127.0.0.1:3000"),
                HeaderValue::from_static("http://localhost:5173"),
            ]
        });

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
        ])
        .allow_credentials(true)
}

fn api_routes() -> Router<AppState> {
    use routes::{applications, auth, careers, contacts, investments, projects, services, team};

    Router::new()
        // Auth
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/forgot-password", post(auth::forgot_password))
        .route("/auth/reset-password", post(auth::reset_password))
        .route(
            "/auth/profile",
            get(auth::profile).post(auth::profile).put(auth::profile),
        )
        .route(
            "/auth/admin/users",
            get(auth::list_admins).post(auth::create_admin),
        )
        .route("/auth/admin/users/{id}", delete(auth::delete_admin))
        // Services
        .route(
            "/services",
            get(services::list_services).post(services::create_service),
        )
        .route(
            "/services/{id}",
            get(services::get_service)
                .put(services::update_service)
                .delete(services::delete_service),
        )
        // Projects
        .route(
            "/projects",
            get(projects::list_projects).post(projects::create_project),
        )
        .route("/projects/upload", post(projects::create_project_upload))
        .route(
            "/projects/{id}",
            get(projects::get_project)
                .put(projects::update_project)
                .delete(projects::delete_project),
        )
        .route("/projects/{id}/upload", put(projects::update_project_upload))
        // Careers
        .route(
            "/careers",
            get(careers::list_careers).post(careers::create_career),
        )
        .route(
            "/careers/{id}",
            get(careers::get_career)
                .put(careers::update_career)
                .delete(careers::delete_career),
        )
        // Applications
        .route("/upload-application", post(applications::submit_application))
        .route("/applications", get(applications::list_applications))
        .route(
            "/applications/{id}",
            get(applications::get_application).delete(applications::delete_application),
        )
        .route(
            "/applications/{id}/accept",
            put(applications::accept_application),
        )
        .route(
            "/applications/{id}/reject",
            put(applications::reject_application),
        )
        // Team
        .route("/team", get(team::list_team).post(team::create_member))
        .route("/team/upload", post(team::create_member_upload))
        .route(
            "/team/{id}",
            get(team::get_member)
                .put(team::update_member_json)
                .delete(team::delete_member),
        )
        .route("/team/{id}/upload", put(team::update_member_upload))
        // Investments & contacts
        .route(
            "/investments",
            get(investments::list_investments).post(investments::create_investment),
        )
        .route(
            "/investments/{id}",
            get(investments::get_investment).delete(investments::delete_investment),
        )
        .route(
            "/contacts",
            get(contacts::list_contacts).post(contacts::create_contact),
        )
        .route("/contacts/{id}", delete(contacts::delete_contact))
}

/// Create and configure the application router.
pub fn create_app(state: AppState, config: &AppConfig) -> Router {
    let cors = configure_cors();
    tracing::info!("CORS configured");

    Router::new()
        .nest("/api", api_routes())
        .nest_service("/uploads", ServeDir::new(&config.upload_dir))
        .route("/health", get(routes::health::health_ping))
        .route("/health/detailed", get(routes::health::health_detailed))
        .route("/health/database", get(routes::health::health_database))
        .route("/health/ready", get(routes::health::health_ready))
        .with_state(state)
        .layer(logging::middleware::propagate_request_id_layer())
        .layer(middleware::from_fn(logging::middleware::log_request))
        .layer(logging::middleware::request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        // Multipart bodies carry resumes and images; one global cap replaces axum's 2 MB default.
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.body_limit_bytes))
        .layer(cors)
}

fn check_production_settings(config: &AppConfig) -> Result<(), StartupError> {
    if !config.is_production() {
        return Ok(());
    }

    let secret = std::env::var("JWT_SECRET").unwrap_or_default();
    if secret.is_empty() || secret == routes::auth::DEFAULT_JWT_SECRET {
        return Err(StartupError::InsecureJwtSecret);
    }

    let admin_email = std::env::var("ADMIN_EMAIL").unwrap_or_default();
    if admin_email.is_empty() || admin_email == "admin@example.com" {
        tracing::warn!(
            "SECURITY: ADMIN_EMAIL is using an insecure default. \
             Set ADMIN_EMAIL to a real address."
        );
    }
    if std::env::var("ADMIN_HASH_PASSWORD").is_err() && std::env::var("ADMIN_PASSWORD").is_err() {
        tracing::warn!(
            "SECURITY: Neither ADMIN_HASH_PASSWORD nor ADMIN_PASSWORD is set. \
             The fallback default password 'admin123' is insecure."
        );
    }
    Ok(())
}

/// Run the server (used by main).
pub async fn run() -> Result<(), StartupError> {
    dotenvy::dotenv().ok();

    let _log_guards = logging::init();
    routes::health::init_start_time();

    let config = AppConfig::from_env();
    check_production_settings(&config)?;

    if std::env::var("DATABASE_URL").is_ok() {
        match db::init_pool(None).await {
            Ok(pool) => {
                if let Err(e) = db::run_migrations(&pool).await {
                    tracing::error!("Failed to run database migrations: {}", e);
                }
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to initialize database pool: {}. Continuing without database.",
                    e
                );
            }
        }
    } else {
        tracing::info!("DATABASE_URL not set. Running without database connection.");
    }

    std::fs::create_dir_all(&config.upload_dir)?;
    let state = AppState::from_config(&config);
    let app = create_app(state, &config);

    let addr = config.bind_addr()?;
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
