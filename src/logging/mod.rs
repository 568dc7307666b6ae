/*!
 * Logging Module
 * Subscriber setup for console and rolling log files
 */
pub mod middleware;

use std::io;
use std::path::PathBuf;
use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Writer guards; dropping them flushes and stops the background writers.
#[must_use = "log lines are lost once the guards are dropped"]
pub struct LogGuards {
    _guards: Vec<WorkerGuard>,
}

#[derive(Debug, Clone)]
pub struct LogSettings {
    pub environment: String,
    pub level: String,
    pub directory: PathBuf,
}

impl LogSettings {
    pub fn from_env() -> Self {
        let environment =
            std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
        let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| {
            if environment == "production" {
                "info".to_string()
            } else {
                "debug".to_string()
            }
        });
        let directory = std::env::var("LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("logs"));
        Self {
            environment,
            level,
            directory,
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Default directive set when `RUST_LOG` is absent.
    pub fn filter_directives(&self) -> String {
        format!(
            "housemajor_backend={},tower_http=info,axum=info,sqlx=warn",
            self.level
        )
    }
}

/// Installs the global subscriber. Production logs JSON, development pretty text.
pub fn init() -> LogGuards {
    let settings = LogSettings::from_env();

    if let Err(e) = std::fs::create_dir_all(&settings.directory) {
        eprintln!(
            "Could not create log directory {}: {}",
            settings.directory.display(),
            e
        );
    }

    let (file_writer, file_guard) =
        non_blocking(rolling::daily(&settings.directory, "app.log"));
    let (error_writer, error_guard) =
        non_blocking(rolling::daily(&settings.directory, "error.log"));
    let (console_writer, console_guard) = non_blocking(io::stdout());

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.filter_directives()));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if settings.is_production() {
        let file_layer = fmt::layer()
            .json()
            .with_writer(file_writer)
            .with_target(true)
            .with_file(true)
            .with_line_number(true);

        let error_layer = fmt::layer()
            .json()
            .with_writer(error_writer)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_filter(tracing_subscriber::filter::LevelFilter::ERROR);

        let console_layer = fmt::layer()
            .json()
            .with_writer(console_writer)
            .with_target(false);

        subscriber
            .with(file_layer)
            .with(error_layer)
            .with(console_layer)
            .init();
    } else {
        let file_layer = fmt::layer()
            .with_writer(file_writer)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false);

        let error_layer = fmt::layer()
            .with_writer(error_writer)
            .with_ansi(false)
            .with_filter(tracing_subscriber::filter::LevelFilter::ERROR);

        let console_layer = fmt::layer()
            .with_writer(console_writer)
            .with_target(true)
            .pretty();

        subscriber
            .with(file_layer)
            .with(error_layer)
            .with(console_layer)
            .init();
    }

    tracing::info!(
        "Logging initialized for {} environment ({})",
        settings.environment,
        settings.directory.display()
    );

    LogGuards {
        _guards: vec![file_guard, error_guard, console_guard],
    }
}
