use std::{net::SocketAddr, path::PathBuf};

/// Server settings read from the environment (after `.env` is loaded).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    /// Directory uploaded files are written to.
    pub upload_dir: PathBuf,
    /// URL prefix under which `upload_dir` is served.
    pub public_upload_base: String,
    pub body_limit_bytes: usize,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3001),
            environment: std::env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
            upload_dir: std::env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("uploads")),
            public_upload_base: std::env::var("PUBLIC_UPLOAD_BASE")
                .unwrap_or_else(|_| "/uploads".to_string()),
            body_limit_bytes: std::env::var("BODY_LIMIT_MB")
                .ok()
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(25)
                * 1024
                * 1024,
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}
