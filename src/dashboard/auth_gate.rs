//! Dashboard sign-in state kept in local storage.
//!
//! Authentication is token presence only; the token is never decoded or
//! checked for expiry here. The server decides, and a rejected token shows
//! up as a 401 from the next call.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

use super::client::{ApiClient, ClientError, TokenStore};
use crate::routes::auth::LoginRequest;

pub const TOKEN_KEY: &str = "authToken";
pub const EMAIL_KEY: &str = "userEmail";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage file is not valid JSON: {0}")]
    Format(#[from] serde_json::Error),
}

/// String key/value store surviving dashboard restarts.
pub trait LocalStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn values(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.values.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl LocalStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.values().remove(key);
        Ok(())
    }
}

/// A JSON object on disk, re-read on every access so that a second process
/// sharing the file sees sign-in and sign-out.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn read(&self) -> Result<HashMap<String, String>, StorageError> {
        match std::fs::read(&self.path) {
            Ok(bytes) if bytes.is_empty() => Ok(HashMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn update(&self, change: impl FnOnce(&mut HashMap<String, String>)) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut values = self.read()?;
        change(&mut values);
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, serde_json::to_vec_pretty(&values)?)?;
        Ok(())
    }
}

impl LocalStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        match self.read() {
            Ok(mut values) => values.remove(key),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Unreadable dashboard storage");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.update(|values| {
            values.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.update(|values| {
            values.remove(key);
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub struct AuthGate<S> {
    storage: Arc<S>,
    changes: watch::Sender<bool>,
}

impl<S: LocalStorage> AuthGate<S> {
    pub fn new(storage: S) -> Self {
        Self::with_shared(Arc::new(storage))
    }

    pub fn with_shared(storage: Arc<S>) -> Self {
        let signed_in = storage.get(TOKEN_KEY).is_some_and(|t| !t.is_empty());
        let (changes, _) = watch::channel(signed_in);
        Self { storage, changes }
    }

    pub fn is_authenticated(&self) -> bool {
        self.get_token().is_some()
    }

    pub fn get_token(&self) -> Option<String> {
        self.storage.get(TOKEN_KEY).filter(|t| !t.is_empty())
    }

    pub fn get_user_email(&self) -> Option<String> {
        self.storage.get(EMAIL_KEY)
    }

    /// Receives the signed-in flag after every login and logout.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.changes.subscribe()
    }

    /// Stores the token and email on success and returns the token.
    pub async fn login(&self, api: &ApiClient, email: &str, password: &str) -> Result<String, AuthError> {
        let data = api
            .login(&LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .await?;

        self.storage.set(TOKEN_KEY, &data.token)?;
        self.storage.set(EMAIL_KEY, &data.user.email)?;
        self.changes.send_replace(true);
        tracing::info!(email = %data.user.email, "Dashboard login");
        Ok(data.token)
    }

    /// Tells the server, then clears local state whatever the server said.
    pub async fn logout(&self, api: &ApiClient) -> Result<(), AuthError> {
        let server = api.logout().await;
        if let Err(e) = &server {
            tracing::warn!(error = %e, "Logout request failed; clearing local session anyway");
        }

        let cleared = self
            .storage
            .remove(TOKEN_KEY)
            .and_then(|()| self.storage.remove(EMAIL_KEY));
        self.changes.send_replace(false);

        cleared?;
        server.map_err(AuthError::from)
    }
}

impl<S: LocalStorage> TokenStore for AuthGate<S> {
    fn token(&self) -> Option<String> {
        self.get_token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::client::ClientConfig;
    use crate::models::{AdminUser, Envelope};
    use crate::routes::auth::LoginData;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use uuid::Uuid;

    async fn spawn_auth_server() -> String {
        let app = Router::new()
            .route(
                "/api/auth/login",
                post(|Json(req): Json<LoginRequest>| async move {
                    if req.password != "s3cret-pass" {
                        return Err((
                            StatusCode::UNAUTHORIZED,
                            Json(Envelope::<()>::error("Invalid email or password")),
                        ));
                    }
                    Ok(Json(Envelope::success(
                        "Login successful",
                        LoginData {
                            token: "jwt-token".to_string(),
                            user: AdminUser {
                                id: Uuid::new_v4(),
                                username: "admin".to_string(),
                                email: req.email,
                                created_at: chrono::Utc::now(),
                            },
                        },
                    )))
                }),
            )
            .route(
                "/api/auth/logout",
                post(|| async { StatusCode::SERVICE_UNAVAILABLE }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/api")
    }

    #[tokio::test]
    async fn test_login_stores_session_and_logout_always_clears() {
        let base = spawn_auth_server().await;
        let gate = Arc::new(AuthGate::new(MemoryStorage::new()));
        let api = ApiClient::new(&ClientConfig::new(base), gate.clone());
        let mut changes = gate.subscribe();
        assert!(!gate.is_authenticated());

        let token = gate.login(&api, "admin@housemajor.com", "s3cret-pass").await.unwrap();
        assert_eq!(token, "jwt-token");
        assert!(gate.is_authenticated());
        assert_eq!(gate.get_user_email().as_deref(), Some("admin@housemajor.com"));
        assert!(changes.has_changed().unwrap());
        assert!(*changes.borrow_and_update());

        let err = gate.logout(&api).await.unwrap_err();
        assert!(matches!(err, AuthError::Client(ClientError::Api { status: 503, .. })));
        assert!(!gate.is_authenticated());
        assert!(gate.get_user_email().is_none());
        assert!(!*changes.borrow_and_update());
    }

    #[tokio::test]
    async fn test_failed_login_leaves_storage_untouched() {
        let base = spawn_auth_server().await;
        let gate = Arc::new(AuthGate::new(MemoryStorage::new()));
        let api = ApiClient::new(&ClientConfig::new(base), gate.clone());

        let err = gate.login(&api, "admin@housemajor.com", "wrong").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid email or password");
        assert!(!gate.is_authenticated());
    }

    #[test]
    fn test_file_storage_is_shared_between_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard").join("session.json");

        let writer = FileStorage::new(&path);
        writer.set(TOKEN_KEY, "abc").unwrap();
        writer.set(EMAIL_KEY, "a@b.com").unwrap();

        let gate = AuthGate::new(FileStorage::new(&path));
        assert!(gate.is_authenticated());
        assert_eq!(gate.get_token().as_deref(), Some("abc"));

        writer.remove(TOKEN_KEY).unwrap();
        assert!(!gate.is_authenticated());
        assert_eq!(gate.get_user_email().as_deref(), Some("a@b.com"));
    }

    #[test]
    fn test_empty_token_is_not_a_session() {
        let storage = MemoryStorage::new();
        storage.set(TOKEN_KEY, "").unwrap();
        let gate = AuthGate::new(storage);
        assert!(!gate.is_authenticated());
    }
}
