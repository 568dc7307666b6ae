use std::sync::Arc;

use crate::config::AppConfig;
use crate::mailer::{LogMailer, Mailer};
use crate::storage::{LocalObjectStore, ObjectStore};

/// Shared collaborators injected into handlers that upload files or send mail.
/// The database pool stays process-wide in [`crate::db`].
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ObjectStore>,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub fn new(store: Arc<dyn ObjectStore>, mailer: Arc<dyn Mailer>) -> Self {
        Self { store, mailer }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            store: Arc::new(LocalObjectStore::new(
                config.upload_dir.clone(),
                config.public_upload_base.clone(),
            )),
            mailer: Arc::new(LogMailer),
        }
    }
}
