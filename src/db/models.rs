//! Row types whose shape differs from the wire records in [`crate::models`].

use chrono::{DateTime, Utc};
use sqlx::{types::Json, FromRow};
use uuid::Uuid;

use crate::models::{
    AdminUser, DownloadLinks, ExternalLinks, Project, ProjectClient, ProjectResult,
};

/// Column list shared by every project query.
pub const PROJECT_COLUMNS: &str = "id, title, description, full_description, category, date, \
     duration, images, features, tags, team, client, external_links, download_links, results";

/// `projects` row; nested objects live in JSONB columns.
#[derive(Debug, Clone, FromRow)]
pub struct ProjectRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub full_description: Option<String>,
    pub category: String,
    pub date: String,
    pub duration: Option<String>,
    pub images: Vec<String>,
    pub features: Vec<String>,
    pub tags: Vec<String>,
    pub team: Vec<String>,
    pub client: Json<ProjectClient>,
    pub external_links: Json<ExternalLinks>,
    pub download_links: Json<DownloadLinks>,
    pub results: Json<Vec<ProjectResult>>,
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        Project {
            id: row.id,
            title: row.title,
            description: row.description,
            full_description: row.full_description,
            category: row.category,
            date: row.date,
            duration: row.duration,
            images: row.images,
            features: row.features,
            tags: row.tags,
            team: row.team,
            client: row.client.0,
            external_links: row.external_links.0,
            download_links: row.download_links.0,
            results: row.results.0,
        }
    }
}

/// `admin_users` row including the credential hash. Never serialized.
#[derive(Debug, Clone, FromRow)]
pub struct AdminUserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl From<AdminUserRow> for AdminUser {
    fn from(row: AdminUserRow) -> Self {
        AdminUser {
            id: row.id,
            username: row.username,
            email: row.email,
            created_at: row.created_at,
        }
    }
}

/// Pending password reset, looked up by token hash.
#[derive(Debug, Clone, FromRow)]
pub struct PasswordResetRow {
    pub id: Uuid,
    pub admin_user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
}

impl PasswordResetRow {
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        !self.used && self.expires_at > now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_password_reset_usable_only_before_expiry_and_unused() {
        let now = Utc::now();
        let mut row = PasswordResetRow {
            id: Uuid::new_v4(),
            admin_user_id: Uuid::new_v4(),
            expires_at: now + Duration::minutes(10),
            used: false,
        };
        assert!(row.is_usable(now));
        row.used = true;
        assert!(!row.is_usable(now));
        row.used = false;
        row.expires_at = now - Duration::seconds(1);
        assert!(!row.is_usable(now));
    }

    #[test]
    fn test_admin_row_drops_password_hash() {
        let row = AdminUserRow {
            id: Uuid::new_v4(),
            username: "root".to_string(),
            email: "root@example.com".to_string(),
            password_hash: "$2b$12$secret".to_string(),
            created_at: Utc::now(),
        };
        let user = AdminUser::from(row);
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret"));
        assert!(json.contains("createdAt"));
    }
}
