//! Endpoint and search metadata for each managed resource.

use serde::de::DeserializeOwned;
use uuid::Uuid;

use super::form::Identified;
use super::list_view::Searchable;
use crate::models::{
    AdminUser, Application, Career, ContactMessage, InvestmentInquiry, Project, Service,
    TeamMember,
};

/// A collection served under `{base}/{PATH}`.
pub trait Resource: DeserializeOwned + Send + Sync + 'static {
    const PATH: &'static str;
    /// Whether list/get answer without a token.
    const PUBLIC_READ: bool = false;
    /// Whether `{PATH}/upload` and `{PATH}/{id}/upload` accept multipart saves.
    const UPLOADS: bool = false;
    /// Whether `PUT {PATH}/{id}` exists.
    const UPDATES: bool = true;
}

impl Resource for Service {
    const PATH: &'static str = "services";
    const PUBLIC_READ: bool = true;
}

impl Resource for Project {
    const PATH: &'static str = "projects";
    const PUBLIC_READ: bool = true;
    const UPLOADS: bool = true;
}

impl Resource for Career {
    const PATH: &'static str = "careers";
    const PUBLIC_READ: bool = true;
}

impl Resource for Application {
    const PATH: &'static str = "applications";
}

impl Resource for TeamMember {
    const PATH: &'static str = "team";
    const PUBLIC_READ: bool = true;
    const UPLOADS: bool = true;
}

impl Resource for InvestmentInquiry {
    const PATH: &'static str = "investments";
}

impl Resource for ContactMessage {
    const PATH: &'static str = "contacts";
}

impl Resource for AdminUser {
    const PATH: &'static str = "auth/admin/users";
    const UPDATES: bool = false;
}

impl Identified for Application {
    fn record_id(&self) -> Uuid {
        self.id
    }
}

impl Identified for InvestmentInquiry {
    fn record_id(&self) -> Uuid {
        self.id
    }
}

impl Identified for ContactMessage {
    fn record_id(&self) -> Uuid {
        self.id
    }
}

impl Searchable for Service {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.description.as_str()]
    }
}

impl Searchable for Project {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.title.as_str(),
            self.category.as_str(),
            self.description.as_str(),
        ]
    }
}

impl Searchable for Career {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.title.as_str(),
            self.department.as_str(),
            self.location.as_str(),
            self.kind.as_str(),
        ]
    }
}

impl Searchable for Application {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.full_name.as_str(),
            self.email.as_str(),
            self.display_job_title(),
            self.status.as_str(),
        ]
    }
}

impl Searchable for TeamMember {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.name.as_str(),
            self.role.as_str(),
            self.email.as_deref().unwrap_or_default(),
        ]
    }
}

impl Searchable for InvestmentInquiry {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.email.as_str(), self.description.as_str()]
    }
}

impl Searchable for ContactMessage {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.email.as_str(), self.message.as_str()]
    }
}

impl Searchable for AdminUser {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.username.as_str(), self.email.as_str()]
    }
}
