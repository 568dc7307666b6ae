//! Domain records shared by the HTTP handlers and the dashboard client.
//!
//! Everything here travels as camelCase JSON. Records carry their database
//! id; the matching `*Payload` types are the full bodies sent on create and
//! update (never a diff).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Job title recorded on applications that are not tied to a posted career.
pub const GENERAL_APPLICATION_TITLE: &str = "General Application";

/// Prefix of the synthesized investment inquiry title.
pub const INVESTMENT_TITLE_PREFIX: &str = "Investment Inquiry - ";

// ============================================================================
// Response envelope
// ============================================================================

/// `{status, message, data}` wrapper used by every backend response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Envelope<T> {
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            data: Some(data),
        }
    }
}

impl Envelope<()> {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            data: None,
        }
    }
}

// ============================================================================
// Services
// ============================================================================

/// Icon keys the public site knows how to render.
///
/// Unknown keys are kept verbatim in [`ServiceIcon::Unknown`] so a record
/// written by an older dashboard still loads; the site renders a placeholder
/// for them. New data entry only accepts known keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ServiceIcon {
    CodeBracket,
    DevicePhoneMobile,
    GlobeAlt,
    Megaphone,
    PaintBrush,
    ServerStack,
    ShieldCheck,
    ChartBar,
    Cloud,
    CpuChip,
    Unknown(String),
}

impl ServiceIcon {
    pub const KNOWN: [ServiceIcon; 10] = [
        ServiceIcon::CodeBracket,
        ServiceIcon::DevicePhoneMobile,
        ServiceIcon::GlobeAlt,
        ServiceIcon::Megaphone,
        ServiceIcon::PaintBrush,
        ServiceIcon::ServerStack,
        ServiceIcon::ShieldCheck,
        ServiceIcon::ChartBar,
        ServiceIcon::Cloud,
        ServiceIcon::CpuChip,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            ServiceIcon::CodeBracket => "CodeBracketIcon",
            ServiceIcon::DevicePhoneMobile => "DevicePhoneMobileIcon",
            ServiceIcon::GlobeAlt => "GlobeAltIcon",
            ServiceIcon::Megaphone => "MegaphoneIcon",
            ServiceIcon::PaintBrush => "PaintBrushIcon",
            ServiceIcon::ServerStack => "ServerStackIcon",
            ServiceIcon::ShieldCheck => "ShieldCheckIcon",
            ServiceIcon::ChartBar => "ChartBarIcon",
            ServiceIcon::Cloud => "CloudIcon",
            ServiceIcon::CpuChip => "CpuChipIcon",
            ServiceIcon::Unknown(name) => name,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, ServiceIcon::Unknown(_))
    }
}

impl From<String> for ServiceIcon {
    fn from(name: String) -> Self {
        ServiceIcon::KNOWN
            .iter()
            .find(|icon| icon.as_str() == name)
            .cloned()
            .unwrap_or(ServiceIcon::Unknown(name))
    }
}

impl From<&str> for ServiceIcon {
    fn from(name: &str) -> Self {
        ServiceIcon::from(name.to_string())
    }
}

impl From<ServiceIcon> for String {
    fn from(icon: ServiceIcon) -> Self {
        icon.as_str().to_string()
    }
}

impl std::fmt::Display for ServiceIcon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    #[sqlx(try_from = "String")]
    pub icon: ServiceIcon,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePayload {
    pub title: String,
    pub description: String,
    pub icon: ServiceIcon,
}

// ============================================================================
// Projects
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectClient {
    pub name: String,
    pub logo: String,
    pub industry: String,
    pub location: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExternalLinks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub live: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DownloadLinks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ios: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub android: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectResult {
    pub metric: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub full_description: Option<String>,
    pub category: String,
    pub date: String,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub team: Vec<String>,
    #[serde(default)]
    pub client: ProjectClient,
    #[serde(default)]
    pub external_links: ExternalLinks,
    #[serde(default)]
    pub download_links: DownloadLinks,
    #[serde(default)]
    pub results: Vec<ProjectResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPayload {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub full_description: Option<String>,
    pub category: String,
    pub date: String,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub team: Vec<String>,
    #[serde(default)]
    pub client: ProjectClient,
    #[serde(default)]
    pub external_links: ExternalLinks,
    #[serde(default)]
    pub download_links: DownloadLinks,
    #[serde(default)]
    pub results: Vec<ProjectResult>,
}

/// Categories offered by the public portfolio filter. Project categories are
/// free text; the filter compares case-insensitively.
pub const PORTFOLIO_CATEGORIES: &[&str] = &[
    "All",
    "Web Development",
    "Mobile Apps",
    "UI/UX Design",
    "Digital Marketing",
    "Cloud Solutions",
];

/// Filters a project list the way the public portfolio view does.
/// `"All"` keeps everything.
pub fn projects_in_category<'a>(projects: &'a [Project], category: &str) -> Vec<&'a Project> {
    if category.eq_ignore_ascii_case("all") {
        return projects.iter().collect();
    }
    projects
        .iter()
        .filter(|p| p.category.eq_ignore_ascii_case(category))
        .collect()
}

// ============================================================================
// Careers & applications
// ============================================================================

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Career {
    pub id: Uuid,
    pub title: String,
    pub department: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "job_type")]
    pub kind: String,
    pub location: String,
    #[serde(default)]
    pub salary: Option<String>,
    #[serde(default)]
    pub experience: Option<String>,
    #[serde(default)]
    pub posted: Option<String>,
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub responsibilities: Vec<String>,
    #[serde(default)]
    #[sqlx(default)]
    pub application_count: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerPayload {
    pub title: String,
    pub department: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub location: String,
    #[serde(default)]
    pub salary: Option<String>,
    #[serde(default)]
    pub experience: Option<String>,
    #[serde(default)]
    pub posted: Option<String>,
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub responsibilities: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Pending,
    Reviewed,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "Pending",
            ApplicationStatus::Reviewed => "Reviewed",
            ApplicationStatus::Accepted => "Accepted",
            ApplicationStatus::Rejected => "Rejected",
        }
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown application status: {0}")]
pub struct UnknownStatus(pub String);

impl TryFrom<String> for ApplicationStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "Pending" => Ok(ApplicationStatus::Pending),
            "Reviewed" => Ok(ApplicationStatus::Reviewed),
            "Accepted" => Ok(ApplicationStatus::Accepted),
            "Rejected" => Ok(ApplicationStatus::Rejected),
            _ => Err(UnknownStatus(value)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub cover_letter: Option<String>,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub career_id: Option<Uuid>,
    #[serde(default)]
    pub resume_url: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
}

impl Application {
    /// An application not tied to a posted career opening.
    pub fn is_general(&self) -> bool {
        self.career_id.is_none()
    }

    /// Title shown in the applications table.
    pub fn display_job_title(&self) -> &str {
        self.job_title
            .as_deref()
            .unwrap_or(GENERAL_APPLICATION_TITLE)
    }
}

/// Resolves the `(career_id, job_title)` pair stored for an application.
/// Without a career the title always falls back to
/// [`GENERAL_APPLICATION_TITLE`], whatever title was supplied.
pub fn application_target(
    career_id: Option<Uuid>,
    job_title: Option<String>,
) -> (Option<Uuid>, String) {
    match career_id {
        Some(id) => (
            Some(id),
            job_title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| GENERAL_APPLICATION_TITLE.to_string()),
        ),
        None => (None, GENERAL_APPLICATION_TITLE.to_string()),
    }
}

// ============================================================================
// Team
// ============================================================================

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub id: Uuid,
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub linkedin: Option<String>,
    #[serde(default)]
    pub github: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMemberPayload {
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub linkedin: Option<String>,
    #[serde(default)]
    pub github: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

// ============================================================================
// Investments & contacts
// ============================================================================

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentInquiry {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentPayload {
    pub title: String,
    pub description: String,
    pub email: String,
}

/// Fields of the public investment form before they are folded into a
/// title and description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentInquiryForm {
    pub email: String,
    pub investment_nature: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl InvestmentInquiryForm {
    pub fn title(&self) -> String {
        format!("{}{}", INVESTMENT_TITLE_PREFIX, self.investment_nature.trim())
    }

    /// One `Label: value` line per filled field.
    pub fn description(&self) -> String {
        let mut lines = Vec::new();
        let optional = |label: &str, value: &Option<String>, lines: &mut Vec<String>| {
            if let Some(v) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                lines.push(format!("{label}: {v}"));
            }
        };
        optional("Name", &self.full_name, &mut lines);
        lines.push(format!("Email: {}", self.email.trim()));
        optional("Phone", &self.phone, &mut lines);
        optional("Company", &self.company, &mut lines);
        lines.push(format!(
            "Investment Nature: {}",
            self.investment_nature.trim()
        ));
        optional("Amount", &self.amount, &mut lines);
        optional("Message", &self.message, &mut lines);
        lines.join("\n")
    }

    pub fn to_payload(&self) -> InvestmentPayload {
        InvestmentPayload {
            title: self.title(),
            description: self.description(),
            email: self.email.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactPayload {
    pub name: String,
    pub email: String,
    pub message: String,
}

// ============================================================================
// Admin users
// ============================================================================

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserPayload {
    pub username: String,
    pub email: String,
    pub password: String,
}
