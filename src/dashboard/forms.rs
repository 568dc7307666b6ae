//! Form mappings for each dashboard resource and the public site forms.

use serde::Serialize;
use uuid::Uuid;

use super::form::{
    field, join_lines, optional_field, put, put_optional, required_field, split_lines,
    AcceptedType, FileRule, FormController, FormFields, FormModel, FormRecord, Identified,
    ValidationError, MAX_PHOTO_BYTES, MAX_RESUME_BYTES,
};
use crate::models::{
    application_target, AdminUser, AdminUserPayload, Career, CareerPayload, ContactPayload,
    DownloadLinks, ExternalLinks, InvestmentInquiryForm, InvestmentPayload, Project,
    ProjectClient, ProjectPayload, ProjectResult, Service, ServiceIcon, ServicePayload,
    TeamMember, TeamMemberPayload,
};

pub const MAX_PROJECT_IMAGE_BYTES: usize = 5 * 1024 * 1024;
const MIN_PASSWORD_LENGTH: usize = 8;

fn email_field(fields: &FormFields, name: &str) -> Result<String, ValidationError> {
    let email = required_field(fields, name, "Email")?;
    let well_formed = match email.split_once('@') {
        Some((user, domain)) => !user.is_empty() && domain.contains('.') && !domain.ends_with('.'),
        None => false,
    };
    if !well_formed || email.contains(char::is_whitespace) {
        return Err(ValidationError::new(name, "Enter a valid email address"));
    }
    Ok(email)
}

// ============================================================================
// Services
// ============================================================================

impl Identified for Service {
    fn record_id(&self) -> Uuid {
        self.id
    }
}

impl FormModel for Service {
    type Payload = ServicePayload;

    fn from_fields(fields: &FormFields) -> Result<ServicePayload, ValidationError> {
        let icon = ServiceIcon::from(required_field(fields, "icon", "Icon")?.as_str());
        if !icon.is_known() {
            return Err(ValidationError::new("icon", format!("Unknown icon '{icon}'")));
        }
        Ok(ServicePayload {
            title: required_field(fields, "title", "Title")?,
            description: required_field(fields, "description", "Description")?,
            icon,
        })
    }
}

impl FormRecord for Service {
    fn to_fields(&self) -> FormFields {
        let mut fields = FormFields::new();
        put(&mut fields, "title", &self.title);
        put(&mut fields, "description", &self.description);
        put(&mut fields, "icon", self.icon.as_str());
        fields
    }
}

// ============================================================================
// Projects
// ============================================================================

impl Identified for Project {
    fn record_id(&self) -> Uuid {
        self.id
    }
}

/// `results` is typed as literal JSON, e.g. `[{"metric":"40%","label":"Faster"}]`.
fn parse_results(text: &str) -> Result<Vec<ProjectResult>, ValidationError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(text)
        .map_err(|e| ValidationError::new("results", format!("Results must be valid JSON: {e}")))
}

impl FormModel for Project {
    type Payload = ProjectPayload;

    const FILE_RULES: &'static [FileRule] = &[FileRule {
        field: "images",
        label: "Project images",
        accepted: AcceptedType::Image,
        max_bytes: Some(MAX_PROJECT_IMAGE_BYTES),
        required: false,
        multiple: true,
    }];

    fn from_fields(fields: &FormFields) -> Result<ProjectPayload, ValidationError> {
        Ok(ProjectPayload {
            title: required_field(fields, "title", "Title")?,
            description: required_field(fields, "description", "Description")?,
            full_description: optional_field(fields, "fullDescription"),
            category: required_field(fields, "category", "Category")?,
            date: required_field(fields, "date", "Date")?,
            duration: optional_field(fields, "duration"),
            images: split_lines(field(fields, "images")),
            features: split_lines(field(fields, "features")),
            tags: split_lines(field(fields, "tags")),
            team: split_lines(field(fields, "team")),
            client: ProjectClient {
                name: field(fields, "clientName").trim().to_string(),
                logo: field(fields, "clientLogo").trim().to_string(),
                industry: field(fields, "clientIndustry").trim().to_string(),
                location: field(fields, "clientLocation").trim().to_string(),
            },
            external_links: ExternalLinks {
                live: optional_field(fields, "externalLinksLive"),
                github: optional_field(fields, "externalLinksGithub"),
            },
            download_links: DownloadLinks {
                ios: optional_field(fields, "downloadLinksIos"),
                android: optional_field(fields, "downloadLinksAndroid"),
            },
            results: parse_results(field(fields, "results"))?,
        })
    }
}

impl FormRecord for Project {
    fn to_fields(&self) -> FormFields {
        let mut fields = FormFields::new();
        put(&mut fields, "title", &self.title);
        put(&mut fields, "description", &self.description);
        put_optional(&mut fields, "fullDescription", self.full_description.as_deref());
        put(&mut fields, "category", &self.category);
        put(&mut fields, "date", &self.date);
        put_optional(&mut fields, "duration", self.duration.as_deref());
        put(&mut fields, "images", join_lines(&self.images));
        put(&mut fields, "features", join_lines(&self.features));
        put(&mut fields, "tags", join_lines(&self.tags));
        put(&mut fields, "team", join_lines(&self.team));
        put(&mut fields, "clientName", &self.client.name);
        put(&mut fields, "clientLogo", &self.client.logo);
        put(&mut fields, "clientIndustry", &self.client.industry);
        put(&mut fields, "clientLocation", &self.client.location);
        put_optional(&mut fields, "externalLinksLive", self.external_links.live.as_deref());
        put_optional(&mut fields, "externalLinksGithub", self.external_links.github.as_deref());
        put_optional(&mut fields, "downloadLinksIos", self.download_links.ios.as_deref());
        put_optional(
            &mut fields,
            "downloadLinksAndroid",
            self.download_links.android.as_deref(),
        );
        let results = if self.results.is_empty() {
            String::new()
        } else {
            serde_json::to_string_pretty(&self.results).unwrap_or_default()
        };
        put(&mut fields, "results", results);
        fields
    }
}

// ============================================================================
// Careers
// ============================================================================

impl Identified for Career {
    fn record_id(&self) -> Uuid {
        self.id
    }
}

impl FormModel for Career {
    type Payload = CareerPayload;

    fn from_fields(fields: &FormFields) -> Result<CareerPayload, ValidationError> {
        Ok(CareerPayload {
            title: required_field(fields, "title", "Title")?,
            department: required_field(fields, "department", "Department")?,
            kind: required_field(fields, "type", "Type")?,
            location: required_field(fields, "location", "Location")?,
            salary: optional_field(fields, "salary"),
            experience: optional_field(fields, "experience"),
            posted: optional_field(fields, "posted"),
            description: required_field(fields, "description", "Description")?,
            requirements: split_lines(field(fields, "requirements")),
            responsibilities: split_lines(field(fields, "responsibilities")),
        })
    }
}

impl FormRecord for Career {
    fn to_fields(&self) -> FormFields {
        let mut fields = FormFields::new();
        put(&mut fields, "title", &self.title);
        put(&mut fields, "department", &self.department);
        put(&mut fields, "type", &self.kind);
        put(&mut fields, "location", &self.location);
        put_optional(&mut fields, "salary", self.salary.as_deref());
        put_optional(&mut fields, "experience", self.experience.as_deref());
        put_optional(&mut fields, "posted", self.posted.as_deref());
        put(&mut fields, "description", &self.description);
        put(&mut fields, "requirements", join_lines(&self.requirements));
        put(&mut fields, "responsibilities", join_lines(&self.responsibilities));
        fields
    }
}

// ============================================================================
// Team
// ============================================================================

impl Identified for TeamMember {
    fn record_id(&self) -> Uuid {
        self.id
    }
}

impl FormModel for TeamMember {
    type Payload = TeamMemberPayload;

    const FILE_RULES: &'static [FileRule] = &[FileRule {
        field: "image",
        label: "Photo",
        accepted: AcceptedType::Image,
        max_bytes: Some(MAX_PHOTO_BYTES),
        required: false,
        multiple: false,
    }];

    fn from_fields(fields: &FormFields) -> Result<TeamMemberPayload, ValidationError> {
        let email = match optional_field(fields, "email") {
            Some(_) => Some(email_field(fields, "email")?),
            None => None,
        };
        Ok(TeamMemberPayload {
            name: required_field(fields, "name", "Name")?,
            role: required_field(fields, "role", "Role")?,
            bio: optional_field(fields, "bio"),
            email,
            linkedin: optional_field(fields, "linkedin"),
            github: optional_field(fields, "github"),
            image: optional_field(fields, "image"),
        })
    }
}

impl FormRecord for TeamMember {
    fn to_fields(&self) -> FormFields {
        let mut fields = FormFields::new();
        put(&mut fields, "name", &self.name);
        put(&mut fields, "role", &self.role);
        put_optional(&mut fields, "bio", self.bio.as_deref());
        put_optional(&mut fields, "email", self.email.as_deref());
        put_optional(&mut fields, "linkedin", self.linkedin.as_deref());
        put_optional(&mut fields, "github", self.github.as_deref());
        put_optional(&mut fields, "image", self.image.as_deref());
        fields
    }
}

// ============================================================================
// Admin users
// ============================================================================

impl Identified for AdminUser {
    fn record_id(&self) -> Uuid {
        self.id
    }
}

/// Admin accounts are created and deleted, never edited, so there is no
/// `FormRecord` impl to seed an edit form from.
impl FormModel for AdminUser {
    type Payload = AdminUserPayload;

    fn from_fields(fields: &FormFields) -> Result<AdminUserPayload, ValidationError> {
        let password = field(fields, "password").to_string();
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(ValidationError::new(
                "password",
                format!("Password must be at least {MIN_PASSWORD_LENGTH} characters"),
            ));
        }
        Ok(AdminUserPayload {
            username: required_field(fields, "username", "Username")?,
            email: email_field(fields, "email")?,
            password,
        })
    }
}


// ============================================================================
// Public site forms
// ============================================================================

impl FormModel for InvestmentInquiryForm {
    type Payload = InvestmentPayload;

    fn from_fields(fields: &FormFields) -> Result<InvestmentPayload, ValidationError> {
        let form = InvestmentInquiryForm {
            email: email_field(fields, "email")?,
            investment_nature: required_field(fields, "investmentNature", "Investment nature")?,
            full_name: optional_field(fields, "fullName"),
            phone: optional_field(fields, "phone"),
            company: optional_field(fields, "company"),
            amount: optional_field(fields, "amount"),
            message: optional_field(fields, "message"),
        };
        Ok(form.to_payload())
    }
}

impl FormModel for ContactPayload {
    type Payload = ContactPayload;

    fn from_fields(fields: &FormFields) -> Result<ContactPayload, ValidationError> {
        Ok(ContactPayload {
            name: required_field(fields, "name", "Name")?,
            email: email_field(fields, "email")?,
            message: required_field(fields, "message", "Message")?,
        })
    }
}

/// The careers-page application form, for one opening or a general application.
#[derive(Debug)]
pub enum ApplicationForm {}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSubmission {
    pub full_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_letter: Option<String>,
    pub job_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub career_id: Option<Uuid>,
}

impl FormModel for ApplicationForm {
    type Payload = ApplicationSubmission;

    const FILE_RULES: &'static [FileRule] = &[FileRule {
        field: "resume",
        label: "CV",
        accepted: AcceptedType::Pdf,
        max_bytes: Some(MAX_RESUME_BYTES),
        required: true,
        multiple: false,
    }];

    fn from_fields(fields: &FormFields) -> Result<ApplicationSubmission, ValidationError> {
        let career_id = match optional_field(fields, "careerId") {
            Some(raw) => Some(
                Uuid::parse_str(&raw)
                    .map_err(|_| ValidationError::new("careerId", "Unknown job opening"))?,
            ),
            None => None,
        };
        let (career_id, job_title) = application_target(career_id, optional_field(fields, "jobTitle"));

        Ok(ApplicationSubmission {
            full_name: required_field(fields, "fullName", "Full name")?,
            email: email_field(fields, "email")?,
            phone: optional_field(fields, "phone"),
            cover_letter: optional_field(fields, "coverLetter"),
            job_title,
            career_id,
        })
    }
}

impl FormController<ApplicationForm> {
    /// Opens the form targeted at `career`, or as a general application.
    pub fn open_for(&mut self, career: Option<&Career>) {
        self.open_blank();
        if let Some(career) = career {
            self.field_change("careerId", career.id.to_string());
            self.field_change("jobTitle", &career.title);
        }
    }
}
