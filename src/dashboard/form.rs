//! Create/edit modal state.
//!
//! A form holds every field as text. Arrays are edited as newline-joined text
//! and nested objects as flattened scalar fields; a [`FormModel`] turns the
//! text back into a full payload on submit. File inputs are described by
//! [`FileRule`]s and checked before anything is sent.

use bytes::Bytes;
use serde::Serialize;
use std::collections::BTreeMap;
use std::marker::PhantomData;
use uuid::Uuid;

pub type FormFields = BTreeMap<String, String>;

pub const MAX_RESUME_BYTES: usize = 5 * 1024 * 1024;
pub const MAX_PHOTO_BYTES: usize = 3 * 1024 * 1024;

/// A local check that blocked submission.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn required(field: &str, label: &str) -> Self {
        Self::new(field, format!("{label} is required"))
    }
}

pub fn join_lines(items: &[String]) -> String {
    items.join("\n")
}

/// Splits a text area into list items. Blank lines are dropped; other lines
/// are kept as typed.
pub fn split_lines(text: &str) -> Vec<String> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

/// Value of `name`, or `""` when the field was never set.
pub fn field<'a>(fields: &'a FormFields, name: &str) -> &'a str {
    fields.get(name).map(String::as_str).unwrap_or_default()
}

pub fn required_field(
    fields: &FormFields,
    name: &str,
    label: &str,
) -> Result<String, ValidationError> {
    let value = field(fields, name).trim();
    if value.is_empty() {
        return Err(ValidationError::required(name, label));
    }
    Ok(value.to_string())
}

/// Empty optional text is sent as absent.
pub fn optional_field(fields: &FormFields, name: &str) -> Option<String> {
    let value = field(fields, name).trim();
    (!value.is_empty()).then(|| value.to_string())
}

pub fn put(fields: &mut FormFields, name: &str, value: impl Into<String>) {
    fields.insert(name.to_string(), value.into());
}

pub fn put_optional(fields: &mut FormFields, name: &str, value: Option<&str>) {
    put(fields, name, value.unwrap_or_default());
}

// ============================================================================
// Files
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptedType {
    Pdf,
    Image,
}

impl AcceptedType {
    fn accepts(self, file: &FileSelection) -> bool {
        match self {
            AcceptedType::Pdf => {
                file.content_type == "application/pdf"
                    || (file.content_type.is_empty()
                        && file.file_name.to_lowercase().ends_with(".pdf"))
            }
            AcceptedType::Image => file.content_type.starts_with("image/"),
        }
    }

    fn describe(self) -> &'static str {
        match self {
            AcceptedType::Pdf => "a PDF file",
            AcceptedType::Image => "an image",
        }
    }
}

/// A file picked in a file input.
#[derive(Debug, Clone, PartialEq)]
pub struct FileSelection {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl FileSelection {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileRule {
    pub field: &'static str,
    pub label: &'static str,
    pub accepted: AcceptedType,
    pub max_bytes: Option<usize>,
    /// Required on create. When editing, the stored file is kept instead.
    pub required: bool,
    pub multiple: bool,
}

impl FileRule {
    fn check(&self, selected: &[FileSelection], editing: bool) -> Result<(), ValidationError> {
        if selected.is_empty() {
            if self.required && !editing {
                return Err(ValidationError::required(self.field, self.label));
            }
            return Ok(());
        }
        if !self.multiple && selected.len() > 1 {
            return Err(ValidationError::new(
                self.field,
                format!("Select a single file for {}", self.label),
            ));
        }
        for file in selected {
            if !self.accepted.accepts(file) {
                return Err(ValidationError::new(
                    self.field,
                    format!("{} must be {}", self.label, self.accepted.describe()),
                ));
            }
            if let Some(max) = self.max_bytes {
                if file.size() > max {
                    return Err(ValidationError::new(
                        self.field,
                        format!(
                            "{} must be at most {}MB",
                            self.label,
                            max / (1024 * 1024)
                        ),
                    ));
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// Models
// ============================================================================

/// Turns form text back into a payload.
pub trait FormModel {
    type Payload: Serialize + Send + Sync + 'static;

    const FILE_RULES: &'static [FileRule] = &[];

    fn from_fields(fields: &FormFields) -> Result<Self::Payload, ValidationError>;

    /// Initial fields of an empty form.
    fn blank_fields() -> FormFields {
        FormFields::new()
    }
}

/// Records addressed by a database id.
pub trait Identified {
    fn record_id(&self) -> Uuid;
}

/// A stored record that can seed an edit form.
pub trait FormRecord: FormModel + Identified {
    fn to_fields(&self) -> FormFields;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Create,
    Update(Uuid),
}

/// Everything one submit sends: the full payload plus any selected files.
#[derive(Debug, Clone)]
pub struct Submission<P> {
    pub target: Target,
    pub payload: P,
    pub files: BTreeMap<String, Vec<FileSelection>>,
}

impl<P> Submission<P> {
    pub fn has_files(&self) -> bool {
        self.files.values().any(|f| !f.is_empty())
    }
}

#[derive(Debug)]
pub struct FormController<M> {
    open: bool,
    editing: Option<Uuid>,
    fields: FormFields,
    files: BTreeMap<String, Vec<FileSelection>>,
    validation: Option<ValidationError>,
    server_error: Option<String>,
    _model: PhantomData<fn() -> M>,
}

impl<M> Default for FormController<M> {
    fn default() -> Self {
        Self {
            open: false,
            editing: None,
            fields: FormFields::new(),
            files: BTreeMap::new(),
            validation: None,
            server_error: None,
            _model: PhantomData,
        }
    }
}

impl<M: FormModel> FormController<M> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_blank(&mut self) {
        self.reset();
        self.fields = M::blank_fields();
        self.open = true;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn editing(&self) -> Option<Uuid> {
        self.editing
    }

    pub fn field(&self, name: &str) -> &str {
        field(&self.fields, name)
    }

    pub fn fields(&self) -> &FormFields {
        &self.fields
    }

    pub fn field_change(&mut self, name: &str, value: impl Into<String>) {
        put(&mut self.fields, name, value);
    }

    /// Replaces the selection of one file input.
    pub fn select_files(&mut self, field: &str, files: Vec<FileSelection>) {
        self.files.insert(field.to_string(), files);
    }

    pub fn validation_error(&self) -> Option<&ValidationError> {
        self.validation.as_ref()
    }

    pub fn server_error(&self) -> Option<&str> {
        self.server_error.as_deref()
    }

    /// Validates locally and builds the submission. The form stays open and
    /// populated either way.
    pub fn submit(&mut self) -> Result<Submission<M::Payload>, ValidationError> {
        let result = self.build();
        self.validation = result.as_ref().err().cloned();
        result
    }

    fn build(&self) -> Result<Submission<M::Payload>, ValidationError> {
        let editing = self.editing.is_some();
        for rule in M::FILE_RULES {
            let selected = self.files.get(rule.field).map(Vec::as_slice).unwrap_or(&[]);
            rule.check(selected, editing)?;
        }

        let payload = M::from_fields(&self.fields)?;
        let target = match self.editing {
            Some(id) => Target::Update(id),
            None => Target::Create,
        };
        let files = self
            .files
            .iter()
            .filter(|(_, selected)| !selected.is_empty())
            .map(|(field, selected)| (field.clone(), selected.clone()))
            .collect();

        Ok(Submission {
            target,
            payload,
            files,
        })
    }

    /// The server rejected the submission; keep the draft, show the message.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.server_error = Some(message.into());
    }

    /// Closes after a successful save. Returns `true`: the owning list must re-fetch.
    pub fn succeed(&mut self) -> bool {
        self.close();
        true
    }

    pub fn close(&mut self) {
        self.reset();
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

impl<M: FormRecord> FormController<M> {
    /// Opens for create (`None`) or seeds every field from `existing`.
    pub fn open(&mut self, existing: Option<&M>) {
        match existing {
            Some(record) => {
                self.reset();
                self.fields = record.to_fields();
                self.editing = Some(record.record_id());
                self.open = true;
            }
            None => self.open_blank(),
        }
    }
}
