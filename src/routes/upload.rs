//! Multipart intake shared by the file-bearing endpoints.
//!
//! Text parts are collected by name; array and object fields arrive as
//! JSON-stringified parts. File parts are validated by size and magic bytes
//! before they reach the [`ObjectStore`].

use axum::extract::Multipart;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::future::Future;

use crate::error::ApiError;
use crate::storage::ObjectStore;

pub const MAX_RESUME_SIZE: usize = 5 * 1024 * 1024; // 5MB
pub const MAX_PHOTO_SIZE: usize = 3 * 1024 * 1024; // 3MB
pub const MAX_PROJECT_IMAGE_SIZE: usize = 5 * 1024 * 1024; // 5MB

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Image,
}

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub field: String,
    pub file_name: String,
    pub bytes: Bytes,
}

#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    files: Vec<UploadedFile>,
}

impl MultipartForm {
    pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = MultipartForm::default();

        loop {
            let field = match multipart.next_field().await {
                Ok(Some(field)) => field,
                Ok(None) => break,
                Err(e) => {
                    tracing::error!("Multipart error: {}", e);
                    return Err(ApiError::BadRequest("Invalid multipart data".to_string()));
                }
            };

            let name = field.name().unwrap_or_default().to_string();
            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let bytes = field.bytes().await.map_err(|e| {
                        tracing::error!("Failed to read upload bytes: {}", e);
                        ApiError::BadRequest("Failed to read file data".to_string())
                    })?;
                    // Browsers send an empty part for an untouched file input.
                    if file_name.is_empty() && bytes.is_empty() {
                        continue;
                    }
                    form.files.push(UploadedFile {
                        field: name,
                        file_name,
                        bytes,
                    });
                }
                None => {
                    let text = field.text().await.map_err(|_| {
                        ApiError::BadRequest(format!("Field '{name}' is not valid text"))
                    })?;
                    form.fields.insert(name, text);
                }
            }
        }

        Ok(form)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Trimmed text with blanks treated as absent.
    pub fn optional_text(&self, name: &str) -> Option<String> {
        self.text(name)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    pub fn required_text(&self, name: &str, label: &str) -> Result<String, ApiError> {
        self.optional_text(name)
            .ok_or_else(|| ApiError::BadRequest(format!("{label} is required")))
    }

    /// Parses a JSON-stringified part; a missing or blank part yields `T::default()`.
    pub fn json<T: DeserializeOwned + Default>(&self, name: &str) -> Result<T, ApiError> {
        match self.optional_text(name) {
            Some(raw) => serde_json::from_str(&raw)
                .map_err(|e| ApiError::BadRequest(format!("Field '{name}' is not valid JSON: {e}"))),
            None => Ok(T::default()),
        }
    }

    pub fn files<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a UploadedFile> + 'a {
        self.files.iter().filter(move |f| f.field == field)
    }

    pub fn file(&self, field: &str) -> Option<&UploadedFile> {
        self.files.iter().find(|f| f.field == field)
    }

    #[cfg(test)]
    pub fn from_parts(fields: &[(&str, &str)], files: Vec<UploadedFile>) -> Self {
        Self {
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            files,
        }
    }
}

pub fn validate_image_magic_bytes(bytes: &[u8]) -> Option<&'static str> {
    if bytes.len() < 4 {
        return None;
    }
    match bytes {
        // JPEG: FF D8 FF
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        // PNG: 89 50 4E 47
        [0x89, 0x50, 0x4E, 0x47, ..] => Some("image/png"),
        // GIF: 47 49 46 38
        [0x47, 0x49, 0x46, 0x38, ..] => Some("image/gif"),
        // WebP: 52 49 46 46 ... 57 45 42 50
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Some("image/webp"),
        _ => None,
    }
}

pub fn is_pdf(bytes: &[u8]) -> bool {
    bytes.starts_with(b"%PDF")
}

fn get_extension_from_mime(mime: &str) -> &'static str {
    match mime {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "application/pdf" => "pdf",
        _ => "bin",
    }
}

/// Checks size and content type; returns the sniffed MIME type.
pub fn validate_file(
    file: &UploadedFile,
    kind: FileKind,
    max_size: usize,
) -> Result<&'static str, ApiError> {
    if file.bytes.is_empty() {
        return Err(ApiError::BadRequest("Empty file".to_string()));
    }
    if file.bytes.len() > max_size {
        return Err(ApiError::PayloadTooLarge(format!(
            "File too large. Maximum size is {}MB.",
            max_size / (1024 * 1024)
        )));
    }
    match kind {
        FileKind::Pdf if is_pdf(&file.bytes) => Ok("application/pdf"),
        FileKind::Pdf => Err(ApiError::BadRequest(
            "Only PDF files are accepted".to_string(),
        )),
        FileKind::Image => validate_image_magic_bytes(&file.bytes).ok_or_else(|| {
            ApiError::BadRequest(
                "File content does not match an allowed image type.".to_string(),
            )
        }),
    }
}

/// Validates and stores one file, returning its public URL.
pub async fn store_file(
    store: &dyn ObjectStore,
    folder: &str,
    file: &UploadedFile,
    kind: FileKind,
    max_size: usize,
) -> Result<String, ApiError> {
    let mime = validate_file(file, kind, max_size)?;
    let url = store
        .put(folder, get_extension_from_mime(mime), file.bytes.clone())
        .await
        .map_err(|e| ApiError::Internal(format!("failed to store {}: {e}", file.file_name)))?;
    tracing::info!("Stored {} ({} bytes) as {}", file.file_name, file.bytes.len(), url);
    Ok(url)
}

/// Deletes uploads whose record never made it to the database.
pub async fn discard_stored(store: &dyn ObjectStore, urls: &[String]) {
    for url in urls {
        if let Err(e) = store.remove(url).await {
            tracing::warn!("Failed to remove orphaned upload {}: {}", url, e);
        }
    }
}

/// Awaits the database write for freshly stored `urls`, removing the files
/// again if the write fails.
pub async fn persist_with_uploads<T, W>(
    store: &dyn ObjectStore,
    urls: &[String],
    write: W,
) -> Result<T, ApiError>
where
    W: Future<Output = Result<T, ApiError>>,
{
    match write.await {
        Ok(value) => Ok(value),
        Err(e) => {
            if !urls.is_empty() {
                tracing::error!(
                    "Write failed after storing {} upload(s), removing them: {}",
                    urls.len(),
                    e
                );
                discard_stored(store, urls).await;
            }
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::LocalObjectStore;

    fn file(field: &str, bytes: &'static [u8]) -> UploadedFile {
        UploadedFile {
            field: field.to_string(),
            file_name: "upload".to_string(),
            bytes: Bytes::from_static(bytes),
        }
    }

    #[test]
    fn test_magic_bytes_detection() {
        assert_eq!(
            validate_image_magic_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]),
            Some("image/jpeg")
        );
        assert_eq!(
            validate_image_magic_bytes(&[0x89, 0x50, 0x4E, 0x47, 0x0D]),
            Some("image/png")
        );
        assert_eq!(validate_image_magic_bytes(b"%PDF-1.7"), None);
        assert!(is_pdf(b"%PDF-1.7"));
    }

    #[test]
    fn test_validate_file_rejects_oversized_pdf() {
        let mut data = b"%PDF".to_vec();
        data.resize(MAX_RESUME_SIZE + 1, 0);
        let big = UploadedFile {
            field: "resume".to_string(),
            file_name: "cv.pdf".to_string(),
            bytes: Bytes::from(data),
        };
        assert!(matches!(
            validate_file(&big, FileKind::Pdf, MAX_RESUME_SIZE),
            Err(ApiError::PayloadTooLarge(_))
        ));
    }

    #[test]
    fn test_validate_file_rejects_non_pdf_resume() {
        let png = file("resume", &[0x89, 0x50, 0x4E, 0x47, 0x0D]);
        assert!(validate_file(&png, FileKind::Pdf, MAX_RESUME_SIZE).is_err());
    }

    #[test]
    fn test_json_part_defaults_when_missing() {
        let form = MultipartForm::from_parts(&[("features", "[\"a\",\"b\"]")], vec![]);
        let features: Vec<String> = form.json("features").unwrap();
        assert_eq!(features, vec!["a", "b"]);
        let tags: Vec<String> = form.json("tags").unwrap();
        assert!(tags.is_empty());
    }

    #[test]
    fn test_json_part_malformed_is_bad_request() {
        let form = MultipartForm::from_parts(&[("results", "{not json")], vec![]);
        let parsed: Result<Vec<String>, _> = form.json("results");
        assert!(matches!(parsed, Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_files_filtered_by_field() {
        let form = MultipartForm::from_parts(
            &[],
            vec![
                file("images", b"a"),
                file("images", b"b"),
                file("resume", b"c"),
            ],
        );
        assert_eq!(form.files("images").count(), 2);
        assert!(form.file("image").is_none());
    }

    #[tokio::test]
    async fn test_failed_write_removes_stored_uploads() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path(), "/uploads");
        let url = store_file(
            &store,
            "resumes",
            &file("resume", b"%PDF-1.4 body"),
            FileKind::Pdf,
            MAX_RESUME_SIZE,
        )
        .await
        .unwrap();
        let path = dir.path().join("resumes").join(url.rsplit('/').next().unwrap());
        assert!(path.exists());

        let result: Result<(), ApiError> = persist_with_uploads(&store, &[url], async {
            Err(ApiError::Internal("insert failed".to_string()))
        })
        .await;
        assert!(result.is_err());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_successful_write_keeps_uploads() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path(), "/uploads");
        let url = store_file(
            &store,
            "team",
            &file("image", &[0x89, 0x50, 0x4E, 0x47, 0x0D]),
            FileKind::Image,
            MAX_PHOTO_SIZE,
        )
        .await
        .unwrap();
        let path = dir.path().join("team").join(url.rsplit('/').next().unwrap());

        let id = persist_with_uploads(&store, std::slice::from_ref(&url), async { Ok(7) })
            .await
            .unwrap();
        assert_eq!(id, 7);
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_store_file_writes_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path(), "/uploads");
        let url = store_file(
            &store,
            "resumes",
            &file("resume", b"%PDF-1.4 body"),
            FileKind::Pdf,
            MAX_RESUME_SIZE,
        )
        .await
        .unwrap();
        assert!(url.ends_with(".pdf"));
    }
}
