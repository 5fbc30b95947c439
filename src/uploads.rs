//! Multipart form intake and local asset storage.
//!
//! Uploaded files land in `AppConfig::upload_dir` under a random name and are
//! served back from `/assets`. The database only stores that file name.

use std::{collections::HashMap, path::Path};

use axum::{
    body::Bytes,
    extract::{FromRequestParts, Multipart},
    http::{header, request::Parts},
};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    state::AppState,
};

pub const ASSET_ROUTE: &str = "/assets";

const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "gif"];
const DOCUMENT_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "pdf"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Image,
    Document,
}

impl FileKind {
    fn extensions(&self) -> &'static [&'static str] {
        match self {
            FileKind::Image => IMAGE_EXTENSIONS,
            FileKind::Document => DOCUMENT_EXTENSIONS,
        }
    }
}

/// Which file fields a form accepts, and how many files each may carry.
#[derive(Debug, Clone, Copy)]
pub struct FileField {
    pub name: &'static str,
    pub max_count: usize,
    pub kind: FileKind,
}

impl FileField {
    pub const fn image(name: &'static str, max_count: usize) -> Self {
        Self {
            name,
            max_count,
            kind: FileKind::Image,
        }
    }

    pub const fn document(name: &'static str) -> Self {
        Self {
            name,
            max_count: 1,
            kind: FileKind::Document,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub extension: String,
    pub bytes: Bytes,
}

#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    files: HashMap<String, Vec<UploadedFile>>,
}

impl MultipartForm {
    pub async fn read(mut multipart: Multipart, accepted: &[FileField]) -> AppResult<Self> {
        let mut form = MultipartForm::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let spec = accepted.iter().find(|f| f.name == name).ok_or_else(|| {
                        AppError::bad_request(format!("Unexpected file field '{name}'"))
                    })?;
                    let bytes = field.bytes().await?;
                    if bytes.is_empty() {
                        continue;
                    }
                    let file = validate_file(spec, file_name, bytes)?;
                    let slot = form.files.entry(name).or_default();
                    if slot.len() >= spec.max_count {
                        return Err(AppError::bad_request(format!(
                            "At most {} file(s) allowed for '{}'",
                            spec.max_count, spec.name
                        )));
                    }
                    slot.push(file);
                }
                None => {
                    let value = field.text().await?;
                    form.fields.insert(name, value);
                }
            }
        }

        Ok(form)
    }

    /// Text field, trimmed; blank values count as absent.
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    pub fn files(&self, name: &str) -> &[UploadedFile] {
        self.files.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn file(&self, name: &str) -> Option<&UploadedFile> {
        self.files(name).first()
    }

    pub fn with_text(mut self, name: &str, value: &str) -> Self {
        self.fields.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_file(mut self, name: &str, file: UploadedFile) -> Self {
        self.files.entry(name.to_string()).or_default().push(file);
        self
    }
}

fn validate_file(spec: &FileField, file_name: String, bytes: Bytes) -> AppResult<UploadedFile> {
    if bytes.len() > MAX_FILE_SIZE {
        return Err(AppError::bad_request(format!(
            "File too large. Maximum size is {}MB",
            MAX_FILE_SIZE / 1024 / 1024
        )));
    }

    let extension = Path::new(&file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .ok_or_else(|| AppError::bad_request(format!("Invalid file extension for: {file_name}")))?;

    if !spec.kind.extensions().contains(&extension.as_str()) {
        return Err(AppError::bad_request(format!(
            "Unsupported file format '{}'. Supported: {}",
            extension,
            spec.kind.extensions().join(", ")
        )));
    }

    Ok(UploadedFile {
        file_name,
        extension,
        bytes,
    })
}

/// Write a file under a fresh random name and return that name.
pub async fn store(upload_dir: &Path, file: &UploadedFile) -> AppResult<String> {
    tokio::fs::create_dir_all(upload_dir)
        .await
        .map_err(|e| AppError::internal(format!("Failed to create upload directory: {e}")))?;

    let name = format!("{}.{}", Uuid::new_v4(), file.extension);
    tokio::fs::write(upload_dir.join(&name), &file.bytes)
        .await
        .map_err(|e| AppError::internal(format!("Failed to store upload: {e}")))?;

    tracing::debug!(original = %file.file_name, stored = %name, "upload stored");
    Ok(name)
}

pub async fn store_all(upload_dir: &Path, files: &[UploadedFile]) -> AppResult<Vec<String>> {
    let mut names = Vec::with_capacity(files.len());
    for file in files {
        match store(upload_dir, file).await {
            Ok(name) => names.push(name),
            Err(err) => {
                remove(upload_dir, &names).await;
                return Err(err);
            }
        }
    }
    Ok(names)
}

/// Best-effort delete of stored files that are no longer referenced.
pub async fn remove(upload_dir: &Path, names: &[String]) {
    for name in names {
        if let Err(err) = tokio::fs::remove_file(upload_dir.join(name)).await {
            tracing::warn!(error = %err, file = %name, "failed to remove upload");
        }
    }
}

/// Prefix that turns a stored file name into an absolute asset URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetBase(pub String);

impl AssetBase {
    pub fn new(origin: &str) -> Self {
        Self(format!("{}{}/", origin.trim_end_matches('/'), ASSET_ROUTE))
    }

    pub fn url(&self, name: &str) -> String {
        if name.starts_with("http://") || name.starts_with("https://") {
            return name.to_string();
        }
        format!("{}{}", self.0, name)
    }

    pub fn url_opt(&self, name: Option<&str>) -> Option<String> {
        name.map(|n| self.url(n))
    }
}

impl FromRequestParts<AppState> for AssetBase {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(base) = &state.config.base_url {
            return Ok(AssetBase::new(base));
        }
        let host = parts
            .headers
            .get(header::HOST)
            .and_then(|h| h.to_str().ok())
            .or_else(|| parts.uri.authority().map(|a| a.as_str()))
            .unwrap_or("localhost");
        Ok(AssetBase::new(&format!("http://{host}")))
    }
}
