// src/api/upload.rs
//! Multipart file parts for photo and document uploads

use reqwest::multipart::Part;
use std::path::Path;
use tracing::debug;

use crate::common::{ClientError, ClientResult};

pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Photo,
    Document,
}

/// Validates the sniffed MIME type for the upload kind
pub fn validate_mime_type(kind: UploadKind, mime_type: &str) -> Result<(), String> {
    match kind {
        UploadKind::Photo if !mime_type.starts_with("image/") => {
            Err("Only image files are allowed".to_string())
        }
        UploadKind::Document
            if !mime_type.starts_with("image/") && mime_type != "application/pdf" =>
        {
            Err("Documents must be an image or a PDF".to_string())
        }
        _ => Ok(()),
    }
}

/// Reads a local file and turns it into a multipart part
///
/// The content type comes from the file's magic bytes, not its extension.
pub async fn file_part(path: &Path, kind: UploadKind) -> ClientResult<Part> {
    let bytes = tokio::fs::read(path).await?;

    if bytes.is_empty() {
        return Err(ClientError::Validation(format!(
            "{} is empty",
            display_name(path)
        )));
    }
    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(ClientError::Validation(format!(
            "{} exceeds the 10 MB upload limit",
            display_name(path)
        )));
    }

    let mime_type = infer::get(&bytes)
        .map(|t| t.mime_type())
        .unwrap_or("application/octet-stream");
    validate_mime_type(kind, mime_type).map_err(ClientError::Validation)?;

    debug!(file = %display_name(path), mime_type, size = bytes.len(), "Prepared upload part");

    Part::bytes(bytes)
        .file_name(display_name(path))
        .mime_str(mime_type)
        .map_err(|e| ClientError::Validation(e.to_string()))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string())
}
