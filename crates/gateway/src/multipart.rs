use axum::extract::Multipart;

use wordlens_core::{types::ImageUpload, Error, Result};

/// Name of the form field carrying the image.
pub const FILE_FIELD: &str = "file";

/// Fallback type when the part does not declare one.
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Extract the single `file` field from a multipart upload.
///
/// Other fields are skipped. A missing or empty `file` field is a malformed
/// request.
pub async fn extract_file_field(mut multipart: Multipart) -> Result<ImageUpload> {
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::malformed(format!("Invalid multipart body: {}", e)))?
    {
        if field.name().unwrap_or_default() != FILE_FIELD {
            continue;
        }

        let file_name = field.file_name().unwrap_or("image").to_string();
        let content_type = field
            .content_type()
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| Error::malformed(format!("Failed to read file field: {}", e)))?;

        upload = Some(ImageUpload::new(file_name, content_type, data));
    }

    match upload {
        Some(upload) if !upload.data.is_empty() => Ok(upload),
        Some(_) => Err(Error::malformed("Uploaded file is empty")),
        None => Err(Error::malformed("No file provided")),
    }
}
