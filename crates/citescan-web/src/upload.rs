use std::path::Path;

use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;

use citescan_ingest::SourceFile;

use crate::handlers::ApiError;

/// Parsed form fields from the multipart upload.
#[derive(Debug)]
pub struct ExtractForm {
    pub files: Vec<SourceFile>,
    pub keyword: String,
}

/// Parse a multipart form upload: any number of `files` (or `file`) parts
/// and one `keyword` field. Parts with neither a file name nor content are
/// dropped, which is what browsers send for an empty file input.
pub async fn parse_multipart(mut multipart: Multipart) -> Result<ExtractForm, ApiError> {
    let mut files = Vec::new();
    let mut keyword = String::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Failed to read form field", e))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "files" | "file" => {
                let filename = field.file_name().map(base_name).unwrap_or_default();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error("Failed to read file data", e))?;
                if filename.is_empty() && data.is_empty() {
                    continue;
                }
                let filename = if filename.is_empty() {
                    format!("upload-{}", files.len() + 1)
                } else {
                    filename
                };
                files.push(SourceFile::new(filename, data.to_vec()));
            }
            "keyword" => {
                keyword = field
                    .text()
                    .await
                    .map_err(|e| multipart_error("Failed to read keyword", e))?;
            }
            _ => {
                // Ignore unknown fields
                let _ = field.bytes().await;
            }
        }
    }

    Ok(ExtractForm { files, keyword })
}

/// Some clients send the full client-side path as the file name.
fn base_name(raw: &str) -> String {
    let raw = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    Path::new(raw)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn multipart_error(context: &str, e: MultipartError) -> ApiError {
    if e.status() == axum::http::StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(format!("{context}: {}", e.body_text()))
    } else {
        ApiError::BadRequest(format!("{context}: {}", e.body_text()))
    }
}
