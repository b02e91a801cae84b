//! multipart/form-data ingestion for the upload endpoint.
//!
//! API Gateway's base64 transport encoding is undone by `lambda_http` before
//! the body reaches this module. No part-count or size caps are enforced.

use std::collections::HashMap;
use std::convert::Infallible;

use futures::stream;
use lambda_http::http::header::CONTENT_TYPE;
use lambda_http::http::HeaderMap;

use crate::errors::ServiceError;

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Boundary-split request body: plain fields by name plus file parts by name.
/// Parsed once per request, immutable afterwards.
#[derive(Debug, Default)]
pub struct MultipartPayload {
    pub fields: HashMap<String, String>,
    pub files: HashMap<String, UploadedFile>,
}

pub async fn parse(headers: &HeaderMap, body: &[u8]) -> Result<MultipartPayload, ServiceError> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ServiceError::InvalidRequest("Missing 'content-type' header".to_string()))?;

    let boundary = multer::parse_boundary(content_type).map_err(|_| {
        ServiceError::InvalidRequest("Missing 'boundary' in 'content-type' header".to_string())
    })?;

    let body = body.to_vec();
    let stream = stream::once(async move { Ok::<_, Infallible>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut payload = MultipartPayload::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServiceError::InvalidRequest(format!("Malformed multipart body: {e}")))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        // Parts carrying a filename are file fields, the rest are plain text.
        if let Some(filename) = field.file_name().map(str::to_string) {
            let content_type = field
                .content_type()
                .map(|m| m.to_string())
                .unwrap_or_else(|| "application/octet-stream".to_string());
            let bytes = field.bytes().await.map_err(|e| {
                ServiceError::InvalidRequest(format!("Malformed multipart body: {e}"))
            })?;
            payload.files.insert(
                name,
                UploadedFile {
                    filename,
                    content_type,
                    bytes: bytes.to_vec(),
                },
            );
        } else {
            let value = field.text().await.map_err(|e| {
                ServiceError::InvalidRequest(format!("Malformed multipart body: {e}"))
            })?;
            payload.fields.insert(name, value);
        }
    }

    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDARY: &str = "xYzBoundary";

    fn form_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}")
                .parse()
                .unwrap(),
        );
        headers
    }

    fn form_body() -> Vec<u8> {
        format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"cat.png\"\r\n\
             Content-Type: image/png\r\n\r\n\
             fake-png-bytes\r\n\
             --{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"tags\"\r\n\r\n\
             pets, cats\r\n\
             --{BOUNDARY}--\r\n"
        )
        .into_bytes()
    }

    #[tokio::test]
    async fn splits_fields_and_files() {
        let payload = parse(&form_headers(), &form_body()).await.unwrap();

        assert_eq!(payload.fields["tags"], "pets, cats");
        let file = &payload.files["file"];
        assert_eq!(file.filename, "cat.png");
        assert_eq!(file.content_type, "image/png");
        assert_eq!(file.bytes, b"fake-png-bytes");
    }

    #[tokio::test]
    async fn missing_content_type_header_is_invalid() {
        let err = parse(&HeaderMap::new(), &form_body()).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidRequest(_)));
        assert!(err.to_string().contains("content-type"));
    }

    #[tokio::test]
    async fn missing_boundary_is_invalid() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, "multipart/form-data".parse().unwrap());
        let err = parse(&headers, &form_body()).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidRequest(_)));
        assert!(err.to_string().contains("boundary"));
    }
}
