use lambda_http::http::{HeaderMap, StatusCode};
use lambda_http::{Body, Error, Response};
use serde_json::json;

use super::model::{ImageRecord, RESERVED_ATTRIBUTES};
use crate::errors::ServiceError;
use crate::multipart;
use crate::storage::{pagination, BlobStore, MetadataStore, Page};

fn json_response(status: StatusCode, body: serde_json::Value) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(body.to_string().into())
        .map_err(Box::new)?)
}

fn error_response(context: &str, err: &ServiceError) -> Result<Response<Body>, Error> {
    match err {
        ServiceError::InvalidRequest(_) | ServiceError::NotFound(_) => {
            tracing::warn!("{context}: {err}");
        }
        _ => tracing::error!("{context}: {err}"),
    }
    json_response(err.status_code(), json!({ "message": err.public_message() }))
}

/// HTTP Handler: POST /images
///
/// Parses the multipart body, stores the blob, then persists the metadata
/// record. If the metadata write fails the blob is left behind on purpose:
/// failure handling is report-and-stop, not rollback.
pub async fn upload_image<B, M>(
    blob: &B,
    metadata: &M,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<Response<Body>, Error>
where
    B: BlobStore + ?Sized,
    M: MetadataStore + ?Sized,
{
    let payload = match multipart::parse(headers, body).await {
        Ok(payload) => payload,
        Err(e) => return error_response("Bad upload request", &e),
    };

    let Some(file) = payload.files.get("file") else {
        return error_response(
            "Bad upload request",
            &ServiceError::InvalidRequest("File part 'file' is required.".to_string()),
        );
    };

    let image_id = uuid::Uuid::new_v4().to_string();
    let s3_key = format!("{}-{}", image_id, file.filename);

    if let Err(e) = blob.store(file.bytes.clone(), &s3_key, &file.content_type).await {
        return error_response("Error uploading image", &e);
    }

    let mut record = ImageRecord {
        image_id: image_id.clone(),
        s3_key,
        filename: file.filename.clone(),
        content_type: file.content_type.clone(),
        upload_timestamp: chrono::Utc::now().timestamp(),
        tags: None,
        extra: serde_json::Map::new(),
    };
    for (name, value) in &payload.fields {
        if name == "tags" {
            record.tags = Some(value.split(',').map(|t| t.trim().to_string()).collect());
        } else if !RESERVED_ATTRIBUTES.contains(&name.as_str()) {
            record
                .extra
                .insert(name.clone(), serde_json::Value::String(value.clone()));
        }
    }

    if let Err(e) = metadata.put(&record).await {
        return error_response("Error uploading image", &e);
    }

    json_response(
        StatusCode::CREATED,
        json!({ "message": "Image uploaded successfully", "imageId": image_id }),
    )
}

/// HTTP Handler: GET /images/{imageId}
///
/// Redirects to a pre-signed retrieval URL for the record's blob.
pub async fn get_image<B, M>(
    blob: &B,
    metadata: &M,
    image_id: &str,
) -> Result<Response<Body>, Error>
where
    B: BlobStore + ?Sized,
    M: MetadataStore + ?Sized,
{
    let record = match metadata.get(image_id).await {
        Ok(record) => record,
        Err(e) => return error_response("Error getting image", &e),
    };

    let url = match blob.retrieval_url(&record.s3_key).await {
        Ok(url) => url,
        Err(e) => return error_response("Error getting image", &e),
    };

    Ok(Response::builder()
        .status(StatusCode::FOUND)
        .header("Location", url)
        .header("Access-Control-Allow-Origin", "*")
        .body(Body::Empty)
        .map_err(Box::new)?)
}

/// HTTP Handler: DELETE /images/{imageId}
///
/// Record lookup precedes both deletes; blob deletion precedes metadata
/// deletion. If the blob delete fails the metadata record is left intact and
/// the handler stops.
pub async fn delete_image<B, M>(
    blob: &B,
    metadata: &M,
    image_id: &str,
) -> Result<Response<Body>, Error>
where
    B: BlobStore + ?Sized,
    M: MetadataStore + ?Sized,
{
    let record = match metadata.get(image_id).await {
        Ok(record) => record,
        Err(e) => return error_response("Error deleting image", &e),
    };

    if let Err(e) = blob.delete(&record.s3_key).await {
        return error_response("Error deleting image", &e);
    }

    if let Err(e) = metadata.delete(image_id).await {
        return error_response("Error deleting image", &e);
    }

    json_response(
        StatusCode::OK,
        json!({ "message": "Image deleted successfully" }),
    )
}

/// Query parameters accepted by the list endpoint.
#[derive(Debug, Default)]
pub struct ListParams {
    pub image_id: Option<String>,
    pub content_type: Option<String>,
    pub tags: Option<String>,
    pub next_token: Option<String>,
}

/// HTTP Handler: GET /images
///
/// Exactly one filter path is selected by first-match priority: exact id
/// lookup, content-type index query, tag filter scan, unfiltered scan. The
/// cursor is decoded before any store call is made.
pub async fn list_images<M>(metadata: &M, params: &ListParams) -> Result<Response<Body>, Error>
where
    M: MetadataStore + ?Sized,
{
    let start_key = match params.next_token.as_deref().map(pagination::decode).transpose() {
        Ok(key) => key,
        Err(e) => return error_response("Bad list request", &e),
    };

    let page = if let Some(image_id) = &params.image_id {
        match metadata.get(image_id).await {
            Ok(record) => Page {
                records: vec![record],
                last_evaluated_key: None,
            },
            Err(e) => return error_response("Error listing images", &e),
        }
    } else if let Some(content_type) = &params.content_type {
        match metadata.query_by_content_type(content_type, start_key).await {
            Ok(page) => page,
            Err(e) => return error_response("Error listing images", &e),
        }
    } else if let Some(tag) = &params.tags {
        match metadata.query_by_tag(tag, start_key).await {
            Ok(page) => page,
            Err(e) => return error_response("Error listing images", &e),
        }
    } else {
        match metadata.scan(start_key).await {
            Ok(page) => page,
            Err(e) => return error_response("Error listing images", &e),
        }
    };

    let mut body = json!({ "items": page.records });
    if let Some(key) = &page.last_evaluated_key {
        match pagination::encode(key) {
            Ok(token) => body["nextToken"] = json!(token),
            Err(e) => return error_response("Error listing images", &e),
        }
    }

    json_response(StatusCode::OK, body)
}
