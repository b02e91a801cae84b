use std::sync::Arc;

use imagevault_atoms::images::http::{
    delete_image, get_image, list_images, upload_image, ListParams,
};
use imagevault_shared::AppState;
use lambda_http::{
    http::{Method, StatusCode},
    Body, Error, Request, RequestExt, Response,
};

/// Main Lambda handler - routes requests to the image endpoints
pub(crate) async fn function_handler(
    event: Request,
    state: Arc<AppState>,
) -> Result<Response<Body>, Error> {
    let method = event.method();
    let path = event.uri().path().to_string();
    tracing::info!("API Lambda invoked - Method: {} Path: {}", method, path);

    // Handle CORS preflight
    if method == "OPTIONS" {
        return Ok(Response::builder()
            .status(StatusCode::OK)
            .header("Access-Control-Allow-Origin", "*")
            .header("Access-Control-Allow-Methods", "GET,POST,DELETE,OPTIONS")
            .header("Access-Control-Allow-Headers", "Content-Type")
            .body(Body::Empty)
            .map_err(Box::new)?);
    }

    let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    match (method, parts.as_slice()) {
        // POST /images - multipart upload
        (&Method::POST, ["images"]) => {
            upload_image(
                &state.blob_store,
                &state.metadata_store,
                event.headers(),
                event.body(),
            )
            .await
        }
        // GET /images - list with optional filters and cursor
        (&Method::GET, ["images"]) => {
            let params = event
                .query_string_parameters_ref()
                .map(|query| ListParams {
                    image_id: query.first("imageId").map(str::to_string),
                    content_type: query.first("contentType").map(str::to_string),
                    tags: query.first("tags").map(str::to_string),
                    next_token: query.first("nextToken").map(str::to_string),
                })
                .unwrap_or_default();
            list_images(&state.metadata_store, &params).await
        }
        // GET /images/{id} - redirect to a pre-signed retrieval URL
        (&Method::GET, ["images", image_id]) => {
            get_image(&state.blob_store, &state.metadata_store, image_id).await
        }
        // DELETE /images/{id} - delete blob then metadata
        (&Method::DELETE, ["images", image_id]) => {
            delete_image(&state.blob_store, &state.metadata_store, image_id).await
        }
        _ => {
            tracing::warn!("No route matched - Method: {} Path: {}", method, path);
            not_found()
        }
    }
}

fn not_found() -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(
            serde_json::json!({"message": "Not found"})
                .to_string()
                .into(),
        )
        .map_err(Box::new)?)
}

#[cfg(test)]
mod tests {
    use aws_sdk_s3::config::BehaviorVersion;
    use imagevault_atoms::storage::{DynamoMetadataStore, S3BlobStore};
    use lambda_http::http;

    use super::*;

    // Unconfigured clients: the preflight and fallback routes return before
    // any store is touched, so these never make a request.
    fn test_state() -> Arc<AppState> {
        let s3_client = aws_sdk_s3::Client::from_conf(
            aws_sdk_s3::Config::builder()
                .behavior_version(BehaviorVersion::latest())
                .build(),
        );
        let dynamo_client = aws_sdk_dynamodb::Client::from_conf(
            aws_sdk_dynamodb::Config::builder()
                .behavior_version(BehaviorVersion::latest())
                .build(),
        );
        Arc::new(AppState {
            blob_store: S3BlobStore::new(s3_client, "test-bucket", None),
            metadata_store: DynamoMetadataStore::new(dynamo_client, "test-table"),
        })
    }

    fn request(method: Method, path: &str) -> Request {
        http::Request::builder()
            .method(method)
            .uri(path)
            .body(Body::Empty)
            .unwrap()
    }

    #[tokio::test]
    async fn options_preflight_is_200_with_cors_headers() {
        let resp = function_handler(request(Method::OPTIONS, "/images"), test_state())
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["Access-Control-Allow-Origin"], "*");
        assert_eq!(
            resp.headers()["Access-Control-Allow-Methods"],
            "GET,POST,DELETE,OPTIONS"
        );
        assert!(matches!(resp.body(), Body::Empty));
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let resp = function_handler(request(Method::GET, "/videos"), test_state())
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = serde_json::from_slice(resp.body()).unwrap();
        assert_eq!(body["message"], "Not found");
    }

    #[tokio::test]
    async fn wrong_method_on_known_path_is_404() {
        let resp = function_handler(request(Method::PUT, "/images"), test_state())
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
