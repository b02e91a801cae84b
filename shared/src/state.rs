use aws_config::{BehaviorVersion, Region};
use aws_sdk_dynamodb::Client as DynamoClient;
use aws_sdk_s3::Client as S3Client;
use imagevault_atoms::storage::{DynamoMetadataStore, S3BlobStore};

use crate::config::Config;

/// Process-lifetime application state: the AWS clients and the store
/// implementations built from them. Constructed once in `main` and passed by
/// reference into handlers; there is no other cross-request state.
pub struct AppState {
    pub blob_store: S3BlobStore,
    pub metadata_store: DynamoMetadataStore,
}

impl AppState {
    pub async fn from_config(config: &Config) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.aws_region.clone()));
        if let Some(endpoint) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint).credentials_provider(
                aws_sdk_dynamodb::config::Credentials::new("test", "test", None, None, "local"),
            );
        }
        let sdk_config = loader.load().await;

        let dynamo_client = DynamoClient::new(&sdk_config);
        let s3_client = if config.endpoint_url.is_some() {
            // LocalStack needs path-style bucket addressing.
            S3Client::from_conf(
                aws_sdk_s3::config::Builder::from(&sdk_config)
                    .force_path_style(true)
                    .build(),
            )
        } else {
            S3Client::new(&sdk_config)
        };

        AppState {
            blob_store: S3BlobStore::new(
                s3_client,
                config.bucket_name.clone(),
                config.localstack_hostname.clone(),
            ),
            metadata_store: DynamoMetadataStore::new(dynamo_client, config.table_name.clone()),
        }
    }
}
