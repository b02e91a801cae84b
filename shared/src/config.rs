use std::env;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable not set.")]
    MissingVar(&'static str),
}

/// Environment-derived configuration, loaded once at startup.
///
/// `APP_ENV=local` selects the LocalStack profile: both services talk to
/// `http://{LOCALSTACK_HOSTNAME|localhost}:4566` with static test
/// credentials. Any other value means real AWS.
#[derive(Debug, Clone)]
pub struct Config {
    pub aws_region: String,
    pub table_name: String,
    pub bucket_name: String,
    pub endpoint_url: Option<String>,
    pub localstack_hostname: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let table_name = env::var("METADATA_TABLE_NAME")
            .map_err(|_| ConfigError::MissingVar("METADATA_TABLE_NAME"))?;
        let bucket_name = env::var("IMAGE_BUCKET_NAME")
            .map_err(|_| ConfigError::MissingVar("IMAGE_BUCKET_NAME"))?;
        let aws_region = env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string());

        let localstack_hostname = env::var("LOCALSTACK_HOSTNAME").ok();
        let app_env = env::var("APP_ENV")
            .unwrap_or_else(|_| "prod".to_string())
            .to_lowercase();
        let endpoint_url = (app_env == "local").then(|| {
            let host = localstack_hostname.as_deref().unwrap_or("localhost");
            let url = format!("http://{host}:4566");
            tracing::debug!("Using LocalStack endpoint: {url}");
            url
        });

        Ok(Config {
            aws_region,
            table_name,
            bucket_name,
            endpoint_url,
            localstack_hostname,
        })
    }
}
