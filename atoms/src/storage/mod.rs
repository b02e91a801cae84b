// Capability interfaces over the two backends plus their AWS implementations.
pub mod blob;
pub mod metadata;
pub mod pagination;

pub use blob::S3BlobStore;
pub use metadata::DynamoMetadataStore;

use async_trait::async_trait;

use crate::errors::ServiceError;
use crate::images::model::ImageRecord;
use pagination::PageKey;

/// One backend page of records. `last_evaluated_key` is `None` once the
/// backend has no more results; the backend chooses the page size.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub records: Vec<ImageRecord>,
    pub last_evaluated_key: Option<PageKey>,
}

/// Object storage: store bytes under a key, hand out time-limited retrieval
/// URLs, delete keys.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Writes `bytes` under `key`, overwriting any existing object.
    async fn store(&self, bytes: Vec<u8>, key: &str, content_type: &str)
        -> Result<String, ServiceError>;

    /// Produces a pre-signed read URL valid for one hour. Does not verify
    /// that the object exists.
    async fn retrieval_url(&self, key: &str) -> Result<String, ServiceError>;

    /// Removes `key`. Absent keys are not an error.
    async fn delete(&self, key: &str) -> Result<(), ServiceError>;
}

/// Key-value metadata storage with a content-type secondary index, a tag
/// filter scan, and a full scan. All listing operations are paginated.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Upsert by primary key `imageId`.
    async fn put(&self, record: &ImageRecord) -> Result<(), ServiceError>;

    /// Fails with `ServiceError::NotFound` when no record exists - a
    /// caller-visible outcome distinct from a backend failure.
    async fn get(&self, image_id: &str) -> Result<ImageRecord, ServiceError>;

    /// Removes the record; no error when absent.
    async fn delete(&self, image_id: &str) -> Result<(), ServiceError>;

    /// Exact-match lookup through the content-type secondary index.
    async fn query_by_content_type(
        &self,
        content_type: &str,
        start_key: Option<PageKey>,
    ) -> Result<Page, ServiceError>;

    /// Records whose `tags` contain `tag`. This is a full-table filter scan,
    /// not an index lookup: cost scales with total record count, not match
    /// count.
    async fn query_by_tag(&self, tag: &str, start_key: Option<PageKey>)
        -> Result<Page, ServiceError>;

    /// Unfiltered enumeration in backend-native order.
    async fn scan(&self, start_key: Option<PageKey>) -> Result<Page, ServiceError>;
}
