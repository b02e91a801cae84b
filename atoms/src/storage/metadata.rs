use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;

use super::pagination::PageKey;
use super::{MetadataStore, Page};
use crate::errors::ServiceError;
use crate::images::model::ImageRecord;

/// GSI keyed on `contentType`. The table schema also declares tag-index
/// attributes, but tag queries deliberately go through a filter scan and
/// leave that index unwired.
const CONTENT_TYPE_INDEX: &str = "ContentTypeIndex";

/// DynamoDB-backed metadata store.
#[derive(Clone)]
pub struct DynamoMetadataStore {
    client: DynamoClient,
    table_name: String,
}

impl DynamoMetadataStore {
    pub fn new(client: DynamoClient, table_name: impl Into<String>) -> Self {
        DynamoMetadataStore {
            client,
            table_name: table_name.into(),
        }
    }

    fn page_from(
        items: &[HashMap<String, AttributeValue>],
        last_evaluated_key: Option<&HashMap<String, AttributeValue>>,
    ) -> Page {
        Page {
            records: items
                .iter()
                .map(|item| ImageRecord::from_item(item.clone()))
                .collect(),
            last_evaluated_key: last_evaluated_key.cloned(),
        }
    }
}

#[async_trait]
impl MetadataStore for DynamoMetadataStore {
    async fn put(&self, record: &ImageRecord) -> Result<(), ServiceError> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(record.to_item()))
            .send()
            .await
            .map_err(|e| ServiceError::Storage(format!("failed to put item in DynamoDB: {e}")))?;
        Ok(())
    }

    async fn get(&self, image_id: &str) -> Result<ImageRecord, ServiceError> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("imageId", AttributeValue::S(image_id.to_string()))
            .send()
            .await
            .map_err(|e| {
                ServiceError::Storage(format!(
                    "failed to get item '{image_id}' from DynamoDB: {e}"
                ))
            })?;

        match result.item() {
            Some(item) => Ok(ImageRecord::from_item(item.clone())),
            None => Err(ServiceError::NotFound(format!(
                "Image with ID '{image_id}' not found."
            ))),
        }
    }

    async fn delete(&self, image_id: &str) -> Result<(), ServiceError> {
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .key("imageId", AttributeValue::S(image_id.to_string()))
            .send()
            .await
            .map_err(|e| {
                ServiceError::Storage(format!(
                    "failed to delete item '{image_id}' from DynamoDB: {e}"
                ))
            })?;
        Ok(())
    }

    async fn query_by_content_type(
        &self,
        content_type: &str,
        start_key: Option<PageKey>,
    ) -> Result<Page, ServiceError> {
        let mut request = self
            .client
            .query()
            .table_name(&self.table_name)
            .index_name(CONTENT_TYPE_INDEX)
            .key_condition_expression("contentType = :contentType")
            .expression_attribute_values(
                ":contentType",
                AttributeValue::S(content_type.to_string()),
            );
        if let Some(key) = start_key {
            request = request.set_exclusive_start_key(Some(key));
        }

        let result = request.send().await.map_err(|e| {
            ServiceError::Storage(format!(
                "failed to query by contentType '{content_type}': {e}"
            ))
        })?;

        Ok(Self::page_from(result.items(), result.last_evaluated_key()))
    }

    async fn query_by_tag(
        &self,
        tag: &str,
        start_key: Option<PageKey>,
    ) -> Result<Page, ServiceError> {
        let mut request = self
            .client
            .scan()
            .table_name(&self.table_name)
            .filter_expression("contains(tags, :tag)")
            .expression_attribute_values(":tag", AttributeValue::S(tag.to_string()));
        if let Some(key) = start_key {
            request = request.set_exclusive_start_key(Some(key));
        }

        let result = request
            .send()
            .await
            .map_err(|e| ServiceError::Storage(format!("failed to query by tag '{tag}': {e}")))?;

        Ok(Self::page_from(result.items(), result.last_evaluated_key()))
    }

    async fn scan(&self, start_key: Option<PageKey>) -> Result<Page, ServiceError> {
        let mut request = self.client.scan().table_name(&self.table_name);
        if let Some(key) = start_key {
            request = request.set_exclusive_start_key(Some(key));
        }

        let result = request
            .send()
            .await
            .map_err(|e| ServiceError::Storage(format!("failed to scan table: {e}")))?;

        Ok(Self::page_from(result.items(), result.last_evaluated_key()))
    }
}
