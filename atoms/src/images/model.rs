use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::errors::ServiceError;

/// Image domain model - one metadata record per uploaded blob.
///
/// `image_id` and `s3_key` are assigned once at upload and never change.
/// Uploader-submitted form fields that are not part of the fixed schema are
/// kept in `extra` and flattened back out at the serialization boundary.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ImageRecord {
    #[serde(rename = "imageId")]
    pub image_id: String,
    pub s3_key: String,
    pub filename: String,
    #[serde(rename = "contentType")]
    pub content_type: String,
    #[serde(rename = "uploadTimestamp")]
    pub upload_timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Attribute names owned by the fixed schema; uploader fields with these
/// names never land in `extra`.
pub const RESERVED_ATTRIBUTES: [&str; 6] = [
    "imageId",
    "s3_key",
    "filename",
    "contentType",
    "uploadTimestamp",
    "tags",
];

impl ImageRecord {
    /// Build a record from a DynamoDB item. Missing fixed attributes fall
    /// back to defaults; attribute types this service never writes are
    /// skipped rather than rejected.
    pub fn from_item(item: HashMap<String, AttributeValue>) -> Self {
        let mut record = ImageRecord {
            image_id: string_attr(&item, "imageId"),
            s3_key: string_attr(&item, "s3_key"),
            filename: string_attr(&item, "filename"),
            content_type: string_attr(&item, "contentType"),
            upload_timestamp: item
                .get("uploadTimestamp")
                .and_then(|v| v.as_n().ok())
                .and_then(|n| n.parse().ok())
                .unwrap_or(0),
            tags: item.get("tags").and_then(|v| v.as_l().ok()).map(|list| {
                list.iter()
                    .filter_map(|v| v.as_s().ok())
                    .map(|s| s.to_string())
                    .collect()
            }),
            extra: Map::new(),
        };

        for (name, value) in item {
            if RESERVED_ATTRIBUTES.contains(&name.as_str()) {
                continue;
            }
            if let Ok(json) = attribute_to_json(&value) {
                record.extra.insert(name, json);
            }
        }

        record
    }

    /// Convert to a DynamoDB item. Extension attributes are written first so
    /// the fixed schema always wins on a name clash.
    pub fn to_item(&self) -> HashMap<String, AttributeValue> {
        let mut item = HashMap::new();

        for (name, value) in &self.extra {
            item.insert(name.clone(), json_to_attribute(value));
        }

        item.insert("imageId".to_string(), AttributeValue::S(self.image_id.clone()));
        item.insert("s3_key".to_string(), AttributeValue::S(self.s3_key.clone()));
        item.insert("filename".to_string(), AttributeValue::S(self.filename.clone()));
        item.insert(
            "contentType".to_string(),
            AttributeValue::S(self.content_type.clone()),
        );
        item.insert(
            "uploadTimestamp".to_string(),
            AttributeValue::N(self.upload_timestamp.to_string()),
        );
        if let Some(tags) = &self.tags {
            item.insert(
                "tags".to_string(),
                AttributeValue::L(tags.iter().map(|t| AttributeValue::S(t.clone())).collect()),
            );
        }

        item
    }
}

fn string_attr(item: &HashMap<String, AttributeValue>, name: &str) -> String {
    item.get(name)
        .and_then(|v| v.as_s().ok())
        .map(|s| s.to_string())
        .unwrap_or_default()
}

/// DynamoDB numbers are arbitrary precision; render them as integers when
/// they have no fractional part, otherwise as floats.
pub(crate) fn attribute_to_json(value: &AttributeValue) -> Result<Value, ServiceError> {
    match value {
        AttributeValue::S(s) => Ok(Value::String(s.clone())),
        AttributeValue::N(n) => number_to_json(n),
        AttributeValue::Bool(b) => Ok(Value::Bool(*b)),
        AttributeValue::Null(_) => Ok(Value::Null),
        AttributeValue::L(list) => Ok(Value::Array(
            list.iter()
                .map(attribute_to_json)
                .collect::<Result<Vec<_>, _>>()?,
        )),
        AttributeValue::M(map) => {
            let mut out = Map::new();
            for (k, v) in map {
                out.insert(k.clone(), attribute_to_json(v)?);
            }
            Ok(Value::Object(out))
        }
        AttributeValue::Ss(set) => Ok(Value::Array(
            set.iter().map(|s| Value::String(s.clone())).collect(),
        )),
        other => Err(ServiceError::Internal(format!(
            "unsupported attribute type: {other:?}"
        ))),
    }
}

fn number_to_json(n: &str) -> Result<Value, ServiceError> {
    if let Ok(i) = n.parse::<i64>() {
        return Ok(Value::Number(Number::from(i)));
    }
    let f: f64 = n
        .parse()
        .map_err(|_| ServiceError::Internal(format!("unparseable numeric attribute: {n}")))?;
    if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        return Ok(Value::Number(Number::from(f as i64)));
    }
    Number::from_f64(f)
        .map(Value::Number)
        .ok_or_else(|| ServiceError::Internal(format!("unparseable numeric attribute: {n}")))
}

pub(crate) fn json_to_attribute(value: &Value) -> AttributeValue {
    match value {
        Value::String(s) => AttributeValue::S(s.clone()),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Null => AttributeValue::Null(true),
        Value::Array(list) => AttributeValue::L(list.iter().map(json_to_attribute).collect()),
        Value::Object(map) => AttributeValue::M(
            map.iter()
                .map(|(k, v)| (k.clone(), json_to_attribute(v)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_record() -> ImageRecord {
        let mut extra = Map::new();
        extra.insert("author".to_string(), Value::String("ana".to_string()));
        ImageRecord {
            image_id: "id-1".to_string(),
            s3_key: "id-1-cat.png".to_string(),
            filename: "cat.png".to_string(),
            content_type: "image/png".to_string(),
            upload_timestamp: 1700000000,
            tags: Some(vec!["pets".to_string(), "cats".to_string()]),
            extra,
        }
    }

    #[test]
    fn item_round_trip() {
        let record = sample_record();
        assert_eq!(ImageRecord::from_item(record.to_item()), record);
    }

    #[test]
    fn serializes_with_wire_names() {
        let value = serde_json::to_value(sample_record()).unwrap();
        assert_eq!(value["imageId"], "id-1");
        assert_eq!(value["s3_key"], "id-1-cat.png");
        assert_eq!(value["contentType"], "image/png");
        assert_eq!(value["uploadTimestamp"], 1700000000);
        assert_eq!(value["tags"], json!(["pets", "cats"]));
        assert_eq!(value["author"], "ana");
    }

    #[test]
    fn tags_absent_when_none() {
        let mut record = sample_record();
        record.tags = None;
        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("tags").is_none());
        assert!(record.to_item().get("tags").is_none());
    }

    #[test]
    fn fractionless_numbers_render_as_integers() {
        assert_eq!(
            attribute_to_json(&AttributeValue::N("5".to_string())).unwrap(),
            json!(5)
        );
        assert_eq!(
            attribute_to_json(&AttributeValue::N("5.0".to_string())).unwrap(),
            json!(5)
        );
        assert_eq!(
            attribute_to_json(&AttributeValue::N("5.5".to_string())).unwrap(),
            json!(5.5)
        );
    }

    #[test]
    fn fixed_schema_wins_over_extension_fields() {
        let mut record = sample_record();
        record
            .extra
            .insert("imageId".to_string(), Value::String("spoofed".to_string()));
        let item = record.to_item();
        assert_eq!(item["imageId"], AttributeValue::S("id-1".to_string()));
    }
}
