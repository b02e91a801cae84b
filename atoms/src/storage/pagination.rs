//! Opaque continuation cursor over the store's last evaluated key.
//!
//! The key map is rendered as JSON with sorted keys and base64-encoded for
//! transport in a query parameter. A cursor is only meaningful when replayed
//! against the same query type and filter value that produced it; no context
//! validation is performed here.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::{Map, Value};

use crate::errors::ServiceError;
use crate::images::model::{attribute_to_json, json_to_attribute};

pub type PageKey = HashMap<String, AttributeValue>;

pub fn encode(key: &PageKey) -> Result<String, ServiceError> {
    let mut map = Map::new();
    for (name, value) in key {
        map.insert(name.clone(), attribute_to_json(value)?);
    }
    let json = serde_json::to_vec(&Value::Object(map))
        .map_err(|e| ServiceError::Internal(format!("failed to encode nextToken: {e}")))?;
    Ok(STANDARD.encode(json))
}

pub fn decode(token: &str) -> Result<PageKey, ServiceError> {
    let invalid = || ServiceError::InvalidRequest("Invalid nextToken format.".to_string());

    let bytes = STANDARD.decode(token).map_err(|_| invalid())?;
    let value: Value = serde_json::from_slice(&bytes).map_err(|_| invalid())?;
    let Value::Object(map) = value else {
        return Err(invalid());
    };

    Ok(map
        .into_iter()
        .map(|(name, value)| (name, json_to_attribute(&value)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_key() -> PageKey {
        PageKey::from([
            (
                "imageId".to_string(),
                AttributeValue::S("b7f2".to_string()),
            ),
            (
                "uploadTimestamp".to_string(),
                AttributeValue::N("1700000000".to_string()),
            ),
        ])
    }

    #[test]
    fn round_trip() {
        let key = sample_key();
        assert_eq!(decode(&encode(&key).unwrap()).unwrap(), key);
    }

    #[test]
    fn round_trip_single_string_key() {
        let key = PageKey::from([("imageId".to_string(), AttributeValue::S("x".to_string()))]);
        assert_eq!(decode(&encode(&key).unwrap()).unwrap(), key);
    }

    #[test]
    fn encoding_is_deterministic() {
        assert_eq!(encode(&sample_key()).unwrap(), encode(&sample_key()).unwrap());
    }

    #[test]
    fn rejects_garbage_base64() {
        assert!(matches!(
            decode("not base64!!"),
            Err(ServiceError::InvalidRequest(_))
        ));
    }

    #[test]
    fn rejects_non_json_payload() {
        let token = STANDARD.encode(b"not json");
        assert!(matches!(
            decode(&token),
            Err(ServiceError::InvalidRequest(_))
        ));
    }

    #[test]
    fn rejects_non_object_payload() {
        let token = STANDARD.encode(b"[1, 2]");
        assert!(matches!(
            decode(&token),
            Err(ServiceError::InvalidRequest(_))
        ));
    }
}
