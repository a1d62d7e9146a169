//! Firestore REST wire types.
//!
//! Only the subset needed to run structured queries and decode the returned
//! documents. See <https://firebase.google.com/docs/firestore/reference/rest>.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Documents and values
// ─────────────────────────────────────────────────────────────────────────────

/// A Firestore document.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Full resource name:
    /// `projects/{p}/databases/{d}/documents/{collection}/{id}/...`
    pub name: String,
    #[serde(default)]
    pub fields: HashMap<String, Value>,
    #[serde(default)]
    pub create_time: Option<String>,
    #[serde(default)]
    pub update_time: Option<String>,
}

impl Document {
    /// The document ID: the last segment of the resource name.
    #[must_use]
    pub fn id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }

    /// Look up a top-level field.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// A typed Firestore value. Exactly one variant is present on the wire,
/// keyed by its type name (e.g. `{"integerValue": "42"}`).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Value {
    NullValue(()),
    BooleanValue(bool),
    /// 64-bit integers are transported as decimal strings.
    IntegerValue(String),
    DoubleValue(f64),
    /// RFC 3339 timestamp with nanosecond precision.
    TimestampValue(String),
    StringValue(String),
    /// Base64-encoded bytes.
    BytesValue(String),
    ReferenceValue(String),
    GeoPointValue(LatLng),
    ArrayValue(ArrayValue),
    MapValue(MapValue),
}

impl Value {
    /// Wire name of the variant, used in decode errors.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::NullValue(()) => "nullValue",
            Self::BooleanValue(_) => "booleanValue",
            Self::IntegerValue(_) => "integerValue",
            Self::DoubleValue(_) => "doubleValue",
            Self::TimestampValue(_) => "timestampValue",
            Self::StringValue(_) => "stringValue",
            Self::BytesValue(_) => "bytesValue",
            Self::ReferenceValue(_) => "referenceValue",
            Self::GeoPointValue(_) => "geoPointValue",
            Self::ArrayValue(_) => "arrayValue",
            Self::MapValue(_) => "mapValue",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LatLng {
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
}

/// An array value. Empty arrays are sent as `{}`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ArrayValue {
    #[serde(default)]
    pub values: Vec<Value>,
}

/// A nested map value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct MapValue {
    #[serde(default)]
    pub fields: HashMap<String, Value>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Structured queries
// ─────────────────────────────────────────────────────────────────────────────

/// Body of a `documents:runQuery` call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunQueryRequest {
    pub structured_query: StructuredQuery,
}

/// One element of the streamed `runQuery` response array.
///
/// An empty result set still yields one element carrying only `readTime`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunQueryResponse {
    #[serde(default)]
    pub document: Option<Document>,
}

/// A query over a single collection.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredQuery {
    pub from: Vec<CollectionSelector>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub order_by: Vec<QueryOrder>,
}

impl StructuredQuery {
    /// Select every document of the direct child collection `collection_id`.
    #[must_use]
    pub fn collection(collection_id: &str) -> Self {
        Self {
            from: vec![CollectionSelector {
                collection_id: collection_id.to_owned(),
            }],
            order_by: Vec::new(),
        }
    }

    /// Append an ordering on `field_path`.
    #[must_use]
    pub fn order_by(mut self, field_path: &str, direction: Direction) -> Self {
        self.order_by.push(QueryOrder {
            field: FieldReference {
                field_path: field_path.to_owned(),
            },
            direction,
        });
        self
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSelector {
    pub collection_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryOrder {
    pub field: FieldReference,
    pub direction: Direction,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldReference {
    pub field_path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Ascending,
    Descending,
}

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Error envelope returned by Google APIs.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_value_decodes_tagged_variants() {
        let value: Value = serde_json::from_value(json!({"integerValue": "549"})).unwrap();
        assert_eq!(value, Value::IntegerValue("549".to_string()));

        let value: Value = serde_json::from_value(json!({"nullValue": null})).unwrap();
        assert_eq!(value, Value::NullValue(()));

        let value: Value = serde_json::from_value(json!({"arrayValue": {}})).unwrap();
        assert_eq!(value, Value::ArrayValue(ArrayValue::default()));
    }

    #[test]
    fn test_document_id_is_last_segment() {
        let doc: Document = serde_json::from_value(json!({
            "name": "projects/p/databases/(default)/documents/users/u@example.com/orders/cs_123",
            "fields": {}
        }))
        .unwrap();

        assert_eq!(doc.id(), "cs_123");
    }

    #[test]
    fn test_structured_query_serialization() {
        let query = StructuredQuery::collection("orders").order_by("timestamp", Direction::Descending);
        let body = serde_json::to_value(RunQueryRequest {
            structured_query: query,
        })
        .unwrap();

        assert_eq!(
            body,
            json!({
                "structuredQuery": {
                    "from": [{"collectionId": "orders"}],
                    "orderBy": [{
                        "field": {"fieldPath": "timestamp"},
                        "direction": "DESCENDING"
                    }]
                }
            })
        );
    }

    #[test]
    fn test_empty_result_has_no_document() {
        let responses: Vec<RunQueryResponse> =
            serde_json::from_value(json!([{"readTime": "2024-01-01T00:00:00Z"}])).unwrap();

        assert_eq!(responses.len(), 1);
        assert!(responses.iter().all(|r| r.document.is_none()));
    }
}
