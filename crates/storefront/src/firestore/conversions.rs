//! Decoding of order documents into domain types.
//!
//! Order documents are written by the payment webhook with this shape:
//!
//! ```text
//! users/{email}/orders/{checkout_session_id}
//!   amount:          number     (rupees, shipping included)
//!   amount_shipping: number     (rupees)
//!   images:          string[]   (one product image per line item)
//!   timestamp:       timestamp  (server time of the webhook)
//! ```

use chrono::DateTime;
use rust_decimal::Decimal;

use voyager_core::{Order, OrderId};

use super::FirestoreError;
use super::types::{Document, Value};

/// Decode an order document.
///
/// # Errors
///
/// Returns `FirestoreError::Decode` if a required field is missing or has an
/// unexpected type.
pub fn convert_order(document: &Document) -> Result<Order, FirestoreError> {
    Ok(Order {
        id: OrderId::new(document.id()),
        amount: decimal_field(document, "amount")?,
        amount_shipping: optional(document, "amount_shipping")
            .map(|value| to_decimal(document, "amount_shipping", value))
            .transpose()?
            .unwrap_or(Decimal::ZERO),
        images: string_array_field(document, "images")?,
        timestamp: unix_seconds_field(document, "timestamp")?,
    })
}

/// A field that may be absent or explicitly null.
fn optional<'a>(document: &'a Document, field: &str) -> Option<&'a Value> {
    document
        .field(field)
        .filter(|value| !matches!(value, Value::NullValue(())))
}

fn required<'a>(document: &'a Document, field: &str) -> Result<&'a Value, FirestoreError> {
    optional(document, field).ok_or_else(|| decode_error(document, field, "missing"))
}

fn decimal_field(document: &Document, field: &str) -> Result<Decimal, FirestoreError> {
    to_decimal(document, field, required(document, field)?)
}

fn to_decimal(document: &Document, field: &str, value: &Value) -> Result<Decimal, FirestoreError> {
    match value {
        Value::IntegerValue(raw) => raw
            .parse::<Decimal>()
            .map_err(|e| decode_error(document, field, &e.to_string())),
        Value::DoubleValue(raw) => Decimal::try_from(*raw)
            .map(|d| d.round_dp(2))
            .map_err(|e| decode_error(document, field, &e.to_string())),
        other => Err(unexpected_type(document, field, other)),
    }
}

fn string_array_field(document: &Document, field: &str) -> Result<Vec<String>, FirestoreError> {
    let Some(value) = optional(document, field) else {
        return Ok(Vec::new());
    };

    let Value::ArrayValue(array) = value else {
        return Err(unexpected_type(document, field, value));
    };

    array
        .values
        .iter()
        .map(|element| match element {
            Value::StringValue(s) => Ok(s.clone()),
            other => Err(unexpected_type(document, field, other)),
        })
        .collect()
}

/// Timestamps are stored as native Firestore timestamps; integer seconds are
/// accepted for documents imported from elsewhere.
fn unix_seconds_field(document: &Document, field: &str) -> Result<i64, FirestoreError> {
    match required(document, field)? {
        Value::TimestampValue(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.timestamp())
            .map_err(|e| decode_error(document, field, &e.to_string())),
        Value::IntegerValue(raw) => raw
            .parse::<i64>()
            .map_err(|e| decode_error(document, field, &e.to_string())),
        other => Err(unexpected_type(document, field, other)),
    }
}

fn unexpected_type(document: &Document, field: &str, value: &Value) -> FirestoreError {
    decode_error(
        document,
        field,
        &format!("unexpected type {}", value.type_name()),
    )
}

fn decode_error(document: &Document, field: &str, reason: &str) -> FirestoreError {
    FirestoreError::Decode {
        document: document.name.clone(),
        field: field.to_owned(),
        reason: reason.to_owned(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;
    use serde_json::json;

    use super::*;

    fn document(fields: serde_json::Value) -> Document {
        serde_json::from_value(json!({
            "name": "projects/voyager/databases/(default)/documents/users/u@example.com/orders/cs_test_1",
            "fields": fields,
        }))
        .unwrap()
    }

    #[test]
    fn test_convert_full_order() {
        let doc = document(json!({
            "amount": {"integerValue": "598"},
            "amount_shipping": {"doubleValue": 49.99},
            "images": {"arrayValue": {"values": [
                {"stringValue": "https://img.example.com/pizza.png"},
                {"stringValue": "https://img.example.com/salad.png"}
            ]}},
            "timestamp": {"timestampValue": "2023-11-14T22:13:20.123456Z"}
        }));

        let order = convert_order(&doc).unwrap();

        assert_eq!(order.id.as_str(), "cs_test_1");
        assert_eq!(order.amount, dec!(598));
        assert_eq!(order.amount_shipping, dec!(49.99));
        assert_eq!(order.images.len(), 2);
        assert_eq!(order.timestamp, 1_700_000_000);
    }

    #[test]
    fn test_optional_fields_default() {
        let doc = document(json!({
            "amount": {"doubleValue": 120.5},
            "timestamp": {"integerValue": "1700000000"}
        }));

        let order = convert_order(&doc).unwrap();

        assert_eq!(order.amount, dec!(120.5));
        assert_eq!(order.amount_shipping, Decimal::ZERO);
        assert!(order.images.is_empty());
    }

    #[test]
    fn test_missing_amount_is_decode_error() {
        let doc = document(json!({
            "timestamp": {"timestampValue": "2023-11-14T22:13:20Z"}
        }));

        let err = convert_order(&doc).unwrap_err();
        assert!(matches!(
            err,
            FirestoreError::Decode { ref field, ref reason, .. } if field == "amount" && reason == "missing"
        ));
    }

    #[test]
    fn test_wrong_timestamp_type_is_decode_error() {
        let doc = document(json!({
            "amount": {"integerValue": "10"},
            "timestamp": {"stringValue": "yesterday"}
        }));

        let err = convert_order(&doc).unwrap_err();
        assert!(err.to_string().contains("unexpected type stringValue"));
    }

    #[test]
    fn test_non_string_image_is_decode_error() {
        let doc = document(json!({
            "amount": {"integerValue": "10"},
            "images": {"arrayValue": {"values": [{"integerValue": "3"}]}},
            "timestamp": {"timestampValue": "2023-11-14T22:13:20Z"}
        }));

        assert!(convert_order(&doc).is_err());
    }
}
