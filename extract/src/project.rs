//! Projection of parsed model output into display-ready items.

use serde_json::{Map, Value};

use crate::error::GenerateError;
use crate::types::{GeneratedField, GeneratedItem};

/// Converts a parsed JSON value into one item per extracted record.
///
/// Batch mode accepts an array (one item per element) but also tolerates a
/// bare object when the model ignored the array instruction; returning one
/// usable record beats strict format enforcement. Single mode requires an
/// object; handing an array to a caller that expects one record would be
/// silently lossy, so that fails instead.
///
/// # Errors
///
/// Returns [`GenerateError::MalformedShape`] for an array in single mode,
/// a non-object array element, or a value that is neither object nor array.
pub fn project(value: Value, batch_mode: bool) -> Result<Vec<GeneratedItem>, GenerateError> {
    match value {
        Value::Object(record) => Ok(vec![item_from_record(record)]),
        Value::Array(records) if batch_mode => records
            .into_iter()
            .enumerate()
            .map(|(index, element)| match element {
                Value::Object(record) => Ok(item_from_record(record)),
                other => Err(GenerateError::MalformedShape {
                    reason: format!(
                        "batch element {index} is {} rather than an object",
                        kind_of(&other)
                    ),
                }),
            })
            .collect(),
        Value::Array(_) => Err(GenerateError::MalformedShape {
            reason: "expected a single object but the model returned an array".to_string(),
        }),
        other => Err(GenerateError::MalformedShape {
            reason: format!("expected a JSON object, got {}", kind_of(&other)),
        }),
    }
}

/// Builds the field projection for one record: own keys in insertion order,
/// scalars only. Nested objects and arrays stay in `json` but are not
/// independently displayable.
fn item_from_record(record: Map<String, Value>) -> GeneratedItem {
    let fields = record
        .iter()
        .filter(|(_, value)| !matches!(value, Value::Object(_) | Value::Array(_)))
        .map(|(key, value)| GeneratedField {
            key: key.clone(),
            label: label_for_key(key),
            value: value.clone(),
        })
        .collect();
    GeneratedItem {
        fields,
        json: record,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Known schema keys and their display labels. Unknown keys fall back to a
/// split-before-capitals transform.
const LABELS: &[(&str, &str)] = &[
    ("name", "Name"),
    ("issuer", "Issuer"),
    ("network", "Network"),
    ("annualFee", "Annual Fee"),
    ("primaryColor", "Primary Color"),
    ("secondaryColor", "Secondary Color"),
    ("title", "Title"),
    ("value", "Value"),
    ("cadence", "Cadence"),
    ("category", "Category"),
    ("rate", "Rate"),
    ("currency", "Currency"),
    ("description", "Description"),
];

fn label_for_key(key: &str) -> String {
    if let Some((_, label)) = LABELS.iter().find(|(known, _)| *known == key) {
        return (*label).to_string();
    }
    split_before_capitals(key)
}

/// "imageUrl" -> "Image Url", "expiresAt" -> "Expires At".
fn split_before_capitals(key: &str) -> String {
    let mut label = String::with_capacity(key.len() + 4);
    for (i, c) in key.chars().enumerate() {
        if i == 0 {
            label.extend(c.to_uppercase());
        } else {
            if c.is_uppercase() {
                label.push(' ');
            }
            label.push(c);
        }
    }
    label
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn single_object_becomes_one_item() {
        let items = project(json!({"name": "Gold Card", "annualFee": 325}), false).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].json["name"], json!("Gold Card"));
    }

    #[test]
    fn batch_array_becomes_item_per_element() {
        let items = project(
            json!([{"title": "Uber credit"}, {"title": "Lounge access"}]),
            true,
        )
        .unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].json["title"], json!("Lounge access"));
    }

    #[test]
    fn bare_object_in_batch_mode_is_tolerated() {
        let items = project(json!({"title": "Uber credit"}), true).unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn array_in_single_mode_is_rejected() {
        let err = project(json!([{"title": "Uber credit"}]), false).unwrap_err();
        assert!(matches!(err, GenerateError::MalformedShape { .. }));
    }

    #[test]
    fn non_object_values_are_rejected() {
        for value in [json!("text"), json!(42), json!(null), json!(true)] {
            let err = project(value, false).unwrap_err();
            assert!(matches!(err, GenerateError::MalformedShape { .. }));
        }
    }

    #[test]
    fn non_object_batch_element_is_rejected() {
        let err = project(json!([{"title": "ok"}, "stray"]), true).unwrap_err();
        assert!(err.to_string().contains("batch element 1"));
    }

    #[test]
    fn fields_keep_insertion_order_and_skip_composites() {
        let items = project(
            json!({
                "name": "Platinum Card",
                "benefits": ["lounge", "hotel"],
                "annualFee": 695,
                "branding": {"primaryColor": "#E5E4E2"},
                "active": true,
                "notes": null
            }),
            false,
        )
        .unwrap();

        let keys: Vec<&str> = items[0].fields.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, vec!["name", "annualFee", "active", "notes"]);
        // The composite values stay authoritative in `json`.
        assert!(items[0].json.contains_key("benefits"));
        assert!(items[0].json.contains_key("branding"));
    }

    #[test]
    fn known_keys_use_the_label_table() {
        let items = project(json!({"annualFee": 550, "primaryColor": "#00264e"}), false).unwrap();
        assert_eq!(items[0].fields[0].label, "Annual Fee");
        assert_eq!(items[0].fields[1].label, "Primary Color");
    }

    #[test]
    fn unknown_keys_split_before_capitals() {
        assert_eq!(label_for_key("imageUrl"), "Image Url");
        assert_eq!(label_for_key("expiresAt"), "Expires At");
        assert_eq!(label_for_key("plain"), "Plain");
    }
}
