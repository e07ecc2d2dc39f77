//! Input-schema normalization for capability registration and wire export.
//!
//! Strict mode guarantees that classifier output can be used without further
//! validation: the parameter object rejects unknown properties and every
//! property that has no `default` is listed in `required`.

use jsonschema::JSONSchema;
use serde_json::{json, Map, Value};

const LOCATION_PROPERTIES: [&str; 4] = ["lat", "lon", "latitude", "longitude"];

/// The schema substituted when a capability supplies an unusable one.
pub fn empty_object_schema() -> Value {
    json!({ "type": "object", "properties": {} })
}

/// Checks a capability's declared input schema, returning the schema to store.
///
/// Anything that is not a JSON object, or that does not compile as a JSON
/// schema, is replaced by [`empty_object_schema`]. A flat property map is
/// wrapped into an object schema. Registration never fails because of a bad
/// schema.
pub fn extract_input_schema(capability: &str, raw: Value) -> Value {
    if !raw.is_object() {
        tracing::warn!(
            capability = %capability,
            "input schema is not an object; using empty object schema"
        );
        return empty_object_schema();
    }
    if let Err(error) = JSONSchema::compile(&raw) {
        tracing::warn!(
            capability = %capability,
            error = %error,
            "input schema failed to compile; using empty object schema"
        );
        return empty_object_schema();
    }
    if is_flat_property_map(&raw) {
        return json!({ "type": "object", "properties": raw });
    }
    raw
}

fn is_flat_property_map(schema: &Value) -> bool {
    match schema {
        Value::Object(map) => {
            !map.contains_key("type")
                && !map.contains_key("properties")
                && !map.contains_key("$ref")
                && map.values().all(Value::is_object)
        }
        _ => false,
    }
}

/// Derives the strict-mode parameter schema.
///
/// - a flat property map is wrapped into `{"type":"object","properties":...}`
/// - `additionalProperties` is forced to `false`
/// - `required` holds every property lacking a `default`, plus any names
///   the schema already declared as required
pub fn to_strict_schema(schema: &Value) -> Value {
    let mut result: Map<String, Value> = match schema {
        Value::Object(map) if map.get("type").and_then(Value::as_str) == Some("object") => {
            map.clone()
        }
        Value::Object(map) => {
            let mut wrapped = Map::new();
            wrapped.insert("type".to_string(), Value::String("object".to_string()));
            wrapped.insert("properties".to_string(), Value::Object(map.clone()));
            wrapped
        }
        _ => {
            let mut wrapped = Map::new();
            wrapped.insert("type".to_string(), Value::String("object".to_string()));
            wrapped.insert("properties".to_string(), Value::Object(Map::new()));
            wrapped
        }
    };

    result.insert("additionalProperties".to_string(), Value::Bool(false));

    let declared: Vec<String> = result
        .get("required")
        .and_then(Value::as_array)
        .map(|names| {
            names
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let mut required: Vec<String> = Vec::new();
    if let Some(properties) = result.get("properties").and_then(Value::as_object) {
        for (name, property) in properties {
            let has_default = property.get("default").is_some();
            if !has_default || declared.contains(name) {
                required.push(name.clone());
            }
        }
    }
    for name in declared {
        if !required.contains(&name) {
            required.push(name);
        }
    }

    result.insert(
        "required".to_string(),
        Value::Array(required.into_iter().map(Value::String).collect()),
    );
    Value::Object(result)
}

/// Names of the top-level properties a schema declares.
pub fn property_names(schema: &Value) -> Vec<String> {
    schema
        .get("properties")
        .and_then(Value::as_object)
        .map(|properties| properties.keys().cloned().collect())
        .unwrap_or_default()
}

/// True when the schema asks for coordinates.
pub fn declares_location(schema: &Value) -> bool {
    schema
        .get("properties")
        .and_then(Value::as_object)
        .is_some_and(|properties| {
            LOCATION_PROPERTIES
                .iter()
                .any(|name| properties.contains_key(*name))
        })
}
