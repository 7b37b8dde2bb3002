//! Builders for the JSON-schema contracts each tool advertises.
//!
//! Kept deliberately small: the registry needs to show the caller an object
//! schema with typed, bounded properties, not run a full validator. The
//! typed request structs are the validator.

use serde_json::{json, Map, Value};

/// An object schema from `(name, property)` pairs plus the required names.
pub fn object(properties: &[(&str, Value)], required: &[&str]) -> Value {
    let mut props = Map::new();
    for (name, prop) in properties {
        props.insert((*name).to_string(), prop.clone());
    }
    json!({
        "type": "object",
        "properties": Value::Object(props),
        "required": required,
    })
}

pub fn string(description: &str) -> Value {
    json!({"type": "string", "description": description})
}

pub fn string_enum(description: &str, values: &[&str]) -> Value {
    json!({"type": "string", "description": description, "enum": values})
}

pub fn integer(description: &str) -> Value {
    json!({"type": "integer", "description": description})
}

pub fn integer_bounded(description: &str, min: i64, max: i64) -> Value {
    json!({"type": "integer", "description": description, "minimum": min, "maximum": max})
}

pub fn number(description: &str) -> Value {
    json!({"type": "number", "description": description})
}

pub fn boolean(description: &str) -> Value {
    json!({"type": "boolean", "description": description})
}

pub fn array(description: &str, items: Value) -> Value {
    json!({"type": "array", "description": description, "items": items})
}

/// Free-form object passed through opaquely.
pub fn any_object(description: &str) -> Value {
    json!({"type": "object", "description": description})
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_shape() {
        let schema = object(
            &[
                ("name", string("Character name")),
                ("level", integer_bounded("Level", 1, 20)),
            ],
            &["name"],
        );
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["level"]["maximum"], 20);
        assert_eq!(schema["required"][0], "name");
    }
}
