//! YAML input converted into the JSON value type used for all metadata.

use serde_json::{Number, Value};
use serde_yaml::Value as Yaml;

/// Parses a YAML document into a JSON value.
///
/// Mapping keys that are not strings are stringified, since notebook metadata
/// only allows string keys. Tags are dropped and their inner value kept.
pub fn parse_yaml(text: &str) -> Result<Value, serde_yaml::Error> {
    let yaml: Yaml = serde_yaml::from_str(text)?;
    Ok(to_json(yaml))
}

fn to_json(yaml: Yaml) -> Value {
    match yaml {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                n.as_f64()
                    .and_then(Number::from_f64)
                    .map_or(Value::Null, Value::Number)
            }
        }
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => Value::Array(items.into_iter().map(to_json).collect()),
        Yaml::Mapping(mapping) => Value::Object(
            mapping
                .into_iter()
                .map(|(key, value)| (key_string(key), to_json(value)))
                .collect(),
        ),
        Yaml::Tagged(tagged) => to_json(tagged.value),
    }
}

fn key_string(key: Yaml) -> String {
    match key {
        Yaml::String(s) => s,
        Yaml::Null => "null".to_string(),
        Yaml::Bool(b) => b.to_string(),
        Yaml::Number(n) => n.to_string(),
        other => to_json(other).to_string(),
    }
}

/// Python-style truthiness; empty option blocks (`null`, `false`, `[]`...)
/// count as "no options".
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn nested_mapping_becomes_object() {
        let value = parse_yaml("kernelspec:\n  name: python3\n  display_name: Python 3\n").unwrap();
        assert_eq!(
            value,
            json!({"kernelspec": {"name": "python3", "display_name": "Python 3"}})
        );
    }

    #[test]
    fn scalars_and_sequences() {
        let value = parse_yaml("tags: [hide-input, 3]\nratio: 0.5\nflag: true\nnothing: ~\n").unwrap();
        assert_eq!(
            value,
            json!({"tags": ["hide-input", 3], "ratio": 0.5, "flag": true, "nothing": null})
        );
    }

    #[test]
    fn non_string_keys_are_stringified() {
        let value = parse_yaml("1: one\ntrue: yes\n").unwrap();
        assert_eq!(value, json!({"1": "one", "true": "yes"}));
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        assert!(parse_yaml("a: [unclosed").is_err());
    }

    #[test]
    fn falsy_values() {
        assert!(is_falsy(&json!(null)));
        assert!(is_falsy(&json!(false)));
        assert!(is_falsy(&json!([])));
        assert!(is_falsy(&json!("")));
        assert!(!is_falsy(&json!({"a": 1})));
        assert!(!is_falsy(&json!("x")));
    }
}
