use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| {
        let path = err.path().to_string();
        anyhow!("at JSON path {path} → {}", err.into_inner())
    })
}

/// A checked-in expected document.
#[derive(Debug, Deserialize)]
pub struct Golden {
    #[serde(rename = "$schema")]
    pub schema: String,
    #[serde(flatten)]
    pub root: Map<String, Value>,
    #[serde(skip)]
    pub text: String,
}

impl Golden {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read golden file {}", path.display()))?;
        let mut golden: Golden = from_str_with_path(&text)
            .with_context(|| format!("malformed golden file {}", path.display()))?;
        if golden.schema != json_typeschema::SCHEMA_ID {
            bail!("{}: unexpected $schema {:?}", path.display(), golden.schema);
        }
        golden.text = text;
        Ok(golden)
    }

    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("$schema".to_owned(), Value::String(self.schema.clone()));
        map.extend(self.root.clone());
        Value::Object(map)
    }
}

/// JSON pointer of the first place where `expected` and `actual` differ.
pub fn first_difference(expected: &Value, actual: &Value) -> Option<String> {
    fn walk(expected: &Value, actual: &Value, at: &mut String) -> bool {
        match (expected, actual) {
            (Value::Object(e), Value::Object(a)) => {
                for (key, ev) in e {
                    let mark = at.len();
                    at.push('/');
                    at.push_str(&key.replace('~', "~0").replace('/', "~1"));
                    let Some(av) = a.get(key) else { return false };
                    if !walk(ev, av, at) {
                        return false;
                    }
                    at.truncate(mark);
                }
                if let Some(extra) = a.keys().find(|k| !e.contains_key(*k)) {
                    at.push('/');
                    at.push_str(&extra.replace('~', "~0").replace('/', "~1"));
                    return false;
                }
                true
            }
            (Value::Array(e), Value::Array(a)) => {
                for i in 0..e.len().max(a.len()) {
                    let mark = at.len();
                    at.push_str(&format!("/{i}"));
                    let (Some(ev), Some(av)) = (e.get(i), a.get(i)) else { return false };
                    if !walk(ev, av, at) {
                        return false;
                    }
                    at.truncate(mark);
                }
                true
            }
            (e, a) => e == a,
        }
    }

    let mut at = String::new();
    if walk(expected, actual, &mut at) { None } else { Some(at) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reports_the_first_differing_pointer() {
        let expected = json!({ "type": "object", "properties": { "a/b": { "type": "string" } } });
        let actual = json!({ "type": "object", "properties": { "a/b": { "type": "integer" } } });
        assert_eq!(first_difference(&expected, &actual).as_deref(), Some("/properties/a~1b/type"));
        assert_eq!(first_difference(&expected, &expected), None);

        let extra = json!({ "type": "object", "required": ["x"], "properties": { "a/b": { "type": "string" } } });
        assert_eq!(first_difference(&expected, &extra).as_deref(), Some("/required"));
    }

    #[test]
    fn golden_parse_errors_are_descriptive() {
        let err = from_str_with_path::<Golden>(r#"{ "$schema": 7 }"#).unwrap_err();
        assert!(err.to_string().contains("expected a string"), "{err}");
    }
}
