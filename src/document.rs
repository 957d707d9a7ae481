//! Root schema document: the fixed `$schema` identifier plus one root node.
use std::fmt;

use serde::ser::{Error as _, Serialize, SerializeMap, Serializer};
use serde_json::ser::PrettyFormatter;

use crate::annotation::Annotations;
use crate::error::Result;
use crate::node::SchemaNode;
use crate::reflect::Reflect;
use crate::settings::Settings;
use crate::walker::Walker;

pub const SCHEMA_ID: &str = "http://json-schema.org/schema#";

const INDENT: &[u8] = b"    ";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    settings: Settings,
    root: SchemaNode,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self {
            settings,
            root: SchemaNode::default(),
        }
    }

    /// Derives the root from the type of `value`. The value itself is never
    /// inspected. On error the previous root is kept.
    pub fn read<T: Reflect + ?Sized>(&mut self, _value: &T) -> Result<()> {
        self.read_type::<T>()
    }

    pub fn read_type<T: Reflect + ?Sized>(&mut self) -> Result<()> {
        let derived = Walker::new(&self.settings).derive(T::type_info, &Annotations::default());
        match derived {
            Ok(root) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(type_name = std::any::type_name::<T>(), kind = root.type_name().unwrap_or("any"), "read schema document");
                self.root = root;
                Ok(())
            }
            Err(error) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(type_name = std::any::type_name::<T>(), %error, "schema derivation failed");
                Err(error)
            }
        }
    }

    pub fn schema_id(&self) -> &'static str {
        SCHEMA_ID
    }

    pub fn root(&self) -> &SchemaNode {
        &self.root
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn into_root(self) -> SchemaNode {
        self.root
    }

    /// Structured form, keys in rendering order.
    pub fn to_value(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }

    /// Canonical text: 4-space indented JSON.
    pub fn render(&self) -> serde_json::Result<String> {
        let mut buf = Vec::new();
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
        self.serialize(&mut ser)?;
        String::from_utf8(buf).map_err(serde_json::Error::custom)
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("$schema", SCHEMA_ID)?;
        self.root.serialize_entries(&mut map)?;
        map.end()
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.render().map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

/// Derives a fresh document for `T` with default settings.
pub fn schema_for<T: Reflect + ?Sized>() -> Result<Document> {
    let mut doc = Document::new();
    doc.read_type::<T>()?;
    Ok(doc)
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde_json::json;

    use super::*;
    use crate::annotation::TagKey;
    use crate::error::SchemaError;
    use crate::reflect::{StructInfo, TypeInfo};

    fn tags(pairs: &[(TagKey, &str)]) -> Annotations {
        pairs.iter().map(|(k, v)| (*k, *v)).collect()
    }

    struct Basic;

    impl Reflect for Basic {
        fn type_info() -> TypeInfo {
            StructInfo::of::<Self>()
                .field::<String>("Omitted", tags(&[(TagKey::Name, "-,omitempty")]))
                .field::<bool>("Bool", tags(&[(TagKey::Name, ",omitempty")]))
                .field::<isize>("Integer", Annotations::new())
                .field::<i8>("Integer8", Annotations::new())
                .field::<u64>("UInteger64", Annotations::new())
                .field::<String>("String", Annotations::new())
                .field::<Vec<u8>>("Bytes", Annotations::new())
                .field::<f32>("Float32", Annotations::new())
                .field::<f64>("Float64", Annotations::new())
                .field::<serde_json::Value>("Interface", tags(&[(TagKey::Required, "true")]))
                .field::<chrono::DateTime<chrono::Utc>>("Timestamp", Annotations::new())
                .into()
        }
    }

    #[test]
    fn reads_basic_struct() {
        let mut doc = Document::new();
        doc.read(&Basic).unwrap();
        assert_eq!(
            doc.to_value().unwrap(),
            json!({
                "$schema": "http://json-schema.org/schema#",
                "type": "object",
                "properties": {
                    "Bool": { "type": "boolean" },
                    "Integer": { "type": "integer" },
                    "Integer8": { "type": "integer" },
                    "UInteger64": { "type": "integer" },
                    "String": { "type": "string" },
                    "Bytes": { "type": "string" },
                    "Float32": { "type": "number" },
                    "Float64": { "type": "number" },
                    "Interface": {},
                    "Timestamp": { "type": "string", "format": "date-time" }
                },
                "required": ["Interface"]
            })
        );
        assert!(!doc.root().properties().unwrap().contains_key("Omitted"));
    }

    struct Tagged;

    impl Reflect for Tagged {
        fn type_info() -> TypeInfo {
            StructInfo::of::<Self>()
                .field::<bool>("Bool", tags(&[(TagKey::Name, "test")]))
                .field::<String>(
                    "String",
                    tags(&[
                        (TagKey::Name, "string"),
                        (TagKey::Description, "blah"),
                        (TagKey::MinLength, "3"),
                        (TagKey::MaxLength, "10"),
                        (TagKey::Pattern, "m{3,10}"),
                    ]),
                )
                .field::<String>("Const", tags(&[(TagKey::Name, "const"), (TagKey::Const, "blah")]))
                .field::<f32>("Float", tags(&[(TagKey::Name, "float"), (TagKey::Min, "1.5"), (TagKey::Max, "42")]))
                .field::<i64>(
                    "Int",
                    tags(&[(TagKey::Name, "int"), (TagKey::ExclusiveMin, "-10"), (TagKey::ExclusiveMax, "0")]),
                )
                .field::<i32>("AnswerToLife", tags(&[(TagKey::Name, "answer"), (TagKey::Const, "42")]))
                .field::<String>("Fruit", tags(&[(TagKey::Name, "fruit"), (TagKey::Enum, "apple|banana|pear")]))
                .into()
        }
    }

    #[test]
    fn overlays_field_annotations() {
        let doc = schema_for::<Tagged>().unwrap();
        assert_eq!(
            doc.to_value().unwrap(),
            json!({
                "$schema": "http://json-schema.org/schema#",
                "type": "object",
                "properties": {
                    "test": { "type": "boolean" },
                    "string": {
                        "type": "string",
                        "description": "blah",
                        "pattern": "m{3,10}",
                        "minLength": 3,
                        "maxLength": 10
                    },
                    "const": { "type": "string", "const": "blah" },
                    "float": { "type": "number", "minimum": 1.5, "maximum": 42 },
                    "int": { "type": "integer", "exclusiveMinimum": -10, "exclusiveMaximum": 0 },
                    "answer": { "type": "integer", "const": 42 },
                    "fruit": { "type": "string", "enum": ["apple", "banana", "pear"] }
                }
            })
        );
    }

    struct Slices;

    impl Reflect for Slices {
        fn type_info() -> TypeInfo {
            StructInfo::of::<Self>()
                .field::<Vec<String>>("Slice", tags(&[(TagKey::Name, ",foo,omitempty")]))
                .field::<Vec<serde_json::Value>>(
                    "SliceOfInterface",
                    tags(&[(TagKey::Name, ",foo"), (TagKey::Required, "true")]),
                )
                .into()
        }
    }

    #[test]
    fn sequences_and_open_items() {
        let doc = schema_for::<Slices>().unwrap();
        assert_eq!(
            doc.to_value().unwrap(),
            json!({
                "$schema": "http://json-schema.org/schema#",
                "type": "object",
                "properties": {
                    "Slice": { "type": "array", "items": { "type": "string" } },
                    "SliceOfInterface": { "type": "array" }
                },
                "required": ["SliceOfInterface"]
            })
        );
    }

    struct Item;

    impl Reflect for Item {
        fn type_info() -> TypeInfo {
            StructInfo::of::<Self>()
                .field::<String>("Foo", tags(&[(TagKey::Required, "true")]))
                .into()
        }
    }

    struct Nested;

    impl Reflect for Nested {
        fn type_info() -> TypeInfo {
            StructInfo::of::<Self>()
                .field::<Item>("Struct", Annotations::new())
                .field::<Vec<Item>>("Items", Annotations::new())
                .field::<Vec<Box<Item>>>("BoxedItems", Annotations::new())
                .into()
        }
    }

    #[test]
    fn required_lists_stay_local() {
        let doc = schema_for::<Nested>().unwrap();
        let item = json!({
            "type": "object",
            "properties": { "Foo": { "type": "string" } },
            "required": ["Foo"]
        });
        assert_eq!(
            doc.to_value().unwrap(),
            json!({
                "$schema": "http://json-schema.org/schema#",
                "type": "object",
                "properties": {
                    "Struct": item.clone(),
                    "Items": { "type": "array", "items": item.clone() },
                    "BoxedItems": { "type": "array", "items": item }
                }
            })
        );
        assert!(doc.root().required().is_empty());
    }

    struct Maps;

    impl Reflect for Maps {
        fn type_info() -> TypeInfo {
            StructInfo::of::<Self>()
                .field::<HashMap<String, String>>("Maps", Annotations::new())
                .field::<HashMap<String, serde_json::Value>>("MapOfInterface", Annotations::new())
                .into()
        }
    }

    #[test]
    fn maps_render_wildcard_property() {
        let doc = schema_for::<Maps>().unwrap();
        let expected = concat!(
            "{\n",
            "    \"$schema\": \"http://json-schema.org/schema#\",\n",
            "    \"type\": \"object\",\n",
            "    \"properties\": {\n",
            "        \"Maps\": {\n",
            "            \"type\": \"object\",\n",
            "            \"properties\": {\n",
            "                \".*\": {\n",
            "                    \"type\": \"string\"\n",
            "                }\n",
            "            },\n",
            "            \"additionalProperties\": false\n",
            "        },\n",
            "        \"MapOfInterface\": {\n",
            "            \"type\": \"object\",\n",
            "            \"additionalProperties\": true\n",
            "        }\n",
            "    }\n",
            "}"
        );
        assert_eq!(doc.to_string(), expected);
    }

    #[test]
    fn non_struct_roots() {
        let mut doc = Document::new();
        doc.read(&Vec::<String>::new()).unwrap();
        assert_eq!(
            doc.to_value().unwrap(),
            json!({
                "$schema": "http://json-schema.org/schema#",
                "type": "array",
                "items": { "type": "string" }
            })
        );
    }

    #[test]
    fn renders_boolean_root() {
        let mut doc = Document::new();
        doc.read(&true).unwrap();
        let expected = "{\n    \"$schema\": \"http://json-schema.org/schema#\",\n    \"type\": \"boolean\"\n}";
        assert_eq!(doc.to_string(), expected);
    }

    #[test]
    fn renders_integer_root() {
        let mut doc = Document::new();
        doc.read(&10).unwrap();
        let expected = "{\n    \"$schema\": \"http://json-schema.org/schema#\",\n    \"type\": \"integer\"\n}";
        assert_eq!(doc.to_string(), expected);
    }

    #[test]
    fn open_root_has_no_type() {
        let doc = schema_for::<serde_json::Value>().unwrap();
        assert_eq!(doc.to_string(), "{\n    \"$schema\": \"http://json-schema.org/schema#\"\n}");
    }

    #[test]
    fn rendering_is_deterministic() {
        let a = schema_for::<Tagged>().unwrap().to_string();
        let b = schema_for::<Tagged>().unwrap().to_string();
        assert_eq!(a, b);
    }

    struct Tree;

    impl Reflect for Tree {
        fn type_info() -> TypeInfo {
            StructInfo::of::<Self>()
                .field::<String>("label", Annotations::new())
                .field::<Vec<Tree>>("children", Annotations::new())
                .into()
        }
    }

    #[test]
    fn recursive_types_fail_and_keep_previous_root() {
        let mut doc = Document::new();
        doc.read(&true).unwrap();
        let err = doc.read_type::<Tree>().unwrap_err();
        match &err {
            SchemaError::RecursiveType { type_name, path } => {
                assert!(type_name.ends_with("Tree"));
                assert_eq!(path, "$.children[]");
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(doc.root().type_name(), Some("boolean"));
    }

    #[test]
    fn repeated_reads_overwrite_the_root() {
        let mut doc = Document::new();
        doc.read(&1.5f64).unwrap();
        doc.read("text").unwrap();
        assert_eq!(doc.root(), &SchemaNode::string());
    }
}
