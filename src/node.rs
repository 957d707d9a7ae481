//! Schema node tree.
//!
//! A node is a description plus exactly one [`Kind`]; constraints live inside
//! the kind they govern, so e.g. a pattern can never sit on an integer node.
use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Property key standing in for "every value of this map".
pub const WILDCARD_PROPERTY: &str = ".*";

pub const FORMAT_DATE_TIME: &str = "date-time";

// ------------------------------- Nodes ----------------------------------- //

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaNode {
    pub description: Option<String>,
    pub kind: Kind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Kind {
    /// No type restriction at all.
    #[default]
    Unconstrained,
    Boolean {
        constant: Option<bool>,
    },
    Integer {
        bounds: Bounds,
        /// Wide enough for every integer width the walker accepts.
        constant: Option<i128>,
    },
    Number {
        bounds: Bounds,
        constant: Option<Bound>,
    },
    String(StringRules),
    Array {
        /// `None` when elements are open-typed.
        items: Option<Box<SchemaNode>>,
    },
    Object(ObjectRules),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringRules {
    pub format: Option<&'static str>,
    pub pattern: Option<String>,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub constant: Option<String>,
    pub enumeration: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectRules {
    /// Declaration order is kept for rendering; equality ignores it.
    pub properties: IndexMap<String, SchemaNode>,
    pub required: Vec<String>,
    pub additional_properties: Option<AdditionalProperties>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdditionalProperties {
    Forbidden,
    Allowed,
    Schema(Box<SchemaNode>),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Bounds {
    pub minimum: Option<Bound>,
    pub maximum: Option<Bound>,
    pub exclusive_minimum: Option<Bound>,
    pub exclusive_maximum: Option<Bound>,
}

impl Bounds {
    pub fn is_empty(&self) -> bool {
        *self == Bounds::default()
    }
}

impl SchemaNode {
    pub fn new(kind: Kind) -> Self {
        Self { description: None, kind }
    }

    pub fn unconstrained() -> Self {
        Self::new(Kind::Unconstrained)
    }

    pub fn string() -> Self {
        Self::new(Kind::String(StringRules::default()))
    }

    pub fn date_time() -> Self {
        Self::new(Kind::String(StringRules {
            format: Some(FORMAT_DATE_TIME),
            ..StringRules::default()
        }))
    }

    pub fn array(items: Option<SchemaNode>) -> Self {
        Self::new(Kind::Array { items: items.map(Box::new) })
    }

    pub fn object(rules: ObjectRules) -> Self {
        Self::new(Kind::Object(rules))
    }

    /// JSON Schema `type` keyword, `None` when unconstrained.
    pub fn type_name(&self) -> Option<&'static str> {
        match self.kind {
            Kind::Unconstrained => None,
            Kind::Boolean { .. } => Some("boolean"),
            Kind::Integer { .. } => Some("integer"),
            Kind::Number { .. } => Some("number"),
            Kind::String(_) => Some("string"),
            Kind::Array { .. } => Some("array"),
            Kind::Object(_) => Some("object"),
        }
    }

    pub fn bounds(&self) -> Option<&Bounds> {
        match &self.kind {
            Kind::Integer { bounds, .. } | Kind::Number { bounds, .. } => Some(bounds),
            _ => None,
        }
    }

    pub fn properties(&self) -> Option<&IndexMap<String, SchemaNode>> {
        match &self.kind {
            Kind::Object(obj) => Some(&obj.properties),
            _ => None,
        }
    }

    pub fn required(&self) -> &[String] {
        match &self.kind {
            Kind::Object(obj) => &obj.required,
            _ => &[],
        }
    }

    pub fn items(&self) -> Option<&SchemaNode> {
        match &self.kind {
            Kind::Array { items } => items.as_deref(),
            _ => None,
        }
    }

    /// Writes this node's keywords into an already open map, in the fixed
    /// rendering order. Absent keywords are skipped.
    pub(crate) fn serialize_entries<M: SerializeMap>(&self, map: &mut M) -> Result<(), M::Error> {
        if let Some(ty) = self.type_name() {
            map.serialize_entry("type", ty)?;
        }
        if let Kind::Object(obj) = &self.kind {
            if !obj.properties.is_empty() {
                map.serialize_entry("properties", &obj.properties)?;
            }
            if !obj.required.is_empty() {
                map.serialize_entry("required", &obj.required)?;
            }
        }
        if let Kind::Array { items: Some(items) } = &self.kind {
            map.serialize_entry("items", items)?;
        }
        if let Kind::Object(ObjectRules { additional_properties: Some(extra), .. }) = &self.kind {
            map.serialize_entry("additionalProperties", extra)?;
        }
        if let Some(description) = &self.description {
            map.serialize_entry("description", description)?;
        }
        if let Kind::String(s) = &self.kind {
            if let Some(format) = s.format {
                map.serialize_entry("format", format)?;
            }
            if let Some(pattern) = &s.pattern {
                map.serialize_entry("pattern", pattern)?;
            }
            if let Some(n) = s.min_length {
                map.serialize_entry("minLength", &n)?;
            }
            if let Some(n) = s.max_length {
                map.serialize_entry("maxLength", &n)?;
            }
        }
        if let Some(bounds) = self.bounds() {
            let keyed = [
                ("minimum", bounds.minimum),
                ("maximum", bounds.maximum),
                ("exclusiveMinimum", bounds.exclusive_minimum),
                ("exclusiveMaximum", bounds.exclusive_maximum),
            ];
            for (key, bound) in keyed {
                if let Some(bound) = bound {
                    map.serialize_entry(key, &bound)?;
                }
            }
        }
        match &self.kind {
            Kind::Boolean { constant: Some(b) } => map.serialize_entry("const", b)?,
            Kind::Integer { constant: Some(i), .. } => map.serialize_entry("const", &Bound::Integer(*i))?,
            Kind::Number { constant: Some(f), .. } => map.serialize_entry("const", f)?,
            Kind::String(StringRules { constant: Some(s), .. }) => map.serialize_entry("const", s)?,
            _ => {}
        }
        if let Kind::String(StringRules { enumeration: Some(values), .. }) = &self.kind {
            map.serialize_entry("enum", values)?;
        }
        Ok(())
    }
}

impl Serialize for SchemaNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        self.serialize_entries(&mut map)?;
        map.end()
    }
}

impl Serialize for AdditionalProperties {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AdditionalProperties::Forbidden => serializer.serialize_bool(false),
            AdditionalProperties::Allowed => serializer.serialize_bool(true),
            AdditionalProperties::Schema(node) => node.serialize(serializer),
        }
    }
}

// ------------------------------- Bound ----------------------------------- //

/// Finite numeric bound. Presence is tracked by `Option<Bound>`, never by a
/// zero sentinel.
///
/// Integer text is kept exact; anything else goes through `f64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Bound {
    Integer(i128),
    Float(OrderedFloat<f64>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundParseError;

impl Bound {
    pub fn new(value: f64) -> Self {
        Bound::Float(OrderedFloat(value))
    }

    pub fn get(self) -> f64 {
        match self {
            Bound::Integer(i) => i as f64,
            Bound::Float(f) => f.0,
        }
    }
}

impl FromStr for Bound {
    type Err = BoundParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(i) = s.parse::<i128>() {
            return Ok(Bound::Integer(i));
        }
        match s.parse::<f64>() {
            Ok(f) if f.is_finite() => Ok(Bound::new(f)),
            _ => Err(BoundParseError),
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Integer(i) => write!(f, "{i}"),
            Bound::Float(x) => write!(f, "{}", x.0),
        }
    }
}

// Prefer emitting integers when exact
impl Serialize for Bound {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            Bound::Integer(i) => {
                if let Ok(i) = i64::try_from(i) {
                    serializer.serialize_i64(i)
                } else if let Ok(u) = u64::try_from(i) {
                    serializer.serialize_u64(u)
                } else {
                    serializer.serialize_i128(i)
                }
            }
            // `i64::MAX as f64` rounds up to 2^63, which does not fit.
            Bound::Float(OrderedFloat(n)) => {
                if n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64 {
                    serializer.serialize_i64(n as i64)
                } else {
                    serializer.serialize_f64(n)
                }
            }
        }
    }
}

// ------------------------------- Tests ------------------------------------ //
