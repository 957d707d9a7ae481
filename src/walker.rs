//! Type walker: recursive descent from a [`TypeInfo`] to a [`SchemaNode`].
//!
//! The kind of a node is decided by the type alone. Field annotations are
//! overlaid afterwards and only where the kind can carry them; a length bound
//! on an integer field is simply not applied.
use std::fmt::{self, Write as _};

use crate::annotation::{invalid, Annotations, Constraints, TagKey};
use crate::error::{Result, SchemaError};
use crate::node::{
    AdditionalProperties, Bound, Kind, ObjectRules, SchemaNode, StringRules, WILDCARD_PROPERTY,
};
use crate::reflect::{FieldInfo, Scalar, StructInfo, TypeInfo, TypeRef};
use crate::settings::{MapStyle, Settings};

#[derive(Debug, Clone)]
enum Segment {
    Field(String),
    Items,
    Values,
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Field(name) => write!(f, ".{name}"),
            Segment::Items => f.write_str("[]"),
            Segment::Values => f.write_str(".*"),
        }
    }
}

pub(crate) struct Walker<'s> {
    settings: &'s Settings,
    /// Structs currently being derived, outermost first.
    ancestors: Vec<&'static str>,
    path: Vec<Segment>,
}

impl<'s> Walker<'s> {
    pub(crate) fn new(settings: &'s Settings) -> Self {
        Self {
            settings,
            ancestors: Vec::new(),
            path: Vec::new(),
        }
    }

    pub(crate) fn derive(&mut self, ty: TypeRef, annotations: &Annotations) -> Result<SchemaNode> {
        self.derive_info(ty(), annotations)
    }

    fn derive_info(&mut self, info: TypeInfo, annotations: &Annotations) -> Result<SchemaNode> {
        let at = self.location();
        if self.path.len() > self.settings.max_depth {
            return Err(SchemaError::DepthExceeded {
                limit: self.settings.max_depth,
                path: at,
            });
        }
        let constraints = Constraints::parse(annotations, self.settings.validate_patterns, &at)?;
        let mut node = self.classify(info)?;
        overlay(&mut node, constraints, &at)?;

        #[cfg(feature = "tracing")]
        tracing::trace!(path = %at, kind = node.type_name().unwrap_or("any"), "derived schema node");

        Ok(node)
    }

    fn nested(&mut self, segment: Segment, info: TypeInfo, annotations: &Annotations) -> Result<SchemaNode> {
        self.path.push(segment);
        let out = self.derive_info(info, annotations);
        self.path.pop();
        out
    }

    fn location(&self) -> String {
        let mut out = String::from("$");
        for segment in &self.path {
            let _ = write!(out, "{segment}");
        }
        out
    }

    fn classify(&mut self, info: TypeInfo) -> Result<SchemaNode> {
        let node = match info {
            TypeInfo::Pointer(pointee) => return self.classify(pointee()),
            TypeInfo::Timestamp => SchemaNode::date_time(),
            TypeInfo::Struct(info) => self.structure(info)?,
            TypeInfo::Sequence(elem) => self.sequence(elem())?,
            TypeInfo::Map(value) => self.map(value())?,
            TypeInfo::Open => SchemaNode::unconstrained(),
            TypeInfo::Scalar(scalar) => scalar_node(scalar),
            TypeInfo::Variants(names) => SchemaNode::new(Kind::String(StringRules {
                enumeration: Some(names.into_iter().map(str::to_owned).collect()),
                ..StringRules::default()
            })),
        };
        Ok(node)
    }

    fn structure(&mut self, info: StructInfo) -> Result<SchemaNode> {
        if self.ancestors.contains(&info.name) {
            return Err(SchemaError::RecursiveType {
                type_name: info.name,
                path: self.location(),
            });
        }
        self.ancestors.push(info.name);
        let out = self.fields(&info.fields);
        self.ancestors.pop();
        out.map(SchemaNode::object)
    }

    fn fields(&mut self, fields: &[FieldInfo]) -> Result<ObjectRules> {
        let mut rules = ObjectRules::default();
        for field in fields {
            let Some(name) = field.annotations.external_name(field.name) else {
                continue;
            };
            let child = self.nested(Segment::Field(name.to_owned()), (field.ty)(), &field.annotations)?;
            // Only this field's own flag counts; nested required lists stay nested.
            if field.annotations.is_required() && !rules.required.iter().any(|r| r == name) {
                rules.required.push(name.to_owned());
            }
            rules.properties.insert(name.to_owned(), child);
        }
        Ok(rules)
    }

    fn sequence(&mut self, elem: TypeInfo) -> Result<SchemaNode> {
        if elem.is_byte() {
            return Ok(SchemaNode::string());
        }
        let elem = elem.resolve();
        if elem.is_open() {
            return Ok(SchemaNode::array(None));
        }
        let items = self.nested(Segment::Items, elem, &Annotations::default())?;
        Ok(SchemaNode::array(Some(items)))
    }

    fn map(&mut self, value: TypeInfo) -> Result<SchemaNode> {
        let value = value.resolve();
        if value.is_open() {
            return Ok(SchemaNode::object(ObjectRules {
                additional_properties: Some(AdditionalProperties::Allowed),
                ..ObjectRules::default()
            }));
        }
        let node = self.nested(Segment::Values, value, &Annotations::default())?;
        let rules = match self.settings.map_style {
            MapStyle::Wildcard => {
                let mut rules = ObjectRules {
                    additional_properties: Some(AdditionalProperties::Forbidden),
                    ..ObjectRules::default()
                };
                rules.properties.insert(WILDCARD_PROPERTY.to_owned(), node);
                rules
            }
            MapStyle::AdditionalSchema => ObjectRules {
                additional_properties: Some(AdditionalProperties::Schema(Box::new(node))),
                ..ObjectRules::default()
            },
        };
        Ok(SchemaNode::object(rules))
    }
}

fn scalar_node(scalar: Scalar) -> SchemaNode {
    let kind = if scalar == Scalar::Bool {
        Kind::Boolean { constant: None }
    } else if scalar.is_integer() {
        Kind::Integer { bounds: Default::default(), constant: None }
    } else if scalar.is_float() {
        Kind::Number { bounds: Default::default(), constant: None }
    } else {
        Kind::String(StringRules::default())
    };
    SchemaNode::new(kind)
}

/// Applies the constraints that fit the node's kind and drops the rest.
fn overlay(node: &mut SchemaNode, c: Constraints, at: &str) -> Result<()> {
    node.description = c.description;
    match &mut node.kind {
        Kind::Unconstrained | Kind::Array { .. } | Kind::Object(_) => {}
        Kind::Boolean { constant } => {
            if let Some(raw) = c.constant {
                *constant = Some(match raw.trim() {
                    "true" => true,
                    "false" => false,
                    _ => return Err(invalid(TagKey::Const, &raw, at, "`true` or `false`")),
                });
            }
        }
        Kind::Integer { bounds, constant } => {
            *bounds = c.bounds;
            if let Some(raw) = c.constant {
                let value = raw
                    .trim()
                    .parse::<i128>()
                    .map_err(|_| invalid(TagKey::Const, &raw, at, "an integer"))?;
                *constant = Some(value);
            }
        }
        Kind::Number { bounds, constant } => {
            *bounds = c.bounds;
            if let Some(raw) = c.constant {
                let value = raw
                    .parse::<Bound>()
                    .map_err(|_| invalid(TagKey::Const, &raw, at, "a finite number"))?;
                *constant = Some(value);
            }
        }
        Kind::String(rules) => {
            rules.pattern = c.pattern;
            rules.min_length = c.min_length;
            rules.max_length = c.max_length;
            rules.constant = c.constant;
            if c.enumeration.is_some() {
                rules.enumeration = c.enumeration;
            }
        }
    }
    Ok(())
}

// ------------------------------- Tests ------------------------------------ //
