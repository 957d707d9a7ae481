//! Per-field annotations and their parsed form.
//!
//! An [`Annotations`] set is raw text keyed by a fixed vocabulary; it is
//! turned into [`Constraints`] once per field when the walker reaches it.
use std::collections::BTreeMap;
use std::fmt;

use regex::Regex;

use crate::error::{Result, SchemaError};
use crate::node::{Bound, Bounds};

/// Separator for `enum` annotation values.
pub const ENUM_SEPARATOR: char = '|';

/// Serialization name that drops a field from the object entirely.
pub const EXCLUDED_NAME: &str = "-";

// ------------------------------- Keys ------------------------------------ //

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TagKey {
    /// Serialization name; only the first comma-separated segment counts.
    Name,
    Required,
    Description,
    MinLength,
    MaxLength,
    Pattern,
    Min,
    Max,
    ExclusiveMin,
    ExclusiveMax,
    Const,
    Enum,
}

impl TagKey {
    pub const ALL: [TagKey; 12] = [
        TagKey::Name,
        TagKey::Required,
        TagKey::Description,
        TagKey::MinLength,
        TagKey::MaxLength,
        TagKey::Pattern,
        TagKey::Min,
        TagKey::Max,
        TagKey::ExclusiveMin,
        TagKey::ExclusiveMax,
        TagKey::Const,
        TagKey::Enum,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TagKey::Name => "json",
            TagKey::Required => "required",
            TagKey::Description => "description",
            TagKey::MinLength => "minLength",
            TagKey::MaxLength => "maxLength",
            TagKey::Pattern => "pattern",
            TagKey::Min => "min",
            TagKey::Max => "max",
            TagKey::ExclusiveMin => "exclusiveMin",
            TagKey::ExclusiveMax => "exclusiveMax",
            TagKey::Const => "const",
            TagKey::Enum => "enum",
        }
    }
}

impl fmt::Display for TagKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------- Annotations -------------------------------- //

/// Immutable mapping from [`TagKey`] to raw annotation text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotations {
    tags: BTreeMap<TagKey, String>,
}

impl Annotations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy with `key` set to `value`, replacing any earlier value.
    pub fn with(mut self, key: TagKey, value: impl Into<String>) -> Self {
        self.tags.insert(key, value.into());
        self
    }

    pub fn get(&self, key: TagKey) -> Option<&str> {
        self.tags.get(&key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TagKey, &str)> {
        self.tags.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// External property name for a field declared as `declared`.
    ///
    /// `None` means the field is excluded from the object.
    pub fn external_name<'a>(&'a self, declared: &'a str) -> Option<&'a str> {
        let segment = self
            .get(TagKey::Name)
            .and_then(|raw| raw.split(',').next())
            .unwrap_or("");
        match segment {
            EXCLUDED_NAME => None,
            "" => Some(declared),
            name => Some(name),
        }
    }

    pub fn is_required(&self) -> bool {
        self.get(TagKey::Required) == Some("true")
    }
}

impl<S: Into<String>> FromIterator<(TagKey, S)> for Annotations {
    fn from_iter<I: IntoIterator<Item = (TagKey, S)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |acc, (key, value)| acc.with(key, value))
    }
}

// ---------------------------- Constraints -------------------------------- //

/// Annotations with their sub-grammars parsed. Which of these apply is
/// decided later by the node's kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constraints {
    pub description: Option<String>,
    pub pattern: Option<String>,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub bounds: Bounds,
    /// Kept as text until the kind is known.
    pub constant: Option<String>,
    pub enumeration: Option<Vec<String>>,
}

impl Constraints {
    pub fn parse(annotations: &Annotations, validate_patterns: bool, path: &str) -> Result<Self> {
        let mut out = Constraints::default();
        for (key, raw) in annotations.iter() {
            match key {
                TagKey::Name | TagKey::Required => {}
                TagKey::Description => out.description = Some(raw.to_owned()),
                TagKey::Pattern => {
                    if validate_patterns {
                        if let Err(source) = Regex::new(raw) {
                            return Err(SchemaError::InvalidPattern {
                                path: path.to_owned(),
                                pattern: raw.to_owned(),
                                source,
                            });
                        }
                    }
                    out.pattern = Some(raw.to_owned());
                }
                TagKey::MinLength => out.min_length = Some(parse_length(key, raw, path)?),
                TagKey::MaxLength => out.max_length = Some(parse_length(key, raw, path)?),
                TagKey::Min => out.bounds.minimum = Some(parse_bound(key, raw, path)?),
                TagKey::Max => out.bounds.maximum = Some(parse_bound(key, raw, path)?),
                TagKey::ExclusiveMin => {
                    out.bounds.exclusive_minimum = Some(parse_bound(key, raw, path)?)
                }
                TagKey::ExclusiveMax => {
                    out.bounds.exclusive_maximum = Some(parse_bound(key, raw, path)?)
                }
                TagKey::Const => out.constant = Some(raw.to_owned()),
                TagKey::Enum => {
                    out.enumeration = Some(raw.split(ENUM_SEPARATOR).map(str::to_owned).collect())
                }
            }
        }
        Ok(out)
    }
}

pub(crate) fn invalid(key: TagKey, raw: &str, path: &str, expected: &'static str) -> SchemaError {
    SchemaError::InvalidAnnotation {
        path: path.to_owned(),
        key,
        value: raw.to_owned(),
        expected,
    }
}

fn parse_length(key: TagKey, raw: &str, path: &str) -> Result<u64> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| invalid(key, raw, path, "a non-negative integer"))
}

fn parse_bound(key: TagKey, raw: &str, path: &str) -> Result<Bound> {
    raw.parse::<Bound>()
        .map_err(|_| invalid(key, raw, path, "a finite number"))
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn external_name_uses_first_segment() {
        let plain = Annotations::new();
        assert_eq!(plain.external_name("Field"), Some("Field"));

        let renamed = Annotations::new().with(TagKey::Name, "test");
        assert_eq!(renamed.external_name("Bool"), Some("test"));

        let options_only = Annotations::new().with(TagKey::Name, ",foo,omitempty");
        assert_eq!(options_only.external_name("Slice"), Some("Slice"));

        let excluded = Annotations::new().with(TagKey::Name, "-,omitempty");
        assert_eq!(excluded.external_name("Omitted"), None);
    }

    #[test]
    fn key_spellings_are_distinct() {
        let spellings: std::collections::BTreeSet<&str> =
            TagKey::ALL.iter().map(|k| k.as_str()).collect();
        assert_eq!(spellings.len(), TagKey::ALL.len());
        assert_eq!(TagKey::ExclusiveMin.to_string(), "exclusiveMin");
    }

    #[test]
    fn required_only_for_exact_true() {
        assert!(Annotations::new().with(TagKey::Required, "true").is_required());
        assert!(!Annotations::new().with(TagKey::Required, "yes").is_required());
        assert!(!Annotations::new().is_required());
    }

    #[test]
    fn parses_every_sub_grammar_once() {
        let tags: Annotations = [
            (TagKey::Description, "blah"),
            (TagKey::MinLength, "3"),
            (TagKey::MaxLength, "10"),
            (TagKey::Pattern, "m{3,10}"),
            (TagKey::Min, "1.5"),
            (TagKey::ExclusiveMax, "0"),
            (TagKey::Enum, "apple|banana|pear"),
            (TagKey::Const, "42"),
        ]
        .into_iter()
        .collect();

        let c = Constraints::parse(&tags, true, "$.f").unwrap();
        assert_eq!(c.description.as_deref(), Some("blah"));
        assert_eq!(c.min_length, Some(3));
        assert_eq!(c.max_length, Some(10));
        assert_eq!(c.pattern.as_deref(), Some("m{3,10}"));
        assert_eq!(c.bounds.minimum, Some(Bound::new(1.5)));
        assert_eq!(c.bounds.maximum, None);
        assert_eq!(c.bounds.exclusive_maximum, Some(Bound::Integer(0)));
        assert_eq!(
            c.enumeration,
            Some(vec!["apple".to_string(), "banana".to_string(), "pear".to_string()])
        );
        assert_eq!(c.constant.as_deref(), Some("42"));
    }

    #[test]
    fn malformed_numbers_are_reported_with_location() {
        let tags = Annotations::new().with(TagKey::Min, "abc");
        let err = Constraints::parse(&tags, true, "$.Float").unwrap_err();
        assert_eq!(err.path(), "$.Float");
        assert_eq!(
            err.to_string(),
            "$.Float: annotation `min` expects a finite number, got \"abc\""
        );

        let tags = Annotations::new().with(TagKey::MaxLength, "-1");
        assert!(Constraints::parse(&tags, true, "$").is_err());

        let tags = Annotations::new().with(TagKey::Max, "NaN");
        assert!(Constraints::parse(&tags, true, "$").is_err());
    }

    #[test]
    fn pattern_validation_can_be_disabled() {
        let tags = Annotations::new().with(TagKey::Pattern, "(unclosed");
        assert!(matches!(
            Constraints::parse(&tags, true, "$"),
            Err(SchemaError::InvalidPattern { .. })
        ));
        let c = Constraints::parse(&tags, false, "$").unwrap();
        assert_eq!(c.pattern.as_deref(), Some("(unclosed"));
    }
}
