use serde::{Deserialize, Serialize};

/// How a map with a concrete value type is expressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapStyle {
    /// One `.*` property holding the value schema, plus
    /// `additionalProperties: false`.
    #[default]
    Wildcard,
    /// `additionalProperties: <value schema>`.
    AdditionalSchema,
}

/// Derivation settings. Every field has a default, so a partial table in a
/// host's config file is enough.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub map_style: MapStyle,
    /// Deepest allowed nesting of derived nodes below the root.
    pub max_depth: usize,
    /// Compile `pattern` annotations with the `regex` crate and reject the
    /// ones that fail.
    pub validate_patterns: bool,
}

pub const DEFAULT_MAX_DEPTH: usize = 128;

impl Default for Settings {
    fn default() -> Self {
        Self {
            map_style: MapStyle::Wildcard,
            max_depth: DEFAULT_MAX_DEPTH,
            validate_patterns: true,
        }
    }
}

impl Settings {
    pub fn with_map_style(mut self, map_style: MapStyle) -> Self {
        self.map_style = map_style;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_validate_patterns(mut self, validate: bool) -> Self {
        self.validate_patterns = validate;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{ "map_style": "additional_schema" }"#).unwrap();
        assert_eq!(settings.map_style, MapStyle::AdditionalSchema);
        assert_eq!(settings.max_depth, DEFAULT_MAX_DEPTH);
        assert!(settings.validate_patterns);
    }
}
