use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::locale::Locale;
use crate::rule::RuleSpec;

pub const DEFAULT_MAX_DEPTH: usize = 3;
pub const DEFAULT_MAX_COLLECTION_SIZE: usize = 5;
pub const DEFAULT_MAX_STRING_LENGTH: usize = 255;

/// Options that control introspection, generation and mapping for one call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct MockConfig {
    /// Include properties that are not publicly visible.
    pub include_private: bool,
    /// Include type-level (static) properties.
    pub include_static: bool,
    /// Include properties marked transient.
    pub include_transient: bool,
    /// Number of structured levels the introspector expands before degrading.
    pub max_depth: usize,
    /// Upper bound for default collection templates.
    pub max_collection_size: usize,
    /// Mapped strings longer than this are truncated.
    pub max_string_length: usize,
    /// Locale for this call; the process default applies when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<String>")]
    pub locale: Option<Locale>,
    /// Seed for reproducible output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            include_private: false,
            include_static: false,
            include_transient: false,
            max_depth: DEFAULT_MAX_DEPTH,
            max_collection_size: DEFAULT_MAX_COLLECTION_SIZE,
            max_string_length: DEFAULT_MAX_STRING_LENGTH,
            locale: None,
            seed: None,
        }
    }
}

impl MockConfig {
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = Some(locale);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Copy of this config with per-type overrides applied.
    pub fn overridden(&self, overrides: &BeanOverrides) -> MockConfig {
        let mut config = self.clone();
        if let Some(value) = overrides.include_private {
            config.include_private = value;
        }
        if let Some(value) = overrides.include_static {
            config.include_static = value;
        }
        if let Some(value) = overrides.include_transient {
            config.include_transient = value;
        }
        if let Some(value) = overrides.max_depth {
            config.max_depth = value;
        }
        config
    }
}

/// Visibility/depth overrides attached to a type or to one structured property.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BeanOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_private: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_static: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_transient: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,
}

/// Per-property generation metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct FieldConfig {
    /// Disabled properties are left out of the template entirely.
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<RuleSpec>,
    /// Placeholder expression; a bare name such as `cname` becomes `@CNAME`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Regex literal body used when no placeholder is set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<LengthSpec>,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            rule: None,
            placeholder: None,
            regex: None,
            length: None,
        }
    }
}

impl FieldConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn with_rule(rule: RuleSpec) -> Self {
        Self {
            rule: Some(rule),
            ..Self::default()
        }
    }

    pub fn with_placeholder(placeholder: impl Into<String>) -> Self {
        Self {
            placeholder: Some(placeholder.into()),
            ..Self::default()
        }
    }

    pub fn with_length(value: usize, fill: FillStrategy) -> Self {
        Self {
            length: Some(LengthSpec { value, fill }),
            ..Self::default()
        }
    }

    /// Placeholder normalised to `@NAME` form, if one is configured.
    pub fn placeholder_expression(&self) -> Option<String> {
        let raw = self.placeholder.as_deref()?.trim();
        if raw.is_empty() {
            return None;
        }
        if raw.starts_with('@') {
            Some(raw.to_string())
        } else {
            Some(format!("@{}", raw.to_uppercase()))
        }
    }
}

/// Target length for a mapped string or sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct LengthSpec {
    pub value: usize,
    #[serde(default)]
    pub fill: FillStrategy,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FillStrategy {
    /// Cycle existing content up to the target length, truncating longer values.
    #[default]
    Repeat,
    /// Only truncate values longer than the target length.
    Truncate,
}
