use mocksmith_core::{Locale, MockConfig};
use serde::{Deserialize, Serialize};

/// Options for one template evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MockOptions {
    /// Seed for a reproducible evaluation; random when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Locale for this evaluation; the process default applies when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<Locale>,
}

impl MockOptions {
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            locale: None,
        }
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = Some(locale);
        self
    }
}

impl From<&MockConfig> for MockOptions {
    fn from(config: &MockConfig) -> Self {
        Self {
            seed: config.seed,
            locale: config.locale.clone(),
        }
    }
}
