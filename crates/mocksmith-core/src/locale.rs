use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Language tag such as `en_US`, `zh_CN` or `pt`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Locale {
    language: String,
    region: Option<String>,
}

impl Locale {
    pub fn new(language: &str, region: Option<&str>) -> Self {
        Self {
            language: language.to_ascii_lowercase(),
            region: region.map(|region| region.to_ascii_uppercase()),
        }
    }

    pub fn en_us() -> Self {
        Self::new("en", Some("US"))
    }

    pub fn zh_cn() -> Self {
        Self::new("zh", Some("CN"))
    }

    pub fn pt_br() -> Self {
        Self::new("pt", Some("BR"))
    }

    /// Accepts `en`, `en_US`, `en-us` and `zh-Hans-CN` style tags.
    pub fn parse(value: &str) -> Option<Self> {
        let mut parts = value
            .trim()
            .split(['_', '-', '.'])
            .filter(|part| !part.is_empty());
        let language = parts.next()?;
        if !(2..=3).contains(&language.len()) || !language.chars().all(|c| c.is_ascii_alphabetic())
        {
            return None;
        }
        let region = parts.find(|part| {
            (part.len() == 2 && part.chars().all(|c| c.is_ascii_alphabetic()))
                || (part.len() == 3 && part.chars().all(|c| c.is_ascii_digit()))
        });
        Some(Self::new(language, region))
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    pub fn tag(&self) -> String {
        match &self.region {
            Some(region) => format!("{}_{}", self.language, region),
            None => self.language.clone(),
        }
    }

    /// Tags to try in order: `lang_REGION`, `lang`, then `en`.
    pub fn fallback_chain(&self) -> Vec<String> {
        let mut chain = Vec::with_capacity(3);
        if self.region.is_some() {
            chain.push(self.tag());
        }
        chain.push(self.language.clone());
        if self.language != "en" {
            chain.push("en".to_string());
        }
        chain
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::en_us()
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag())
    }
}

impl FromStr for Locale {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Locale::parse(value).ok_or_else(|| Error::InvalidConfig(format!("invalid locale '{value}'")))
    }
}

impl TryFrom<String> for Locale {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Locale> for String {
    fn from(locale: Locale) -> Self {
        locale.tag()
    }
}
