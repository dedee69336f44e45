use std::fmt;

use mocksmith_core::Locale;

/// Locales with a `fake` data module.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FakerLocale {
    En,
    PtBr,
    ZhCn,
    FrFr,
}

impl FakerLocale {
    /// Closest supported module; unknown languages use English.
    pub fn for_locale(locale: &Locale) -> Self {
        match locale.language() {
            "pt" => Self::PtBr,
            "zh" => Self::ZhCn,
            "fr" => Self::FrFr,
            _ => Self::En,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::PtBr => "pt_BR",
            Self::ZhCn => "zh_CN",
            Self::FrFr => "fr_FR",
        }
    }
}

impl fmt::Display for FakerLocale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
