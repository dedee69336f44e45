use rand::Rng;
use serde_json::Value;

use crate::context::ResolutionContext;
use crate::errors::GenerationError;
use crate::params::Args;
use crate::placeholder::{Placeholder, PlaceholderRegistry, VocabularyPlaceholder};

const CITIES: &[&str] = &["Springfield", "Riverside", "Franklin", "Greenville", "Bristol"];
const PROVINCES: &[&str] = &["California", "Texas", "Florida", "New York", "Ohio"];
const STREETS: &[&str] = &["Main Street", "Oak Avenue", "Maple Drive", "Cedar Lane", "Elm Road"];
const AREA_CODES: &[&str] = &["201", "202", "203", "205", "206", "207"];
const PHONE_FORMATS: &[&str] = &["(###) ###-####", "###-###-####"];
const MOBILE_PREFIXES: &[&str] = &["134", "135", "136", "137", "138", "139"];
const LANDLINE_PREFIXES: &[&str] = &["010", "020", "021", "022", "023", "024"];
const TOLL_FREE_PREFIXES: &[&str] = &["800", "888", "877", "866", "855", "844"];
const PREMIUM_PREFIXES: &[&str] = &["900", "976", "970", "540", "550", "560"];

pub fn register(registry: &mut PlaceholderRegistry) {
    registry.register_placeholder(Box::new(VocabularyPlaceholder {
        name: "city",
        category: "cities",
        fallback: CITIES,
    }));
    registry.register_placeholder(Box::new(VocabularyPlaceholder {
        name: "province",
        category: "provinces",
        fallback: PROVINCES,
    }));
    registry.register_placeholder(Box::new(VocabularyPlaceholder {
        name: "street",
        category: "streetNames",
        fallback: STREETS,
    }));
    registry.register_placeholder(Box::new(VocabularyPlaceholder {
        name: "streetName",
        category: "streetNames",
        fallback: STREETS,
    }));
    registry.register_placeholder(Box::new(VocabularyPlaceholder {
        name: "areaCode",
        category: "areaCodes",
        fallback: AREA_CODES,
    }));
    registry.register_placeholder(Box::new(PhoneNumberPlaceholder));
}

/// Phone number sub-type selected with a `PT.*` argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhoneType {
    Mobile,
    Landline,
    TollFree,
    Premium,
}

impl PhoneType {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "PT.M" | "MOBILE" => Some(Self::Mobile),
            "PT.L" | "LANDLINE" => Some(Self::Landline),
            "PT.TF" | "TOLL_FREE" => Some(Self::TollFree),
            "PT.P" | "PREMIUM" => Some(Self::Premium),
            _ => None,
        }
    }

    fn category(self) -> &'static str {
        match self {
            Self::Mobile => "mobilePrefixes",
            Self::Landline => "landlinePrefixes",
            Self::TollFree => "tollFreePrefixes",
            Self::Premium => "premiumPrefixes",
        }
    }

    fn fallback(self) -> &'static [&'static str] {
        match self {
            Self::Mobile => MOBILE_PREFIXES,
            Self::Landline => LANDLINE_PREFIXES,
            Self::TollFree => TOLL_FREE_PREFIXES,
            Self::Premium => PREMIUM_PREFIXES,
        }
    }

    fn default_format(self) -> &'static str {
        match self {
            Self::Mobile => "###########",
            Self::Landline => "###-########",
            Self::TollFree | Self::Premium => "###-###-####",
        }
    }
}

/// `phoneNumber([format][, PT.M|PT.L|PT.TF|PT.P])`; `#` marks a digit slot.
struct PhoneNumberPlaceholder;

impl Placeholder for PhoneNumberPlaceholder {
    fn name(&self) -> &'static str {
        "phoneNumber"
    }

    fn resolve(
        &self,
        ctx: &mut ResolutionContext<'_>,
        args: &Args<'_>,
    ) -> Result<Value, GenerationError> {
        let mut phone_type = None;
        let mut format = None;
        for index in 0..args.len() {
            let Some(arg) = args.get_str(index) else {
                continue;
            };
            match PhoneType::parse(&arg) {
                Some(parsed) => phone_type = Some(parsed),
                None if format.is_none() => format = Some(arg),
                None => {}
            }
        }

        let format = match (format, phone_type) {
            (Some(format), _) => format,
            (None, Some(phone_type)) => phone_type.default_format().to_string(),
            (None, None) => ctx.pick_vocabulary("phoneFormats", PHONE_FORMATS),
        };
        let prefix = phone_type
            .map(|phone_type| ctx.pick_vocabulary(phone_type.category(), phone_type.fallback()))
            .unwrap_or_default();

        Ok(Value::String(fill_digits(ctx, &format, &prefix)))
    }
}

/// Fills `#` slots left to right, using `prefix` digits for the leading slots.
fn fill_digits(ctx: &mut ResolutionContext<'_>, format: &str, prefix: &str) -> String {
    let mut prefix = prefix.chars().filter(char::is_ascii_digit);
    format
        .chars()
        .map(|ch| {
            if ch != '#' {
                return ch;
            }
            prefix
                .next()
                .unwrap_or_else(|| char::from(b'0' + ctx.rng().random_range(0..=9u8)))
        })
        .collect()
}
