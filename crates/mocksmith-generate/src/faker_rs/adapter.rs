use fake::Fake;
use rand::RngCore;

use crate::faker_rs::locales::FakerLocale;

macro_rules! localized {
    ($module:ident :: $faker:ident, $locale:expr, $rng:expr) => {{
        let value: String = match $locale {
            FakerLocale::En => fake::faker::$module::en::$faker().fake_with_rng($rng),
            FakerLocale::PtBr => fake::faker::$module::pt_br::$faker().fake_with_rng($rng),
            FakerLocale::ZhCn => fake::faker::$module::zh_cn::$faker().fake_with_rng($rng),
            FakerLocale::FrFr => fake::faker::$module::fr_fr::$faker().fake_with_rng($rng),
        };
        value
    }};
}

/// Corpus categories that `fake` can fill when no asset file provides them.
pub const FAKER_CATEGORIES: &[&str] = &[
    "words",
    "firstNames",
    "lastNames",
    "cities",
    "provinces",
    "streetNames",
    "companies",
    "professions",
    "emailDomains",
];

pub struct FakeRsAdapter;

impl FakeRsAdapter {
    pub fn supports(category: &str) -> bool {
        FAKER_CATEGORIES.contains(&category)
    }

    /// One entry of `category` drawn from the `fake` locale module.
    pub fn vocabulary(
        category: &str,
        locale: FakerLocale,
        rng: &mut dyn RngCore,
    ) -> Option<String> {
        let value = match category {
            "words" => localized!(lorem::Word, locale, rng),
            "firstNames" => localized!(name::FirstName, locale, rng),
            "lastNames" => localized!(name::LastName, locale, rng),
            "cities" => localized!(address::CityName, locale, rng),
            "provinces" => localized!(address::StateName, locale, rng),
            "streetNames" => localized!(address::StreetName, locale, rng),
            "companies" => localized!(company::CompanyName, locale, rng),
            "professions" => localized!(company::Profession, locale, rng),
            "emailDomains" => localized!(internet::FreeEmailProvider, locale, rng),
            _ => return None,
        };
        let value = value.trim().to_string();
        (!value.is_empty()).then_some(value)
    }
}
