use rand::Rng;
use serde_json::Value;

use crate::context::ResolutionContext;
use crate::errors::GenerationError;
use crate::params::Args;
use crate::placeholder::{Placeholder, PlaceholderRegistry, VocabularyPlaceholder};

const COMPANIES: &[&str] = &["Acme Corp", "Globex", "Initech", "Umbrella Inc", "Stark Industries"];
const PROFESSIONS: &[&str] = &["Engineer", "Teacher", "Designer", "Accountant", "Nurse"];
const BANK_CODES: &[(&str, &str)] = &[
    ("Bank of America", "4147"),
    ("JPMorgan Chase", "4000"),
    ("Wells Fargo", "4512"),
    ("Citibank", "4011"),
];
const UNKNOWN_BANK_CODE: &str = "6225";
const DEFAULT_CARD_LENGTH: usize = 19;

pub fn register(registry: &mut PlaceholderRegistry) {
    registry.register_placeholder(Box::new(VocabularyPlaceholder {
        name: "company",
        category: "companies",
        fallback: COMPANIES,
    }));
    registry.register_placeholder(Box::new(VocabularyPlaceholder {
        name: "profession",
        category: "professions",
        fallback: PROFESSIONS,
    }));
    registry.register_placeholder(Box::new(BankCardPlaceholder));
}

/// `bankCard(bankName, length, cardType)`: Luhn-valid card number.
///
/// The prefix comes from the `bankCodes` corpus (`name,code` lines). Credit
/// cards keep the first three code digits and end the prefix with `1`.
struct BankCardPlaceholder;

impl Placeholder for BankCardPlaceholder {
    fn name(&self) -> &'static str {
        "bankCard"
    }

    fn resolve(
        &self,
        ctx: &mut ResolutionContext<'_>,
        args: &Args<'_>,
    ) -> Result<Value, GenerationError> {
        let banks = bank_codes(ctx);
        let code = match args.get_str(0).filter(|name| !name.is_empty()) {
            Some(name) => banks
                .iter()
                .find(|(bank, _)| bank.eq_ignore_ascii_case(name.trim()))
                .map(|(_, code)| code.clone())
                .unwrap_or_else(|| UNKNOWN_BANK_CODE.to_string()),
            None if banks.is_empty() => UNKNOWN_BANK_CODE.to_string(),
            None => banks[ctx.rng().random_range(0..banks.len())].1.clone(),
        };
        let length = args
            .get_usize(1)
            .filter(|length| *length >= 8)
            .unwrap_or(DEFAULT_CARD_LENGTH);
        let credit = args
            .get_str(2)
            .is_some_and(|kind| kind.eq_ignore_ascii_case("credit"));

        let prefix = if credit {
            let head: String = code.chars().take(3).collect();
            format!("{head}1")
        } else {
            code
        };
        Ok(Value::String(card_number(ctx, &prefix, length)))
    }
}

fn bank_codes(ctx: &mut ResolutionContext<'_>) -> Vec<(String, String)> {
    let parsed: Vec<(String, String)> = ctx
        .vocabulary("bankCodes")
        .iter()
        .filter_map(|line| {
            let (name, code) = line.rsplit_once(',')?;
            let code = code.trim();
            (!code.is_empty() && code.bytes().all(|b| b.is_ascii_digit()))
                .then(|| (name.trim().to_string(), code.to_string()))
        })
        .collect();
    if !parsed.is_empty() {
        return parsed;
    }
    BANK_CODES
        .iter()
        .map(|(name, code)| (name.to_string(), code.to_string()))
        .collect()
}

fn card_number(ctx: &mut ResolutionContext<'_>, prefix: &str, length: usize) -> String {
    let mut digits: Vec<u8> = prefix
        .bytes()
        .filter(u8::is_ascii_digit)
        .map(|b| b - b'0')
        .take(length - 1)
        .collect();
    while digits.len() < length - 1 {
        digits.push(ctx.rng().random_range(0..=9));
    }
    digits.push(luhn_check_digit(&digits));
    digits.iter().map(|d| char::from(b'0' + d)).collect()
}

/// Check digit that makes `digits` followed by it pass the Luhn test.
pub fn luhn_check_digit(digits: &[u8]) -> u8 {
    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(index, &digit)| {
            let digit = u32::from(digit);
            if index % 2 == 0 {
                let doubled = digit * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                digit
            }
        })
        .sum();
    ((10 - sum % 10) % 10) as u8
}

pub fn luhn_valid(number: &str) -> bool {
    let digits: Vec<u8> = number.bytes().map(|b| b.wrapping_sub(b'0')).collect();
    match digits.split_last() {
        Some((check, body)) if digits.iter().all(|d| *d <= 9) => luhn_check_digit(body) == *check,
        _ => false,
    }
}
