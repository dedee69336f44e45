use rand::Rng;
use serde_json::Value;

use crate::context::ResolutionContext;
use crate::errors::GenerationError;
use crate::params::Args;
use crate::placeholder::{
    LOWER, Placeholder, PlaceholderRegistry, VocabularyPlaceholder, random_between, random_chars,
};

const EMAIL_DOMAINS: &[&str] = &["example.com", "test.org", "sample.net", "demo.io", "mock.dev"];
const TLDS: &[&str] = &["com", "org", "net", "edu", "gov", "io", "co", "me"];
const PROTOCOLS: &[&str] = &["http", "https"];

pub fn register(registry: &mut PlaceholderRegistry) {
    registry.register_placeholder(Box::new(VocabularyPlaceholder {
        name: "emailDomain",
        category: "emailDomains",
        fallback: EMAIL_DOMAINS,
    }));
    registry.register_placeholder(Box::new(VocabularyPlaceholder {
        name: "tld",
        category: "tlds",
        fallback: TLDS,
    }));
    registry.register_placeholder(Box::new(DomainPlaceholder));
    registry.register_placeholder(Box::new(UrlPlaceholder));
    registry.register_placeholder(Box::new(EmailPlaceholder));
    registry.register_placeholder(Box::new(IpPlaceholder));
}

fn domain(ctx: &mut ResolutionContext<'_>, tld: Option<String>) -> String {
    let len = random_between(ctx, 4, 10) as usize;
    let label = random_chars(ctx, LOWER, len);
    let tld = tld.unwrap_or_else(|| ctx.pick_vocabulary("tlds", TLDS));
    format!("{label}.{tld}")
}

struct DomainPlaceholder;

impl Placeholder for DomainPlaceholder {
    fn name(&self) -> &'static str {
        "domain"
    }

    fn resolve(
        &self,
        ctx: &mut ResolutionContext<'_>,
        args: &Args<'_>,
    ) -> Result<Value, GenerationError> {
        Ok(Value::String(domain(ctx, args.get_str(0))))
    }
}

/// `url(protocol, host)`; both parts are random when omitted.
struct UrlPlaceholder;

impl Placeholder for UrlPlaceholder {
    fn name(&self) -> &'static str {
        "url"
    }

    fn resolve(
        &self,
        ctx: &mut ResolutionContext<'_>,
        args: &Args<'_>,
    ) -> Result<Value, GenerationError> {
        let protocol = args.get_str(0).unwrap_or_else(|| {
            PROTOCOLS[ctx.rng().random_range(0..PROTOCOLS.len())].to_string()
        });
        let host = match args.get_str(1) {
            Some(host) => host,
            None => domain(ctx, None),
        };
        let len = random_between(ctx, 3, 10) as usize;
        let path = random_chars(ctx, LOWER, len);
        Ok(Value::String(format!("{protocol}://{host}/{path}")))
    }
}

struct EmailPlaceholder;

impl Placeholder for EmailPlaceholder {
    fn name(&self) -> &'static str {
        "email"
    }

    fn resolve(
        &self,
        ctx: &mut ResolutionContext<'_>,
        args: &Args<'_>,
    ) -> Result<Value, GenerationError> {
        let len = random_between(ctx, 5, 12) as usize;
        let user = random_chars(ctx, LOWER, len);
        let host = match args.get_str(0) {
            Some(host) => host,
            None => ctx.pick_vocabulary("emailDomains", EMAIL_DOMAINS),
        };
        Ok(Value::String(format!("{user}@{host}")))
    }
}

struct IpPlaceholder;

impl Placeholder for IpPlaceholder {
    fn name(&self) -> &'static str {
        "ip"
    }

    fn resolve(
        &self,
        ctx: &mut ResolutionContext<'_>,
        _args: &Args<'_>,
    ) -> Result<Value, GenerationError> {
        let octets: [u8; 4] = ctx.rng().random();
        Ok(Value::String(std::net::Ipv4Addr::from(octets).to_string()))
    }
}
