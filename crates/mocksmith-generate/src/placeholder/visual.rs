use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rand::Rng;
use serde_json::Value;

use crate::context::ResolutionContext;
use crate::errors::GenerationError;
use crate::params::Args;
use crate::placeholder::{Placeholder, PlaceholderRegistry};

const DEFAULT_IMAGE_SIZE: &str = "200x100";
const DEFAULT_FOREGROUND: &str = "FFFFFF";
const IMAGE_TEXTS: &[&str] = &["Mock"];

pub fn register(registry: &mut PlaceholderRegistry) {
    registry.register_placeholder(Box::new(ColorPlaceholder));
    registry.register_placeholder(Box::new(ImagePlaceholder));
    registry.register_placeholder(Box::new(DataImagePlaceholder));
}

fn hex_color(ctx: &mut ResolutionContext<'_>) -> String {
    let rgb: [u8; 3] = ctx.rng().random();
    hex::encode(rgb)
}

struct ColorPlaceholder;

impl Placeholder for ColorPlaceholder {
    fn name(&self) -> &'static str {
        "color"
    }

    fn resolve(
        &self,
        ctx: &mut ResolutionContext<'_>,
        _args: &Args<'_>,
    ) -> Result<Value, GenerationError> {
        Ok(Value::String(format!("#{}", hex_color(ctx))))
    }
}

/// `image(size, background, foreground, text)` placeholder-service URL.
struct ImagePlaceholder;

impl Placeholder for ImagePlaceholder {
    fn name(&self) -> &'static str {
        "image"
    }

    fn resolve(
        &self,
        ctx: &mut ResolutionContext<'_>,
        args: &Args<'_>,
    ) -> Result<Value, GenerationError> {
        let size = args
            .get_str(0)
            .unwrap_or_else(|| DEFAULT_IMAGE_SIZE.to_string());
        let background = match args.get_str(1) {
            Some(color) => color.trim_start_matches('#').to_string(),
            None => hex_color(ctx),
        };
        let foreground = args
            .get_str(2)
            .map(|color| color.trim_start_matches('#').to_string())
            .unwrap_or_else(|| DEFAULT_FOREGROUND.to_string());
        let text = match args.get_str(3) {
            Some(text) => text,
            None => ctx.pick_vocabulary("imageTexts", IMAGE_TEXTS),
        };
        Ok(Value::String(format!(
            "https://via.placeholder.com/{size}/{background}/{foreground}?text={}",
            text.replace(' ', "+")
        )))
    }
}

/// `dataImage(size, text)`: inline SVG as a base64 data URI.
struct DataImagePlaceholder;

impl Placeholder for DataImagePlaceholder {
    fn name(&self) -> &'static str {
        "dataImage"
    }

    fn resolve(
        &self,
        ctx: &mut ResolutionContext<'_>,
        args: &Args<'_>,
    ) -> Result<Value, GenerationError> {
        let size = args
            .get_str(0)
            .unwrap_or_else(|| DEFAULT_IMAGE_SIZE.to_string());
        let (width, height) = size
            .split_once('x')
            .and_then(|(w, h)| Some((w.trim().parse::<u32>().ok()?, h.trim().parse::<u32>().ok()?)))
            .unwrap_or((200, 100));
        let text = match args.get_str(1) {
            Some(text) => text,
            None => ctx.pick_vocabulary("imageTexts", IMAGE_TEXTS),
        };
        let background = hex_color(ctx);
        let svg = format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\">\
             <rect width=\"100%\" height=\"100%\" fill=\"#{background}\"/>\
             <text x=\"50%\" y=\"50%\" fill=\"#{DEFAULT_FOREGROUND}\" text-anchor=\"middle\" \
             dominant-baseline=\"middle\">{}</text></svg>",
            escape_xml(&text)
        );
        Ok(Value::String(format!(
            "data:image/svg+xml;base64,{}",
            STANDARD.encode(svg)
        )))
    }
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
