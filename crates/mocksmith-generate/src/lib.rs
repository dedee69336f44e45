//! Template evaluation engine for mocksmith.
//!
//! Turns templates whose keys carry `name|rule` modifiers and whose strings
//! carry `@placeholder` expressions or `/regex/` literals into generated JSON
//! trees.

pub mod assets;
pub mod context;
pub mod errors;
pub mod evaluator;
pub mod extended;
pub mod faker_rs;
pub mod locale;
pub mod model;
pub mod numeric;
pub mod params;
pub mod placeholder;
pub mod regex_literal;

pub use assets::{AssetCorpus, WordSource, asset_corpus, default_word_source};
pub use context::ResolutionContext;
pub use errors::GenerationError;
pub use evaluator::{MAX_REPEAT_LEN, TemplateEvaluator};
pub use extended::{ExtendedOutcome, ExtendedRegistry, Handler, ParamHandler};
pub use locale::{current_locale, set_locale};
pub use model::MockOptions;
pub use placeholder::{Placeholder, PlaceholderRegistry, PlaceholderResolver, builtin_registry};
