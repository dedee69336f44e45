//! Process-wide default locale.
//!
//! Every evaluation snapshots this value into its `ResolutionContext`, so a
//! per-call locale in `MockOptions` never races with other callers. Changing
//! the default affects evaluations that start afterwards.

use std::sync::{OnceLock, RwLock};

use mocksmith_core::Locale;
use tracing::info;

fn current() -> &'static RwLock<Locale> {
    static CURRENT: OnceLock<RwLock<Locale>> = OnceLock::new();
    CURRENT.get_or_init(|| RwLock::new(Locale::default()))
}

pub fn set_locale(locale: Locale) {
    info!(locale = %locale, "default locale changed");
    match current().write() {
        Ok(mut guard) => *guard = locale,
        Err(poisoned) => *poisoned.into_inner() = locale,
    }
}

pub fn current_locale() -> Locale {
    match current().read() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}
