pub mod adapter;
pub mod locales;

pub use adapter::{FAKER_CATEGORIES, FakeRsAdapter};
pub use locales::FakerLocale;
