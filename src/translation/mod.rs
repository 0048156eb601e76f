mod client;
mod language;

pub use client::TranslationClient;
pub use language::{SUPPORTED_LANGUAGES, print_languages, validate_language};
