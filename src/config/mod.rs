//! Configuration loading: TOML file, environment secrets and CLI overrides.

mod manager;

pub use manager::{
    ACCESS_TOKEN_ENV, CHANNEL_SECRET_ENV, CompletionSection, ConfigFile, ConfigManager,
    DEEPL_API_KEY_ENV, DEFAULT_CALLBACK_PATH, DEFAULT_COMPLETION_API_KEY_ENV,
    DEFAULT_COMPLETION_ENDPOINT, DEFAULT_HOST, DEFAULT_MODEL, DEFAULT_PORT,
    DEFAULT_REPLY_ENDPOINT, DEFAULT_SWEEP_INTERVAL_SECS, DEFAULT_TARGET_LANGUAGE,
    DEFAULT_TIMEOUT_SECS, DEFAULT_TRANSLATION_ENDPOINT, HttpSection, LineSection,
    ResolveOptions, ResolvedConfig, Secrets, ServerSection, SessionsSection, TranslationSection,
    resolve_config,
};
