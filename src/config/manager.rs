use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::paths;
use crate::translation::validate_language;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_CALLBACK_PATH: &str = "/callback";
pub const DEFAULT_COMPLETION_ENDPOINT: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_COMPLETION_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const DEFAULT_TRANSLATION_ENDPOINT: &str = "https://api-free.deepl.com/v2/translate";
pub const DEFAULT_TARGET_LANGUAGE: &str = "en";
pub const DEFAULT_REPLY_ENDPOINT: &str = "https://api.line.me/v2/bot/message/reply";
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ACCESS_TOKEN_ENV: &str = "LINE_CHANNEL_ACCESS_TOKEN";
pub const CHANNEL_SECRET_ENV: &str = "LINE_CHANNEL_SECRET";
pub const DEEPL_API_KEY_ENV: &str = "DEEPL_API_KEY";

/// `[server]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerSection {
    pub host: Option<String>,
    pub port: Option<u16>,
    /// Path the webhook is registered under.
    pub callback_path: Option<String>,
}

/// `[completion]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompletionSection {
    /// OpenAI-compatible base URL (without `/v1/chat/completions`).
    pub endpoint: Option<String>,
    /// Model used for new sessions.
    pub model: Option<String>,
    /// API key stored directly in config (not recommended).
    #[serde(default)]
    pub api_key: Option<String>,
    /// Environment variable name containing the API key.
    #[serde(default)]
    pub api_key_env: Option<String>,
    /// Upper bound on stored messages per user; 0 keeps the history unbounded.
    pub max_history_messages: Option<usize>,
}

impl CompletionSection {
    /// Gets the API key, preferring environment variable over config file.
    pub fn get_api_key(&self) -> Option<String> {
        let env_var = self
            .api_key_env
            .as_deref()
            .unwrap_or(DEFAULT_COMPLETION_API_KEY_ENV);

        if let Ok(key) = std::env::var(env_var)
            && !key.is_empty()
        {
            return Some(key);
        }
        self.api_key.clone()
    }
}

/// `[translation]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranslationSection {
    pub endpoint: Option<String>,
    /// Initial target language code.
    pub to: Option<String>,
}

/// `[line]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LineSection {
    pub reply_endpoint: Option<String>,
}

/// `[sessions]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionsSection {
    /// Seconds a session may stay idle before eviction; 0 disables expiry.
    pub idle_ttl_secs: Option<u64>,
    pub sweep_interval_secs: Option<u64>,
}

/// `[http]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HttpSection {
    /// Timeout applied to every outbound request.
    pub timeout_secs: Option<u64>,
}

/// The complete configuration file structure.
///
/// Corresponds to `~/.config/line-relay/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub completion: CompletionSection,
    #[serde(default)]
    pub translation: TranslationSection,
    #[serde(default)]
    pub line: LineSection,
    #[serde(default)]
    pub sessions: SessionsSection,
    #[serde(default)]
    pub http: HttpSection,
}

/// Credentials that must be present before the server starts.
#[derive(Clone)]
pub struct Secrets {
    pub channel_access_token: String,
    pub channel_secret: String,
    pub deepl_api_key: String,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets").finish_non_exhaustive()
    }
}

impl Secrets {
    /// Reads the secrets from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the secrets through `lookup`; empty values count as missing.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let require = |name: &str| {
            lookup(name).filter(|value| !value.is_empty()).ok_or_else(|| {
                anyhow::anyhow!(
                    "Missing required environment variable: {name}\n\n\
                     Set it before starting the server:\n  \
                     export {name}=\"...\""
                )
            })
        };

        Ok(Self {
            channel_access_token: require(ACCESS_TOKEN_ENV)?,
            channel_secret: require(CHANNEL_SECRET_ENV)?,
            deepl_api_key: require(DEEPL_API_KEY_ENV)?,
        })
    }
}

/// Resolved configuration after merging CLI arguments, config file and defaults.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub host: String,
    pub port: u16,
    pub callback_path: String,
    pub completion_endpoint: String,
    pub model: String,
    pub completion_api_key: Option<String>,
    pub max_history_messages: usize,
    pub translation_endpoint: String,
    pub target_language: String,
    pub reply_endpoint: String,
    pub idle_ttl: Option<Duration>,
    pub sweep_interval: Duration,
    pub timeout: Duration,
    pub secrets: Secrets,
}

/// Options for resolving configuration.
///
/// Contains CLI overrides that take precedence over config file values.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub model: Option<String>,
    /// Initial target language override.
    pub to: Option<String>,
}

/// Resolves configuration by merging CLI options with config file settings.
///
/// CLI options take precedence over config file values, which take
/// precedence over built-in defaults.
///
/// # Errors
///
/// Returns an error if a value is present but unusable (unknown target
/// language, callback path without a leading `/`, zero timeout).
pub fn resolve_config(
    options: &ResolveOptions,
    config_file: &ConfigFile,
    secrets: Secrets,
) -> Result<ResolvedConfig> {
    let host = options
        .host
        .clone()
        .or_else(|| config_file.server.host.clone())
        .unwrap_or_else(|| DEFAULT_HOST.to_string());

    let port = options
        .port
        .or(config_file.server.port)
        .unwrap_or(DEFAULT_PORT);

    let callback_path = config_file
        .server
        .callback_path
        .clone()
        .unwrap_or_else(|| DEFAULT_CALLBACK_PATH.to_string());
    if !callback_path.starts_with('/') {
        bail!("Invalid callback_path '{callback_path}': it must start with '/'");
    }

    let model = options
        .model
        .clone()
        .or_else(|| config_file.completion.model.clone())
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());

    let target_language = options
        .to
        .clone()
        .or_else(|| config_file.translation.to.clone())
        .unwrap_or_else(|| DEFAULT_TARGET_LANGUAGE.to_string());
    validate_language(&target_language)?;

    let timeout_secs = config_file
        .http
        .timeout_secs
        .unwrap_or(DEFAULT_TIMEOUT_SECS);
    if timeout_secs == 0 {
        bail!("Invalid http.timeout_secs: it must be greater than 0");
    }

    let sweep_interval_secs = config_file
        .sessions
        .sweep_interval_secs
        .unwrap_or(DEFAULT_SWEEP_INTERVAL_SECS);
    if sweep_interval_secs == 0 {
        bail!("Invalid sessions.sweep_interval_secs: it must be greater than 0");
    }

    let idle_ttl = config_file
        .sessions
        .idle_ttl_secs
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs);

    Ok(ResolvedConfig {
        host,
        port,
        callback_path,
        completion_endpoint: config_file
            .completion
            .endpoint
            .clone()
            .unwrap_or_else(|| DEFAULT_COMPLETION_ENDPOINT.to_string()),
        model,
        completion_api_key: config_file.completion.get_api_key(),
        max_history_messages: config_file.completion.max_history_messages.unwrap_or(0),
        translation_endpoint: config_file
            .translation
            .endpoint
            .clone()
            .unwrap_or_else(|| DEFAULT_TRANSLATION_ENDPOINT.to_string()),
        target_language,
        reply_endpoint: config_file
            .line
            .reply_endpoint
            .clone()
            .unwrap_or_else(|| DEFAULT_REPLY_ENDPOINT.to_string()),
        idle_ttl,
        sweep_interval: Duration::from_secs(sweep_interval_secs),
        timeout: Duration::from_secs(timeout_secs),
        secrets,
    })
}

/// Loads configuration files.
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Creates a config manager for the default location.
    ///
    /// Configuration is read from `$XDG_CONFIG_HOME/line-relay/config.toml`
    /// or `~/.config/line-relay/config.toml` if `XDG_CONFIG_HOME` is not set.
    pub fn new() -> Result<Self> {
        Ok(Self {
            config_path: paths::config_dir()?.join("config.toml"),
        })
    }

    pub fn with_path(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn load(&self) -> Result<ConfigFile> {
        let contents = fs::read_to_string(&self.config_path).with_context(|| {
            format!("Failed to read config file: {}", self.config_path.display())
        })?;

        let config_file: ConfigFile = toml::from_str(&contents).with_context(|| {
            format!(
                "Failed to parse config file: {}",
                self.config_path.display()
            )
        })?;

        Ok(config_file)
    }

    /// Loads the config file, treating a missing file as empty.
    ///
    /// A file that exists but cannot be read or parsed is still an error.
    pub fn load_or_default(&self) -> Result<ConfigFile> {
        match fs::metadata(&self.config_path) {
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(
                    path = %self.config_path.display(),
                    "No config file, using defaults"
                );
                Ok(ConfigFile::default())
            }
            _ => self.load(),
        }
    }
}
