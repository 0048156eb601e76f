//! # line-relay - LINE webhook summarize-and-translate relay
//!
//! `line-relay` receives LINE Messaging API webhooks, asks an
//! OpenAI-compatible chat completion endpoint to summarize each text
//! message, translates the summary with a DeepL-compatible endpoint and
//! replies to the user.
//!
//! ## Chat commands
//!
//! - `/new chat` clears the sender's conversation history
//! - `/set en` translates all subsequent replies into English
//! - `/set ja` translates all subsequent replies into Japanese
//!
//! Any other text is summarized. The translation target is shared by all
//! users; the conversation history is kept per user.
//!
//! ## Quick Start
//!
//! ```bash
//! export LINE_CHANNEL_ACCESS_TOKEN=...
//! export LINE_CHANNEL_SECRET=...
//! export DEEPL_API_KEY=...
//! export OPENAI_API_KEY=...
//!
//! line-relay --port 8000
//! ```
//!
//! ## Configuration
//!
//! Optional settings are read from `~/.config/line-relay/config.toml`:
//!
//! ```toml
//! [completion]
//! model = "gpt-3.5-turbo"
//! max_history_messages = 20
//!
//! [translation]
//! to = "ja"
//!
//! [sessions]
//! idle_ttl_secs = 86400
//! ```

/// Command-line interface definitions and handlers.
pub mod cli;

/// OpenAI-compatible chat completion client.
pub mod completion;

/// Configuration file, environment secrets and override resolution.
pub mod config;

/// Error taxonomy and HTTP status mapping.
pub mod error;

/// LINE webhook signature, events and reply client.
pub mod line;

/// XDG-style path utilities for configuration.
pub mod paths;

/// Command dispatch and the summarize-then-translate round-trip.
pub mod relay;

/// Webhook HTTP server.
pub mod server;

/// Per-user conversation sessions.
pub mod session;

/// DeepL-compatible translation client.
pub mod translation;
