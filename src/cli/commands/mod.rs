//! Subcommand implementations.

/// Webhook server command handler.
pub mod serve;
