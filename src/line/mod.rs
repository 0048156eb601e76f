//! LINE Messaging API plumbing: webhook signature, event model and replies.

/// Webhook body and event types.
pub mod event;
mod reply;
/// `X-Line-Signature` computation and verification.
pub mod signature;

pub use event::{TextMessage, WebhookBody};
pub use reply::ReplyClient;
pub use signature::SIGNATURE_HEADER;
