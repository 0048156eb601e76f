//! Webhook request body model.
//!
//! Only text message events are acted on; every other event or message type
//! deserializes into an `Other` variant and is skipped.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookBody {
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Event {
    Message(MessageEvent),
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEvent {
    /// Absent for events delivered in standby mode.
    #[serde(default)]
    pub reply_token: Option<String>,
    pub source: Source,
    pub message: EventMessage,
    #[serde(default)]
    pub webhook_event_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Source {
    #[serde(rename_all = "camelCase")]
    User { user_id: String },
    #[serde(rename_all = "camelCase")]
    Group {
        group_id: String,
        user_id: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Room {
        room_id: String,
        user_id: Option<String>,
    },
}

impl Source {
    /// Id of the user who sent the event, if the platform disclosed it.
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Self::User { user_id } => Some(user_id),
            Self::Group { user_id, .. } | Self::Room { user_id, .. } => user_id.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EventMessage {
    Text { id: String, text: String },
    #[serde(other)]
    Other,
}

/// A text message ready for the relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMessage {
    pub user_id: String,
    pub reply_token: String,
    pub text: String,
}

impl WebhookBody {
    pub fn parse(body: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(body)
    }

    /// Text messages with a known sender, in delivery order.
    pub fn text_messages(&self) -> Vec<TextMessage> {
        self.events
            .iter()
            .filter_map(|event| {
                let Event::Message(event) = event else {
                    tracing::debug!("Skipping non-message event");
                    return None;
                };
                let EventMessage::Text { text, .. } = &event.message else {
                    tracing::debug!("Skipping non-text message");
                    return None;
                };
                let Some(reply_token) = &event.reply_token else {
                    tracing::debug!("Skipping message without reply token");
                    return None;
                };
                let Some(user_id) = event.source.user_id() else {
                    tracing::debug!("Skipping message without user id");
                    return None;
                };

                Some(TextMessage {
                    user_id: user_id.to_string(),
                    reply_token: reply_token.clone(),
                    text: text.clone(),
                })
            })
            .collect()
    }
}
