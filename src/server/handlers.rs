use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use bytes::Bytes;
use serde_json::{Value, json};
use std::sync::Arc;

use super::AppState;
use crate::error::{RelayError, Result};
use crate::line::{SIGNATURE_HEADER, WebhookBody, signature};

/// `POST /callback`: verifies, parses and answers a webhook delivery.
///
/// Events are handled in delivery order and each text message gets exactly
/// one reply. A reply failure aborts the remaining events.
pub async fn callback(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<&'static str> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or(RelayError::MissingSignature)?;

    signature::verify(&state.channel_secret, &body, signature)?;

    let webhook = WebhookBody::parse(&body)?;
    let messages = webhook.text_messages();
    tracing::debug!(
        events = webhook.events.len(),
        text_messages = messages.len(),
        "Webhook received"
    );

    for message in messages {
        tracing::debug!(user_id = %message.user_id, text = %message.text, "Handling message");

        let reply = state
            .relay
            .handle_text(&message.user_id, &message.text)
            .await;

        state
            .reply
            .reply_text(&message.reply_token, &reply)
            .await?;
    }

    Ok("OK")
}

/// `GET /health`: liveness plus the number of live sessions.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "sessions": state.relay.sessions().len(),
    }))
}
