use reqwest::Client;
use serde::Serialize;

use crate::error::{RelayError, Result, Service};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplyRequest<'a> {
    reply_token: &'a str,
    messages: [TextSendMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct TextSendMessage<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
}

/// Sends replies through the Messaging API reply endpoint.
pub struct ReplyClient {
    client: Client,
    endpoint: String,
    access_token: String,
}

impl ReplyClient {
    pub const fn new(client: Client, endpoint: String, access_token: String) -> Self {
        Self {
            client,
            endpoint,
            access_token,
        }
    }

    /// Replies to the event identified by `reply_token` with a single text message.
    ///
    /// Reply tokens are single-use; the platform rejects a second reply.
    pub async fn reply_text(&self, reply_token: &str, text: &str) -> Result<()> {
        let request = ReplyRequest {
            reply_token,
            messages: [TextSendMessage { kind: "text", text }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.access_token)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RelayError::UpstreamStatus {
                service: Service::Reply,
                status,
                body,
            });
        }

        tracing::debug!(chars = text.chars().count(), "Reply sent");
        Ok(())
    }
}
