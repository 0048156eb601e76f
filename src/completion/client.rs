use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{RelayError, Result, Service};
use crate::session::{Message, Role, Session};

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    stream: bool,
}

/// Response body of a non-streaming chat completion.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionResponse {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

impl CompletionResponse {
    /// Content of the first choice.
    pub fn first_content(&self) -> Result<&str> {
        let choice = self.choices.first().ok_or(RelayError::MissingField {
            service: Service::Completion,
            field: "choices",
        })?;

        choice
            .message
            .content
            .as_deref()
            .ok_or(RelayError::MissingField {
                service: Service::Completion,
                field: "choices[0].message.content",
            })
    }
}

/// Client for OpenAI-compatible `/v1/chat/completions` endpoints.
pub struct CompletionClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl CompletionClient {
    pub const fn new(client: Client, endpoint: String, api_key: Option<String>) -> Self {
        Self {
            client,
            endpoint,
            api_key,
        }
    }

    fn url(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.endpoint.trim_end_matches('/')
        )
    }

    /// Sends the session's model and full history and returns the parsed response.
    pub async fn complete(&self, session: &Session) -> Result<CompletionResponse> {
        let url = self.url();

        let chat_request = ChatCompletionRequest {
            model: session.model(),
            messages: session.messages(),
            stream: false,
        };

        let mut http_request = self.client.post(&url).json(&chat_request);

        if let Some(api_key) = &self.api_key {
            http_request = http_request.bearer_auth(api_key);
        }

        tracing::debug!(
            %url,
            model = session.model(),
            messages = session.len(),
            "Requesting chat completion"
        );

        let response = http_request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RelayError::UpstreamStatus {
                service: Service::Completion,
                status,
                body,
            });
        }

        let completion: CompletionResponse = response.json().await?;

        if let Some(usage) = completion.usage {
            tracing::debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                total_tokens = usage.total_tokens,
                "Chat completion finished"
            );
        }

        Ok(completion)
    }
}
