use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::{PoisonError, RwLock};

use crate::error::{RelayError, Result, Service};

#[derive(Debug, Serialize)]
struct TranslateForm<'a> {
    text: &'a str,
    target_lang: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(default)]
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
struct Translation {
    text: String,
    #[serde(default)]
    detected_source_language: Option<String>,
}

/// Client for DeepL-compatible `/v2/translate` endpoints.
///
/// The target language is shared by every caller holding this client.
pub struct TranslationClient {
    client: Client,
    endpoint: String,
    api_key: String,
    target_language: RwLock<String>,
}

impl TranslationClient {
    pub fn new(
        client: Client,
        endpoint: String,
        api_key: String,
        target_language: impl Into<String>,
    ) -> Self {
        Self {
            client,
            endpoint,
            api_key,
            target_language: RwLock::new(target_language.into()),
        }
    }

    /// Changes the language used by all subsequent translations.
    pub fn set_target_language(&self, code: &str) {
        *self
            .target_language
            .write()
            .unwrap_or_else(PoisonError::into_inner) = code.to_string();
        tracing::info!(target_language = code, "Translation target changed");
    }

    pub fn target_language(&self) -> String {
        self.target_language
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Translates `text` into the current target language.
    pub async fn translate(&self, text: &str) -> Result<String> {
        let target_language = self.target_language();
        let form = TranslateForm {
            text,
            target_lang: &target_language,
        };

        tracing::debug!(
            endpoint = %self.endpoint,
            target_language = %target_language,
            chars = text.chars().count(),
            "Requesting translation"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("DeepL-Auth-Key {}", self.api_key))
            .form(&form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RelayError::UpstreamStatus {
                service: Service::Translation,
                status,
                body,
            });
        }

        let body: TranslateResponse = response.json().await?;
        first_translation(body)
    }
}

fn first_translation(body: TranslateResponse) -> Result<String> {
    let translation = body
        .translations
        .into_iter()
        .next()
        .ok_or(RelayError::MissingField {
            service: Service::Translation,
            field: "translations",
        })?;

    if let Some(source) = &translation.detected_source_language {
        tracing::debug!(detected_source_language = %source, "Translation finished");
    }

    Ok(translation.text)
}
