//! Message relay: command dispatch and the summarize-then-translate round-trip.

/// Chat command parsing and fixed replies.
pub mod command;

use crate::completion::{CompletionClient, build_summary_prompt};
use crate::error::Result;
use crate::session::{Role, Session, SessionRegistry};
use crate::translation::TranslationClient;

pub use command::{
    COMMANDS, Command, FALLBACK_REPLY, RESET_CONFIRMATION, SET_EN_CONFIRMATION,
    SET_JA_CONFIRMATION, TargetLanguage, parse_command,
};

/// Turns an inbound user text into the text to reply with.
pub struct Relay {
    sessions: SessionRegistry,
    completion: CompletionClient,
    translation: TranslationClient,
}

impl Relay {
    pub const fn new(
        sessions: SessionRegistry,
        completion: CompletionClient,
        translation: TranslationClient,
    ) -> Self {
        Self {
            sessions,
            completion,
            translation,
        }
    }

    pub const fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    pub const fn translation(&self) -> &TranslationClient {
        &self.translation
    }

    /// Handles one message from `user_id` and returns the reply text.
    ///
    /// The user's session stays locked until the reply text is ready, so
    /// messages from the same user are processed one at a time. Upstream
    /// failures produce [`FALLBACK_REPLY`] and leave the history untouched.
    pub async fn handle_text(&self, user_id: &str, text: &str) -> String {
        let handle = self.sessions.get_or_create(user_id);
        let mut session = handle.lock().await;

        match parse_command(text) {
            Command::NewChat => {
                session.reset();
                tracing::info!(user_id, "Conversation history cleared");
                RESET_CONFIRMATION.to_string()
            }
            Command::SetLanguage(language) => {
                self.translation.set_target_language(language.code());
                language.confirmation().to_string()
            }
            Command::Summarize(text) => match self.summarize(&mut session, text).await {
                Ok(reply) => reply,
                Err(e) => {
                    tracing::warn!(user_id, error = %e, "Falling back after upstream failure");
                    FALLBACK_REPLY.to_string()
                }
            },
        }
    }

    async fn summarize(&self, session: &mut Session, text: &str) -> Result<String> {
        // Work on a copy so a failed round-trip leaves no trace in the history.
        let mut draft = session.clone();
        draft.append_message(Role::User, build_summary_prompt(text));

        let response = self.completion.complete(&draft).await?;
        let content = response.first_content()?.trim().to_string();
        draft.append_message(Role::Assistant, content.as_str());

        let translated = self.translation.translate(&content).await?;

        *session = draft;
        Ok(translated.trim().to_string())
    }
}
