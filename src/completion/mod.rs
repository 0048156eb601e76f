mod client;
mod prompt;

pub use client::{Choice, ChoiceMessage, CompletionClient, CompletionResponse, Usage};
pub use prompt::{SUMMARY_PROMPT_TEMPLATE, build_summary_prompt};
