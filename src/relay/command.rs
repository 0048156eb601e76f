//! Chat command parsing.
//!
//! Commands are matched against the whole message text, case-sensitively.
//! Anything that is not exactly a command is text to summarize.

/// Reply sent after the conversation history is cleared.
pub const RESET_CONFIRMATION: &str = "今までの会話履歴を削除しました。\n新たな会話を始めます。";

/// Reply sent after the translation target is set to English.
pub const SET_EN_CONFIRMATION: &str = "翻訳先言語を英語に設定しました。";

/// Reply sent after the translation target is set to Japanese.
pub const SET_JA_CONFIRMATION: &str = "翻訳先言語を日本語に設定しました。";

/// Reply sent when the completion or translation round-trip fails.
pub const FALLBACK_REPLY: &str =
    "申し訳ありません。応答を生成できませんでした。\nしばらくしてからもう一度お試しください。";

// Available commands: (command, description)
pub const COMMANDS: &[(&str, &str)] = &[
    ("/new chat", "Clear the conversation history"),
    ("/set en", "Translate replies into English"),
    ("/set ja", "Translate replies into Japanese"),
];

/// Translation targets selectable from chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetLanguage {
    English,
    Japanese,
}

impl TargetLanguage {
    pub const fn code(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Japanese => "ja",
        }
    }

    pub const fn confirmation(self) -> &'static str {
        match self {
            Self::English => SET_EN_CONFIRMATION,
            Self::Japanese => SET_JA_CONFIRMATION,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'a> {
    NewChat,
    SetLanguage(TargetLanguage),
    Summarize(&'a str),
}

pub fn parse_command(text: &str) -> Command<'_> {
    match text {
        "/new chat" => Command::NewChat,
        "/set en" => Command::SetLanguage(TargetLanguage::English),
        "/set ja" => Command::SetLanguage(TargetLanguage::Japanese),
        _ => Command::Summarize(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_new_chat() {
        assert_eq!(parse_command("/new chat"), Command::NewChat);
    }

    #[test]
    fn test_parse_set_language() {
        assert_eq!(
            parse_command("/set en"),
            Command::SetLanguage(TargetLanguage::English)
        );
        assert_eq!(
            parse_command("/set ja"),
            Command::SetLanguage(TargetLanguage::Japanese)
        );
    }

    #[test]
    fn test_parse_plain_text() {
        assert_eq!(parse_command("Hello"), Command::Summarize("Hello"));
    }

    #[test]
    fn test_commands_are_case_sensitive() {
        assert_eq!(parse_command("/New Chat"), Command::Summarize("/New Chat"));
        assert_eq!(parse_command("/SET EN"), Command::Summarize("/SET EN"));
    }

    #[test]
    fn test_commands_require_exact_match() {
        assert_eq!(parse_command(" /new chat"), Command::Summarize(" /new chat"));
        assert_eq!(parse_command("/new chat "), Command::Summarize("/new chat "));
        assert_eq!(parse_command("/set fr"), Command::Summarize("/set fr"));
        assert_eq!(parse_command("/set"), Command::Summarize("/set"));
    }

    #[test]
    fn test_target_language_codes() {
        assert_eq!(TargetLanguage::English.code(), "en");
        assert_eq!(TargetLanguage::Japanese.code(), "ja");
        assert_eq!(TargetLanguage::English.confirmation(), SET_EN_CONFIRMATION);
        assert_eq!(TargetLanguage::Japanese.confirmation(), SET_JA_CONFIRMATION);
    }

    #[test]
    fn test_command_table_matches_parser() {
        for (command, _) in COMMANDS {
            assert!(!matches!(parse_command(command), Command::Summarize(_)));
        }
    }
}
