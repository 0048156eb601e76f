pub const SUMMARY_PROMPT_TEMPLATE: &str = "以下の文章を要約してください。\n{text}";

#[allow(clippy::literal_string_with_formatting_args)]
pub fn build_summary_prompt(text: &str) -> String {
    // {text} is a placeholder for string replacement, not a format argument
    SUMMARY_PROMPT_TEMPLATE.replace("{text}", text)
}
