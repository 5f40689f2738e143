//! System prompt for the research assistant
//!
//! This module contains the default system prompt for the agent.

/// The default system prompt for the research agent
pub const SYSTEM_PROMPT: &str = r#"You are a helpful research assistant. Use tools when needed:
- Use web_search for up-to-date facts, news, or current names.
- Use wikipedia for general background and stable reference info.
Keep answers concise and include 1-3 short source URLs in parentheses."#;

/// Get the default system prompt
pub fn default_system_prompt() -> &'static str {
    SYSTEM_PROMPT
}

/// Sample questions offered by the console
pub const EXAMPLE_QUESTIONS: [(&str, &str); 4] = [
    (
        "Current Bears quarterback?",
        "Who is the quarterback for the Chicago Bears right now?",
    ),
    (
        "Latest Rust release?",
        "What is the latest stable Rust release version?",
    ),
    ("What is Tokio?", "What is Tokio and who maintains it?"),
    (
        "Who is Tim Berners-Lee?",
        "Who is Tim Berners-Lee? Provide a concise summary.",
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_names_tools() {
        let prompt = default_system_prompt();
        assert!(prompt.contains("web_search"));
        assert!(prompt.contains("wikipedia"));
    }
}
