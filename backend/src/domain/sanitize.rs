//! Input sanitisation helpers.
//!
//! Free-text fields (check-in notes, reviews, bios) are stripped of markup
//! and script-bearing fragments before they reach persistence. This is
//! defence against stored markup, not a substitute for output encoding.

use std::sync::OnceLock;

use regex::Regex;

/// Maximum length retained for free-text input, in characters.
pub const TEXT_MAX: usize = 1000;

/// Maximum length retained for usernames, in characters.
pub const USERNAME_MAX: usize = 30;

static SCRIPT_FRAGMENT_RE: OnceLock<Regex> = OnceLock::new();

fn script_fragment_regex() -> &'static Regex {
    SCRIPT_FRAGMENT_RE.get_or_init(|| {
        // javascript:/data: schemes and inline event handlers such as onclick=.
        let pattern = r"(?i)javascript:|data:|on\w+\s*=";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("sanitiser regex failed to compile: {error}"))
    })
}

/// Sanitise free-text user input.
///
/// Removes angle brackets, `javascript:`/`data:` scheme prefixes, and inline
/// event-handler fragments, trims surrounding whitespace, and caps the result
/// at [`TEXT_MAX`] characters.
///
/// # Examples
/// ```
/// use hotspots_backend::domain::sanitize::sanitize_text;
///
/// assert_eq!(sanitize_text("<b>hi</b>"), "bhi/b");
/// assert_eq!(sanitize_text("  padded  "), "padded");
/// ```
pub fn sanitize_text(input: &str) -> String {
    let without_brackets: String = input.chars().filter(|c| *c != '<' && *c != '>').collect();
    let cleaned = script_fragment_regex().replace_all(&without_brackets, "");
    cleaned.trim().chars().take(TEXT_MAX).collect()
}

/// Sanitise a username: only alphanumerics, underscore, and hyphen survive,
/// capped at [`USERNAME_MAX`] characters.
pub fn sanitize_username(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .take(USERNAME_MAX)
        .collect()
}

/// Sanitise an avatar URL. Only `https` URLs are accepted; anything else
/// collapses to the empty string (meaning "no avatar").
pub fn sanitize_avatar_url(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    if trimmed.len() <= 2048 && trimmed.starts_with("https://") {
        trimmed.to_owned()
    } else {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("<script>alert(1)</script>", "scriptalert(1)/script")]
    #[case("javascript:alert(1)", "alert(1)")]
    #[case("a onclick=evil b", "a evil b")]
    #[case("data:text/html,x", "text/html,x")]
    #[case("  plain note  ", "plain note")]
    fn strips_dangerous_fragments(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(sanitize_text(input), expected);
    }

    #[rstest]
    fn caps_text_at_limit() {
        let long = "x".repeat(TEXT_MAX + 50);
        assert_eq!(sanitize_text(&long).chars().count(), TEXT_MAX);
    }

    #[rstest]
    #[case("ada_lovelace", "ada_lovelace")]
    #[case("ada lovelace!", "adalovelace")]
    #[case("<ada>", "ada")]
    fn username_keeps_safe_characters(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(sanitize_username(input), expected);
    }

    #[rstest]
    #[case("https://img.example/a.png", "https://img.example/a.png")]
    #[case("http://img.example/a.png", "")]
    #[case("javascript:alert(1)", "")]
    #[case("", "")]
    fn avatar_url_requires_https(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(sanitize_avatar_url(input), expected);
    }
}
