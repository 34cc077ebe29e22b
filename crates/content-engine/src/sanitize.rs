//! Helpers for sanitizing data before it enters logs, errors or prompts.
//!
//! Provider replies can be large and API keys travel in some endpoint URLs,
//! so nothing from either goes into a log line without passing through here.

/// Maximum length of provider output echoed into logs and parse errors.
pub const MAX_LOGGED_CHARS: usize = 500;

/// Returns at most `max_chars` characters of `text`, marking the cut.
///
/// Counts characters rather than bytes so multi-byte text never splits.
pub fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}... (truncated)", &text[..byte_idx]),
        None => text.to_string(),
    }
}

/// Shorthand for [`truncate`] with [`MAX_LOGGED_CHARS`].
pub fn for_log(text: &str) -> String {
    truncate(text, MAX_LOGGED_CHARS)
}

/// Masks the value of a `key=` query parameter in a URL.
///
/// - `https://host/v1/models/m:generateContent?key=abc` → `...?key=****`
/// - `https://host/v1/messages` → unchanged
pub fn redact_url(url: &str) -> String {
    let Some((base, query)) = url.split_once('?') else {
        return url.to_string();
    };

    let redacted: Vec<String> = query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((name, _)) if name.eq_ignore_ascii_case("key") => format!("{}=****", name),
            _ => pair.to_string(),
        })
        .collect();

    format!("{}?{}", base, redacted.join("&"))
}

/// Escapes chat-control tokens in caller-supplied text before it is
/// embedded in a prompt.
///
/// # Sequences Escaped
/// - `<|...|>` - ChatML special tokens
/// - `<s>`, `</s>` - Sequence boundaries
/// - `[INST]`, `[/INST]` - Llama-style instruction markers
/// - `<<SYS>>`, `<</SYS>>` - Llama-style system prompt markers
pub fn sanitize_for_prompt(text: &str) -> String {
    text.replace("<|", "< |")
        .replace("|>", "| >")
        .replace("<s>", "< s >")
        .replace("</s>", "< / s >")
        .replace("[INST]", "[ INST ]")
        .replace("[/INST]", "[ / INST ]")
        .replace("<<SYS>>", "< < SYS > >")
        .replace("<</SYS>>", "< < / SYS > >")
}
