//! Tolerant JSON parsing for LLM replies
//!
//! Models often wrap JSON in markdown fences, leave comments in, or emit
//! trailing commas. [`parse_llm_json`] tries a fixed ladder of repairs, each
//! one a small pure function, and returns the first value that parses.
//!
//! Repair order:
//! 1. Direct parse
//! 2. Strip markdown fences
//! 3. Strip `/* */` and `//` comments
//! 4. Drop trailing commas
//! 5. Extract the first `{...}` span, then the first `[...]` span

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

const PREVIEW_CHARS: usize = 200;

static FENCE_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^```(?:json)?\s*").unwrap());
static FENCE_CLOSE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^```\s*$").unwrap());
static BLOCK_COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());
static LINE_COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?m)([^\\:"]|^)//.*$"#).unwrap());
static TRAILING_COMMA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*([\]}])").unwrap());
static OBJECT_SPAN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\{.*\}").unwrap());
static ARRAY_SPAN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\[.*\]").unwrap());

/// Error returned when no repair strategy yields valid JSON
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("could not parse JSON from model reply: {preview}...")]
    Unparseable {
        /// First characters of the original reply
        preview: String,
    },
}

/// Parse a model reply into JSON, applying repairs until one works.
pub fn parse_llm_json(text: &str) -> Result<Value, ParseError> {
    if let Some(value) = try_parse(text) {
        return Ok(value);
    }

    let cleaned = strip_fences(text);
    if let Some(value) = try_parse(&cleaned) {
        tracing::debug!("parsed model reply after stripping fences");
        return Ok(value);
    }

    let cleaned = strip_comments(&cleaned);
    if let Some(value) = try_parse(&cleaned) {
        tracing::debug!("parsed model reply after stripping comments");
        return Ok(value);
    }

    let cleaned = strip_trailing_commas(&cleaned);
    if let Some(value) = try_parse(&cleaned) {
        tracing::debug!("parsed model reply after dropping trailing commas");
        return Ok(value);
    }

    if let Some(value) = extract_object(&cleaned).or_else(|| extract_array(&cleaned)) {
        tracing::debug!("parsed model reply from an embedded JSON span");
        return Ok(value);
    }

    Err(ParseError::Unparseable {
        preview: text.chars().take(PREVIEW_CHARS).collect(),
    })
}

fn try_parse(text: &str) -> Option<Value> {
    serde_json::from_str(text).ok()
}

/// Remove ```` ``` ```` / ```` ```json ```` fence lines.
pub fn strip_fences(text: &str) -> String {
    let opened = FENCE_OPEN_RE.replace_all(text, "");
    FENCE_CLOSE_RE.replace_all(&opened, "").trim().to_string()
}

/// Remove block and line comments. `//` preceded by `:` or a quote is kept
/// so URLs inside strings survive.
pub fn strip_comments(text: &str) -> String {
    let without_blocks = BLOCK_COMMENT_RE.replace_all(text, "");
    LINE_COMMENT_RE
        .replace_all(&without_blocks, "${1}")
        .trim()
        .to_string()
}

/// Drop commas that directly precede a closing bracket or brace.
pub fn strip_trailing_commas(text: &str) -> String {
    TRAILING_COMMA_RE.replace_all(text, "${1}").into_owned()
}

/// Parse the widest `{...}` span in the text.
pub fn extract_object(text: &str) -> Option<Value> {
    extract_span(&OBJECT_SPAN_RE, text)
}

/// Parse the widest `[...]` span in the text.
pub fn extract_array(text: &str) -> Option<Value> {
    extract_span(&ARRAY_SPAN_RE, text)
}

fn extract_span(re: &Regex, text: &str) -> Option<Value> {
    let span = re.find(text)?;
    try_parse(&strip_trailing_commas(span.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_direct_parse() {
        let value = parse_llm_json(r#"{"title": "Ciabatta"}"#).unwrap();
        assert_eq!(value, json!({"title": "Ciabatta"}));
    }

    #[test]
    fn test_fenced_reply() {
        let reply = "```json\n{\"title\": \"Ciabatta\"}\n```";
        assert_eq!(parse_llm_json(reply).unwrap()["title"], "Ciabatta");
    }

    #[test]
    fn test_comments_are_removed_but_urls_survive() {
        let reply = r#"{
            // the name
            "title": "Pizza", /* inline */
            "source": "https://example.com/pizza"
        }"#;
        let value = parse_llm_json(reply).unwrap();
        assert_eq!(value["title"], "Pizza");
        assert_eq!(value["source"], "https://example.com/pizza");
    }

    #[test]
    fn test_trailing_commas() {
        let reply = r#"{"imageKeywords": ["bread", "loaf",],}"#;
        let value = parse_llm_json(reply).unwrap();
        assert_eq!(value["imageKeywords"], json!(["bread", "loaf"]));
    }

    #[test]
    fn test_object_embedded_in_prose() {
        let reply = "Ecco la ricetta:\n{\"title\": \"Pici\", \"category\": \"Pasta\",}\nBuon appetito!";
        let value = parse_llm_json(reply).unwrap();
        assert_eq!(value["category"], "Pasta");
    }

    #[test]
    fn test_array_embedded_in_prose() {
        let reply = "Keywords: [\"focaccia\", \"olive oil\"] as requested";
        assert_eq!(
            parse_llm_json(reply).unwrap(),
            json!(["focaccia", "olive oil"])
        );
    }

    #[test]
    fn test_unparseable_reply() {
        let err = parse_llm_json("no json here at all").unwrap_err();
        let ParseError::Unparseable { preview } = err;
        assert_eq!(preview, "no json here at all");
    }

    #[test]
    fn test_preview_is_truncated() {
        let reply = "x".repeat(500);
        let ParseError::Unparseable { preview } = parse_llm_json(&reply).unwrap_err();
        assert_eq!(preview.chars().count(), 200);
    }

    #[test]
    fn test_strategies_in_isolation() {
        assert_eq!(strip_fences("```\n[1]\n```"), "[1]");
        assert_eq!(strip_trailing_commas("[1, 2, ]"), "[1, 2]");
        assert_eq!(strip_comments("[1] // tail"), "[1]");
        assert!(extract_object("nothing").is_none());
    }
}
