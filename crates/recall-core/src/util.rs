//! Small helpers shared by config parsing, the HTTP client and the models.

/// Longest error body excerpt carried into an error message
const MAX_EXCERPT_CHARS: usize = 180;

/// Trim optional text, treating blank values as absent.
pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    let value = value?;
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Whether `value` names an `http://` or `https://` location.
pub fn is_http_url(value: &str) -> bool {
    ["http://", "https://"]
        .iter()
        .any(|scheme| value.len() > scheme.len() && value.starts_with(scheme))
}

/// Single-line excerpt of a response body for error messages.
///
/// Whitespace runs (including newlines from HTML error pages) collapse to one
/// space and the result is cut at a fixed number of characters.
pub fn compact_text(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(MAX_EXCERPT_CHARS)
        .collect()
}

/// Current Unix timestamp in milliseconds, the unit every record uses.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_is_absent() {
        assert_eq!(normalize_text_option(None), None);
        assert_eq!(normalize_text_option(Some(" \t ".to_string())), None);
        assert_eq!(
            normalize_text_option(Some(" recall=debug ".to_string())),
            Some("recall=debug".to_string())
        );
    }

    #[test]
    fn only_http_schemes_with_a_host_count_as_urls() {
        assert!(is_http_url("http://127.0.0.1:3000"));
        assert!(is_http_url("https://api.example.com"));
        assert!(!is_http_url("https://"));
        assert!(!is_http_url("ftp://example.com"));
        assert!(!is_http_url("api.example.com"));
    }

    #[test]
    fn compact_text_flattens_and_truncates() {
        assert_eq!(
            compact_text("<html>\n  <body>Bad Gateway</body>\n</html>"),
            "<html> <body>Bad Gateway</body> </html>"
        );
        assert_eq!(compact_text(&"x".repeat(500)).chars().count(), 180);
        assert_eq!(compact_text("   "), "");
    }
}
