//! Shared utility functions

use chrono::{DateTime, Utc};

/// Average reading speed used for reading time estimates
const WORDS_PER_MINUTE: usize = 200;

/// Parse a datetime string (RFC3339 format) or return current time
///
/// Timestamps are stored as RFC3339 text; a corrupt value falls back to
/// the current time instead of failing the whole row.
pub fn parse_datetime_or_now(s: &str) -> DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Count whitespace-separated words
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Estimate reading time for a piece of content
///
/// # Examples
///
/// ```
/// use inkpost_db::utils::reading_time;
///
/// assert_eq!(reading_time("one two three"), "1 min read");
/// assert_eq!(reading_time(""), "0 min read");
/// ```
pub fn reading_time(text: &str) -> String {
    let minutes = word_count(text).div_ceil(WORDS_PER_MINUTE);
    format!("{} min read", minutes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_count() {
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("   "), 0);
        assert_eq!(word_count("hello"), 1);
        assert_eq!(word_count("  hello \n\t world  "), 2);
    }

    #[test]
    fn test_reading_time() {
        let words = vec!["word"; 200].join(" ");
        assert_eq!(reading_time(&words), "1 min read");

        let words = vec!["word"; 201].join(" ");
        assert_eq!(reading_time(&words), "2 min read");

        assert_eq!(reading_time("# Title\n\nShort post"), "1 min read");
    }

    #[test]
    fn test_parse_datetime_or_now() {
        let valid_time = "2024-01-01T12:00:00Z";
        let parsed = parse_datetime_or_now(valid_time);
        assert_eq!(parsed.to_rfc3339(), "2024-01-01T12:00:00+00:00");

        // Invalid time should return current time (just check it doesn't panic)
        let now_before = Utc::now();
        let parsed = parse_datetime_or_now("invalid");
        let now_after = Utc::now();
        assert!(parsed >= now_before && parsed <= now_after);
    }
}
