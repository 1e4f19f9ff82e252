/// Feed-specific utility functions shared by the normalizer, sources and renderers

/// URL utilities for feed sources
pub mod url {
    use url::Url;

    /// True for absolute http(s) URLs.
    pub fn is_valid_feed_url(url_str: &str) -> bool {
        Url::parse(url_str)
            .map(|url| matches!(url.scheme(), "http" | "https"))
            .unwrap_or(false)
    }

    /// Turn an arXiv abstract URL into its PDF URL.
    pub fn arxiv_pdf_link(abs_url: &str) -> String {
        format!("{}.pdf", abs_url.replace("/abs/", "/pdf/"))
    }
}

/// Timestamp helpers
pub mod time {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

    /// Parse the timestamp formats seen in RSS and Atom documents.
    ///
    /// Returns `None` for anything unrecognized; callers decide whether that
    /// means keep or drop.
    pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }

        if let Ok(date) = DateTime::parse_from_rfc3339(value) {
            return Some(date.with_timezone(&Utc));
        }

        if let Ok(date) = DateTime::parse_from_rfc2822(value) {
            return Some(date.with_timezone(&Utc));
        }

        if let Ok(date) = DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%z") {
            return Some(date.with_timezone(&Utc));
        }

        for format in &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
                return Some(naive.and_utc());
            }
        }

        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }

    /// Long human date used in page titles, e.g. "Sunday, October 18, 2026".
    pub fn format_long_date(date: NaiveDate) -> String {
        date.format("%A, %B %-d, %Y").to_string()
    }

    pub fn format_iso_date(date: NaiveDate) -> String {
        date.format("%Y-%m-%d").to_string()
    }

    /// Parse a file stem such as `2026-10-18`.
    pub fn parse_iso_date(stem: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(stem, "%Y-%m-%d").ok()
    }
}

/// Text cleanup helpers
pub mod text {
    use regex::Regex;
    use std::sync::LazyLock;

    // Malformed markup can leave fragments behind.
    static TAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

    const SENTENCE_ENDINGS: [char; 6] = ['.', '。', '!', '！', '?', '？'];

    /// Remove anything that looks like an HTML tag.
    pub fn strip_html(html: &str) -> String {
        TAG_PATTERN.replace_all(html, "").into_owned()
    }

    /// First `max_chars` characters of `text`.
    pub fn truncate_chars(text: &str, max_chars: usize) -> String {
        text.chars().take(max_chars).collect()
    }

    /// Like [`truncate_chars`] but marks the cut with `...`.
    pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
        if text.chars().count() > max_chars {
            format!("{}...", truncate_chars(text, max_chars))
        } else {
            text.to_string()
        }
    }

    pub fn collapse_whitespace(text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Shorten text to at most `max_chars`, preferring a sentence boundary,
    /// then a word boundary, past the halfway point.
    pub fn smart_truncate(text: &str, max_chars: usize) -> String {
        let summary = collapse_whitespace(text);
        let chars: Vec<char> = summary.chars().collect();
        if chars.len() <= max_chars {
            return summary;
        }

        let truncated = &chars[..max_chars];

        if let Some(pos) = truncated.iter().rposition(|c| SENTENCE_ENDINGS.contains(c)) {
            if pos * 2 > max_chars {
                return truncated[..=pos].iter().collect();
            }
        }

        if let Some(pos) = truncated.iter().rposition(|c| *c == ' ') {
            if pos * 2 > max_chars {
                return format!("{}...", truncated[..pos].iter().collect::<String>());
            }
        }

        format!("{}...", truncated.iter().collect::<String>())
    }

    pub fn escape_html(text: &str) -> String {
        let mut escaped = String::with_capacity(text.len());
        for c in text.chars() {
            match c {
                '&' => escaped.push_str("&amp;"),
                '<' => escaped.push_str("&lt;"),
                '>' => escaped.push_str("&gt;"),
                '"' => escaped.push_str("&quot;"),
                '\'' => escaped.push_str("&#39;"),
                _ => escaped.push(c),
            }
        }
        escaped
    }

    /// Escape text used as a Markdown link label.
    pub fn escape_markdown_label(text: &str) -> String {
        let mut escaped = String::with_capacity(text.len());
        for c in text.chars() {
            if matches!(c, '\\' | '[' | ']') {
                escaped.push('\\');
            }
            escaped.push(c);
        }
        escaped
    }

    /// Percent-encode the characters that end a Markdown link target early.
    pub fn escape_markdown_url(url: &str) -> String {
        let mut escaped = String::with_capacity(url.len());
        for c in url.chars() {
            match c {
                '(' => escaped.push_str("%28"),
                ')' => escaped.push_str("%29"),
                ' ' => escaped.push_str("%20"),
                _ => escaped.push(c),
            }
        }
        escaped
    }

    /// True when more than 30% of the characters are CJK ideographs.
    pub fn is_mostly_chinese(text: &str) -> bool {
        let total = text.chars().count();
        let cjk = text
            .chars()
            .filter(|c| ('\u{4e00}'..='\u{9fa5}').contains(c))
            .count();
        cjk as f64 > total as f64 * 0.3
    }
}
