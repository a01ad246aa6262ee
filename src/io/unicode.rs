//! Grapheme-aware text helpers for terminal output.

use unicode_segmentation::UnicodeSegmentation;

/// Returns the number of grapheme clusters in `s`.
///
/// # Examples
///
/// ```
/// use pdf_chat::io::unicode::grapheme_count;
///
/// assert_eq!(grapheme_count("Hello"), 5);
/// assert_eq!(grapheme_count("世界"), 2);
/// ```
#[must_use]
pub fn grapheme_count(s: &str) -> usize {
    s.graphemes(true).count()
}

/// Truncates a string at a grapheme cluster boundary.
///
/// # Arguments
///
/// * `s` - The string to truncate.
/// * `max_graphemes` - Maximum number of grapheme clusters.
#[must_use]
pub fn truncate_graphemes(s: &str, max_graphemes: usize) -> &str {
    let mut end_byte = 0;

    for (count, grapheme) in s.graphemes(true).enumerate() {
        if count >= max_graphemes {
            break;
        }
        end_byte += grapheme.len();
    }

    &s[..end_byte]
}

/// Produces a one-line preview of at most `max_graphemes` clusters.
///
/// Newlines are flattened to spaces and an ellipsis marks truncation.
#[must_use]
pub fn preview(s: &str, max_graphemes: usize) -> String {
    let flat = s.split_whitespace().collect::<Vec<_>>().join(" ");
    if grapheme_count(&flat) <= max_graphemes {
        return flat;
    }
    let keep = max_graphemes.saturating_sub(3);
    format!("{}...", truncate_graphemes(&flat, keep))
}
