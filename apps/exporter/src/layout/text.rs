//! Text normalization applied to every string before it becomes part of a line.
//!
//! Irregular whitespace and typographic quotes either have no WinAnsi glyph or
//! measure differently from what the viewer draws, so they are folded to plain
//! ASCII equivalents up front.

/// Normalizes a piece of user or model text.
///
/// - NBSP, narrow NBSP and figure space become regular spaces
/// - zero-width characters are removed
/// - curly single/double quotes become straight quotes
/// - leading and trailing whitespace is trimmed
pub fn normalize_text(input: &str) -> String {
    let folded: String = input
        .chars()
        .filter(|c| !matches!(c, '\u{200B}'..='\u{200D}' | '\u{FEFF}'))
        .map(|c| match c {
            '\u{00A0}' | '\u{202F}' | '\u{2007}' => ' ',
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' => '\'',
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' => '"',
            other => other,
        })
        .collect();
    folded.trim().to_string()
}

/// Normalizes and returns `None` when nothing but whitespace remains.
pub fn non_empty(input: &str) -> Option<String> {
    let text = normalize_text(input);
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Normalizes every entry and drops the empty ones, keeping order.
pub fn non_empty_list<S: AsRef<str>>(items: &[S]) -> Vec<String> {
    items.iter().filter_map(|s| non_empty(s.as_ref())).collect()
}
