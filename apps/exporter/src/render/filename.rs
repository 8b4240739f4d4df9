//! Export filenames: `{prefix}_{slug}[_{YYYY-MM-DD}].pdf`.

use chrono::NaiveDate;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

pub const DEFAULT_PREFIX: &str = "ww";
const FALLBACK_SLUG: &str = "export";

/// Lowercase, hyphen-separated, `[a-z0-9_-]` only. Accents are folded
/// (`Beyoncé` → `beyonce`); anything that slugs to nothing becomes `export`.
pub fn slugify(input: &str) -> String {
    let folded: String = input
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase();

    let mut slug = String::with_capacity(folded.len());
    for c in folded.chars() {
        let c = if c.is_whitespace() { '-' } else { c };
        if !(c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_') {
            continue;
        }
        if c == '-' && slug.ends_with('-') {
            continue;
        }
        slug.push(c);
    }

    let trimmed = slug.trim_matches('-');
    if trimmed.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Builds the download filename. An empty prefix falls back to `ww`.
pub fn export_filename(prefix: &str, base: &str, date: Option<NaiveDate>) -> String {
    let prefix = if prefix.trim().is_empty() {
        DEFAULT_PREFIX.to_string()
    } else {
        slugify(prefix)
    };
    match date {
        Some(date) => format!("{prefix}_{}_{}.pdf", slugify(base), date.format("%Y-%m-%d")),
        None => format!("{prefix}_{}.pdf", slugify(base)),
    }
}
