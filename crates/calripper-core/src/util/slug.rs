//! Slug generation for calendar file names.
//!
//! ## Summary
//! Slugs are lowercase ASCII alphanumerics joined by single hyphens, so
//! they are safe as file names and URL path segments.

/// Slug used when a name has no ASCII alphanumeric characters at all.
const FALLBACK_SLUG: &str = "untitled";

/// Generate a file-safe slug from a name.
///
/// Examples:
/// - "Live Music" -> "live-music"
/// - "Kids & Family" -> "kids-family"
/// - "日本" -> "untitled"
#[must_use]
pub fn generate_slug(name: &str) -> String {
    let slug = name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}
