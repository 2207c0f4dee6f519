//! Slug and title rules shared by modules and lessons.

/// Longest title, slug or category accepted by the catalog.
pub const MAX_FIELD_LEN: usize = 255;

/// Returns true if `slug` is non-empty lowercase ASCII letters, digits and
/// single hyphens, without a leading or trailing hyphen.
#[must_use]
pub fn is_valid_slug(slug: &str) -> bool {
    if slug.is_empty() || slug.starts_with('-') || slug.ends_with('-') || slug.contains("--") {
        return false;
    }
    slug.chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Trim a required field, returning `None` when nothing is left.
pub(crate) fn required(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

/// Trim an optional field, collapsing blank strings to `None`.
pub(crate) fn optional(value: Option<String>) -> Option<String> {
    value.and_then(|v| required(&v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_seeded_slugs() {
        assert!(is_valid_slug("what-is-blockchain"));
        assert!(is_valid_slug("ethereum-virtual-machine"));
        assert!(is_valid_slug("defi101"));
    }

    #[test]
    fn rejects_malformed_slugs() {
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("Upper-Case"));
        assert!(!is_valid_slug("-leading"));
        assert!(!is_valid_slug("trailing-"));
        assert!(!is_valid_slug("double--hyphen"));
        assert!(!is_valid_slug("with space"));
    }

    #[test]
    fn optional_collapses_blank() {
        assert_eq!(optional(Some("   ".into())), None);
        assert_eq!(optional(Some(" x ".into())), Some("x".into()));
    }
}
