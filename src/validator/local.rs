/// Characters allowed in an unquoted local part besides ASCII alphanumerics.
const ATEXT_SPECIALS: &[char] = &[
    '!', '#', '$', '%', '&', '\'', '*', '+', '-', '/', '=', '?', '^', '_', '`', '{', '|', '}',
    '~', '.',
];

/// Strict rules: ASCII atext plus non-leading/non-trailing '.', no "..".
pub(crate) fn is_local_strict(s: &str) -> bool {
    if s.is_empty() || s.starts_with('.') || s.ends_with('.') || s.contains("..") {
        return false;
    }
    s.chars()
        .all(|c| c.is_ascii_alphanumeric() || ATEXT_SPECIALS.contains(&c))
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn strict_dots() {
        assert!(!is_local_strict(".abc"));
        assert!(!is_local_strict("abc."));
        assert!(!is_local_strict("a..b"));
        assert!(is_local_strict("a.b"));
    }

    #[test]
    fn strict_rejects_non_ascii_and_spaces() {
        assert!(!is_local_strict("josé"));
        assert!(!is_local_strict("john smith"));
        assert!(!is_local_strict(""));
        assert!(is_local_strict("o'brien"));
        assert!(is_local_strict("anne-marie_x"));
    }
}
