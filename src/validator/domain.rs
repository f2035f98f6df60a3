/// Converts `domain` to lower-case ASCII (IDNA). Returns `None` when the
/// conversion fails or leaves nothing behind.
pub(crate) fn ascii_domain(domain: &str) -> Option<String> {
    let trimmed = domain.trim().trim_end_matches('.');
    if trimmed.is_empty() {
        return None;
    }
    match idna::domain_to_ascii(trimmed) {
        Ok(ascii) if !ascii.is_empty() => Some(ascii.to_ascii_lowercase()),
        _ => None,
    }
}

/// Validates the domain: IDNA conversion plus label checks.
/// Invalidating reasons are pushed into `reasons`.
pub(crate) fn check_domain(domain: &str, reasons: &mut Vec<String>) -> Option<String> {
    let Some(domain_ascii) = ascii_domain(domain) else {
        reasons.push("domain punycode conversion failed".to_string());
        return None;
    };

    if !domain_ascii.contains('.') {
        reasons.push("domain must contain at least one dot".to_string());
    }

    for label in domain_ascii.split('.') {
        if label.is_empty() {
            reasons.push("empty domain label".to_string());
            continue;
        }
        if label.len() > 63 {
            reasons.push(format!(
                "domain label '{}' length {} > 63",
                label,
                label.len()
            ));
        }
        if label.starts_with('-') || label.ends_with('-') {
            reasons.push(format!(
                "domain label '{}' cannot start/end with '-'",
                label
            ));
        }
        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            reasons.push(format!("domain label '{}' has invalid chars", label));
        }
    }

    Some(domain_ascii)
}
