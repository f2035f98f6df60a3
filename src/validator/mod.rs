//! Address syntax checks (RFC subset) shared by candidate generation and
//! probe input parsing.

mod domain;
mod local;
mod types;

pub use types::ValidationReport;

pub(crate) use domain::ascii_domain;
pub(crate) use local::is_local_strict;

use domain::check_domain;

/// Checks `email` against the unquoted local-part rules and IDNA domain
/// labels. Every problem found is listed in the report.
pub fn validate_email(email: &str) -> ValidationReport {
    let input = email.trim();

    let mut reasons = Vec::new();

    if input.len() > 254 {
        reasons.push(format!("total length {} > 254", input.len()));
    }

    let parts: Vec<&str> = input.split('@').collect();
    if parts.len() != 2 {
        reasons.push("must contain exactly one '@'".to_string());
        return ValidationReport {
            ok: false,
            reasons,
            local: String::new(),
            ascii_domain: String::new(),
        };
    }
    let (local, domain) = (parts[0], parts[1]);

    if local.is_empty() || local.len() > 64 {
        reasons.push(format!(
            "local part length {} invalid (1..=64)",
            local.len()
        ));
    }

    let ascii_domain = check_domain(domain, &mut reasons).unwrap_or_default();

    if !is_local_strict(local) {
        reasons.push("invalid local part (strict rules)".into());
    }

    ValidationReport {
        ok: reasons.is_empty(),
        reasons,
        local: local.to_string(),
        ascii_domain,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn accepts_basic() {
        let r = validate_email("alice@example.com");
        assert!(r.ok, "{:?}", r.reasons);
        assert_eq!(r.local, "alice");
        assert_eq!(r.ascii_domain, "example.com");
    }

    #[test]
    fn report_has_ascii_domain() {
        let r = validate_email("alice@exämple.com");
        assert!(r.ok, "{:?}", r.reasons);
        assert!(r.ascii_domain.starts_with("xn--"));
    }

    #[test]
    fn rejects_missing_or_double_at() {
        for input in ["alice", "a@b@example.com", "@"] {
            let r = validate_email(input);
            assert!(!r.ok, "{input} should be rejected");
        }
    }

    #[test]
    fn rejects_quoted_local() {
        let r = validate_email("\"a b\"@example.com");
        assert!(!r.ok);
        assert_eq!(r.reasons, ["invalid local part (strict rules)"]);
    }
}
