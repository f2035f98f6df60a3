use std::collections::BTreeSet;

use super::normalize::normalize_token;
use super::types::{Candidate, PersonName};

/// Role mailboxes probed when no person name is known.
pub const ROLE_PREFIXES: [&str; 7] = [
    "admin", "contact", "hello", "team", "support", "info", "mail",
];

/// The eleven local-part patterns derived from a person's first and last
/// token, de-duplicated. A single-token name uses that token as both.
pub fn variants_for(person: &PersonName, domain: &str, normalize: bool) -> BTreeSet<Candidate> {
    let tokens: Vec<String> = if normalize {
        person
            .tokens()
            .iter()
            .map(|token| normalize_token(token))
            .filter(|token| !token.is_empty())
            .collect()
    } else {
        person.tokens().to_vec()
    };

    let (Some(first), Some(last)) = (tokens.first(), tokens.last()) else {
        return BTreeSet::new();
    };
    let f = initial(first);
    let l = initial(last);

    let locals = [
        first.to_string(),
        format!("{first}{last}"),
        format!("{first}.{last}"),
        format!("{first}_{last}"),
        format!("{last}.{first}"),
        format!("{f}{last}"),
        format!("{f}.{last}"),
        format!("{first}{l}"),
        format!("{f}{l}"),
        format!("{last}{first}"),
        last.to_string(),
    ];

    locals
        .iter()
        .map(|local| Candidate::from_parts(local, domain))
        .collect()
}

/// The fixed role-based addresses for `domain`.
pub fn prefixes_for(domain: &str) -> BTreeSet<Candidate> {
    ROLE_PREFIXES
        .iter()
        .map(|prefix| Candidate::from_parts(prefix, domain))
        .collect()
}

/// First character of `token` (whole char, never a partial UTF-8 sequence).
fn initial(token: &str) -> &str {
    token
        .char_indices()
        .nth(1)
        .map_or(token, |(idx, _)| &token[..idx])
}
