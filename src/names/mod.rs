//! Candidate generation: person names or a bare domain to the set of
//! addresses worth probing.

mod normalize;
mod patterns;
mod types;

pub use normalize::transliterate;
pub use patterns::{ROLE_PREFIXES, prefixes_for, variants_for};
pub use types::{Candidate, CandidateError, NameInput, PersonName};

use std::collections::BTreeSet;

use crate::config::ScoutConfig;
use crate::validator::{ascii_domain, is_local_strict};

/// Assembles the candidates for one domain search.
///
/// Variants are generated for every supplied person when enabled; role
/// prefixes only when enabled *and* no person was supplied. The two sources
/// are never combined. Candidates with an invalid local part are dropped.
pub fn candidate_set(
    config: &ScoutConfig,
    domain: &str,
    people: &[PersonName],
) -> BTreeSet<Candidate> {
    let Some(domain) = ascii_domain(domain) else {
        tracing::warn!(target: "mailscout::names", domain, "domain is not convertible to ASCII");
        return BTreeSet::new();
    };

    let mut candidates = BTreeSet::new();
    if config.check_variants && !people.is_empty() {
        for person in people {
            candidates.extend(variants_for(person, &domain, config.normalize));
        }
    }
    if config.check_prefixes && people.is_empty() {
        candidates.extend(prefixes_for(&domain));
    }

    candidates.retain(|candidate| {
        let ok = is_local_strict(candidate.local_part());
        if !ok {
            tracing::debug!(target: "mailscout::names", %candidate, "dropping syntactically invalid candidate");
        }
        ok
    });
    candidates
}
