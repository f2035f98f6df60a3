#![forbid(unsafe_code)]
//! mailscout : découverte d'adresses e-mail par sondage SMTP, sans envoi.
//!
//! Candidates are derived from person names (or role prefixes for a bare
//! domain), then confirmed with `RCPT TO` against the domain's MX hosts.
//! Catch-all servers are detected and reported as `risky`.
//!
//! The free functions below use the system resolver and plain SMTP; build a
//! [`Scout`] directly to inject other collaborators.

pub mod config;
pub mod mx;
pub mod names;
pub mod probe;
pub mod search;
pub mod smtp;
pub mod validator;

mod scout;

pub use config::{ConfigError, ScoutConfig, SmtpSettings, Throttle, configure};
pub use mx::{MxError, MxRecord, MxResolver, SystemResolver};
pub use names::{Candidate, CandidateError, NameInput, PersonName, transliterate};
pub use probe::{ProbeResult, ProbeStatus};
pub use scout::Scout;
pub use search::{BulkRequest, BulkResult};
pub use smtp::{MailExchanger, SmtpExchanger};
pub use validator::{ValidationReport, validate_email};

/// Probes one address on `port`, ignoring the configured port.
pub async fn probe_single(config: &ScoutConfig, email: &str, port: u16) -> ProbeResult {
    Scout::system(config.with_port(port))
        .probe_address(email)
        .await
}

/// Searches `domain` for the first deliverable address of `names`.
pub async fn search_domain(config: &ScoutConfig, domain: &str, names: &NameInput) -> ProbeResult {
    Scout::system(config.clone())
        .search_domain(domain, names)
        .await
}

/// Runs [`search_domain`] for every request; results come back in
/// completion order.
pub async fn search_bulk(config: &ScoutConfig, requests: Vec<BulkRequest>) -> Vec<BulkResult> {
    Scout::system(config.clone()).search_bulk(requests).await
}
