use std::fmt;
use std::time::Instant;

use crate::names::Candidate;

#[cfg_attr(
    feature = "with-serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeStatus {
    /// The server accepted the recipient and is not a catch-all.
    Valid,
    Invalid,
    /// Accepted, but the server accepts any recipient.
    Risky,
}

impl fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Valid => "valid",
            Self::Invalid => "invalid",
            Self::Risky => "risky",
        })
    }
}

/// Outcome of probing one address, or of a whole domain search.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeResult {
    /// `None` only for the "No valid email found" search result.
    pub email: Option<String>,
    pub status: ProbeStatus,
    pub catch_all: bool,
    pub message: String,
    pub user_name: String,
    pub domain: String,
    /// Host that gave the definitive answer, empty when none did.
    pub mx: String,
    pub connections: u32,
    pub verification_ops: u32,
    pub elapsed_seconds: f64,
}

impl ProbeResult {
    pub const NOT_FOUND: &'static str = "No valid email found";
    pub const CATCH_ALL: &'static str = "Catch-All";
    pub const ALL_MX_FAILED: &'static str = "SMTP failed for all MX records";

    /// Search result used when no candidate was confirmed.
    pub fn not_found(domain: impl Into<String>) -> Self {
        Self {
            email: None,
            status: ProbeStatus::Invalid,
            catch_all: false,
            message: Self::NOT_FOUND.to_string(),
            user_name: String::new(),
            domain: domain.into(),
            mx: String::new(),
            connections: 0,
            verification_ops: 0,
            elapsed_seconds: 0.0,
        }
    }

    /// Invalid result for input that never reached the network.
    pub(crate) fn rejected_input(address: &str, reason: impl fmt::Display) -> Self {
        let address = address.trim();
        let (local, domain) = address.rsplit_once('@').unwrap_or((address, ""));
        Self {
            email: Some(address.to_string()),
            message: format!("Rejected: {reason}"),
            user_name: user_name(local),
            domain: domain.to_string(),
            ..Self::not_found("")
        }
    }

    /// Blank invalid result for `candidate`, filled in while probing.
    pub(crate) fn pending(candidate: &Candidate) -> Self {
        Self {
            email: Some(candidate.as_str().to_string()),
            message: String::new(),
            user_name: user_name(candidate.local_part()),
            ..Self::not_found(candidate.domain())
        }
    }

    pub(crate) fn finish(mut self, started: Instant) -> Self {
        let elapsed = started.elapsed().as_secs_f64();
        self.elapsed_seconds = (elapsed * 1000.0).round() / 1000.0;
        self
    }

    /// `true` for `valid` and `risky` results.
    pub fn is_found(&self) -> bool {
        matches!(self.status, ProbeStatus::Valid | ProbeStatus::Risky)
    }
}

/// Display name guessed from a local part: `"jean-luc.picard"` becomes
/// `"Jean Luc Picard"`.
pub fn user_name(local: &str) -> String {
    local
        .split(['.', '_', '-', '+'])
        .filter(|word| !word.is_empty())
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
