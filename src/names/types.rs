use std::fmt;

use thiserror::Error;

use crate::validator::validate_email;

/// One person's ordered name tokens (first, middle..., last). Never empty.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonName {
    tokens: Vec<String>,
}

impl PersonName {
    /// Builds a name from raw tokens. Each token is further split on
    /// whitespace; blank pieces are dropped. Returns `None` when nothing is left.
    pub fn new<I, S>(tokens: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokens: Vec<String> = tokens
            .into_iter()
            .flat_map(|token| {
                token
                    .as_ref()
                    .split_whitespace()
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .collect();
        if tokens.is_empty() {
            None
        } else {
            Some(Self { tokens })
        }
    }

    /// Splits a full name such as `"Jean Luc Picard"` into tokens.
    pub fn parse(full_name: &str) -> Option<Self> {
        Self::new([full_name])
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }
}

impl fmt::Display for PersonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tokens.join(" "))
    }
}

/// Names as callers submit them: a single full name, a flat token list for
/// one person, or one token list per person.
#[cfg_attr(
    feature = "with-serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(untagged)
)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameInput {
    Full(String),
    Tokens(Vec<String>),
    People(Vec<Vec<String>>),
}

impl Default for NameInput {
    fn default() -> Self {
        Self::Tokens(Vec::new())
    }
}

impl NameInput {
    /// Normalizes the submitted shape into a uniform list of people. Entries
    /// without a single non-blank token are skipped.
    pub fn people(&self) -> Vec<PersonName> {
        match self {
            Self::Full(full) => PersonName::parse(full).into_iter().collect(),
            Self::Tokens(tokens) => PersonName::new(tokens).into_iter().collect(),
            Self::People(people) => people.iter().filter_map(PersonName::new).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.people().is_empty()
    }
}

impl From<&str> for NameInput {
    fn from(full: &str) -> Self {
        Self::Full(full.to_string())
    }
}

impl From<Vec<String>> for NameInput {
    fn from(tokens: Vec<String>) -> Self {
        Self::Tokens(tokens)
    }
}

impl From<Vec<Vec<String>>> for NameInput {
    fn from(people: Vec<Vec<String>>) -> Self {
        Self::People(people)
    }
}

#[derive(Debug, Error)]
pub enum CandidateError {
    #[error("invalid email address: {}", .reasons.join("; "))]
    Invalid { reasons: Vec<String> },
}

/// A syntactically valid, not yet confirmed `local@domain` address.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize), serde(transparent))]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Candidate(String);

impl Candidate {
    /// Validates `address` (strict local part) and lower-cases / IDNA-converts
    /// its domain.
    pub fn parse(address: &str) -> Result<Self, CandidateError> {
        let report = validate_email(address);
        if !report.ok {
            return Err(CandidateError::Invalid {
                reasons: report.reasons,
            });
        }
        Ok(Self::from_parts(&report.local, &report.ascii_domain))
    }

    pub(crate) fn from_parts(local: &str, domain: &str) -> Self {
        Self(format!("{local}@{domain}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn local_part(&self) -> &str {
        self.0.rsplit_once('@').map_or("", |(local, _)| local)
    }

    pub fn domain(&self) -> &str {
        self.0.rsplit_once('@').map_or("", |(_, domain)| domain)
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Candidate {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
