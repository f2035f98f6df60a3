use std::time::Duration;

use thiserror::Error;
use trust_dns_resolver::error::ResolveError;

#[derive(Debug, Error)]
pub enum MxError {
    #[error("domain is empty")]
    EmptyDomain,
    #[error("domain IDNA conversion failed")]
    Idna,
    #[error("resolver initialization failed: {0}")]
    ResolverInit(String),
    #[error("MX lookup failed: {source}")]
    Lookup {
        #[source]
        source: ResolveError,
    },
    #[error("no MX records found for {domain}")]
    NoRecords { domain: String },
    #[error("MX lookup for {domain} timed out after {}ms", .after.as_millis())]
    Timeout { domain: String, after: Duration },
}

impl MxError {
    pub(crate) fn lookup(source: ResolveError) -> Self {
        Self::Lookup { source }
    }

    pub(crate) fn no_records(domain: &str) -> Self {
        Self::NoRecords {
            domain: domain.to_string(),
        }
    }
}
