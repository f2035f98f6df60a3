use std::future::Future;
use std::time::Duration;

use trust_dns_resolver::TokioAsyncResolver;
use trust_dns_resolver::error::ResolveErrorKind;

use super::{MxError, MxRecord};
use crate::validator::ascii_domain;

/// Source of MX records for an ASCII domain.
///
/// Implementations return raw records; [`lookup`] takes care of ordering and
/// the timeout.
pub trait MxResolver: Send + Sync {
    fn resolve_mx(
        &self,
        domain: &str,
    ) -> impl Future<Output = Result<Vec<MxRecord>, MxError>> + Send;
}

/// [`MxResolver`] backed by the system DNS configuration (`/etc/resolv.conf`
/// on Unix).
pub struct SystemResolver {
    inner: Result<TokioAsyncResolver, String>,
}

impl SystemResolver {
    /// Reads the system configuration. A failure is kept and reported by every
    /// lookup instead of aborting construction.
    pub fn from_system_conf() -> Self {
        let inner = TokioAsyncResolver::tokio_from_system_conf().map_err(|err| err.to_string());
        if let Err(err) = &inner {
            tracing::warn!(target: "mailscout::mx", error = %err, "system resolver unavailable");
        }
        Self { inner }
    }
}

impl Default for SystemResolver {
    fn default() -> Self {
        Self::from_system_conf()
    }
}

impl MxResolver for SystemResolver {
    async fn resolve_mx(&self, domain: &str) -> Result<Vec<MxRecord>, MxError> {
        let resolver = self
            .inner
            .as_ref()
            .map_err(|err| MxError::ResolverInit(err.clone()))?;
        match resolver.mx_lookup(domain).await {
            Ok(lookup) => Ok(lookup
                .iter()
                .map(|mx| MxRecord::new(mx.preference(), mx.exchange().to_utf8()))
                .collect()),
            Err(err) if matches!(err.kind(), ResolveErrorKind::NoRecordsFound { .. }) => {
                Ok(Vec::new())
            }
            Err(err) => Err(MxError::lookup(err)),
        }
    }
}

/// Resolves the mail exchangers of `domain`, most preferred first.
///
/// The domain is trimmed and IDNA-converted before the query, which is bounded
/// by `timeout`. An answer with no usable host is [`MxError::NoRecords`].
pub async fn lookup<R: MxResolver>(
    resolver: &R,
    domain: &str,
    timeout: Duration,
) -> Result<Vec<MxRecord>, MxError> {
    if domain.trim().is_empty() {
        return Err(MxError::EmptyDomain);
    }
    let ascii = ascii_domain(domain).ok_or(MxError::Idna)?;
    let records = tokio::time::timeout(timeout, resolver.resolve_mx(&ascii))
        .await
        .map_err(|_| MxError::Timeout {
            domain: ascii.clone(),
            after: timeout,
        })??;
    let ordered = order_records(records);
    if ordered.is_empty() {
        return Err(MxError::no_records(&ascii));
    }
    tracing::debug!(target: "mailscout::mx", domain = %ascii, hosts = ordered.len(), "MX resolved");
    Ok(ordered)
}

/// Sorts by preference, normalizes host names and drops null MX entries and
/// duplicates.
pub(crate) fn order_records(records: Vec<MxRecord>) -> Vec<MxRecord> {
    let mut records: Vec<MxRecord> = records
        .into_iter()
        .map(|record| MxRecord::new(record.preference, normalize_exchange(&record.exchange)))
        .filter(|record| !record.exchange.is_empty())
        .collect();
    records.sort();
    records.dedup();
    records
}

pub(crate) fn normalize_exchange(exchange: &str) -> String {
    exchange.trim().trim_end_matches('.').to_ascii_lowercase()
}
