//! Concurrent candidate search for one domain, and for many domains.
//!
//! A domain search probes every candidate in its own task, bounded by a
//! semaphore of `probe_concurrency` permits and paced by a token bucket. Each
//! probe also holds one of the scout-wide connection slots, which detached
//! probes keep until they finish. The first `valid` or `risky` result wins:
//! the winning task cancels the search before releasing its permits, so
//! queued tasks never start, and the tasks still running are detached.

mod bulk;
mod limiter;

pub use bulk::{BulkRequest, BulkResult};

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::mx::MxResolver;
use crate::names::{NameInput, candidate_set};
use crate::probe::ProbeResult;
use crate::scout::Scout;
use crate::smtp::MailExchanger;
use crate::validator::ascii_domain;
use limiter::RateLimiter;

impl<R, X> Scout<R, X>
where
    R: MxResolver + 'static,
    X: MailExchanger + 'static,
{
    /// Finds the first deliverable address for `names` at `domain`, or for
    /// the role prefixes when no name is given.
    ///
    /// Returns [`ProbeResult::not_found`] when no candidate is confirmed.
    pub async fn search_domain(&self, domain: &str, names: &NameInput) -> ProbeResult {
        let config = self.config();
        let people = names.people();
        let candidates = candidate_set(config, domain, &people);
        let label = ascii_domain(domain).unwrap_or_else(|| domain.trim().to_string());
        if candidates.is_empty() {
            tracing::info!(target: "mailscout::search", domain = %label, "no candidate to probe");
            return ProbeResult::not_found(label);
        }
        tracing::debug!(
            target: "mailscout::search",
            domain = %label,
            candidates = candidates.len(),
            people = people.len(),
            "search started"
        );

        let permits = Arc::new(Semaphore::new(config.probe_concurrency));
        let limiter = RateLimiter::new(config.throttle).map(Arc::new);
        let cancel = CancellationToken::new();
        let mut tasks = JoinSet::new();

        for candidate in candidates {
            let scout = self.clone();
            let permits = Arc::clone(&permits);
            let limiter = limiter.clone();
            let cancel = cancel.clone();
            tasks.spawn(async move {
                let _permit = tokio::select! {
                    _ = cancel.cancelled() => return None,
                    permit = permits.acquire_owned() => permit.ok()?,
                };
                let _slot = tokio::select! {
                    _ = cancel.cancelled() => return None,
                    slot = scout.connection_slot() => slot?,
                };
                if let Some(limiter) = &limiter {
                    tokio::select! {
                        _ = cancel.cancelled() => return None,
                        _ = limiter.acquire() => {}
                    }
                }
                if cancel.is_cancelled() {
                    return None;
                }
                let result = scout.probe_in_slot(&candidate).await;
                if result.is_found() {
                    // Before `_permit` drops: a waiting task must see the search as over.
                    cancel.cancel();
                }
                Some(result)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Some(result)) if result.is_found() => {
                    cancel.cancel();
                    tasks.detach_all();
                    tracing::info!(
                        target: "mailscout::search",
                        domain = %label,
                        email = result.email.as_deref().unwrap_or_default(),
                        status = %result.status,
                        "address found"
                    );
                    return result;
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(target: "mailscout::search", domain = %label, error = %err, "probe task failed");
                }
            }
        }

        tracing::info!(target: "mailscout::search", domain = %label, "no valid email found");
        ProbeResult::not_found(label)
    }
}
