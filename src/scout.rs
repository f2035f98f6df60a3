use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::config::ScoutConfig;
use crate::mx::{MxResolver, SystemResolver};
use crate::smtp::{MailExchanger, SmtpExchanger};

/// Entry point bundling the configuration with its DNS and SMTP
/// collaborators. Cheap to clone; clones share the same state, including the
/// cap of `probe_concurrency × bulk_concurrency` probes in flight.
pub struct Scout<R = SystemResolver, X = SmtpExchanger> {
    inner: Arc<Inner<R, X>>,
}

struct Inner<R, X> {
    config: ScoutConfig,
    resolver: R,
    exchanger: X,
    connections: Arc<Semaphore>,
}

impl Scout {
    /// Scout using the system DNS configuration and plain SMTP over TCP.
    pub fn system(config: ScoutConfig) -> Self {
        Self::new(config, SystemResolver::from_system_conf(), SmtpExchanger)
    }
}

impl<R, X> Scout<R, X>
where
    R: MxResolver,
    X: MailExchanger,
{
    pub fn new(config: ScoutConfig, resolver: R, exchanger: X) -> Self {
        let slots = config
            .probe_concurrency
            .saturating_mul(config.bulk_concurrency)
            .clamp(1, Semaphore::MAX_PERMITS);
        Self {
            inner: Arc::new(Inner {
                config,
                resolver,
                exchanger,
                connections: Arc::new(Semaphore::new(slots)),
            }),
        }
    }

    pub fn config(&self) -> &ScoutConfig {
        &self.inner.config
    }

    pub(crate) fn resolver(&self) -> &R {
        &self.inner.resolver
    }

    pub(crate) fn exchanger(&self) -> &X {
        &self.inner.exchanger
    }

    /// Waits for one of the scout-wide probe slots. Hold the permit for as
    /// long as the probe may touch the network.
    pub(crate) async fn connection_slot(&self) -> Option<OwnedSemaphorePermit> {
        Arc::clone(&self.inner.connections).acquire_owned().await.ok()
    }
}

impl<R, X> Clone for Scout<R, X> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
