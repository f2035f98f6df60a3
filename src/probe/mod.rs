//! Single-address probing: MX walk, recipient verification and catch-all
//! detection.

mod catch_all;
mod types;

pub use catch_all::is_catch_all;
pub use types::{ProbeResult, ProbeStatus, user_name};

use std::time::Instant;

use crate::mx::{self, MxResolver};
use crate::names::Candidate;
use crate::scout::Scout;
use crate::smtp::MailExchanger;

impl<R, X> Scout<R, X>
where
    R: MxResolver,
    X: MailExchanger,
{
    /// Parses `address` and probes it. Unparseable input is an invalid result.
    pub async fn probe_address(&self, address: &str) -> ProbeResult {
        let started = Instant::now();
        match Candidate::parse(address) {
            Ok(candidate) => self.probe(&candidate).await,
            Err(err) => ProbeResult::rejected_input(address, err).finish(started),
        }
    }

    /// Probes `candidate` against its domain's MX hosts, most preferred first.
    ///
    /// The first host that answers `RCPT TO` decides; hosts that fail before
    /// that are skipped. Never fails: every outcome is a [`ProbeResult`].
    /// Waits for a free slot when the scout is already at its connection cap.
    pub async fn probe(&self, candidate: &Candidate) -> ProbeResult {
        let _slot = self.connection_slot().await;
        self.probe_in_slot(candidate).await
    }

    /// [`Scout::probe`] for a caller already holding a connection slot.
    pub(crate) async fn probe_in_slot(&self, candidate: &Candidate) -> ProbeResult {
        let started = Instant::now();
        let config = self.config();
        let mut result = ProbeResult::pending(candidate);

        let records = match mx::lookup(self.resolver(), candidate.domain(), config.dns_timeout).await {
            Ok(records) => records,
            Err(err) => {
                tracing::warn!(target: "mailscout::probe", %candidate, error = %err, "MX resolution failed");
                result.message = format!("Rejected: {err}");
                return result.finish(started);
            }
        };

        for record in &records {
            let host = record.exchange.as_str();
            result.connections += 1;
            let dialogue = match self
                .exchanger()
                .verify_recipient(host, candidate.as_str(), &config.smtp)
                .await
            {
                Ok(dialogue) => dialogue,
                Err(err) => {
                    result.verification_ops += err.commands;
                    tracing::debug!(target: "mailscout::probe", %candidate, error = %err, "no answer, trying next MX");
                    continue;
                }
            };

            result.verification_ops += dialogue.commands;
            result.mx = host.to_string();
            if !dialogue.accepted() {
                result.message = dialogue.reply.to_string();
            } else if config.check_catch_all
                && is_catch_all(self.exchanger(), candidate.domain(), host, &config.smtp).await
            {
                result.status = ProbeStatus::Risky;
                result.catch_all = true;
                result.message = ProbeResult::CATCH_ALL.to_string();
            } else {
                result.status = ProbeStatus::Valid;
                result.message = dialogue.reply.to_string();
            }
            tracing::debug!(
                target: "mailscout::probe",
                %candidate,
                mx = host,
                status = %result.status,
                "definitive answer"
            );
            return result.finish(started);
        }

        result.message = ProbeResult::ALL_MX_FAILED.to_string();
        result.finish(started)
    }

    /// Whether `mx_host` accepts any recipient at `domain`.
    pub async fn is_catch_all(&self, domain: &str, mx_host: &str) -> bool {
        let _slot = self.connection_slot().await;
        is_catch_all(self.exchanger(), domain, mx_host, &self.config().smtp).await
    }
}
