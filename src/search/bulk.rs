use futures::stream::{self, Stream, StreamExt};

use crate::mx::MxResolver;
use crate::names::NameInput;
use crate::probe::ProbeResult;
use crate::scout::Scout;
use crate::smtp::MailExchanger;

/// One domain to search, with optional names.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkRequest {
    pub domain: String,
    #[cfg_attr(feature = "with-serde", serde(default))]
    pub names: NameInput,
}

impl BulkRequest {
    pub fn new(domain: impl Into<String>, names: impl Into<NameInput>) -> Self {
        Self {
            domain: domain.into(),
            names: names.into(),
        }
    }

    /// Request probing the role prefixes only.
    pub fn domain_only(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            names: NameInput::default(),
        }
    }
}

/// A [`BulkRequest`] echoed back with its outcome.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct BulkResult {
    pub domain: String,
    pub names: NameInput,
    pub result: ProbeResult,
}

impl<R, X> Scout<R, X>
where
    R: MxResolver + 'static,
    X: MailExchanger + 'static,
{
    /// Searches every request, at most `bulk_concurrency` at a time, yielding
    /// results as they complete.
    pub fn search_bulk_stream(
        &self,
        requests: Vec<BulkRequest>,
    ) -> impl Stream<Item = BulkResult> + Send + use<R, X> {
        let scout = self.clone();
        let limit = self.config().bulk_concurrency.max(1);
        stream::iter(requests)
            .map(move |request| {
                let scout = scout.clone();
                async move {
                    let result = scout.search_domain(&request.domain, &request.names).await;
                    BulkResult {
                        domain: request.domain,
                        names: request.names,
                        result,
                    }
                }
            })
            .buffer_unordered(limit)
    }

    /// Collects [`Scout::search_bulk_stream`]; results are in completion order.
    pub async fn search_bulk(&self, requests: Vec<BulkRequest>) -> Vec<BulkResult> {
        self.search_bulk_stream(requests).collect().await
    }
}
