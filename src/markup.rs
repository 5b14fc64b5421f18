//! Paged, searchable markup results.

use std::sync::Arc;

use tracing::{trace, warn};

use crate::{
    Result,
    backend::MarkupSource,
    common::Sequenced,
    model::{MarkupPage, MarkupQuery},
};

/// Browses markup results, keeping only the newest response visible.
///
/// Searches may overlap. A response is applied only if no later search has
/// been applied already; in-flight searches are never cancelled.
pub struct MarkupBrowser {
    source: Arc<dyn MarkupSource>,
    latest: Sequenced<MarkupPage>,
}

impl MarkupBrowser {
    pub fn new(source: Arc<dyn MarkupSource>) -> Self {
        Self {
            source,
            latest: Sequenced::new(),
        }
    }

    /// Runs `query`. Returns `None` when a newer search was applied while
    /// this one was in flight.
    pub async fn search(
        &self,
        query: &MarkupQuery,
    ) -> Result<Option<MarkupPage>> {
        let ticket = self.latest.issue();
        trace!("MarkupBrowser::search ticket {} {:?}", ticket, query);

        let page = match self.source.markup_results(query).await {
            Ok(page) => page,
            Err(err) if ticket < self.latest.last_applied() => {
                warn!("discarding failed stale markup search {}: {}", ticket, err);
                return Ok(None);
            }
            Err(err) => return Err(err),
        };

        if self.latest.apply(ticket, page.clone()) {
            Ok(Some(page))
        } else {
            warn!("discarding stale markup search {} (latest is {})", ticket, self.latest.last_applied());
            Ok(None)
        }
    }

    /// The last applied page.
    pub fn current(&self) -> Option<MarkupPage> {
        self.latest.current()
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, sync::Mutex};

    use async_trait::async_trait;
    use tokio::sync::{mpsc, oneshot};

    use super::*;
    use crate::{PipeforgeError, backend::MemBackend, model::MarkupResult};

    /// Holds every request until the test releases it.
    struct Gated {
        calls: mpsc::UnboundedSender<String>,
        gates: Mutex<HashMap<String, oneshot::Receiver<MarkupPage>>>,
    }

    #[async_trait]
    impl MarkupSource for Gated {
        async fn markup_results(
            &self,
            query: &MarkupQuery,
        ) -> Result<MarkupPage> {
            let key = query.search.clone().unwrap_or_default();
            let gate = self.gates.lock().unwrap().remove(&key).unwrap();
            self.calls.send(key).unwrap();
            gate.await.map_err(|e| PipeforgeError::Network(e.to_string()))
        }
    }

    fn page(total: usize) -> MarkupPage {
        MarkupPage {
            records_total: total,
            records_filtered: total,
            media: vec![],
        }
    }

    #[tokio::test]
    async fn test_stale_response_is_discarded() {
        let (calls_tx, mut calls) = mpsc::unbounded_channel();
        let mut senders = HashMap::new();
        let mut gates = HashMap::new();
        for key in ["one", "two", "three"] {
            let (tx, rx) = oneshot::channel();
            senders.insert(key, tx);
            gates.insert(key.to_string(), rx);
        }
        let browser = Arc::new(MarkupBrowser::new(Arc::new(Gated {
            calls: calls_tx,
            gates: Mutex::new(gates),
        })));

        let mut handles = HashMap::new();
        for key in ["one", "two", "three"] {
            let b = browser.clone();
            handles.insert(key, tokio::spawn(async move { b.search(&MarkupQuery::default().search(key)).await }));
            assert_eq!(calls.recv().await.unwrap(), key);
        }

        senders.remove("one").unwrap().send(page(1)).unwrap();
        assert_eq!(handles.remove("one").unwrap().await.unwrap().unwrap(), Some(page(1)));
        senders.remove("three").unwrap().send(page(3)).unwrap();
        assert_eq!(handles.remove("three").unwrap().await.unwrap().unwrap(), Some(page(3)));
        senders.remove("two").unwrap().send(page(2)).unwrap();
        assert_eq!(handles.remove("two").unwrap().await.unwrap().unwrap(), None);

        assert_eq!(browser.current(), Some(page(3)));
    }

    #[tokio::test]
    async fn test_search_mem_source() {
        let mem = MemBackend::new();
        for id in 1..=3 {
            mem.add_markup(MarkupResult {
                id,
                job_id: 7,
                source_medium: Some(format!("video-{}.mp4", id)),
                ..Default::default()
            });
        }
        let browser = MarkupBrowser::new(mem.markup());

        let page = browser.search(&MarkupQuery::with_job(7).search("VIDEO-2")).await.unwrap().unwrap();
        assert_eq!(page.records_total, 3);
        assert_eq!(page.records_filtered, 1);
        assert_eq!(page.media[0].id, 2);
        assert_eq!(browser.current(), Some(page));
    }
}
