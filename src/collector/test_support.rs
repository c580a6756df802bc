//! Scripted in-memory sources for collector tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::schema::{ContinuationToken, Page, RawRecord, SourceKind};
use crate::sources::adapter::{PaginatedSource, RemoteError};

type Script = VecDeque<Result<Page, RemoteError>>;

/// Replays a per-region queue of pages or errors.
///
/// A region without a script, or whose script ran out, yields one
/// empty final page.
#[derive(Clone)]
pub struct ScriptedSource {
    kind: SourceKind,
    scripts: Arc<Mutex<HashMap<String, Script>>>,
    calls: Arc<Mutex<Vec<(String, Option<String>)>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl ScriptedSource {
    pub fn new(kind: SourceKind) -> Self {
        Self {
            kind,
            scripts: Arc::default(),
            calls: Arc::default(),
            in_flight: Arc::default(),
            max_in_flight: Arc::default(),
        }
    }

    /// Queues `pages` for `region`, chaining tokens `t1, t2, ...`
    /// between them and ending with no token.
    pub fn with_pages(self, region: &str, pages: &[&[&str]]) -> Self {
        let count = pages.len();
        let script = pages
            .iter()
            .enumerate()
            .map(|(i, names)| {
                Ok(Page {
                    records: names
                        .iter()
                        .map(|n| RawRecord {
                            name: n.to_string(),
                            description: None,
                        })
                        .collect(),
                    next_token: (i + 1 < count)
                        .then(|| ContinuationToken::new(format!("t{}", i + 1))),
                })
            })
            .collect();
        self.scripts
            .lock()
            .unwrap()
            .insert(region.to_string(), script);
        self
    }

    /// Appends a single page with an explicit continuation token.
    pub fn with_page(self, region: &str, names: &[&str], next: Option<&str>) -> Self {
        let page = Page {
            records: names
                .iter()
                .map(|n| RawRecord {
                    name: n.to_string(),
                    description: None,
                })
                .collect(),
            next_token: next.map(ContinuationToken::new),
        };
        self.scripts
            .lock()
            .unwrap()
            .entry(region.to_string())
            .or_default()
            .push_back(Ok(page));
        self
    }

    /// Makes the next call for `region` fail.
    pub fn with_error(self, region: &str, error: RemoteError) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .entry(region.to_string())
            .or_default()
            .push_back(Err(error));
        self
    }

    /// Calls made so far for `region`, with the token each carried.
    pub fn calls_for(&self, region: &str) -> Vec<Option<String>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(r, _)| r == region)
            .map(|(_, t)| t.clone())
            .collect()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn shared(self) -> Arc<dyn PaginatedSource> {
        Arc::new(self)
    }
}

#[async_trait::async_trait]
impl PaginatedSource for ScriptedSource {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    async fn fetch_page(
        &self,
        partition: &str,
        token: Option<&ContinuationToken>,
    ) -> Result<Page, RemoteError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        self.calls
            .lock()
            .unwrap()
            .push((partition.to_string(), token.map(|t| t.as_str().to_string())));

        let next = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(partition)
            .and_then(VecDeque::pop_front);

        tokio::task::yield_now().await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        next.unwrap_or_else(|| Ok(Page::default()))
    }
}

pub fn throttled() -> RemoteError {
    RemoteError::Throttled {
        code: "ThrottlingException".to_string(),
        message: "Rate exceeded".to_string(),
    }
}
