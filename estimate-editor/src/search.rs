//! Catalog search box state machine.
//!
//! Each keystroke restarts a debounce timer; the trailing query runs in a
//! spawned task that reports back over a channel. Outcomes carry the sequence
//! number they were issued under and only the latest one may change the
//! suggestion list.

use crate::error::{EditorError, Result};
use crate::models::{CatalogEntry, CatalogScope};
use crate::services::CatalogSearch;
use crate::utils::coerce::coerce_selection_quantity;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

static BARCODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{8,14}$").expect("Failed to compile barcode pattern"));

static SKU: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w-]+$").expect("Failed to compile SKU pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Barcode,
    Sku,
    Text,
}

/// Decide whether `text` is worth sending to the catalog.
pub fn classify_query(text: &str) -> Option<QueryKind> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if BARCODE.is_match(text) {
        return Some(QueryKind::Barcode);
    }
    if SKU.is_match(text)
        && text.chars().any(char::is_alphabetic)
        && text.chars().any(|c| c.is_ascii_digit())
    {
        return Some(QueryKind::Sku);
    }
    (text.chars().count() >= 2).then_some(QueryKind::Text)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchState {
    Idle,
    Pending,
    Displaying,
    Error(String),
}

/// A catalog entry the user picked, with the requested quantity.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub scope: CatalogScope,
    pub entry: CatalogEntry,
    pub quantity: u32,
}

/// Result of one search task.
#[derive(Debug)]
pub struct SearchOutcome {
    pub scope: CatalogScope,
    seq: u64,
    page: u32,
    result: Result<Vec<CatalogEntry>>,
}

pub struct SearchController {
    scope: CatalogScope,
    catalog: Arc<dyn CatalogSearch>,
    debounce: Duration,
    page_size: usize,
    query: String,
    page: u32,
    results: Vec<CatalogEntry>,
    has_more: bool,
    state: SearchState,
    issued: u64,
    inflight: Option<JoinHandle<()>>,
    tx: mpsc::UnboundedSender<SearchOutcome>,
    rx: mpsc::UnboundedReceiver<SearchOutcome>,
}

impl SearchController {
    pub fn new(
        scope: CatalogScope,
        catalog: Arc<dyn CatalogSearch>,
        debounce: Duration,
        page_size: usize,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            scope,
            catalog,
            debounce,
            page_size: page_size.max(1),
            query: String::new(),
            page: 1,
            results: Vec::new(),
            has_more: false,
            state: SearchState::Idle,
            issued: 0,
            inflight: None,
            tx,
            rx,
        }
    }

    pub fn scope(&self) -> CatalogScope {
        self.scope
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &[CatalogEntry] {
        &self.results
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    /// The search box text changed. Restarts from page 1.
    pub fn input(&mut self, text: &str) {
        self.cancel_pending();
        self.query = text.to_string();
        self.page = 1;
        self.results.clear();
        self.has_more = false;

        if classify_query(&self.query).is_none() {
            self.state = SearchState::Idle;
            return;
        }

        self.state = SearchState::Pending;
        self.spawn(1, Some(self.debounce));
    }

    /// Fetch the next page right away. Returns false when there is nothing
    /// more to load or a request is already pending.
    pub fn load_more(&mut self) -> bool {
        if !self.has_more
            || self.state == SearchState::Pending
            || classify_query(&self.query).is_none()
        {
            return false;
        }

        self.cancel_pending();
        self.state = SearchState::Pending;
        self.spawn(self.page + 1, None);
        true
    }

    /// Wait for the next task outcome. Stale outcomes are returned too;
    /// [`apply`](Self::apply) filters them.
    pub async fn next_outcome(&mut self) -> Option<SearchOutcome> {
        self.rx.recv().await
    }

    /// Fold an outcome into the suggestion list.
    ///
    /// Outcomes from superseded requests fail with `Cancelled` and change
    /// nothing. A failed request moves to `Error` and keeps the current list.
    pub fn apply(&mut self, outcome: SearchOutcome) -> Result<()> {
        if outcome.seq != self.issued {
            tracing::debug!(
                scope = %self.scope,
                seq = outcome.seq,
                latest = self.issued,
                "Dropping stale search outcome"
            );
            return Err(EditorError::Cancelled);
        }
        self.inflight = None;

        match outcome.result {
            Ok(entries) => {
                self.has_more = entries.len() >= self.page_size;
                if outcome.page <= 1 {
                    self.results = entries;
                } else {
                    self.results.extend(entries);
                }
                self.page = outcome.page;
                self.state = SearchState::Displaying;
                tracing::debug!(
                    scope = %self.scope,
                    page = self.page,
                    results = self.results.len(),
                    has_more = self.has_more,
                    "Search results updated"
                );
                Ok(())
            }
            Err(e) => {
                tracing::warn!(scope = %self.scope, query = %self.query, error = %e, "Search failed");
                self.state = SearchState::Error(e.to_string());
                Err(e)
            }
        }
    }

    /// Pick the suggestion at `index` and reset the box.
    pub fn select(&mut self, index: usize, quantity_text: &str) -> Option<Selection> {
        let entry = self.results.get(index)?.clone();
        self.cancel_pending();
        self.query.clear();
        self.results.clear();
        self.page = 1;
        self.has_more = false;
        self.state = SearchState::Idle;

        Some(Selection {
            scope: self.scope,
            entry,
            quantity: coerce_selection_quantity(quantity_text),
        })
    }

    fn spawn(&mut self, page: u32, delay: Option<Duration>) {
        self.issued += 1;
        let seq = self.issued;
        let scope = self.scope;
        let query = self.query.trim().to_string();
        let catalog = Arc::clone(&self.catalog);
        let tx = self.tx.clone();

        self.inflight = Some(tokio::spawn(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            tracing::debug!(scope = %scope, seq, page, query = %query, "Searching catalog");
            let result = catalog.search(scope, &query, page).await;
            let _ = tx.send(SearchOutcome {
                scope,
                seq,
                page,
                result,
            });
        }));
    }

    /// Abort the running task and invalidate anything it already queued.
    fn cancel_pending(&mut self) {
        self.issued += 1;
        if let Some(handle) = self.inflight.take() {
            handle.abort();
        }
    }
}

impl Drop for SearchController {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}
