//! Test helpers for estimate-editor integration tests.
//!
//! Provides in-memory fakes of the document store and the catalog so the
//! editor can be driven without a backend.

#![allow(dead_code)]

use async_trait::async_trait;
use estimate_editor::config::{
    DocumentStoreSettings, EditorSettings, LoggingSettings, SearchSettings, Settings,
};
use estimate_editor::error::{EditorError, Result};
use estimate_editor::models::{
    AddItemRequest, AddItemResponse, CatalogEntry, CatalogId, CatalogScope, DocumentHeader,
    ItemId, ItemKind, ItemPatch, LineItemRecord, PriceRefresh, RefreshResponse,
};
use estimate_editor::services::{CatalogSearch, DocumentStore};
use estimate_editor::startup::build_editor_with;
use estimate_editor::EstimateEditor;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

static TRACING: Once = Once::new();

pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

pub const PAGE_SIZE: usize = 25;

pub fn settings(persist_order: bool) -> Settings {
    Settings {
        document_store: DocumentStoreSettings {
            base_url: "http://localhost:5000/estimates".to_string(),
            estimate_id: 1,
            connect_timeout_secs: 5,
        },
        search: SearchSettings {
            debounce_ms: 300,
            page_size: PAGE_SIZE,
        },
        editor: EditorSettings { persist_order },
        logging: LoggingSettings::default(),
    }
}

pub fn entry(id: i64, name: &str, cost: Decimal, retail: Decimal, stock: Option<u32>) -> CatalogEntry {
    CatalogEntry {
        id: CatalogId(id),
        name: name.to_string(),
        description: String::new(),
        unit_cost: cost,
        unit_retail: retail,
        stock,
    }
}

/// Catalog answering from a fixed list, matching names case-insensitively.
pub struct FakeCatalog {
    products: Vec<CatalogEntry>,
    bundles: Vec<CatalogEntry>,
    delay: Duration,
    failing: AtomicBool,
    calls: Mutex<Vec<(CatalogScope, String, u32)>>,
}

impl FakeCatalog {
    pub fn new(products: Vec<CatalogEntry>, bundles: Vec<CatalogEntry>) -> Self {
        Self {
            products,
            bundles,
            delay: Duration::ZERO,
            failing: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every search takes `delay` to answer.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<(CatalogScope, String, u32)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn queries(&self) -> Vec<String> {
        self.calls().into_iter().map(|(_, q, _)| q).collect()
    }
}

#[async_trait]
impl CatalogSearch for FakeCatalog {
    async fn search(
        &self,
        scope: CatalogScope,
        query: &str,
        page: u32,
    ) -> Result<Vec<CatalogEntry>> {
        self.calls
            .lock()
            .unwrap()
            .push((scope, query.to_string(), page));

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(EditorError::NetworkFailure("catalog offline".to_string()));
        }

        let source = match scope {
            CatalogScope::Products => &self.products,
            CatalogScope::Bundles => &self.bundles,
        };
        let needle = query.to_lowercase();
        let skip = (page.saturating_sub(1) as usize) * PAGE_SIZE;
        Ok(source
            .iter()
            .filter(|e| e.name.to_lowercase().contains(&needle))
            .skip(skip)
            .take(PAGE_SIZE)
            .cloned()
            .collect())
    }
}

/// One component of a fake bundle: name, quantity per bundle, cost, retail.
pub type Component = (&'static str, Decimal, Decimal, Decimal);

/// Document store keeping a log of every call it receives.
pub struct FakeStore {
    next_id: AtomicI64,
    bundles: HashMap<CatalogId, Vec<Component>>,
    refresh: Vec<PriceRefresh>,
    failing: AtomicBool,
    failing_updates: Mutex<HashSet<ItemId>>,
    pub adds: Mutex<Vec<AddItemRequest>>,
    pub updates: Mutex<Vec<(ItemId, ItemPatch)>>,
    pub removals: Mutex<Vec<ItemId>>,
    pub saves: Mutex<Vec<DocumentHeader>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(100),
            bundles: HashMap::new(),
            refresh: Vec::new(),
            failing: AtomicBool::new(false),
            failing_updates: Mutex::new(HashSet::new()),
            adds: Mutex::new(Vec::new()),
            updates: Mutex::new(Vec::new()),
            removals: Mutex::new(Vec::new()),
            saves: Mutex::new(Vec::new()),
        }
    }

    pub fn with_bundle(mut self, id: i64, components: Vec<Component>) -> Self {
        self.bundles.insert(CatalogId(id), components);
        self
    }

    pub fn with_refresh(mut self, refresh: Vec<PriceRefresh>) -> Self {
        self.refresh = refresh;
        self
    }

    /// Make every call fail with a 500.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn fail_updates_for(&self, id: ItemId) {
        self.failing_updates.lock().unwrap().insert(id);
    }

    pub fn updates(&self) -> Vec<(ItemId, ItemPatch)> {
        self.updates.lock().unwrap().clone()
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(EditorError::RequestFailed {
                status: 500,
                message: "store unavailable".to_string(),
            });
        }
        Ok(())
    }

    fn next_id(&self) -> ItemId {
        ItemId(self.next_id.fetch_add(1, Ordering::SeqCst))
    }
}

#[async_trait]
impl DocumentStore for FakeStore {
    async fn add_item(&self, request: &AddItemRequest) -> Result<AddItemResponse> {
        self.check()?;
        self.adds.lock().unwrap().push(request.clone());

        if request.kind != ItemKind::Bundle {
            return Ok(AddItemResponse::Product {
                item_id: self.next_id(),
            });
        }

        let components = self.bundles.get(&request.id).cloned().unwrap_or_default();
        let parent_id = self.next_id();
        let quantity = Decimal::from(request.quantity);
        let parent = LineItemRecord {
            id: parent_id,
            kind: Some(ItemKind::Bundle),
            name: request.name.clone().unwrap_or_default(),
            description: request.description.clone(),
            quantity,
            unit_cost: request.unit_cost.unwrap_or_default(),
            unit_retail: request.unit_retail.unwrap_or_default(),
            stock: None,
            parent_id: None,
        };
        let items = components
            .into_iter()
            .map(|(name, per_bundle, cost, retail)| LineItemRecord {
                id: self.next_id(),
                kind: Some(ItemKind::BundleChild),
                name: name.to_string(),
                description: None,
                quantity: per_bundle * quantity,
                unit_cost: cost,
                unit_retail: retail,
                stock: None,
                parent_id: Some(parent_id),
            })
            .collect();

        Ok(AddItemResponse::Bundle { parent, items })
    }

    async fn update_item(&self, id: ItemId, patch: &ItemPatch) -> Result<()> {
        self.check()?;
        if self.failing_updates.lock().unwrap().contains(&id) {
            return Err(EditorError::RequestFailed {
                status: 409,
                message: format!("item {} is locked", id),
            });
        }
        self.updates.lock().unwrap().push((id, patch.clone()));
        Ok(())
    }

    async fn remove_item(&self, id: ItemId) -> Result<()> {
        self.check()?;
        self.removals.lock().unwrap().push(id);
        Ok(())
    }

    async fn refresh(&self) -> Result<RefreshResponse> {
        self.check()?;
        Ok(RefreshResponse {
            items: self.refresh.clone(),
        })
    }

    async fn save(&self, header: &DocumentHeader) -> Result<()> {
        self.check()?;
        self.saves.lock().unwrap().push(header.clone());
        Ok(())
    }
}

pub fn editor(store: Arc<FakeStore>, catalog: Arc<FakeCatalog>, persist_order: bool) -> EstimateEditor {
    init_tracing();
    build_editor_with(&settings(persist_order), store, catalog)
}
