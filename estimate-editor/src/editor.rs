//! The estimate editor: one event pipeline tying search, the gateway, the
//! store, drag handling and rendering together.
//!
//! Every mutation is confirmed by the document store before the local store
//! changes. Failures never abort the session; they are turned into notices.

use crate::config::EditorSettings;
use crate::drag::{DragReorderController, DropOutcome};
use crate::error::{EditorError, Result};
use crate::models::{CatalogScope, DocumentHeader, ItemId, ItemKind, ItemPatch};
use crate::render::{LineItemsTemplate, RowAction, RowEvent, RowRenderer, RowView, ViewState};
use crate::search::{SearchController, Selection};
use crate::services::{AddedItems, ItemGateway, RemoveOutcome};
use crate::store::{DropTarget, LineItemStore, Placement};
use crate::totals::{compute_totals, Totals};
use crate::utils::coerce::{clamp_non_negative, coerce_amount, coerce_quantity};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A message for the user about something that happened in the session.
#[derive(Debug, Clone, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    SearchInput {
        scope: CatalogScope,
        text: String,
    },
    LoadMore(CatalogScope),
    Select {
        scope: CatalogScope,
        index: usize,
        quantity: String,
    },
    Row(RowEvent),
    DragStart(ItemId),
    DragOver {
        over: ItemId,
        pointer_y: f64,
        row_top: f64,
        row_height: f64,
    },
    DragDrop,
    DragCancel,
    /// Move a unit in one step, as a full drag gesture would.
    Move {
        id: ItemId,
        target: DropTarget,
    },
    RefreshPricing,
    Save(DocumentHeader),
}

pub struct EstimateEditor {
    store: LineItemStore,
    gateway: ItemGateway,
    products: SearchController,
    bundles: SearchController,
    drag: DragReorderController,
    view: ViewState,
    totals: Totals,
    notices: Vec<Notice>,
    settings: EditorSettings,
}

impl EstimateEditor {
    pub fn new(
        gateway: ItemGateway,
        products: SearchController,
        bundles: SearchController,
        settings: EditorSettings,
    ) -> Self {
        Self {
            store: LineItemStore::new(),
            gateway,
            products,
            bundles,
            drag: DragReorderController::new(),
            view: ViewState::new(),
            totals: Totals::default(),
            notices: Vec::new(),
            settings,
        }
    }

    pub fn store(&self) -> &LineItemStore {
        &self.store
    }

    pub fn totals(&self) -> Totals {
        self.totals
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn search(&self, scope: CatalogScope) -> &SearchController {
        match scope {
            CatalogScope::Products => &self.products,
            CatalogScope::Bundles => &self.bundles,
        }
    }

    fn search_mut(&mut self, scope: CatalogScope) -> &mut SearchController {
        match scope {
            CatalogScope::Products => &mut self.products,
            CatalogScope::Bundles => &mut self.bundles,
        }
    }

    pub fn rows(&self) -> Vec<RowView> {
        RowRenderer::rows(&self.store, &self.view)
    }

    pub fn render_html(&self) -> Result<String> {
        LineItemsTemplate::new(&self.store, &self.view, self.totals).to_html()
    }

    pub async fn dispatch(&mut self, event: EditorEvent) {
        match event {
            EditorEvent::SearchInput { scope, text } => self.search_mut(scope).input(&text),
            EditorEvent::LoadMore(scope) => {
                if !self.search_mut(scope).load_more() {
                    tracing::debug!(scope = %scope, "Nothing more to load");
                }
            }
            EditorEvent::Select {
                scope,
                index,
                quantity,
            } => match self.search_mut(scope).select(index, &quantity) {
                Some(selection) => self.add_selection(selection).await,
                None => self.notify(
                    NoticeLevel::Warning,
                    format!("No {} suggestion at position {}", scope, index + 1),
                ),
            },
            EditorEvent::Row(RowEvent { item, action }) => match action {
                RowAction::EditQuantity(raw) => self.edit_quantity(item, &raw).await,
                RowAction::EditUnitCost(raw) => match coerce_amount(&raw) {
                    Ok(cost) => self.edit_price(item, ItemPatch::unit_cost(cost)).await,
                    Err(e) => self.reject(e),
                },
                RowAction::EditUnitRetail(raw) => match coerce_amount(&raw) {
                    Ok(retail) => self.edit_price(item, ItemPatch::unit_retail(retail)).await,
                    Err(e) => self.reject(e),
                },
                RowAction::Remove => self.remove(item).await,
                RowAction::ToggleChildren => self.toggle(item),
            },
            EditorEvent::DragStart(id) => {
                if let Err(e) = self.drag.begin(&self.store, id) {
                    tracing::debug!(item_id = %id, error = %e, "Drag not started");
                }
            }
            EditorEvent::DragOver {
                over,
                pointer_y,
                row_top,
                row_height,
            } => {
                self.drag
                    .hover(&self.store, over, pointer_y, row_top, row_height);
            }
            EditorEvent::DragDrop => self.finish_drag().await,
            EditorEvent::DragCancel => self.drag.cancel(),
            EditorEvent::Move { id, target } => {
                if let Err(e) = self.drag.begin(&self.store, id) {
                    self.report("Move", e);
                    return;
                }
                let pointer_y = match target.placement {
                    Placement::Before => 0.0,
                    Placement::After => 1.0,
                };
                self.drag
                    .hover(&self.store, target.anchor, pointer_y, 0.0, 1.0);
                self.finish_drag().await;
            }
            EditorEvent::RefreshPricing => self.refresh_pricing().await,
            EditorEvent::Save(header) => self.save(header).await,
        }
    }

    /// Wait for the next search outcome from either box and apply it.
    /// Returns the scope whose suggestions changed.
    pub async fn pump_search(&mut self) -> Option<CatalogScope> {
        let (scope, outcome) = tokio::select! {
            Some(outcome) = self.products.next_outcome() => (CatalogScope::Products, outcome),
            Some(outcome) = self.bundles.next_outcome() => (CatalogScope::Bundles, outcome),
            else => return None,
        };

        match self.search_mut(scope).apply(outcome) {
            Ok(()) => Some(scope),
            Err(EditorError::Cancelled) => None,
            Err(e) => {
                tracing::debug!(scope = %scope, error = %e, "Search box moved to error state");
                Some(scope)
            }
        }
    }

    async fn add_selection(&mut self, selection: Selection) {
        let name = selection.entry.name.clone();
        let added = match self.gateway.add_item(&selection).await {
            Ok(added) => added,
            Err(e) => {
                self.report(&format!("Adding {}", name), e);
                return;
            }
        };

        let inserted = match added {
            AddedItems::Single(item) => self.store.insert(item, None),
            AddedItems::Group { parent, children } => self.store.insert_group(parent, children),
        };
        if let Err(e) = inserted {
            self.report(&format!("Adding {}", name), e);
            return;
        }
        self.recompute();
    }

    async fn edit_quantity(&mut self, id: ItemId, raw: &str) {
        let Some(item) = self.store.get(id) else {
            self.report("Quantity", EditorError::NotFound(id));
            return;
        };
        if item.kind == ItemKind::BundleChild {
            let rejection = EditorError::Rejected(format!(
                "quantity of '{}' follows its bundle; edit the bundle instead",
                item.name
            ));
            self.reject(rejection);
            return;
        }

        let old = item.quantity;
        let is_bundle = item.is_bundle();
        let new = match coerce_quantity(raw) {
            Ok(new) => new,
            Err(e) => {
                self.reject(e);
                return;
            }
        };
        let patch = ItemPatch::quantity(new);

        if let Err(e) = self.gateway.update_item(id, &patch).await {
            self.report("Updating quantity", e);
            return;
        }
        if let Err(e) = self.store.update(id, &patch) {
            self.report("Updating quantity", e);
            return;
        }

        if is_bundle && !old.is_zero() && old != new {
            self.cascade_quantity(id, old, new).await;
        }
        self.recompute();
    }

    /// Scale every child of `bundle` by `new / old`, one confirmed update
    /// per child. A failed child leaves that child as it was.
    ///
    /// Scaled quantities are rounded to 4 places, so repeated rescales can drift.
    async fn cascade_quantity(&mut self, bundle: ItemId, old: Decimal, new: Decimal) {
        let children: Vec<(ItemId, Decimal)> = self
            .store
            .children_of(bundle)
            .iter()
            .map(|c| (c.id, c.quantity))
            .collect();

        for (child, quantity) in children {
            let Some(scaled) = quantity
                .checked_mul(new)
                .and_then(|product| product.checked_div(old))
            else {
                let err = EditorError::OutOfRange(format!("{} x {} / {}", quantity, new, old));
                self.report(&format!("Updating component {}", child), err);
                continue;
            };
            let patch = ItemPatch::quantity(clamp_non_negative(scaled.round_dp(4)));
            let result = match self.gateway.update_item(child, &patch).await {
                Ok(()) => self.store.update(child, &patch).map(|_| ()),
                Err(e) => Err(e),
            };
            if let Err(e) = result {
                self.report(&format!("Updating component {}", child), e);
            }
        }
        tracing::debug!(bundle_id = %bundle, %old, %new, "Bundle quantity cascaded");
    }

    async fn edit_price(&mut self, id: ItemId, patch: ItemPatch) {
        if !self.store.contains(id) {
            self.report("Price", EditorError::NotFound(id));
            return;
        }
        if let Err(e) = self.gateway.update_item(id, &patch).await {
            self.report("Updating price", e);
            return;
        }
        if let Err(e) = self.store.update(id, &patch) {
            self.report("Updating price", e);
            return;
        }
        self.recompute();
    }

    async fn remove(&mut self, id: ItemId) {
        if !self.store.contains(id) {
            self.report("Remove", EditorError::NotFound(id));
            return;
        }

        match self.gateway.remove_item(id).await {
            Ok(RemoveOutcome::Removed) => match self.store.remove_cascade(id) {
                Ok(removed) => {
                    tracing::debug!(item_id = %id, rows = removed.len(), "Rows removed");
                    self.view.retain(&self.store);
                    self.recompute();
                }
                Err(e) => self.report("Remove", e),
            },
            Ok(RemoveOutcome::AlreadyPending) => {
                tracing::debug!(item_id = %id, "Ignoring duplicate removal");
            }
            Err(e) => self.report("Removing item", e),
        }
    }

    fn toggle(&mut self, id: ItemId) {
        match self.store.get(id) {
            Some(item) if item.is_bundle() => {
                let state = self.view.toggle(id);
                tracing::debug!(item_id = %id, ?state, "Bundle toggled");
            }
            _ => tracing::debug!(item_id = %id, "Toggle ignored for non-bundle row"),
        }
    }

    async fn finish_drag(&mut self) {
        match self.drag.drop(&mut self.store) {
            DropOutcome::Moved(orders) => {
                self.recompute();
                if self.settings.persist_order {
                    if let Err(e) = self.gateway.persist_order(&orders).await {
                        self.report("Saving row order", e);
                    }
                }
            }
            DropOutcome::Rejected => tracing::debug!("Drop rejected"),
            DropOutcome::NoOp => {}
        }
    }

    async fn refresh_pricing(&mut self) {
        let refreshed = match self.gateway.refresh_pricing().await {
            Ok(refreshed) => refreshed,
            Err(e) => {
                self.report("Refreshing pricing", e);
                return;
            }
        };

        let applied = refreshed
            .iter()
            .filter(|r| self.store.apply_refresh(r))
            .count();
        self.recompute();
        self.notify(
            NoticeLevel::Info,
            format!("Pricing refreshed for {} item(s)", applied),
        );
    }

    async fn save(&mut self, header: DocumentHeader) {
        match self.gateway.save_document(&header).await {
            Ok(()) => self.notify(NoticeLevel::Info, "Estimate saved".to_string()),
            Err(e) => self.report("Saving estimate", e),
        }
    }

    fn recompute(&mut self) {
        match compute_totals(self.store.all()) {
            Ok(totals) => self.totals = totals,
            Err(e) => self.report("Computing totals", e),
        }
    }

    /// Refuse a local edit before anything is sent.
    fn reject(&mut self, err: EditorError) {
        tracing::debug!(error = %err, "Edit refused");
        self.notify(NoticeLevel::Warning, err.to_string());
    }

    fn notify(&mut self, level: NoticeLevel, message: String) {
        self.notices.push(Notice {
            level,
            message,
            at: Utc::now(),
        });
    }

    fn report(&mut self, context: &str, err: EditorError) {
        if !err.is_user_visible() {
            tracing::debug!(context, error = %err, "Suppressed editor error");
            return;
        }
        tracing::error!(context, error = %err, "Editor operation failed");
        self.notify(NoticeLevel::Error, format!("{}: {}", context, err));
    }
}
