//! Item mutation gateway.
//!
//! Turns editor intents into document store calls and the store's replies
//! into line items. Nothing here touches the local store: callers apply the
//! returned values only after the call succeeded.

use crate::error::{EditorError, Result};
use crate::models::{
    AddItemRequest, AddItemResponse, DocumentHeader, ItemId, ItemKind, ItemPatch, LineItem,
    PriceRefresh,
};
use crate::search::Selection;
use crate::services::document_client::DocumentStore;
use crate::utils::coerce::clamp_money;
use dashmap::DashSet;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Confirmed result of an add.
#[derive(Debug, Clone, PartialEq)]
pub enum AddedItems {
    Single(LineItem),
    Group {
        parent: LineItem,
        children: Vec<LineItem>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    /// A removal for the same id is still waiting on the store.
    AlreadyPending,
}

/// Marks an id as having a removal in flight until dropped.
struct InFlight<'a> {
    ids: &'a DashSet<ItemId>,
    id: ItemId,
}

impl<'a> InFlight<'a> {
    fn acquire(ids: &'a DashSet<ItemId>, id: ItemId) -> Option<Self> {
        ids.insert(id).then_some(Self { ids, id })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.ids.remove(&self.id);
    }
}

pub struct ItemGateway {
    store: Arc<dyn DocumentStore>,
    removals: DashSet<ItemId>,
}

impl ItemGateway {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            removals: DashSet::new(),
        }
    }

    /// Add the selected catalog entry. Bundles come back expanded into the
    /// parent row and its children, in the order the store assigned.
    pub async fn add_item(&self, selection: &Selection) -> Result<AddedItems> {
        let entry = &selection.entry;
        let kind = selection.scope.item_kind();
        let request = AddItemRequest {
            id: entry.id,
            kind,
            quantity: selection.quantity,
            name: Some(entry.name.clone()),
            description: (!entry.description.is_empty()).then(|| entry.description.clone()),
            unit_cost: Some(entry.unit_cost),
            unit_retail: Some(entry.unit_retail),
        };

        let response = self.store.add_item(&request).await?;

        match (kind, response) {
            (ItemKind::Product, AddItemResponse::Product { item_id }) => {
                tracing::info!(item_id = %item_id, catalog_id = %entry.id, "Product added");
                Ok(AddedItems::Single(LineItem {
                    id: item_id,
                    kind: ItemKind::Product,
                    name: entry.name.clone(),
                    description: entry.description.clone(),
                    quantity: Decimal::from(selection.quantity),
                    unit_cost: clamp_money(entry.unit_cost),
                    unit_retail: clamp_money(entry.unit_retail),
                    stock: entry.stock,
                    parent_id: None,
                    order: 0,
                }))
            }
            (ItemKind::Bundle, AddItemResponse::Bundle { parent, items }) => {
                let mut parent = parent.into_line_item(ItemKind::Bundle);
                parent.kind = ItemKind::Bundle;
                parent.parent_id = None;
                parent.stock = None;

                let mut children = Vec::with_capacity(items.len());
                for record in items {
                    if let Some(owner) = record.parent_id {
                        if owner != parent.id {
                            return Err(EditorError::InvalidResponse(format!(
                                "child {} names bundle {} instead of {}",
                                record.id, owner, parent.id
                            )));
                        }
                    }
                    let mut child = record.into_line_item(ItemKind::BundleChild);
                    child.kind = ItemKind::BundleChild;
                    child.parent_id = Some(parent.id);
                    children.push(child);
                }

                tracing::info!(
                    item_id = %parent.id,
                    catalog_id = %entry.id,
                    children = children.len(),
                    "Bundle added"
                );
                Ok(AddedItems::Group { parent, children })
            }
            (kind, other) => Err(EditorError::InvalidResponse(format!(
                "unexpected add-item reply for a {}: {:?}",
                kind, other
            ))),
        }
    }

    pub async fn update_item(&self, id: ItemId, patch: &ItemPatch) -> Result<()> {
        if patch.is_empty() {
            return Ok(());
        }
        self.store.update_item(id, patch).await?;
        tracing::debug!(item_id = %id, ?patch, "Line item updated");
        Ok(())
    }

    /// Remove one item. A second call for an id whose removal is still in
    /// flight returns `AlreadyPending` without contacting the store.
    pub async fn remove_item(&self, id: ItemId) -> Result<RemoveOutcome> {
        let Some(_in_flight) = InFlight::acquire(&self.removals, id) else {
            tracing::debug!(item_id = %id, "Removal already in flight");
            return Ok(RemoveOutcome::AlreadyPending);
        };

        self.store.remove_item(id).await?;
        tracing::info!(item_id = %id, "Line item removed");
        Ok(RemoveOutcome::Removed)
    }

    pub fn is_removing(&self, id: ItemId) -> bool {
        self.removals.contains(&id)
    }

    /// Current catalog cost and stock for the document's items.
    pub async fn refresh_pricing(&self) -> Result<Vec<PriceRefresh>> {
        let response = self.store.refresh().await?;
        tracing::info!(items = response.items.len(), "Pricing refreshed");
        Ok(response.items)
    }

    pub async fn save_document(&self, header: &DocumentHeader) -> Result<()> {
        self.store.save(header).await?;
        tracing::info!(status = %header.status, "Estimate saved");
        Ok(())
    }

    /// Send each row's display position. Stops at the first failure.
    pub async fn persist_order(&self, orders: &[(ItemId, u32)]) -> Result<()> {
        for (id, order) in orders {
            self.store.update_item(*id, &ItemPatch::order(*order)).await?;
        }
        tracing::debug!(rows = orders.len(), "Order persisted");
        Ok(())
    }
}
