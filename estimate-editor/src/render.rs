//! Row projection and HTML fragment rendering.

use crate::error::Result;
use crate::models::{ItemId, ItemKind};
use crate::store::LineItemStore;
use crate::totals::Totals;
use askama::Template;
use rust_decimal::Decimal;
use std::collections::HashSet;

/// Display state kept outside the store: which bundles are collapsed.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    collapsed: HashSet<ItemId>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_collapsed(&self, id: ItemId) -> bool {
        self.collapsed.contains(&id)
    }

    /// Flip a bundle between expanded and collapsed. Returns the new state.
    pub fn toggle(&mut self, id: ItemId) -> Toggle {
        if self.collapsed.remove(&id) {
            Toggle::Expanded
        } else {
            self.collapsed.insert(id);
            Toggle::Collapsed
        }
    }

    /// Forget bundles that are no longer in the store.
    pub fn retain(&mut self, store: &LineItemStore) {
        self.collapsed.retain(|id| store.contains(*id));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Expanded,
    Collapsed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowView {
    pub id: ItemId,
    pub kind: ItemKind,
    pub name: String,
    pub description: String,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
    pub unit_retail: Decimal,
    /// `None` when quantity times cost does not fit a `Decimal`.
    pub line_total: Option<Decimal>,
    pub stock: Option<u32>,
    pub shortage: bool,
    pub quantity_editable: bool,
    pub toggle: Option<Toggle>,
    pub hidden: bool,
    pub depth: u8,
}

impl RowView {
    pub fn toggle_label(&self) -> &'static str {
        match self.toggle {
            Some(Toggle::Expanded) => "-",
            Some(Toggle::Collapsed) => "+",
            None => "",
        }
    }

    pub fn stock_label(&self) -> String {
        self.stock.map(|s| s.to_string()).unwrap_or_default()
    }

    pub fn line_total_label(&self) -> String {
        match self.line_total {
            Some(total) => format!("{:.2}", total),
            None => "overflow".to_string(),
        }
    }
}

pub struct RowRenderer;

impl RowRenderer {
    pub fn rows(store: &LineItemStore, view: &ViewState) -> Vec<RowView> {
        store
            .all()
            .iter()
            .map(|item| {
                let toggle = item.is_bundle().then(|| {
                    if view.is_collapsed(item.id) {
                        Toggle::Collapsed
                    } else {
                        Toggle::Expanded
                    }
                });
                RowView {
                    id: item.id,
                    kind: item.kind,
                    name: item.name.clone(),
                    description: item.description.clone(),
                    quantity: item.quantity,
                    unit_cost: item.unit_cost,
                    unit_retail: item.unit_retail,
                    line_total: item.line_total().map(|t| t.round_dp(2)),
                    stock: item.stock,
                    shortage: item.is_short(),
                    quantity_editable: item.kind != ItemKind::BundleChild,
                    toggle,
                    hidden: item.parent_id.is_some_and(|p| view.is_collapsed(p)),
                    depth: if item.is_top_level() { 0 } else { 1 },
                }
            })
            .collect()
    }
}

#[derive(Template)]
#[template(path = "line_items.html")]
pub struct LineItemsTemplate {
    pub rows: Vec<RowView>,
    pub totals: Totals,
}

impl LineItemsTemplate {
    pub fn new(store: &LineItemStore, view: &ViewState, totals: Totals) -> Self {
        Self {
            rows: RowRenderer::rows(store, view),
            totals,
        }
    }

    pub fn to_html(&self) -> Result<String> {
        Ok(self.render()?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowAction {
    EditQuantity(String),
    EditUnitCost(String),
    EditUnitRetail(String),
    Remove,
    ToggleChildren,
}

/// A control change on a rendered row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowEvent {
    pub item: ItemId,
    pub action: RowAction,
}

impl RowEvent {
    /// Map a control's `data-item-id`, `data-action` and current value back
    /// to a typed event. Unknown actions and ids yield `None`.
    pub fn from_control(item_id: &str, action: &str, value: &str) -> Option<Self> {
        let item = ItemId(item_id.trim().parse().ok()?);
        let action = match action {
            "quantity" => RowAction::EditQuantity(value.to_string()),
            "unit-cost" => RowAction::EditUnitCost(value.to_string()),
            "unit-retail" => RowAction::EditUnitRetail(value.to_string()),
            "remove" => RowAction::Remove,
            "toggle" => RowAction::ToggleChildren,
            _ => return None,
        };
        Some(Self { item, action })
    }
}
