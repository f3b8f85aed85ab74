//! Line item model for estimate-editor.

use crate::utils::coerce::{clamp_money, clamp_non_negative};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier assigned by the document store when an item is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub i64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemKind {
    Product,
    Bundle,
    BundleChild,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Product => "product",
            ItemKind::Bundle => "bundle",
            ItemKind::BundleChild => "bundle-child",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of an estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub id: ItemId,
    pub kind: ItemKind,
    pub name: String,
    pub description: String,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
    pub unit_retail: Decimal,
    pub stock: Option<u32>,
    pub parent_id: Option<ItemId>,
    pub order: u32,
}

impl LineItem {
    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn is_bundle(&self) -> bool {
        self.kind == ItemKind::Bundle
    }

    /// Quantity times unit cost, or `None` when the product overflows.
    pub fn line_total(&self) -> Option<Decimal> {
        self.quantity.checked_mul(self.unit_cost)
    }

    /// Nothing ordered, or more ordered than the catalog has on hand.
    pub fn is_short(&self) -> bool {
        if self.quantity.is_zero() {
            return true;
        }
        match self.stock {
            Some(stock) => Decimal::from(stock) < self.quantity,
            None => false,
        }
    }

    /// Apply the present fields of a patch, coercing them on the way in.
    pub fn apply(&mut self, patch: &ItemPatch) {
        if let Some(quantity) = patch.quantity {
            self.quantity = clamp_non_negative(quantity);
        }
        if let Some(cost) = patch.unit_cost {
            self.unit_cost = clamp_money(cost);
        }
        if let Some(retail) = patch.unit_retail {
            self.unit_retail = clamp_money(retail);
        }
    }
}

/// Partial update of the editable fields of a line item.
///
/// Serializes to the field map accepted by `update-item`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_cost: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_retail: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
}

impl ItemPatch {
    pub fn quantity(quantity: Decimal) -> Self {
        Self {
            quantity: Some(quantity),
            ..Default::default()
        }
    }

    pub fn unit_cost(cost: Decimal) -> Self {
        Self {
            unit_cost: Some(cost),
            ..Default::default()
        }
    }

    pub fn unit_retail(retail: Decimal) -> Self {
        Self {
            unit_retail: Some(retail),
            ..Default::default()
        }
    }

    pub fn order(order: u32) -> Self {
        Self {
            order: Some(order),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.quantity.is_none()
            && self.unit_cost.is_none()
            && self.unit_retail.is_none()
            && self.order.is_none()
    }
}

fn default_quantity() -> Decimal {
    Decimal::ONE
}

/// Line item as returned by the document store.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemRecord {
    pub id: ItemId,
    #[serde(default)]
    pub kind: Option<ItemKind>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_quantity")]
    pub quantity: Decimal,
    #[serde(default)]
    pub unit_cost: Decimal,
    #[serde(default, alias = "retail")]
    pub unit_retail: Decimal,
    #[serde(default)]
    pub stock: Option<u32>,
    #[serde(default)]
    pub parent_id: Option<ItemId>,
}

impl LineItemRecord {
    /// Convert to a line item, falling back to `kind` when the record has none.
    pub fn into_line_item(self, kind: ItemKind) -> LineItem {
        LineItem {
            id: self.id,
            kind: self.kind.unwrap_or(kind),
            name: self.name,
            description: self.description.unwrap_or_default(),
            quantity: clamp_non_negative(self.quantity),
            unit_cost: clamp_money(self.unit_cost),
            unit_retail: clamp_money(self.unit_retail),
            stock: self.stock,
            parent_id: self.parent_id,
            order: 0,
        }
    }
}
