//! Request and response bodies exchanged with the document store.

use crate::models::{CatalogId, ItemId, ItemKind, LineItemRecord};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Body of `add-item`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub id: CatalogId,
    pub kind: ItemKind,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_cost: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_retail: Option<Decimal>,
}

/// Reply of `add-item`: a bare id for products, the expanded group for bundles.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AddItemResponse {
    Bundle {
        parent: LineItemRecord,
        #[serde(default)]
        items: Vec<LineItemRecord>,
    },
    Product {
        #[serde(rename = "itemId")]
        item_id: ItemId,
    },
}

/// Authoritative pricing for one item after a catalog refresh.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRefresh {
    pub id: ItemId,
    #[serde(default)]
    pub unit_cost: Option<Decimal>,
    #[serde(default, alias = "unitRetail")]
    pub retail: Option<Decimal>,
    #[serde(default)]
    pub stock: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RefreshResponse {
    #[serde(default)]
    pub items: Vec<PriceRefresh>,
}

/// Header fields saved through `edit`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentHeader {
    pub customer_id: Option<String>,
    pub customer_name: String,
    pub customer_address: String,
    pub status: String,
}
