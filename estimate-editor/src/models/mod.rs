//! Domain models for estimate-editor.

mod catalog;
mod document;
mod line_item;

pub use catalog::{CatalogEntry, CatalogId, CatalogScope, SearchResponse};
pub use document::{
    AddItemRequest, AddItemResponse, DocumentHeader, PriceRefresh, RefreshResponse,
};
pub use line_item::{ItemId, ItemKind, ItemPatch, LineItem, LineItemRecord};
