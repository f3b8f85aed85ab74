//! Catalog entries returned by product and bundle search.

use crate::models::ItemKind;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogId(pub i64);

impl fmt::Display for CatalogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which catalog a search box queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogScope {
    Products,
    Bundles,
}

impl CatalogScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogScope::Products => "products",
            CatalogScope::Bundles => "bundles",
        }
    }

    /// Kind of the top-level line item created from an entry of this scope.
    pub fn item_kind(&self) -> ItemKind {
        match self {
            CatalogScope::Products => ItemKind::Product,
            CatalogScope::Bundles => ItemKind::Bundle,
        }
    }
}

impl fmt::Display for CatalogScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CatalogScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "products" | "product" | "p" => Ok(CatalogScope::Products),
            "bundles" | "bundle" | "b" => Ok(CatalogScope::Bundles),
            other => Err(format!("unknown catalog scope '{}'", other)),
        }
    }
}

/// One suggestion in a search result page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub id: CatalogId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "cost")]
    pub unit_cost: Decimal,
    #[serde(default, alias = "retail")]
    pub unit_retail: Decimal,
    #[serde(default)]
    pub stock: Option<u32>,
}

/// Search reply. The store answers `{products: [...]}` or `{bundles: [...]}`
/// depending on the endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub products: Vec<CatalogEntry>,
    #[serde(default)]
    pub bundles: Vec<CatalogEntry>,
}

impl SearchResponse {
    pub fn into_entries(self, scope: CatalogScope) -> Vec<CatalogEntry> {
        match scope {
            CatalogScope::Products => self.products,
            CatalogScope::Bundles => self.bundles,
        }
    }
}
