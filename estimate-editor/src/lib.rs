//! Line-item editor for estimates.
//!
//! Search the catalog, add products and bundles, edit rows inline, reorder
//! them by dragging and keep live totals. Every change is confirmed by the
//! remote document store before it lands in the local [`store::LineItemStore`].

pub mod commands;
pub mod config;
pub mod drag;
pub mod editor;
pub mod error;
pub mod models;
pub mod observability;
pub mod render;
pub mod search;
pub mod services;
pub mod startup;
pub mod store;
pub mod totals;
pub mod utils;

pub use editor::{EditorEvent, EstimateEditor, Notice, NoticeLevel};
pub use error::{EditorError, Result};
