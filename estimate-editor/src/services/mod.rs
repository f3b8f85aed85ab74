pub mod document_client;
pub mod gateway;

pub use document_client::{CatalogSearch, DocumentStore, HttpDocumentStore};
pub use gateway::{AddedItems, ItemGateway, RemoveOutcome};
