use std::sync::Arc;

use crate::config::Settings;
use crate::editor::EstimateEditor;
use crate::error::Result;
use crate::models::CatalogScope;
use crate::search::SearchController;
use crate::services::{CatalogSearch, DocumentStore, HttpDocumentStore, ItemGateway};

/// Wire an editor against the HTTP document store named in `settings`.
pub fn build_editor(settings: &Settings) -> Result<EstimateEditor> {
    let client = Arc::new(HttpDocumentStore::new(settings.document_store.clone())?);
    Ok(build_editor_with(settings, client.clone(), client))
}

/// Wire an editor against arbitrary store and catalog implementations.
pub fn build_editor_with(
    settings: &Settings,
    store: Arc<dyn DocumentStore>,
    catalog: Arc<dyn CatalogSearch>,
) -> EstimateEditor {
    let search = |scope| {
        SearchController::new(
            scope,
            catalog.clone(),
            settings.search.debounce(),
            settings.search.page_size,
        )
    };

    EstimateEditor::new(
        ItemGateway::new(store),
        search(CatalogScope::Products),
        search(CatalogScope::Bundles),
        settings.editor.clone(),
    )
}
