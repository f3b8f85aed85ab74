//! Document store client.
//!
//! The editor only talks to the store through the [`DocumentStore`] and
//! [`CatalogSearch`] traits; [`HttpDocumentStore`] implements both over the
//! JSON endpoints of the estimate backend.

use crate::config::DocumentStoreSettings;
use crate::error::{EditorError, Result};
use crate::models::{
    AddItemRequest, AddItemResponse, CatalogEntry, CatalogScope, DocumentHeader, ItemId,
    ItemPatch, RefreshResponse, SearchResponse,
};
use crate::observability::{RequestIdExt, TaggedRequest};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::Instrument;

/// Catalog lookups backing the search boxes.
#[async_trait]
pub trait CatalogSearch: Send + Sync {
    /// Fetch one page (1-based) of entries matching `query`.
    async fn search(
        &self,
        scope: CatalogScope,
        query: &str,
        page: u32,
    ) -> Result<Vec<CatalogEntry>>;
}

/// Persistence of the estimate's line items.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn add_item(&self, request: &AddItemRequest) -> Result<AddItemResponse>;
    async fn update_item(&self, id: ItemId, patch: &ItemPatch) -> Result<()>;
    async fn remove_item(&self, id: ItemId) -> Result<()>;
    async fn refresh(&self) -> Result<RefreshResponse>;
    async fn save(&self, header: &DocumentHeader) -> Result<()>;
}

pub struct HttpDocumentStore {
    client: Client,
    settings: DocumentStoreSettings,
}

impl HttpDocumentStore {
    pub fn new(settings: DocumentStoreSettings) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(settings.connect_timeout())
            .build()
            .map_err(|e| EditorError::NetworkFailure(format!("HTTP client setup failed: {}", e)))?;

        Ok(Self { client, settings })
    }

    pub fn base_url(&self) -> &str {
        self.settings.base_url.trim_end_matches('/')
    }

    fn document_url(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url(),
            self.settings.estimate_id,
            path
        )
    }

    fn search_url(&self, scope: CatalogScope) -> String {
        match scope {
            CatalogScope::Products => format!("{}/search", self.base_url()),
            CatalogScope::Bundles => format!("{}/bundles/search", self.base_url()),
        }
    }

    /// Send and fail with `RequestFailed` on any non-2xx status, keeping the
    /// error body as the message.
    async fn send(&self, request: TaggedRequest, operation: &'static str) -> Result<reqwest::Response> {
        let request_id = request.request_id().to_string();
        let span = tracing::debug_span!("document_store", request_id = %request_id, operation);
        tracing::debug!(request_id = %request_id, operation, "Sending document store request");

        let response = request.send().instrument(span).await.map_err(|e| {
            tracing::error!(request_id = %request_id, operation, error = %e, "Document store unreachable");
            EditorError::NetworkFailure(e.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        tracing::warn!(
            request_id = %request_id,
            operation,
            status = status.as_u16(),
            message = %message,
            "Document store rejected request"
        );
        Err(EditorError::RequestFailed {
            status: status.as_u16(),
            message,
        })
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl CatalogSearch for HttpDocumentStore {
    async fn search(
        &self,
        scope: CatalogScope,
        query: &str,
        page: u32,
    ) -> Result<Vec<CatalogEntry>> {
        let request = self
            .client
            .tagged_get(&self.search_url(scope))
            .query(&[("q", query.to_string()), ("page", page.to_string())]);

        let response = self.send(request, "search").await?;
        let body: SearchResponse = Self::read_json(response).await?;
        Ok(body.into_entries(scope))
    }
}

#[async_trait]
impl DocumentStore for HttpDocumentStore {
    async fn add_item(&self, request: &AddItemRequest) -> Result<AddItemResponse> {
        let http = self
            .client
            .tagged_post(&self.document_url("add-item"))
            .json(request);

        let response = self.send(http, "add-item").await?;
        Self::read_json(response).await
    }

    async fn update_item(&self, id: ItemId, patch: &ItemPatch) -> Result<()> {
        let http = self
            .client
            .tagged_post(&self.document_url(&format!("update-item/{}", id)))
            .json(patch);

        self.send(http, "update-item").await?;
        Ok(())
    }

    async fn remove_item(&self, id: ItemId) -> Result<()> {
        let http = self
            .client
            .tagged_post(&self.document_url(&format!("remove-item/{}", id)));

        self.send(http, "remove-item").await?;
        Ok(())
    }

    async fn refresh(&self) -> Result<RefreshResponse> {
        let http = self.client.tagged_post(&self.document_url("refresh"));

        let response = self.send(http, "refresh").await?;
        Self::read_json(response).await
    }

    async fn save(&self, header: &DocumentHeader) -> Result<()> {
        let http = self
            .client
            .tagged_post(&self.document_url("edit"))
            .json(header);

        self.send(http, "edit").await?;
        Ok(())
    }
}
