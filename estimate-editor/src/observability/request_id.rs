//! Request correlation for calls to the document store.
//!
//! Every outgoing request carries a fresh `x-request-id` so a failed mutation
//! can be matched with the server's logs.

use reqwest::header::HeaderMap;
use uuid::Uuid;

/// Header name for request correlation ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// A request builder that tags the request with a generated request ID.
pub struct TaggedRequest {
    request: reqwest::RequestBuilder,
    request_id: String,
}

impl TaggedRequest {
    pub fn new(request: reqwest::RequestBuilder) -> Self {
        Self {
            request,
            request_id: Uuid::new_v4().to_string(),
        }
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Add JSON body to the request.
    pub fn json<T: serde::Serialize + ?Sized>(self, json: &T) -> Self {
        Self {
            request: self.request.json(json),
            ..self
        }
    }

    /// Add query parameters to the request.
    pub fn query<T: serde::Serialize + ?Sized>(self, query: &T) -> Self {
        Self {
            request: self.request.query(query),
            ..self
        }
    }

    /// Send the request with the request ID header injected.
    pub async fn send(self) -> Result<reqwest::Response, reqwest::Error> {
        let mut headers = HeaderMap::new();
        inject_request_id(&mut headers, &self.request_id);

        self.request.headers(headers).send().await
    }
}

pub fn inject_request_id(headers: &mut HeaderMap, request_id: &str) {
    if let Ok(value) = request_id.parse() {
        headers.insert(REQUEST_ID_HEADER, value);
    }
}

/// Extension trait for reqwest::Client to create tagged requests.
pub trait RequestIdExt {
    fn tagged_get(&self, url: &str) -> TaggedRequest;
    fn tagged_post(&self, url: &str) -> TaggedRequest;
}

impl RequestIdExt for reqwest::Client {
    fn tagged_get(&self, url: &str) -> TaggedRequest {
        TaggedRequest::new(self.get(url))
    }

    fn tagged_post(&self, url: &str) -> TaggedRequest {
        TaggedRequest::new(self.post(url))
    }
}
