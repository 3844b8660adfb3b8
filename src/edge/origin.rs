//! Origin-facing stages
//!
//! [`OriginFetcher`] is the only stage that performs I/O: it reads a JSON
//! document from the object store and answers with a field projection of it.
//! [`StoreOrigin`] is the plain origin read used when no fetcher is bound.
//! Both absorb every error into a 404 or a 500; nothing escapes as a fault.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::Value;

use super::path::{relative_path, resource_identifier, strip_route_prefix};
use super::projection::{project, FieldSelector};
use super::{BodyEncoding, EdgeRequest, EdgeResponse};
use crate::http::mime;
use crate::logger;
use crate::store::{ObjectStore, StoreError};

/// Query parameter carrying the field selector
pub const FIELDS_PARAM: &str = "fields";

/// Error type for a single fetch; never leaves this module.
#[derive(Debug, thiserror::Error)]
enum FetchError {
    #[error("no resource identifier in path '{0}'")]
    MissingIdentifier(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("stored object {key} has an empty body")]
    EmptyBody { key: String },

    #[error("stored object {key} is not valid JSON: {source}")]
    MalformedJson {
        key: String,
        source: serde_json::Error,
    },

    #[error("failed to encode projection of {key}: {source}")]
    Encode {
        key: String,
        source: serde_json::Error,
    },
}

impl FetchError {
    /// Misses answer 404; a key the viewer could not legally name is a miss too
    const fn is_miss(&self) -> bool {
        match self {
            Self::MissingIdentifier(_) | Self::Store(StoreError::InvalidKey(_)) => true,
            Self::Store(e) => e.is_not_found(),
            _ => false,
        }
    }
}

/// Convert a fetch outcome into the response contract
fn settle(result: Result<EdgeResponse, FetchError>) -> EdgeResponse {
    match result {
        Ok(response) => response,
        Err(e) if e.is_miss() => {
            logger::log_info(&format!("[ORIGIN] Not found: {e}"));
            EdgeResponse::not_found()
        }
        Err(e) => {
            logger::log_error(&format!("[ORIGIN] Upstream failure: {e}"));
            EdgeResponse::internal_error()
        }
    }
}

/// Reads `{category}/{id}.json` and returns a projection of it
///
/// The id is the last segment after the route prefix, so `/author/` names
/// nothing rather than `author`.
#[derive(Clone)]
pub struct OriginFetcher {
    store: Arc<dyn ObjectStore>,
    category: String,
    route_prefix: String,
}

impl OriginFetcher {
    /// Fetcher whose route prefix is the category itself
    pub fn new(store: Arc<dyn ObjectStore>, category: impl Into<String>) -> Self {
        let category = category.into().trim_matches('/').to_string();
        Self {
            store,
            route_prefix: category.clone(),
            category,
        }
    }

    #[must_use]
    pub fn with_route_prefix(mut self, prefix: &str) -> Self {
        self.route_prefix = prefix.trim_matches('/').to_string();
        self
    }

    /// Object key for a resource identifier
    pub fn object_key(&self, id: &str) -> String {
        format!("{}/{id}.json", self.category)
    }

    pub async fn fetch(&self, request: &EdgeRequest) -> EdgeResponse {
        settle(self.try_fetch(request).await)
    }

    async fn try_fetch(&self, request: &EdgeRequest) -> Result<EdgeResponse, FetchError> {
        let id = resource_identifier(strip_route_prefix(&request.path, &self.route_prefix))
            .ok_or_else(|| FetchError::MissingIdentifier(request.path.clone()))?;
        let selector = request.query_param(FIELDS_PARAM).and_then(FieldSelector::parse);
        let container = request.origin.store_id();
        let key = self.object_key(id);

        logger::log_info(&format!("[ORIGIN] Retrieving {key} from {container}"));
        let bytes = self.store.get(container, &key).await?;
        if bytes.is_empty() {
            return Err(FetchError::EmptyBody { key });
        }

        let document: Value = serde_json::from_slice(&bytes).map_err(|source| {
            FetchError::MalformedJson {
                key: key.clone(),
                source,
            }
        })?;
        let projected = project(document, selector.as_ref());
        let body = serde_json::to_string(&projected)
            .map_err(|source| FetchError::Encode { key, source })?;

        Ok(EdgeResponse::json(body))
    }
}

/// Plain origin read: the path (minus its leading slash) is the object key
#[derive(Clone)]
pub struct StoreOrigin {
    store: Arc<dyn ObjectStore>,
}

impl StoreOrigin {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    pub async fn read(&self, request: &EdgeRequest) -> EdgeResponse {
        settle(self.try_read(request).await)
    }

    async fn try_read(&self, request: &EdgeRequest) -> Result<EdgeResponse, FetchError> {
        let key = relative_path(&request.path);
        if key.is_empty() || key.ends_with('/') {
            return Err(FetchError::MissingIdentifier(request.path.clone()));
        }
        let bytes = self.store.get(request.origin.store_id(), key).await?;

        let extension = key.rsplit_once('.').map(|(_, ext)| ext);
        let mut response = EdgeResponse::new(200);
        response
            .headers
            .insert("content-type", mime::get_content_type(extension));
        match String::from_utf8(bytes) {
            Ok(text) => {
                response.body = Some(text);
                response.body_encoding = Some(BodyEncoding::Text);
            }
            Err(e) => {
                response.body = Some(STANDARD.encode(e.into_bytes()));
                response.body_encoding = Some(BodyEncoding::Base64);
            }
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::OriginDescriptor;
    use crate::store::memory::MemoryStore;
    use std::io::ErrorKind;

    const DOMAIN: &str = "blog-origin.s3.us-east-1.amazonaws.com";

    fn fetcher(store: MemoryStore) -> OriginFetcher {
        OriginFetcher::new(Arc::new(store), "author")
    }

    fn author_store() -> MemoryStore {
        MemoryStore::new().with_object(
            "blog-origin",
            "author/ktinn.json",
            r#"{"name":"A","bio":"B"}"#,
        )
    }

    fn get(path: &str) -> EdgeRequest {
        EdgeRequest::new(path, OriginDescriptor::new(DOMAIN))
    }

    #[tokio::test]
    async fn test_full_object_without_selector() {
        let resp = fetcher(author_store()).fetch(&get("/author/ktinn")).await;
        assert_eq!(resp.status, 200);
        assert_eq!(resp.status_description, "OK");
        assert_eq!(resp.body.as_deref(), Some(r#"{"name":"A","bio":"B"}"#));
        assert_eq!(resp.headers.get("content-type"), Some("application/json"));
        assert_eq!(resp.body_encoding, Some(BodyEncoding::Text));
    }

    #[tokio::test]
    async fn test_projection_with_selector() {
        let req = get("/author/ktinn").with_query("fields", "name");
        let resp = fetcher(author_store()).fetch(&req).await;
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body.as_deref(), Some(r#"{"name":"A"}"#));
    }

    #[tokio::test]
    async fn test_empty_selector_returns_full_object() {
        let req = get("/author/ktinn").with_query("fields", "");
        let resp = fetcher(author_store()).fetch(&req).await;
        assert_eq!(resp.body.as_deref(), Some(r#"{"name":"A","bio":"B"}"#));
    }

    #[tokio::test]
    async fn test_missing_key_is_404() {
        let resp = fetcher(author_store()).fetch(&get("/author/nobody")).await;
        assert_eq!(resp.status, 404);
        assert_eq!(resp.status_description, "Not Found");
        assert!(resp.body.is_none());
        assert!(!resp.headers.contains("content-type"));
    }

    #[tokio::test]
    async fn test_store_failure_is_500() {
        let store = author_store().with_failure(
            "blog-origin",
            "author/broken.json",
            ErrorKind::ConnectionReset,
        );
        let resp = fetcher(store).fetch(&get("/author/broken")).await;
        assert_eq!(resp.status, 500);
        assert_eq!(resp.status_description, "Internal Server Error");
        assert!(resp.body.is_none());
    }

    #[tokio::test]
    async fn test_access_denied_is_500() {
        let store = MemoryStore::new().with_failure(
            "blog-origin",
            "author/private.json",
            ErrorKind::PermissionDenied,
        );
        let resp = fetcher(store).fetch(&get("/author/private")).await;
        assert_eq!(resp.status, 500);
    }

    #[tokio::test]
    async fn test_malformed_json_is_500() {
        let store = MemoryStore::new()
            .with_object("blog-origin", "author/bad.json", "{\"name\": ")
            .with_object("blog-origin", "author/empty.json", "");
        let fetcher = fetcher(store);
        for path in ["/author/bad", "/author/empty"] {
            let resp = fetcher.fetch(&get(path)).await;
            assert_eq!(resp.status, 500, "path {path}");
            assert!(resp.body.is_none());
        }
    }

    #[tokio::test]
    async fn test_missing_identifier_skips_store() {
        let store = Arc::new(author_store());
        let fetcher = OriginFetcher::new(store.clone(), "author");
        let resp = fetcher.fetch(&get("/")).await;
        assert_eq!(resp.status, 404);
        assert_eq!(store.reads(), 0);
    }

    #[tokio::test]
    async fn test_bare_route_prefix_skips_store() {
        let store = Arc::new(
            author_store().with_object("blog-origin", "author/author.json", r#"{"name":"Z"}"#),
        );
        let fetcher = OriginFetcher::new(store.clone(), "author");
        for path in ["/author/", "/author", "author//"] {
            let resp = fetcher.fetch(&get(path)).await;
            assert_eq!(resp.status, 404, "path {path:?}");
        }
        assert_eq!(store.reads(), 0);

        let people = OriginFetcher::new(store.clone(), "author").with_route_prefix("people/");
        assert_eq!(people.fetch(&get("/people/")).await.status, 404);
        assert_eq!(store.reads(), 0);
        assert_eq!(people.fetch(&get("/people/ktinn")).await.status, 200);
    }

    #[tokio::test]
    async fn test_container_is_first_domain_label() {
        let store = MemoryStore::new().with_object("other", "author/ktinn.json", "{}");
        let req = EdgeRequest::new("/author/ktinn", OriginDescriptor::new("other.s3.amazonaws.com"));
        let resp = fetcher(store).fetch(&req).await;
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body.as_deref(), Some("{}"));
    }

    #[tokio::test]
    async fn test_store_origin_reads_path_as_key() {
        let store = MemoryStore::new()
            .with_object("blog-origin", "entry/1.json", r#"{"title":"Hi"}"#)
            .with_object("blog-origin", "img/logo.png", vec![0x89, 0x50, 0xff, 0x00]);
        let origin = StoreOrigin::new(Arc::new(store));

        let resp = origin.read(&get("/entry/1.json")).await;
        assert_eq!(resp.status, 200);
        assert_eq!(resp.headers.get("content-type"), Some("application/json"));
        assert_eq!(resp.body.as_deref(), Some(r#"{"title":"Hi"}"#));

        let resp = origin.read(&get("/img/logo.png")).await;
        assert_eq!(resp.headers.get("content-type"), Some("image/png"));
        assert_eq!(resp.body_encoding, Some(BodyEncoding::Base64));
        assert_eq!(resp.body.as_deref(), Some("iVD/AA=="));

        assert_eq!(origin.read(&get("/entry/2.json")).await.status, 404);
        assert_eq!(origin.read(&get("/")).await.status, 404);
    }
}
