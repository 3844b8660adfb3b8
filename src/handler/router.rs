//! Viewer request dispatch
//!
//! Method checks happen here; everything else is the pipeline's job.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Request, Response};

use crate::config::AppState;
use crate::http;
use crate::logger::{self, AccessLogEntry};

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let method = req.method().clone();
    let is_head = method == Method::HEAD;

    let (response, behavior) = match check_http_method(&method) {
        Some(resp) => (resp, None),
        None => {
            let edge_request = http::to_edge_request(&req, &state.origin);
            let (behavior, edge_response) = state.pipeline.dispatch(edge_request).await;
            let pattern = behavior.pattern.clone();
            (http::into_hyper_response(edge_response, is_head), Some(pattern))
        }
    };

    if state.config.logging.access_log {
        let mut entry = AccessLogEntry::new(
            remote_addr.ip().to_string(),
            method.to_string(),
            req.uri().path().to_string(),
        );
        entry.query = req.uri().query().map(ToString::to_string);
        entry.version = http_version(req.version());
        entry.status = response.status().as_u16();
        entry.bytes_sent = response_body_len(&response);
        entry.referer = header_string(&req, "referer");
        entry.user_agent = header_string(&req, "user-agent");
        entry.behavior = behavior;
        entry.store = state.origin.store_id().to_string();
        entry.elapsed = started.elapsed();
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// GET and HEAD reach the pipeline; OPTIONS gets 204, the rest 405
fn check_http_method(method: &Method) -> Option<Response<Full<Bytes>>> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(http::build_options_response()),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

fn header_string<B>(req: &Request<B>, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

fn response_body_len(resp: &Response<Full<Bytes>>) -> usize {
    resp.headers()
        .get("content-length")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

const fn http_version(version: hyper::Version) -> &'static str {
    match version {
        hyper::Version::HTTP_10 => "1.0",
        hyper::Version::HTTP_2 => "2",
        hyper::Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::store::memory::MemoryStore;
    use http_body_util::BodyExt;

    fn state() -> Arc<AppState> {
        let mut config = Config::load_from("/nonexistent/edge-config").unwrap();
        config.logging.access_log = false;
        let store = MemoryStore::new()
            .with_object("blog-origin", "author/ktinn.json", r#"{"name":"A","bio":"B"}"#)
            .with_object("blog-origin", "entry/hello.json", r#"{"title":"Hello"}"#);
        Arc::new(AppState::new(config, Arc::new(store)).unwrap())
    }

    fn addr() -> SocketAddr {
        "127.0.0.1:50000".parse().unwrap()
    }

    async fn send(method: Method, uri: &str) -> Response<Full<Bytes>> {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .body(())
            .unwrap();
        handle_request(req, state(), addr()).await.unwrap()
    }

    #[tokio::test]
    async fn test_author_projection_over_http() {
        let resp = send(Method::GET, "/author/ktinn?fields=name").await;
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["cache-control"], "public, max-age=63072000;");
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body, Bytes::from_static(br#"{"name":"A"}"#));
    }

    #[tokio::test]
    async fn test_blog_redirect_over_http() {
        let resp = send(Method::GET, "/blog/hello?fields=title").await;
        assert_eq!(resp.status(), 303);
        assert_eq!(resp.headers()["location"], "/entry/hello.json");
        assert_eq!(resp.headers()["cache-control"], "public, max-age=63072000;");
    }

    #[tokio::test]
    async fn test_head_has_no_body() {
        let resp = send(Method::HEAD, "/entry/hello.json").await;
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["content-length"], "17");
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_methods() {
        assert_eq!(send(Method::POST, "/author/ktinn").await.status(), 405);
        assert_eq!(send(Method::OPTIONS, "/author/ktinn").await.status(), 204);
    }
}
