//! HTTP response building module
//!
//! Turns pipeline responses into hyper responses, plus the few responses the
//! front answers on its own before the pipeline runs.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

use crate::edge::{BodyEncoding, EdgeResponse};

/// Convert an edge response; HEAD requests get the headers without a body
pub fn into_hyper_response(edge: EdgeResponse, is_head: bool) -> Response<Full<Bytes>> {
    let body = match (edge.body, edge.body_encoding) {
        (None, _) => Bytes::new(),
        (Some(data), Some(BodyEncoding::Base64)) => match STANDARD.decode(data.as_bytes()) {
            Ok(bytes) => Bytes::from(bytes),
            Err(e) => {
                crate::logger::log_error(&format!("Invalid base64 body from pipeline: {e}"));
                return build_502_response();
            }
        },
        (Some(data), _) => Bytes::from(data),
    };

    let mut builder = Response::builder()
        .status(edge.status)
        .header("Content-Length", body.len());
    for (name, value) in edge.headers.iter() {
        builder = builder.header(name, value);
    }
    let body = if is_head { Bytes::new() } else { body };

    builder.body(Full::new(body)).unwrap_or_else(|e| {
        log_build_error(&edge.status.to_string(), &e);
        build_502_response()
    })
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(405)
        .header("Allow", "GET, HEAD, OPTIONS")
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("405", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build OPTIONS response
pub fn build_options_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(204)
        .header("Allow", "GET, HEAD, OPTIONS")
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("OPTIONS", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

fn build_502_response() -> Response<Full<Bytes>> {
    let mut resp = Response::new(Full::new(Bytes::new()));
    *resp.status_mut() = hyper::StatusCode::BAD_GATEWAY;
    resp
}

fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
