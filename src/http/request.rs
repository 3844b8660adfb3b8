//! hyper request → edge request

use hyper::Request;

use crate::edge::{EdgeRequest, OriginDescriptor};

/// Build the edge view of an incoming request
///
/// Header values that are not visible ASCII are skipped.
pub fn to_edge_request<B>(req: &Request<B>, origin: &OriginDescriptor) -> EdgeRequest {
    let uri = req.uri();
    let mut edge = EdgeRequest::new(uri.path(), origin.clone())
        .with_query_string(uri.query().unwrap_or_default());
    for (name, value) in req.headers() {
        if let Ok(value) = value.to_str() {
            edge = edge.with_header(name.as_str(), value);
        }
    }
    edge
}
