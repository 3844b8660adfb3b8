//! HTTP protocol layer module
//!
//! Converts between hyper's types and the edge pipeline's canonical
//! request/response values.

pub mod mime;
pub mod request;
pub mod response;

pub use request::to_edge_request;
pub use response::{build_405_response, build_options_response, into_hyper_response};
