//! Request handler module
//!
//! Entry point between the HTTP server and the edge pipeline.

pub mod router;

pub use router::handle_request;
