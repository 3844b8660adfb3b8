//! Edge request pipeline
//!
//! The stages that run at the content-delivery boundary, in front of the
//! object store:
//! - Admission filter (every viewer request)
//! - Canonical redirector (legacy blog URLs)
//! - Field-projecting origin fetcher (author profiles)
//! - Response header stamper (every viewer response)
//!
//! Stages exchange the canonical [`EdgeRequest`] / [`EdgeResponse`] values;
//! the external event shapes live in [`wire`].

pub mod admission;
pub mod cache_control;
pub mod dispatch;
pub mod origin;
pub mod path;
pub mod pipeline;
pub mod projection;
pub mod redirect;
pub mod request;
pub mod response;
pub mod wire;

pub use admission::AdmissionFilter;
pub use cache_control::HeaderStamper;
pub use dispatch::{Behavior, RouteTable, RouteTableError};
pub use origin::OriginFetcher;
pub use pipeline::Pipeline;
pub use redirect::CanonicalRedirector;
pub use request::{EdgeRequest, OriginDescriptor};
pub use response::{BodyEncoding, EdgeResponse};

/// Outcome of a request-side stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    /// Continue down the pipeline with this request
    Continue(EdgeRequest),
    /// Stop here and answer the viewer with this response
    Respond(EdgeResponse),
}
