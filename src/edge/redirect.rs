//! Canonical redirector
//!
//! Rewrites legacy `blog/{id}` URLs into `entry/{id}.json` with a 303.
//! The viewer query string is not carried over.

use super::path::{resource_identifier, strip_route_prefix};
use super::{EdgeRequest, EdgeResponse};

#[derive(Debug, Clone)]
pub struct CanonicalRedirector {
    /// Legacy first segment, e.g. `blog`
    legacy_prefix: String,
    /// Canonical first segment, e.g. `entry`
    target_category: String,
}

impl CanonicalRedirector {
    pub fn new(legacy_prefix: impl Into<String>, target_category: impl Into<String>) -> Self {
        Self {
            legacy_prefix: legacy_prefix.into().trim_matches('/').to_string(),
            target_category: target_category.into().trim_matches('/').to_string(),
        }
    }

    /// Build the terminal redirect for `request`
    ///
    /// A path with no identifier after the legacy prefix (`/blog/`) gets a
    /// 404 instead of a redirect.
    pub fn redirect(&self, request: &EdgeRequest) -> EdgeResponse {
        let rest = strip_route_prefix(&request.path, &self.legacy_prefix);
        let Some(id) = resource_identifier(rest) else {
            return EdgeResponse::not_found();
        };
        // Keep the viewer's form: absolute paths redirect to absolute paths
        let root = if request.path.starts_with('/') { "/" } else { "" };
        EdgeResponse::see_other(format!("{root}{}/{id}.json", self.target_category))
    }
}

impl Default for CanonicalRedirector {
    fn default() -> Self {
        Self::new("blog", "entry")
    }
}
