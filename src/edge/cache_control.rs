//! Response header stamper
//!
//! Runs on every response on its way back to the viewer. It only touches
//! headers; status and body pass through as they are.

use super::EdgeResponse;

/// Two years, as sent to viewers
pub const DEFAULT_CACHE_CONTROL: &str = "public, max-age=63072000;";

#[derive(Debug, Clone)]
pub struct HeaderStamper {
    value: String,
}

impl HeaderStamper {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn stamp(&self, mut response: EdgeResponse) -> EdgeResponse {
        response.headers.insert("cache-control", self.value.as_str());
        response
    }
}

impl Default for HeaderStamper {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CONTROL)
    }
}
