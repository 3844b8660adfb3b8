//! Canonical edge response
//!
//! One internal header representation; [`super::wire`] serializes it to
//! whichever shape the execution point expects.

use std::collections::BTreeMap;

/// How the body is encoded on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyEncoding {
    Text,
    Base64,
}

impl BodyEncoding {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Base64 => "base64",
        }
    }
}

/// Response headers keyed by lowercase name
///
/// Inserting an existing name replaces its value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(BTreeMap<String, String>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        self.0.insert(name.to_ascii_lowercase(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(&name.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Response produced by a stage or the origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeResponse {
    pub status: u16,
    pub status_description: String,
    pub headers: Headers,
    pub body: Option<String>,
    pub body_encoding: Option<BodyEncoding>,
}

impl EdgeResponse {
    /// Response with the standard description for `status` and no body
    pub fn new(status: u16) -> Self {
        Self {
            status,
            status_description: status_description(status).to_string(),
            headers: Headers::new(),
            body: None,
            body_encoding: None,
        }
    }

    /// 200 with a JSON text body
    pub fn json(body: String) -> Self {
        let mut resp = Self::new(200);
        resp.headers.insert("content-type", "application/json");
        resp.body = Some(body);
        resp.body_encoding = Some(BodyEncoding::Text);
        resp
    }

    /// 303 pointing at `location`
    pub fn see_other(location: impl Into<String>) -> Self {
        let mut resp = Self::new(303);
        resp.headers.insert("location", location);
        resp
    }

    pub fn not_found() -> Self {
        Self::new(404)
    }

    pub fn internal_error() -> Self {
        Self::new(500)
    }

    pub fn forbidden() -> Self {
        Self::new(403)
    }
}

/// Standard reason phrase for the statuses the edge produces
pub const fn status_description(status: u16) -> &'static str {
    match status {
        200 => "OK",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        303 => "See Other",
        304 => "Not Modified",
        400 => "Bad Request",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}
