//! Canonical edge request

use std::collections::HashMap;

/// Where the origin lives, as seen by the edge
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OriginDescriptor {
    /// Origin domain, e.g. `blog-origin.s3.us-east-1.amazonaws.com`
    pub domain_name: String,
}

impl OriginDescriptor {
    pub fn new(domain_name: impl Into<String>) -> Self {
        Self {
            domain_name: domain_name.into(),
        }
    }

    /// Store container identifier: the first label of the domain name
    pub fn store_id(&self) -> &str {
        self.domain_name.split('.').next().unwrap_or_default()
    }
}

/// Request flowing through the edge stages
///
/// Header names are stored lowercase. Query parameters keep the first value
/// seen for a repeated name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeRequest {
    pub path: String,
    pub query: HashMap<String, String>,
    pub headers: HashMap<String, String>,
    pub origin: OriginDescriptor,
}

impl EdgeRequest {
    pub fn new(path: impl Into<String>, origin: OriginDescriptor) -> Self {
        Self {
            path: path.into(),
            query: HashMap::new(),
            headers: HashMap::new(),
            origin,
        }
    }

    /// Attach query parameters parsed from a raw query string (no leading `?`)
    ///
    /// Malformed query strings are treated as empty.
    #[must_use]
    pub fn with_query_string(mut self, raw: &str) -> Self {
        self.query = parse_query_string(raw);
        self
    }

    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// Header lookup (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Copy of this request as the origin sees it when the viewer query
    /// string is not forwarded
    #[must_use]
    pub fn without_query(&self) -> Self {
        Self {
            query: HashMap::new(),
            ..self.clone()
        }
    }
}

/// Parse an `application/x-www-form-urlencoded` query string
pub fn parse_query_string(raw: &str) -> HashMap<String, String> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(raw).unwrap_or_default();
    let mut query = HashMap::with_capacity(pairs.len());
    for (name, value) in pairs {
        query.entry(name).or_insert(value);
    }
    query
}
