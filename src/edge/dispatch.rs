//! Path-pattern route table
//!
//! Maps path patterns (`blog/*`, `entry/*.json`) to the stages bound to
//! them. Patterns are matched against the path without its leading slash,
//! `*` matches any run of characters (slashes included), and the most
//! specific matching pattern wins. Paths no pattern matches fall back to the
//! default behavior.

use serde::{Deserialize, Serialize};

use super::path::relative_path;

/// Stage bound to the viewer-request event of a behavior
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewerRequestStage {
    /// Answer with a 303 to `{target_category}/{id}.json`
    Redirect { target_category: String },
}

/// What answers the request once it reaches the origin side
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OriginAction {
    /// Read the object store directly at the request path
    #[default]
    Store,
    /// Field-projecting fetch of `{category}/{id}.json`
    Fetch { category: String },
}

/// Stages bound to one path pattern
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Behavior {
    pub pattern: String,
    #[serde(default)]
    pub viewer_request: Option<ViewerRequestStage>,
    #[serde(default)]
    pub origin: OriginAction,
    /// Whether the viewer query string reaches the origin side
    #[serde(default)]
    pub forward_query_string: bool,
}

impl Behavior {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            viewer_request: None,
            origin: OriginAction::Store,
            forward_query_string: false,
        }
    }

    /// Catch-all behavior for unmatched paths
    pub fn catch_all() -> Self {
        Self::new("*")
    }

    #[must_use]
    pub fn redirect_to(mut self, target_category: impl Into<String>) -> Self {
        self.viewer_request = Some(ViewerRequestStage::Redirect {
            target_category: target_category.into(),
        });
        self
    }

    #[must_use]
    pub fn fetch(mut self, category: impl Into<String>) -> Self {
        self.origin = OriginAction::Fetch {
            category: category.into(),
        };
        self
    }

    #[must_use]
    pub const fn forward_query_string(mut self) -> Self {
        self.forward_query_string = true;
        self
    }

    /// Literal text before the first wildcard, without slashes at the ends
    pub fn literal_prefix(&self) -> &str {
        let end = self.pattern.find('*').unwrap_or(self.pattern.len());
        self.pattern[..end].trim_matches('/')
    }

    /// Number of non-wildcard characters; higher is more specific
    fn specificity(&self) -> usize {
        self.pattern.chars().filter(|c| *c != '*').count()
    }

    fn matches(&self, path: &str) -> bool {
        wildcard_match(self.pattern.as_bytes(), relative_path(path).as_bytes())
    }
}

/// Error type for route table validation.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RouteTableError {
    #[error("behavior pattern must not be empty")]
    EmptyPattern,

    #[error("duplicate behavior pattern '{0}'")]
    DuplicatePattern(String),

    #[error("behavior '{0}' binds both a redirect and an origin fetch")]
    ConflictingStages(String),

    #[error("behavior '{pattern}' has an empty {field}")]
    EmptyCategory { pattern: String, field: &'static str },
}

/// Ordered behaviors plus the default
#[derive(Debug, Clone)]
pub struct RouteTable {
    default: Behavior,
    behaviors: Vec<Behavior>,
}

impl RouteTable {
    pub fn new(default: Behavior, behaviors: Vec<Behavior>) -> Result<Self, RouteTableError> {
        let mut normalized: Vec<Behavior> = Vec::with_capacity(behaviors.len());
        for mut behavior in behaviors {
            behavior.pattern = behavior.pattern.trim_start_matches('/').to_string();
            validate(&behavior)?;
            if normalized.iter().any(|b| b.pattern == behavior.pattern) {
                return Err(RouteTableError::DuplicatePattern(behavior.pattern));
            }
            normalized.push(behavior);
        }
        validate(&default)?;
        Ok(Self {
            default,
            behaviors: normalized,
        })
    }

    /// The table the blog distribution ships with
    pub fn standard() -> Self {
        Self {
            default: Behavior::catch_all(),
            behaviors: vec![
                Behavior::new("entry/*.json"),
                Behavior::new("blog/*").redirect_to("entry"),
                Behavior::new("author/*").fetch("author").forward_query_string(),
            ],
        }
    }

    /// Behavior for `path`: most specific match, earliest on ties
    pub fn resolve(&self, path: &str) -> &Behavior {
        let mut best: Option<&Behavior> = None;
        for behavior in self.behaviors.iter().filter(|b| b.matches(path)) {
            if best.map_or(true, |b| behavior.specificity() > b.specificity()) {
                best = Some(behavior);
            }
        }
        best.unwrap_or(&self.default)
    }

    pub fn behaviors(&self) -> &[Behavior] {
        &self.behaviors
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::standard()
    }
}

fn validate(behavior: &Behavior) -> Result<(), RouteTableError> {
    if behavior.pattern.is_empty() {
        return Err(RouteTableError::EmptyPattern);
    }
    let redirect = match &behavior.viewer_request {
        Some(ViewerRequestStage::Redirect { target_category }) => Some(target_category),
        None => None,
    };
    if let Some(target) = redirect {
        if target.trim_matches('/').is_empty() {
            return Err(RouteTableError::EmptyCategory {
                pattern: behavior.pattern.clone(),
                field: "redirect target",
            });
        }
    }
    if let OriginAction::Fetch { category } = &behavior.origin {
        if redirect.is_some() {
            return Err(RouteTableError::ConflictingStages(behavior.pattern.clone()));
        }
        if category.trim_matches('/').is_empty() {
            return Err(RouteTableError::EmptyCategory {
                pattern: behavior.pattern.clone(),
                field: "fetch category",
            });
        }
    }
    Ok(())
}

/// `*`-only glob match with single-star backtracking
fn wildcard_match(pattern: &[u8], text: &[u8]) -> bool {
    let (mut p, mut t) = (0, 0);
    let mut star: Option<(usize, usize)> = None;
    while t < text.len() {
        if p < pattern.len() && pattern[p] == b'*' {
            star = Some((p, t));
            p += 1;
        } else if p < pattern.len() && pattern[p] == text[t] {
            p += 1;
            t += 1;
        } else if let Some((sp, st)) = star {
            p = sp + 1;
            t = st + 1;
            star = Some((sp, st + 1));
        } else {
            return false;
        }
    }
    pattern[p..].iter().all(|&c| c == b'*')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wildcard_match() {
        assert!(wildcard_match(b"blog/*", b"blog/hello"));
        assert!(wildcard_match(b"blog/*", b"blog/"));
        assert!(wildcard_match(b"blog/*", b"blog/2024/hello"));
        assert!(!wildcard_match(b"blog/*", b"blog"));
        assert!(wildcard_match(b"entry/*.json", b"entry/1.json"));
        assert!(wildcard_match(b"entry/*.json", b"entry/a/b.json"));
        assert!(!wildcard_match(b"entry/*.json", b"entry/1.html"));
        assert!(wildcard_match(b"*", b""));
        assert!(wildcard_match(b"a*b*c", b"axxbyyc"));
        assert!(!wildcard_match(b"a*b*c", b"axxbyy"));
    }

    #[test]
    fn test_standard_table() {
        let table = RouteTable::standard();
        assert_eq!(table.resolve("/blog/hello").pattern, "blog/*");
        assert_eq!(table.resolve("/entry/1.json").pattern, "entry/*.json");
        assert_eq!(table.resolve("/author/ktinn").pattern, "author/*");
        assert_eq!(table.resolve("/entry/1.html").pattern, "*");
        assert_eq!(table.resolve("/").pattern, "*");
        assert_eq!(table.resolve("/index.html").pattern, "*");
    }

    #[test]
    fn test_most_specific_wins() {
        let table = RouteTable::new(
            Behavior::catch_all(),
            vec![
                Behavior::new("author/*"),
                Behavior::new("author/staff/*").fetch("staff"),
            ],
        )
        .unwrap();
        assert_eq!(table.resolve("/author/staff/ann").pattern, "author/staff/*");
        assert_eq!(table.resolve("/author/ann").pattern, "author/*");
    }

    #[test]
    fn test_ties_resolve_to_first_declared() {
        let table = RouteTable::new(
            Behavior::catch_all(),
            vec![Behavior::new("a*/x"), Behavior::new("ab/*")],
        )
        .unwrap();
        assert_eq!(table.resolve("ab/x").pattern, "a*/x");
    }

    #[test]
    fn test_leading_slash_in_pattern_is_ignored() {
        let table =
            RouteTable::new(Behavior::catch_all(), vec![Behavior::new("/blog/*")]).unwrap();
        assert_eq!(table.resolve("/blog/x").pattern, "blog/*");
    }

    #[test]
    fn test_literal_prefix() {
        assert_eq!(Behavior::new("blog/*").literal_prefix(), "blog");
        assert_eq!(Behavior::new("/old/blog/*").literal_prefix(), "old/blog");
        assert_eq!(Behavior::new("*").literal_prefix(), "");
    }

    #[test]
    fn test_validation_errors() {
        let err = RouteTable::new(Behavior::catch_all(), vec![Behavior::new("")]).unwrap_err();
        assert_eq!(err, RouteTableError::EmptyPattern);

        let err = RouteTable::new(
            Behavior::catch_all(),
            vec![Behavior::new("blog/*"), Behavior::new("/blog/*")],
        )
        .unwrap_err();
        assert_eq!(err, RouteTableError::DuplicatePattern("blog/*".to_string()));

        let both = Behavior::new("x/*").redirect_to("entry").fetch("author");
        let err = RouteTable::new(Behavior::catch_all(), vec![both]).unwrap_err();
        assert_eq!(err, RouteTableError::ConflictingStages("x/*".to_string()));

        let err = RouteTable::new(Behavior::catch_all(), vec![Behavior::new("x/*").fetch("/")])
            .unwrap_err();
        assert!(matches!(err, RouteTableError::EmptyCategory { .. }));
    }

    #[test]
    fn test_behavior_deserializes_from_config_shape() {
        let json = r#"{
            "pattern": "author/*",
            "origin": {"type": "fetch", "category": "author"},
            "forward_query_string": true
        }"#;
        let behavior: Behavior = serde_json::from_str(json).unwrap();
        assert_eq!(behavior, Behavior::new("author/*").fetch("author").forward_query_string());

        let json = r#"{"pattern": "blog/*", "viewer_request": {"type": "redirect", "target_category": "entry"}}"#;
        let behavior: Behavior = serde_json::from_str(json).unwrap();
        assert_eq!(behavior, Behavior::new("blog/*").redirect_to("entry"));
    }
}
