//! Resource identifier derivation from request paths

/// Last non-empty segment of a slash-delimited path
///
/// `None` when the path has no non-empty segment (`""`, `"/"`, `"//"`).
pub fn resource_identifier(path: &str) -> Option<&str> {
    path.split('/').rev().find(|segment| !segment.is_empty())
}

/// Path without its leading slashes, as used for pattern matching and store keys
pub fn relative_path(path: &str) -> &str {
    path.trim_start_matches('/')
}

/// Relative path with a leading `prefix` removed, when it matches whole segments
///
/// `blog` strips `blog/x` and `blog`, but not `blogroll`. An empty prefix
/// strips nothing.
pub fn strip_route_prefix<'a>(path: &'a str, prefix: &str) -> &'a str {
    let relative = relative_path(path);
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        return relative;
    }
    match relative.strip_prefix(prefix) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => relative,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_identifier() {
        assert_eq!(resource_identifier("/author/ktinn"), Some("ktinn"));
        assert_eq!(resource_identifier("author/ktinn"), Some("ktinn"));
        assert_eq!(resource_identifier("/blog/2024/hello"), Some("hello"));
        assert_eq!(resource_identifier("/blog/hello/"), Some("hello"));
    }

    #[test]
    fn test_resource_identifier_degenerate() {
        assert_eq!(resource_identifier(""), None);
        assert_eq!(resource_identifier("/"), None);
        assert_eq!(resource_identifier("//"), None);
    }

    #[test]
    fn test_relative_path() {
        assert_eq!(relative_path("/entry/1.json"), "entry/1.json");
        assert_eq!(relative_path("entry/1.json"), "entry/1.json");
        assert_eq!(relative_path("/"), "");
    }

    #[test]
    fn test_strip_route_prefix() {
        assert_eq!(strip_route_prefix("/blog/hello", "blog"), "/hello");
        assert_eq!(strip_route_prefix("/author/", "author"), "/");
        assert_eq!(strip_route_prefix("author", "author"), "");
        assert_eq!(strip_route_prefix("/blogroll", "blog"), "blogroll");
        assert_eq!(strip_route_prefix("/old/blog/x", "/old/blog/"), "/x");
        assert_eq!(strip_route_prefix("/entry/x", ""), "entry/x");
    }
}
