//! Edge event wire formats
//!
//! Two execution points, two shapes:
//! - viewer functions: `{"request": {"uri", "querystring": {k: {"value"}}}}` in,
//!   integer `statusCode` and `{name: {"value"}}` headers out
//! - origin lambdas: `{"Records": [{"cf": {"request": {...}}}]}` in with a raw
//!   query string and the origin descriptor, string `status` and
//!   `{name: [{"key", "value"}]}` headers out

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::request::parse_query_string;
use super::{EdgeRequest, EdgeResponse, OriginDescriptor};

/// Execution point a response is serialized for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionPoint {
    /// Viewer-request / viewer-response functions
    Viewer,
    /// Origin-request lambdas
    Origin,
}

/// Error type for event decoding.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("malformed edge event: {0}")]
    Json(#[from] serde_json::Error),

    #[error("origin event has no records")]
    NoRecords,

    #[error("unrecognized edge event shape")]
    UnknownShape,
}

#[derive(Debug, Deserialize, Serialize)]
struct SingleValue {
    value: String,
}

#[derive(Debug, Deserialize, Serialize)]
struct KeyedValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    key: Option<String>,
    value: String,
}

#[derive(Debug, Deserialize)]
struct ViewerEvent {
    request: ViewerRequest,
}

#[derive(Debug, Deserialize)]
struct ViewerRequest {
    uri: String,
    #[serde(default)]
    querystring: HashMap<String, SingleValue>,
    #[serde(default)]
    headers: HashMap<String, SingleValue>,
}

#[derive(Debug, Deserialize)]
struct OriginEvent {
    #[serde(rename = "Records")]
    records: Vec<OriginRecord>,
}

#[derive(Debug, Deserialize)]
struct OriginRecord {
    cf: OriginCf,
}

#[derive(Debug, Deserialize)]
struct OriginCf {
    request: OriginRequest,
}

#[derive(Debug, Deserialize)]
struct OriginRequest {
    uri: String,
    #[serde(default)]
    querystring: String,
    #[serde(default)]
    headers: HashMap<String, Vec<KeyedValue>>,
    #[serde(default)]
    origin: Option<OriginSpec>,
}

#[derive(Debug, Deserialize)]
struct OriginSpec {
    #[serde(default)]
    s3: Option<DomainOrigin>,
    #[serde(default)]
    custom: Option<DomainOrigin>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DomainOrigin {
    domain_name: String,
}

/// Decode a viewer-function event
///
/// Viewer events carry no origin, so the caller supplies it.
pub fn decode_viewer_event(
    event: &[u8],
    origin: &OriginDescriptor,
) -> Result<EdgeRequest, WireError> {
    let event: ViewerEvent = serde_json::from_slice(event)?;
    let mut request = EdgeRequest::new(event.request.uri, origin.clone());
    for (name, v) in event.request.querystring {
        request = request.with_query(name, v.value);
    }
    for (name, v) in event.request.headers {
        request = request.with_header(&name, v.value);
    }
    Ok(request)
}

/// Decode an origin-request event
///
/// Without an origin block the descriptor is left empty.
pub fn decode_origin_event(event: &[u8]) -> Result<EdgeRequest, WireError> {
    let event: OriginEvent = serde_json::from_slice(event)?;
    let record = event.records.into_iter().next().ok_or(WireError::NoRecords)?;
    let raw = record.cf.request;

    let domain = raw
        .origin
        .and_then(|o| o.s3.or(o.custom))
        .map(|d| d.domain_name)
        .unwrap_or_default();
    let mut request = EdgeRequest::new(raw.uri, OriginDescriptor::new(domain));
    request.query = parse_query_string(&raw.querystring);
    for (name, values) in raw.headers {
        if let Some(first) = values.into_iter().next() {
            request = request.with_header(&name, first.value);
        }
    }
    Ok(request)
}

/// Decode either event shape, telling which one it was
pub fn decode_event(
    event: &[u8],
    fallback_origin: &OriginDescriptor,
) -> Result<(EdgeRequest, ExecutionPoint), WireError> {
    let probe: Value = serde_json::from_slice(event)?;
    if probe.get("Records").is_some() {
        Ok((decode_origin_event(event)?, ExecutionPoint::Origin))
    } else if probe.get("request").is_some() {
        Ok((decode_viewer_event(event, fallback_origin)?, ExecutionPoint::Viewer))
    } else {
        Err(WireError::UnknownShape)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ViewerResponseOut<'a> {
    status_code: u16,
    status_description: &'a str,
    headers: BTreeMap<&'a str, SingleValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    body_encoding: Option<&'static str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OriginResponseOut<'a> {
    status: String,
    status_description: &'a str,
    headers: BTreeMap<&'a str, Vec<KeyedValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    body_encoding: Option<&'static str>,
}

/// Serialize a response in the shape `point` expects
pub fn encode_response(
    response: &EdgeResponse,
    point: ExecutionPoint,
) -> Result<Value, WireError> {
    let body = response.body.as_deref();
    let body_encoding = response.body_encoding.map(super::BodyEncoding::as_str);
    let value = match point {
        ExecutionPoint::Viewer => serde_json::to_value(ViewerResponseOut {
            status_code: response.status,
            status_description: &response.status_description,
            headers: response
                .headers
                .iter()
                .map(|(name, value)| {
                    (
                        name,
                        SingleValue {
                            value: value.to_string(),
                        },
                    )
                })
                .collect(),
            body,
            body_encoding,
        })?,
        ExecutionPoint::Origin => serde_json::to_value(OriginResponseOut {
            status: response.status.to_string(),
            status_description: &response.status_description,
            headers: response
                .headers
                .iter()
                .map(|(name, value)| {
                    (
                        name,
                        vec![KeyedValue {
                            key: Some(canonical_header_name(name)),
                            value: value.to_string(),
                        }],
                    )
                })
                .collect(),
            body,
            body_encoding,
        })?,
    };
    Ok(value)
}

/// `content-type` → `Content-Type`
pub fn canonical_header_name(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase()
            })
        })
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_viewer_event() {
        let event = json!({
            "version": "1.0",
            "request": {
                "method": "GET",
                "uri": "/blog/hello",
                "querystring": {"fields": {"value": "title"}},
                "headers": {"User-Agent": {"value": "curl/8.0"}}
            }
        });
        let origin = OriginDescriptor::new("bucket.s3.amazonaws.com");
        let req = decode_viewer_event(event.to_string().as_bytes(), &origin).unwrap();
        assert_eq!(req.path, "/blog/hello");
        assert_eq!(req.query_param("fields"), Some("title"));
        assert_eq!(req.header("user-agent"), Some("curl/8.0"));
        assert_eq!(req.origin, origin);
    }

    #[test]
    fn test_decode_origin_event() {
        let event = json!({
            "Records": [{"cf": {"request": {
                "clientIp": "203.0.113.178",
                "method": "GET",
                "uri": "/author/ktinn",
                "querystring": "fields=name%2Cbio",
                "headers": {"host": [{"key": "Host", "value": "d111.cloudfront.net"}]},
                "origin": {"s3": {"domainName": "blog-origin.s3.us-east-1.amazonaws.com", "path": ""}}
            }}}]
        });
        let req = decode_origin_event(event.to_string().as_bytes()).unwrap();
        assert_eq!(req.path, "/author/ktinn");
        assert_eq!(req.query_param("fields"), Some("name,bio"));
        assert_eq!(req.header("Host"), Some("d111.cloudfront.net"));
        assert_eq!(req.origin.store_id(), "blog-origin");
    }

    #[test]
    fn test_decode_event_detects_shape() {
        let origin = OriginDescriptor::new("fallback.s3");
        let viewer = json!({"request": {"uri": "/x"}}).to_string();
        let (req, point) = decode_event(viewer.as_bytes(), &origin).unwrap();
        assert_eq!(point, ExecutionPoint::Viewer);
        assert_eq!(req.origin.store_id(), "fallback");

        let lambda = json!({"Records": [{"cf": {"request": {"uri": "/y"}}}]}).to_string();
        let (req, point) = decode_event(lambda.as_bytes(), &origin).unwrap();
        assert_eq!(point, ExecutionPoint::Origin);
        assert_eq!(req.origin.store_id(), "");

        assert!(matches!(
            decode_event(b"{\"Records\": []}", &origin),
            Err(WireError::NoRecords)
        ));
        assert!(matches!(
            decode_event(b"{}", &origin),
            Err(WireError::UnknownShape)
        ));
        assert!(matches!(decode_event(b"not json", &origin), Err(WireError::Json(_))));
    }

    #[test]
    fn test_encode_viewer_shape() {
        let resp = EdgeResponse::see_other("/entry/1.json");
        let value = encode_response(&resp, ExecutionPoint::Viewer).unwrap();
        assert_eq!(
            value,
            json!({
                "statusCode": 303,
                "statusDescription": "See Other",
                "headers": {"location": {"value": "/entry/1.json"}}
            })
        );
    }

    #[test]
    fn test_encode_origin_shape() {
        let resp = EdgeResponse::json(r#"{"name":"A"}"#.to_string());
        let value = encode_response(&resp, ExecutionPoint::Origin).unwrap();
        assert_eq!(
            value,
            json!({
                "status": "200",
                "statusDescription": "OK",
                "headers": {"content-type": [{"key": "Content-Type", "value": "application/json"}]},
                "body": "{\"name\":\"A\"}",
                "bodyEncoding": "text"
            })
        );

        let value = encode_response(&EdgeResponse::not_found(), ExecutionPoint::Origin).unwrap();
        assert_eq!(
            value,
            json!({"status": "404", "statusDescription": "Not Found", "headers": {}})
        );
    }

    #[test]
    fn test_canonical_header_name() {
        assert_eq!(canonical_header_name("content-type"), "Content-Type");
        assert_eq!(canonical_header_name("cache-control"), "Cache-Control");
        assert_eq!(canonical_header_name("location"), "Location");
        assert_eq!(canonical_header_name("x-amz-id-2"), "X-Amz-Id-2");
    }
}
