//! Requests
//!
//! Request shape plus content negotiation: a send format and return format
//! become `Content-Type`/`Accept` headers, and a JSON payload is encoded
//! as the body (or as query parameters for GET).

use crate::{FormData, NetError};
use std::collections::HashMap;

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
        }
    }

    /// Parse a method name (case-insensitive)
    pub fn from_name(name: &str) -> Result<Self, NetError> {
        match name.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            "PATCH" => Ok(Method::Patch),
            other => Err(NetError::UnsupportedMethod(other.to_string())),
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body format for outgoing data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SendFormat {
    #[default]
    Json,
    /// `application/x-www-form-urlencoded`
    Html,
    /// `multipart/form-data`
    Form,
    Xml,
    Text,
}

impl SendFormat {
    pub fn from_name(name: &str) -> Result<Self, NetError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(SendFormat::Json),
            "html" => Ok(SendFormat::Html),
            "form" => Ok(SendFormat::Form),
            "xml" => Ok(SendFormat::Xml),
            "text" => Ok(SendFormat::Text),
            other => Err(NetError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            SendFormat::Json => "application/json",
            SendFormat::Html => "application/x-www-form-urlencoded",
            SendFormat::Form => "multipart/form-data",
            SendFormat::Xml => "text/xml",
            SendFormat::Text => "text/plain",
        }
    }
}

/// Expected response format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReturnFormat {
    #[default]
    Json,
    Html,
    Xml,
    Text,
}

impl ReturnFormat {
    pub fn from_name(name: &str) -> Result<Self, NetError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ReturnFormat::Json),
            "html" => Ok(ReturnFormat::Html),
            "xml" => Ok(ReturnFormat::Xml),
            "text" => Ok(ReturnFormat::Text),
            other => Err(NetError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn accept(&self) -> &'static str {
        match self {
            ReturnFormat::Json => "application/json",
            ReturnFormat::Html => "text/html",
            ReturnFormat::Xml => "application/xml, text/xml",
            ReturnFormat::Text => "text/plain",
        }
    }
}

/// Content negotiation settings for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Negotiation {
    pub send_format: SendFormat,
    pub return_format: ReturnFormat,
    pub encoding: String,
}

impl Default for Negotiation {
    fn default() -> Self {
        Self {
            send_format: SendFormat::Json,
            return_format: ReturnFormat::Json,
            encoding: "utf-8".to_string(),
        }
    }
}

impl Negotiation {
    /// `Content-Type` value for a body of the send format
    pub fn content_type(&self) -> String {
        format!("{};charset={}", self.send_format.mime(), self.encoding)
    }
}

/// Request configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Request {
    pub method: Method,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: Option<Vec<u8>>,
}

impl Request {
    pub fn new(method: Method, url: &str) -> Self {
        Self {
            method,
            url: url.to_string(),
            ..Default::default()
        }
    }

    pub fn get(url: &str) -> Self {
        Self::new(Method::Get, url)
    }

    pub fn post(url: &str) -> Self {
        Self::new(Method::Post, url)
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_json(self, json: &str) -> Self {
        self.with_header("Content-Type", "application/json")
            .with_body(json.as_bytes().to_vec())
    }

    /// Header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Attach `payload` per `negotiation`.
    ///
    /// GET requests carry the payload as query parameters; other methods
    /// carry an encoded body. `headers`, when given, replace the negotiated
    /// `Content-Type`/`Accept` headers entirely.
    pub fn with_payload(
        mut self,
        payload: &serde_json::Value,
        negotiation: &Negotiation,
        headers: Option<Vec<(String, String)>>,
    ) -> Result<Self, NetError> {
        let mut content_type = negotiation.content_type();

        if !payload.is_null() {
            if self.method == Method::Get {
                self.url = append_query(&self.url, payload);
            } else {
                let (body_type, body) = encode_body(negotiation, payload)?;
                if let Some(body_type) = body_type {
                    content_type = format!("{};charset={}", body_type, negotiation.encoding);
                }
                self.body = Some(body);
            }
        }

        match headers {
            Some(explicit) => {
                for (k, v) in explicit {
                    self.headers.insert(k, v);
                }
            }
            None => {
                self.headers.insert("Content-Type".into(), content_type);
                self.headers
                    .insert("Accept".into(), negotiation.return_format.accept().into());
            }
        }
        Ok(self)
    }
}

/// Flat key/value view of a payload for query strings and url-encoded bodies
fn payload_pairs(payload: &serde_json::Value) -> Vec<(String, String)> {
    match payload {
        serde_json::Value::Object(map) => map
            .iter()
            .map(|(k, v)| (k.clone(), scalar_text(v)))
            .collect(),
        other => vec![("data".to_string(), scalar_text(other))],
    }
}

pub(crate) fn scalar_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn urlencode(payload: &serde_json::Value) -> String {
    if let serde_json::Value::String(s) = payload {
        return s.clone();
    }
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(payload_pairs(payload))
        .finish()
}

fn append_query(target: &str, payload: &serde_json::Value) -> String {
    if let Ok(mut parsed) = url::Url::parse(target) {
        if let serde_json::Value::String(s) = payload {
            let query = match parsed.query() {
                Some(q) if !q.is_empty() => format!("{q}&{s}"),
                _ => s.clone(),
            };
            parsed.set_query(Some(&query));
        } else {
            parsed.query_pairs_mut().extend_pairs(payload_pairs(payload));
        }
        return parsed.into();
    }
    let separator = if target.contains('?') { '&' } else { '?' };
    format!("{target}{separator}{}", urlencode(payload))
}

/// Encode a payload body; returns a content type override when the format
/// needs one (multipart boundary)
fn encode_body(
    negotiation: &Negotiation,
    payload: &serde_json::Value,
) -> Result<(Option<String>, Vec<u8>), NetError> {
    match negotiation.send_format {
        SendFormat::Json => serde_json::to_vec(payload)
            .map(|body| (None, body))
            .map_err(|e| NetError::Encode(e.to_string())),
        SendFormat::Html => Ok((None, urlencode(payload).into_bytes())),
        SendFormat::Form => {
            let (content_type, body) = FormData::from_payload(payload).encode();
            Ok((Some(content_type), body))
        }
        SendFormat::Xml => {
            let body = match payload {
                serde_json::Value::String(s) => s.clone(),
                other => {
                    let mut out = format!("<?xml version=\"1.0\" encoding=\"{}\"?>", negotiation.encoding);
                    write_xml("data", other, &mut out);
                    out
                }
            };
            Ok((None, body.into_bytes()))
        }
        SendFormat::Text => Ok((None, scalar_text(payload).into_bytes())),
    }
}

fn write_xml(tag: &str, value: &serde_json::Value, out: &mut String) {
    out.push('<');
    out.push_str(tag);
    out.push('>');
    match value {
        serde_json::Value::Object(map) => {
            for (k, v) in map {
                write_xml(k, v, out);
            }
        }
        serde_json::Value::Array(items) => {
            for item in items {
                write_xml("item", item, out);
            }
        }
        other => {
            for c in scalar_text(other).chars() {
                match c {
                    '<' => out.push_str("&lt;"),
                    '>' => out.push_str("&gt;"),
                    '&' => out.push_str("&amp;"),
                    _ => out.push(c),
                }
            }
        }
    }
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_builder() {
        let req = Request::get("https://example.com").with_header("Accept", "application/json");

        assert_eq!(req.method, Method::Get);
        assert_eq!(req.header("accept"), Some("application/json"));
    }

    #[test]
    fn test_method_names() {
        assert_eq!(Method::from_name("patch"), Ok(Method::Patch));
        assert_eq!(Method::Delete.as_str(), "DELETE");
        assert!(Method::from_name("TRACE").is_err());
    }

    #[test]
    fn test_negotiated_headers() {
        let negotiation = Negotiation {
            send_format: SendFormat::Html,
            return_format: ReturnFormat::Html,
            encoding: "utf-8".into(),
        };
        let req = Request::post("https://example.com/save")
            .with_payload(&json!({"a": "1 2", "b": 3}), &negotiation, None)
            .unwrap();

        assert_eq!(
            req.header("Content-Type"),
            Some("application/x-www-form-urlencoded;charset=utf-8")
        );
        assert_eq!(req.header("Accept"), Some("text/html"));
        assert_eq!(req.body.as_deref(), Some("a=1+2&b=3".as_bytes()));
    }

    #[test]
    fn test_explicit_headers_replace_negotiated() {
        let req = Request::post("https://example.com")
            .with_payload(
                &json!({"a": 1}),
                &Negotiation::default(),
                Some(vec![("X-Token".into(), "t".into())]),
            )
            .unwrap();

        assert_eq!(req.header("X-Token"), Some("t"));
        assert!(req.header("Content-Type").is_none());
        assert!(req.header("Accept").is_none());
    }

    #[test]
    fn test_get_payload_goes_to_query() {
        let req = Request::get("https://example.com/list?page=2")
            .with_payload(&json!({"q": "a&b"}), &Negotiation::default(), None)
            .unwrap();

        assert_eq!(req.url, "https://example.com/list?page=2&q=a%26b");
        assert!(req.body.is_none());
    }

    #[test]
    fn test_relative_get_query() {
        let req = Request::get("/list")
            .with_payload(&json!({"n": 1}), &Negotiation::default(), None)
            .unwrap();
        assert_eq!(req.url, "/list?n=1");
    }

    #[test]
    fn test_xml_body() {
        let negotiation = Negotiation {
            send_format: SendFormat::Xml,
            ..Default::default()
        };
        let req = Request::new(Method::Put, "https://example.com")
            .with_payload(&json!({"name": "a<b", "tags": ["x"]}), &negotiation, None)
            .unwrap();
        let body = String::from_utf8(req.body.unwrap()).unwrap();

        assert!(body.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?><data>"));
        assert!(body.contains("<name>a&lt;b</name>"));
        assert!(body.contains("<tags><item>x</item></tags>"));
    }

    #[test]
    fn test_multipart_content_type_has_boundary() {
        let negotiation = Negotiation {
            send_format: SendFormat::Form,
            ..Default::default()
        };
        let req = Request::post("https://example.com")
            .with_payload(&json!({"a": "1"}), &negotiation, None)
            .unwrap();
        let content_type = req.header("Content-Type").unwrap();
        assert!(content_type.starts_with("multipart/form-data; boundary="));
        assert!(content_type.ends_with(";charset=utf-8"));
    }
}
