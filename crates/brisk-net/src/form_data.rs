//! Multipart bodies for the `form` send format
//!
//! A payload object becomes one part per top-level field. Scalars are sent
//! as their text, nested objects and arrays as compact JSON. Upload glue can
//! add binary parts with [`FormData::append_blob`].

use crate::request::scalar_text;

/// Ordered multipart parts
#[derive(Debug, Clone, Default)]
pub struct FormData {
    parts: Vec<Part>,
}

/// One multipart part
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Field { name: String, value: String },
    Blob {
        name: String,
        filename: String,
        content_type: String,
        bytes: Vec<u8>,
    },
}

impl Part {
    pub fn name(&self) -> &str {
        match self {
            Part::Field { name, .. } | Part::Blob { name, .. } => name,
        }
    }
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parts for a request payload; a non-object payload is a single `data` field
    pub fn from_payload(payload: &serde_json::Value) -> Self {
        let mut form = Self::new();
        match payload {
            serde_json::Value::Object(map) => {
                for (name, value) in map {
                    form.append(name, &field_text(value));
                }
            }
            serde_json::Value::Null => {}
            other => form.append("data", &field_text(other)),
        }
        form
    }

    pub fn append(&mut self, name: &str, value: &str) {
        self.parts.push(Part::Field {
            name: name.to_string(),
            value: value.to_string(),
        });
    }

    pub fn append_blob(&mut self, name: &str, filename: &str, content_type: &str, bytes: Vec<u8>) {
        self.parts.push(Part::Blob {
            name: name.to_string(),
            filename: filename.to_string(),
            content_type: content_type.to_string(),
            bytes,
        });
    }

    /// First part called `name`
    pub fn get(&self, name: &str) -> Option<&Part> {
        self.parts.iter().find(|p| p.name() == name)
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Content type with boundary, and the encoded body
    pub fn encode(&self) -> (String, Vec<u8>) {
        let boundary = format!("----brisk{:016x}", boundary_seed());
        let mut body = Vec::new();
        for part in &self.parts {
            body.extend_from_slice(b"--");
            body.extend_from_slice(boundary.as_bytes());
            body.extend_from_slice(b"\r\n");
            match part {
                Part::Field { name, value } => {
                    let head = format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", quote(name));
                    body.extend_from_slice(head.as_bytes());
                    body.extend_from_slice(value.as_bytes());
                }
                Part::Blob {
                    name,
                    filename,
                    content_type,
                    bytes,
                } => {
                    let head = format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                        quote(name),
                        quote(filename),
                        content_type
                    );
                    body.extend_from_slice(head.as_bytes());
                    body.extend_from_slice(bytes);
                }
            }
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
        (format!("multipart/form-data; boundary={boundary}"), body)
    }
}

fn field_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Object(_) | serde_json::Value::Array(_) => value.to_string(),
        other => scalar_text(other),
    }
}

fn quote(text: &str) -> String {
    text.replace('"', "%22").replace(['\r', '\n'], " ")
}

fn boundary_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0xb415c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_payload() {
        let form = FormData::from_payload(&serde_json::json!({"a": 1, "b": "x", "c": {"d": true}, "e": null}));
        assert_eq!(form.len(), 4);
        assert_eq!(form.get("a"), Some(&Part::Field { name: "a".into(), value: "1".into() }));
        assert_eq!(form.get("c"), Some(&Part::Field { name: "c".into(), value: r#"{"d":true}"#.into() }));
        assert_eq!(form.get("e"), Some(&Part::Field { name: "e".into(), value: String::new() }));

        let single = FormData::from_payload(&serde_json::json!("raw"));
        assert_eq!(single.get("data"), Some(&Part::Field { name: "data".into(), value: "raw".into() }));
        assert!(FormData::from_payload(&serde_json::Value::Null).is_empty());
    }

    #[test]
    fn test_encode() {
        let mut form = FormData::from_payload(&serde_json::json!({"name": "value"}));
        form.append_blob("chunk", "part-0.bin", "application/octet-stream", b"\x00\x01".to_vec());

        let (content_type, body) = form.encode();
        let boundary = content_type.split("boundary=").nth(1).unwrap().to_string();
        let text = String::from_utf8_lossy(&body);

        assert!(content_type.starts_with("multipart/form-data; "));
        assert!(text.starts_with(&format!("--{boundary}\r\n")));
        assert!(text.contains("name=\"name\"\r\n\r\nvalue\r\n"));
        assert!(text.contains("filename=\"part-0.bin\"\r\nContent-Type: application/octet-stream"));
        assert!(text.ends_with(&format!("--{boundary}--\r\n")));
    }
}
