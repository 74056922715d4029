//! brisk Networking
//!
//! Request encoding, transports, and the dispatch gate that bounds how many
//! requests are in flight at once.

mod request;
mod form_data;
mod transport;
mod gate;
mod dispatcher;
mod progress;
mod mock;

pub use request::{Method, Negotiation, Request, ReturnFormat, SendFormat};
pub use form_data::{FormData, Part};
pub use transport::{BoxFuture, HttpTransport, Transport, TransportConfig};
pub use gate::{Admission, DispatchGate, DEFAULT_MAX_IN_FLIGHT};
pub use dispatcher::{Completion, Dispatcher, Ticket};
pub use progress::{PartTag, ProgressTracker};
pub use mock::MockTransport;
pub use url::Url;

/// HTTP Response
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    /// Response with status 200 and a text body
    pub fn ok(body: impl Into<String>) -> Self {
        Self::with_status(200, body)
    }

    pub fn with_status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into().into_bytes(),
        }
    }

    /// Body decoded as UTF-8 (lossy)
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Statuses 200 through 399 count as success
    pub fn is_success(&self) -> bool {
        (200..400).contains(&self.status)
    }

    /// Turn a failure status into [`NetError::HttpError`]
    pub fn error_for_status(self) -> Result<Self, NetError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(NetError::HttpError {
                status: self.status,
                body: self.text(),
            })
        }
    }
}

/// Network error
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NetError {
    #[error("HTTP error: {status}")]
    HttpError { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Unsupported method: {0}")]
    UnsupportedMethod(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Encoding error: {0}")]
    Encode(String),
}

impl NetError {
    /// HTTP status for status errors
    pub fn status(&self) -> Option<u16> {
        match self {
            NetError::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Response body text carried by status errors
    pub fn body(&self) -> Option<&str> {
        match self {
            NetError::HttpError { body, .. } => Some(body),
            _ => None,
        }
    }
}
