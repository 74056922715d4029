//! Transports
//!
//! A [`Transport`] performs one round trip. [`HttpTransport`] uses the
//! blocking reqwest client on smol's blocking pool so that any executor can
//! drive it.

use crate::{Method, NetError, Request, Response};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Boxed future returned by transports
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// Performs network round trips
pub trait Transport: Send + Sync + 'static {
    /// Execute one request; any HTTP status is a successful round trip
    fn execute(&self, request: Request) -> BoxFuture<Result<Response, NetError>>;
}

/// HTTP client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransportConfig {
    /// User agent string
    pub user_agent: String,
    /// Connection timeout
    pub connect_timeout_ms: u64,
    /// Whole-request timeout
    pub request_timeout_ms: u64,
    /// Max redirects to follow (0 = disable)
    pub max_redirects: usize,
    /// Headers added to every request
    pub default_headers: Vec<(String, String)>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("brisk/", env!("CARGO_PKG_VERSION")).into(),
            connect_timeout_ms: 30_000,
            request_timeout_ms: 60_000,
            max_redirects: 10,
            default_headers: Vec::new(),
        }
    }
}

/// HTTP transport over reqwest (rustls)
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    default_headers: Vec<(String, String)>,
}

impl HttpTransport {
    pub fn new(config: TransportConfig) -> Result<Self, NetError> {
        let redirect = if config.max_redirects == 0 {
            reqwest::redirect::Policy::none()
        } else {
            reqwest::redirect::Policy::limited(config.max_redirects)
        };
        let client = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent)
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .redirect(redirect)
            .build()
            .map_err(|e| NetError::Network(e.to_string()))?;
        Ok(Self {
            client,
            default_headers: config.default_headers,
        })
    }
}

impl Transport for HttpTransport {
    fn execute(&self, request: Request) -> BoxFuture<Result<Response, NetError>> {
        let client = self.client.clone();
        let defaults = self.default_headers.clone();
        Box::pin(smol::unblock(move || send_blocking(&client, &defaults, request)))
    }
}

fn send_blocking(
    client: &reqwest::blocking::Client,
    defaults: &[(String, String)],
    request: Request,
) -> Result<Response, NetError> {
    let method = match request.method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
        Method::Patch => reqwest::Method::PATCH,
    };
    let url = reqwest::Url::parse(&request.url).map_err(|_| NetError::InvalidUrl(request.url.clone()))?;
    let mut builder = client.request(method, url);

    // Add headers
    for (name, value) in defaults {
        builder = builder.header(name.as_str(), value.as_str());
    }
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }

    // Add body
    if let Some(body) = request.body {
        builder = builder.body(body);
    }

    let response = builder.send().map_err(|e| {
        if e.is_timeout() {
            NetError::Timeout
        } else {
            NetError::Network(e.to_string())
        }
    })?;

    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.to_string(), v.to_string())))
        .collect();
    let body = response
        .bytes()
        .map_err(|e| NetError::Network(e.to_string()))?
        .to_vec();

    Ok(Response { status, headers, body })
}
