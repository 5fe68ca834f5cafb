//! Request and response types independent of the transport.

use std::borrow::Cow;

use svelteesp32_core::{Method, RequestHead, Response};

/// A request as seen by handlers: method, target and headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolRequest {
    pub method: Method,
    /// Request target including any query string.
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl PoolRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub(crate) fn from_tiny(request: &tiny_http::Request) -> Self {
        Self {
            method: Method::parse(request.method().as_str()),
            url: request.url().to_string(),
            headers: request
                .headers()
                .iter()
                .map(|h| (h.field.as_str().as_str().to_string(), h.value.as_str().to_string()))
                .collect(),
        }
    }

    /// Path without query string.
    pub fn path(&self) -> &str {
        self.url.split(['?', '#']).next().unwrap_or(&self.url)
    }
}

impl RequestHead for PoolRequest {
    fn method(&self) -> Method {
        self.method
    }

    fn path(&self) -> &str {
        &self.url
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// A response produced by a handler. Static bodies are not copied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolResponse {
    pub status: u16,
    pub headers: Vec<(Cow<'static, str>, Cow<'static, str>)>,
    pub body: Cow<'static, [u8]>,
}

impl PoolResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Cow::Borrowed(&[]),
        }
    }

    pub fn header(mut self, name: impl Into<Cow<'static, str>>, value: impl Into<Cow<'static, str>>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<Cow<'static, [u8]>>) -> Self {
        self.body = body.into();
        self
    }

    /// `application/json` response.
    pub fn json(status: u16, body: impl Into<String>) -> Self {
        Self::new(status)
            .header("Content-Type", "application/json")
            .body(body.into().into_bytes())
    }

    /// `text/plain` response.
    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self::new(status)
            .header("Content-Type", "text/plain")
            .body(body.into().into_bytes())
    }

    /// Value of a header. Lookup is case-insensitive.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_ref())
    }

    pub(crate) fn into_tiny(self) -> tiny_http::Response<std::io::Cursor<Cow<'static, [u8]>>> {
        let headers = self
            .headers
            .iter()
            .filter_map(|(name, value)| {
                let header = tiny_http::Header::from_bytes(name.as_bytes(), value.as_bytes());
                if header.is_err() {
                    tracing::warn!("dropping invalid response header {}: {}", name, value);
                }
                header.ok()
            })
            .collect();
        let len = self.body.len();
        tiny_http::Response::new(
            tiny_http::StatusCode(self.status),
            headers,
            std::io::Cursor::new(self.body),
            Some(len),
            None,
        )
    }
}

impl From<Response> for PoolResponse {
    fn from(response: Response) -> Self {
        Self {
            status: response.status.code(),
            headers: response
                .headers()
                .map(|(name, value)| (Cow::Borrowed(name), Cow::Borrowed(value)))
                .collect(),
            body: Cow::Borrowed(response.body),
        }
    }
}
