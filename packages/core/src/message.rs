//! The message data model: a pure, immutable sum type over requests and
//! responses. Signing never mutates a `Message` — it returns a fresh one
//! with the `Signature`/`Signature-Input` headers added.

use http::{HeaderMap, Method};
use url::Url;

/// An HTTP request or response, as supplied by the host application.
///
/// The host is responsible for parsing the wire request/response into this
/// shape; this crate never touches a socket or a request line.
#[derive(Debug, Clone)]
pub enum Message {
    Request(RequestMessage),
    Response(ResponseMessage),
}

impl Message {
    pub fn as_request(&self) -> Option<&RequestMessage> {
        match self {
            Message::Request(r) => Some(r),
            Message::Response(_) => None,
        }
    }

    pub fn as_response(&self) -> Option<&ResponseMessage> {
        match self {
            Message::Request(_) => None,
            Message::Response(r) => Some(r),
        }
    }

    pub fn headers(&self) -> &HeaderMap {
        match self {
            Message::Request(r) => &r.headers,
            Message::Response(r) => &r.headers,
        }
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        match self {
            Message::Request(r) => &mut r.headers,
            Message::Response(r) => &mut r.headers,
        }
    }
}

/// A request: method, a fully-parsed target URL, and headers.
///
/// `@request-target` is reconstructed from `url` rather than a raw request
/// line — the spec's Non-goals explicitly leave that reconstruction's
/// caveats (e.g. normalised empty paths) to this crate rather than to a
/// parser of the literal wire bytes.
#[derive(Debug, Clone)]
pub struct RequestMessage {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
}

impl RequestMessage {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
        }
    }
}

/// A response: status code, headers, and an optional bound request used to
/// resolve `;req`-parameterised components.
#[derive(Debug, Clone)]
pub struct ResponseMessage {
    pub status: u16,
    pub headers: HeaderMap,
    pub bound_request: Option<RequestMessage>,
}

impl ResponseMessage {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            bound_request: None,
        }
    }

    pub fn with_bound_request(mut self, request: RequestMessage) -> Self {
        self.bound_request = Some(request);
        self
    }
}
