//! The HTTP call function the interceptor wraps
//!
//! [`HttpCall`] is the fetch-like function a host dispatches every outbound
//! request through. Its argument comes in three shapes ([`CallInput`]) plus
//! optional per-call overrides ([`CallInit`]).

mod client;
mod response;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use reqwest::header::{HeaderMap, HeaderValue, IntoHeaderName};
use reqwest::{Method, Url};

use crate::error::{BodyError, TransportError};

pub use client::ReqwestTransport;
pub use response::{CallResponse, ResponseBody};

/// A one-shot stream of body chunks
pub type BodyStream = BoxStream<'static, Result<Bytes, BodyError>>;

/// Outgoing request body
pub enum RequestBody {
    Text(String),
    Bytes(Bytes),
    Stream(BodyStream),
}

impl fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

impl From<String> for RequestBody {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for RequestBody {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Bytes> for RequestBody {
    fn from(bytes: Bytes) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(Bytes::from(bytes))
    }
}

/// A fully described request (the "request object" call shape)
#[derive(Debug)]
pub struct CallRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<RequestBody>,
}

impl CallRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn header<K: IntoHeaderName>(mut self, name: K, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn body(mut self, body: impl Into<RequestBody>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// First argument of an HTTP call
#[derive(Debug)]
pub enum CallInput {
    UrlString(String),
    UrlObject(Url),
    Request(CallRequest),
}

impl CallInput {
    /// Target URL as the caller expressed it
    pub fn url(&self) -> String {
        match self {
            Self::UrlString(url) => url.clone(),
            Self::UrlObject(url) => url.as_str().to_string(),
            Self::Request(request) => request.url.as_str().to_string(),
        }
    }

    /// Method of the call; a request object carries its own, the URL shapes
    /// take it from `init` and default to GET.
    pub fn method(&self, init: Option<&CallInit>) -> Method {
        match self {
            Self::Request(request) => request.method.clone(),
            Self::UrlString(_) | Self::UrlObject(_) => init
                .and_then(|init| init.method.clone())
                .unwrap_or(Method::GET),
        }
    }

    /// Headers the call will send: `init` headers win over the request's own
    pub fn headers<'a>(&'a self, init: Option<&'a CallInit>) -> Option<&'a HeaderMap> {
        init.and_then(|init| init.headers.as_ref())
            .or(match self {
                Self::Request(request) => Some(&request.headers),
                Self::UrlString(_) | Self::UrlObject(_) => None,
            })
    }
}

impl From<&str> for CallInput {
    fn from(url: &str) -> Self {
        Self::UrlString(url.to_string())
    }
}

impl From<String> for CallInput {
    fn from(url: String) -> Self {
        Self::UrlString(url)
    }
}

impl From<Url> for CallInput {
    fn from(url: Url) -> Self {
        Self::UrlObject(url)
    }
}

impl From<CallRequest> for CallInput {
    fn from(request: CallRequest) -> Self {
        Self::Request(request)
    }
}

/// Per-call overrides (second argument of an HTTP call)
#[derive(Debug, Default)]
pub struct CallInit {
    pub method: Option<Method>,
    pub headers: Option<HeaderMap>,
    pub body: Option<RequestBody>,
}

impl CallInit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn header<K: IntoHeaderName>(mut self, name: K, value: HeaderValue) -> Self {
        self.headers
            .get_or_insert_with(HeaderMap::new)
            .insert(name, value);
        self
    }

    pub fn body(mut self, body: impl Into<RequestBody>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// The process-wide HTTP call function
#[async_trait]
pub trait HttpCall: Send + Sync {
    async fn call(
        &self,
        input: CallInput,
        init: Option<CallInit>,
    ) -> Result<CallResponse, TransportError>;
}

#[async_trait]
impl<T: HttpCall + ?Sized> HttpCall for Arc<T> {
    async fn call(
        &self,
        input: CallInput,
        init: Option<CallInit>,
    ) -> Result<CallResponse, TransportError> {
        (**self).call(input, init).await
    }
}
