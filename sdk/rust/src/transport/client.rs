//! Default transport backed by reqwest

use async_trait::async_trait;
use futures::TryStreamExt;
use reqwest::header::HeaderMap;
use reqwest::{Method, Url};

use super::{CallInit, CallInput, CallResponse, HttpCall, RequestBody, ResponseBody};
use crate::error::{BodyError, TransportError};

/// The unwrapped HTTP call function: a plain reqwest client
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl From<RequestBody> for reqwest::Body {
    fn from(body: RequestBody) -> Self {
        match body {
            RequestBody::Text(text) => reqwest::Body::from(text),
            RequestBody::Bytes(bytes) => reqwest::Body::from(bytes),
            RequestBody::Stream(chunks) => reqwest::Body::wrap_stream(chunks),
        }
    }
}

#[async_trait]
impl HttpCall for ReqwestTransport {
    async fn call(
        &self,
        input: CallInput,
        init: Option<CallInit>,
    ) -> Result<CallResponse, TransportError> {
        let (url, mut method, mut headers, mut body) = match input {
            CallInput::UrlString(raw) => {
                let url = Url::parse(&raw).map_err(|e| TransportError::InvalidUrl {
                    url: raw.clone(),
                    reason: e.to_string(),
                })?;
                (url, Method::GET, HeaderMap::new(), None)
            }
            CallInput::UrlObject(url) => (url, Method::GET, HeaderMap::new(), None),
            CallInput::Request(request) => {
                (request.url, request.method, request.headers, request.body)
            }
        };

        if let Some(init) = init {
            if let Some(m) = init.method {
                method = m;
            }
            if let Some(h) = init.headers {
                headers = h;
            }
            if init.body.is_some() {
                body = init.body;
            }
        }

        tracing::trace!(%method, %url, "Sending request");

        let mut builder = self.client.request(method, url).headers(headers);
        if let Some(body) = body {
            builder = builder.body(reqwest::Body::from(body));
        }

        let response = builder.send().await?;

        let status = response.status();
        let headers = response.headers().clone();
        let url = response.url().to_string();
        let body = ResponseBody::from_stream(response.bytes_stream().map_err(BodyError::from));

        Ok(CallResponse::new(status, headers, body).with_url(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_url_string_is_transport_error() {
        let transport = ReqwestTransport::new();
        let err = transport
            .call(CallInput::from("not a url"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::InvalidUrl { ref url, .. } if url == "not a url"));
    }
}
