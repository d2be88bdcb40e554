//! Responses with duplicable bodies

use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt, stream};
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

use super::BodyStream;
use crate::error::BodyError;

/// Response body: either already buffered or a one-shot chunk stream
pub struct ResponseBody {
    inner: Inner,
}

enum Inner {
    Full(Bytes),
    Stream(BodyStream),
}

impl Default for ResponseBody {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.inner {
            Inner::Full(bytes) => write!(f, "ResponseBody::Full({} bytes)", bytes.len()),
            Inner::Stream(_) => f.write_str("ResponseBody::Stream(..)"),
        }
    }
}

impl ResponseBody {
    pub fn empty() -> Self {
        Self::full(Bytes::new())
    }

    pub fn full(bytes: impl Into<Bytes>) -> Self {
        Self {
            inner: Inner::Full(bytes.into()),
        }
    }

    pub fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<Bytes, BodyError>> + Send + 'static,
    {
        Self {
            inner: Inner::Stream(stream.boxed()),
        }
    }

    /// Split into two independent bodies carrying the same chunks.
    ///
    /// A streaming body is pulled by a spawned driver task, so either side can
    /// be drained, dropped or left unread without affecting the other. Must be
    /// called from within a tokio runtime.
    pub fn tee(self) -> (Self, Self) {
        match self.inner {
            Inner::Full(bytes) => (Self::full(bytes.clone()), Self::full(bytes)),
            Inner::Stream(mut upstream) => {
                let (left_tx, left_rx) = mpsc::unbounded_channel();
                let (right_tx, right_rx) = mpsc::unbounded_channel();

                tokio::spawn(async move {
                    while let Some(chunk) = upstream.next().await {
                        let left_open = left_tx.send(chunk.clone()).is_ok();
                        let right_open = right_tx.send(chunk).is_ok();
                        if !left_open && !right_open {
                            tracing::trace!("Both body readers dropped, stopping tee");
                            break;
                        }
                    }
                });

                (
                    Self::from_stream(UnboundedReceiverStream::new(left_rx)),
                    Self::from_stream(UnboundedReceiverStream::new(right_rx)),
                )
            }
        }
    }

    /// Read the whole body
    pub async fn collect(self) -> Result<Bytes, BodyError> {
        match self.inner {
            Inner::Full(bytes) => Ok(bytes),
            Inner::Stream(mut chunks) => {
                let mut buf = BytesMut::new();
                while let Some(chunk) = chunks.next().await {
                    buf.extend_from_slice(&chunk?);
                }
                Ok(buf.freeze())
            }
        }
    }

    pub fn into_stream(self) -> BodyStream {
        match self.inner {
            Inner::Full(bytes) if bytes.is_empty() => stream::empty().boxed(),
            Inner::Full(bytes) => stream::once(async move { Ok(bytes) }).boxed(),
            Inner::Stream(chunks) => chunks,
        }
    }
}

/// Response of an HTTP call
#[derive(Debug)]
pub struct CallResponse {
    url: String,
    status: StatusCode,
    status_text: String,
    headers: HeaderMap,
    body: ResponseBody,
}

impl CallResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: ResponseBody) -> Self {
        Self {
            url: String::new(),
            status,
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_status_text(mut self, status_text: impl Into<String>) -> Self {
        self.status_text = status_text.into();
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Duplicate this response.
    ///
    /// `self` keeps one side of a [`ResponseBody::tee`]; the returned copy
    /// holds the other. Reading the copy never consumes what `self` delivers.
    pub fn clone_response(&mut self) -> CallResponse {
        let (mine, theirs) = std::mem::take(&mut self.body).tee();
        self.body = mine;

        CallResponse {
            url: self.url.clone(),
            status: self.status,
            status_text: self.status_text.clone(),
            headers: self.headers.clone(),
            body: theirs,
        }
    }

    pub fn into_body(self) -> ResponseBody {
        self.body
    }

    pub fn bytes_stream(self) -> BodyStream {
        self.body.into_stream()
    }

    pub async fn bytes(self) -> Result<Bytes, BodyError> {
        self.body.collect().await
    }

    /// Body decoded as UTF-8, replacing invalid sequences
    pub async fn text(self) -> Result<String, BodyError> {
        let bytes = self.bytes().await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    pub async fn json<T: DeserializeOwned>(self) -> Result<T, BodyError> {
        let bytes = self.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| BodyError(e.to_string()))
    }
}
