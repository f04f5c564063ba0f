//! Streaming request reader.
//!
//! Posts a JSON payload to an event-stream endpoint and yields each `data:`
//! frame of the response in order. Every failure (transport, non-2xx status,
//! missing body) is yielded exactly once as the last item, after which the
//! stream ends. Dropping the stream aborts the request.

use std::collections::HashMap;

use futures::future;
use futures::stream::{self, BoxStream, Stream, StreamExt};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error};

use crate::client::{ensure_success, ClientError};
use crate::http::{add_extra_headers, with_bearer};
use crate::options::SecretString;
use crate::sse::SSEResponseExt;

/// One `data:` payload from the event stream, verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame(pub String);

impl Frame {
    /// The payload text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Take the payload text.
    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Parameters for one streaming call.
#[derive(Debug, Clone)]
pub struct StreamRequest {
    endpoint: String,
    payload: Value,
    token: SecretString,
    extra_headers: Option<HashMap<String, String>>,
}

impl StreamRequest {
    /// Build a request, serializing the payload up front.
    pub fn new<P>(
        endpoint: impl Into<String>,
        payload: &P,
        token: impl Into<SecretString>,
    ) -> Result<Self, ClientError>
    where
        P: Serialize + ?Sized,
    {
        let endpoint = endpoint.into();
        if endpoint.trim().is_empty() {
            return Err(ClientError::Config("stream endpoint is required".to_string()));
        }
        Ok(Self {
            endpoint,
            payload: serde_json::to_value(payload)?,
            token: token.into(),
            extra_headers: None,
        })
    }

    /// Send these headers along with the standard ones.
    pub fn with_extra_headers(mut self, headers: Option<HashMap<String, String>>) -> Self {
        self.extra_headers = headers;
        self
    }

    /// Target URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// JSON body sent with the request.
    pub fn payload(&self) -> &Value {
        &self.payload
    }
}

enum ReaderState {
    Connect(reqwest::Client, StreamRequest),
    Reading(BoxStream<'static, Result<String, ClientError>>),
    Finished,
}

/// Open an event stream and yield its frames.
///
/// Nothing is sent until the stream is first polled.
pub fn frame_stream(
    http: &reqwest::Client,
    request: StreamRequest,
) -> impl Stream<Item = Result<Frame, ClientError>> + Send + 'static {
    stream::unfold(
        ReaderState::Connect(http.clone(), request),
        |state| async move {
            match state {
                ReaderState::Connect(http, request) => match open(&http, &request).await {
                    Ok(frames) => next_frame(frames).await,
                    Err(e) => {
                        error!(endpoint = %request.endpoint, "stream request failed: {}", e);
                        Some((Err(e), ReaderState::Finished))
                    }
                },
                ReaderState::Reading(frames) => next_frame(frames).await,
                ReaderState::Finished => None,
            }
        },
    )
}

async fn open(
    http: &reqwest::Client,
    request: &StreamRequest,
) -> Result<BoxStream<'static, Result<String, ClientError>>, ClientError> {
    let req = http
        .post(&request.endpoint)
        .header(CONTENT_TYPE, "application/json")
        .header(ACCEPT, "text/event-stream")
        .json(&request.payload);
    let req = add_extra_headers(req, &request.extra_headers);
    let response = ensure_success(with_bearer(req, &request.token).send().await?).await?;

    if response.status() == StatusCode::NO_CONTENT || response.content_length() == Some(0) {
        return Err(ClientError::EmptyBody);
    }

    Ok(response.sse().boxed())
}

async fn next_frame(
    mut frames: BoxStream<'static, Result<String, ClientError>>,
) -> Option<(Result<Frame, ClientError>, ReaderState)> {
    match frames.next().await? {
        Ok(data) => {
            debug!(frame = %data, "stream frame");
            Some((Ok(Frame(data)), ReaderState::Reading(frames)))
        }
        Err(e) => {
            error!("stream read failed: {}", e);
            Some((Err(e), ReaderState::Finished))
        }
    }
}

/// End a stream right after its first error.
pub fn stop_after_error<S, T>(stream: S) -> impl Stream<Item = Result<T, ClientError>>
where
    S: Stream<Item = Result<T, ClientError>>,
{
    stream.scan(false, |failed, item| {
        if *failed {
            return future::ready(None);
        }
        *failed = item.is_err();
        future::ready(Some(item))
    })
}

/// Drive a frame stream to completion, reporting through a callback.
///
/// The callback receives `Ok(payload)` for every frame and at most one
/// `Err(message)`, after which it is never called again.
pub async fn read_frames<F>(http: &reqwest::Client, request: StreamRequest, mut on_value: F)
where
    F: FnMut(Result<String, String>),
{
    let frames = frame_stream(http, request);
    futures::pin_mut!(frames);
    while let Some(item) = frames.next().await {
        match item {
            Ok(frame) => on_value(Ok(frame.into_inner())),
            Err(e) => {
                on_value(Err(e.message()));
                return;
            }
        }
    }
}
