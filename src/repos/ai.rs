//! Question answering, code completion and health probing.

use futures::stream::{Stream, StreamExt};
use itertools::Itertools;
use nonempty::NonEmpty;
use serde::Serialize;
use tracing::{debug, error, instrument};

use crate::client::{ApiClient, ClientError};
use crate::model::{Answer, CompletionChunk};
use crate::stream::{frame_stream, stop_after_error, StreamRequest};

const SIMPLE_EXTRACT: &str = "/ai/simple_extract";
const COMPLETION_STREAM: &str = "/code/completion_stream";
const HEALTH: &str = "/healthz";

#[derive(Serialize)]
struct SimpleExtract<'a> {
    question: &'a str,
    documents: &'a NonEmpty<String>,
}

#[derive(Serialize)]
struct CompletionQuery<'a> {
    query: &'a str,
}

/// Client for the AI endpoints.
#[derive(Debug, Clone)]
pub struct AiRepo {
    client: ApiClient,
}

impl AiRepo {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Answer `question` from the given documents.
    #[instrument(skip(self, documents), fields(documents = %documents.iter().join(",")))]
    pub async fn simple_extract(
        &self,
        question: &str,
        documents: &NonEmpty<String>,
    ) -> Result<Answer, ClientError> {
        let body = SimpleExtract {
            question,
            documents,
        };
        self.client.post_json(SIMPLE_EXTRACT, &body).await
    }

    /// Probe the API. Any failure, including a timeout, reads as offline.
    pub async fn health_check(&self) -> bool {
        let req = self
            .client
            .request(reqwest::Method::GET, HEALTH)
            .timeout(self.client.options().health_timeout);

        match req.send().await.and_then(|r| r.error_for_status()) {
            Ok(_) => true,
            Err(e) => {
                error!("health check failed: {}", e);
                false
            }
        }
    }

    /// Stream a code completion for `query`.
    ///
    /// Fails up front with `ClientError::Unauthenticated` when there is no
    /// token. Afterwards every failure, including a frame that is not valid
    /// completion JSON, arrives as the last item of the stream.
    pub fn stream_completion(
        &self,
        query: &str,
    ) -> Result<impl Stream<Item = Result<CompletionChunk, ClientError>> + Send + 'static, ClientError>
    {
        let token = self.client.token().ok_or(ClientError::Unauthenticated)?;
        let request = StreamRequest::new(
            self.client.url(COMPLETION_STREAM),
            &CompletionQuery { query },
            token,
        )?
        .with_extra_headers(self.client.options().extra_headers.clone());
        debug!(endpoint = %request.endpoint(), "opening completion stream");

        let chunks = frame_stream(self.client.http(), request)
            .map(|frame| frame.and_then(|frame| CompletionChunk::from_frame(frame.as_str())));
        Ok(stop_after_error(chunks))
    }
}
