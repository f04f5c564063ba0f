use futures::StreamExt;
use tracing::debug;

use crate::model::{CompletionChunk, LlmFinalContent};
use crate::repos::AiRepo;
use crate::store::Loadable;

/// Text streamed so far, plus the closing record once it arrives.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionState {
    pub stream: String,
    pub fin: Option<LlmFinalContent>,
}

/// State behind the code-completion page.
#[derive(Debug)]
pub struct CompletionStore {
    repo: AiRepo,
    pub content: Loadable<CompletionState>,
    streaming: bool,
}

impl CompletionStore {
    pub fn new(repo: AiRepo) -> Self {
        Self {
            repo,
            content: Loadable::default(),
            streaming: false,
        }
    }

    /// Whether a completion stream is currently open.
    pub fn streaming(&self) -> bool {
        self.streaming
    }

    /// Stream a completion for `query` into `content`.
    ///
    /// Partial chunks are appended to `stream`. The final chunk replaces it
    /// with the server's full text. A failure moves `content` to the error
    /// state and keeps whatever text had arrived.
    pub async fn send_prompt(&mut self, query: &str) {
        self.content.set_loading();

        let chunks = match self.repo.stream_completion(query) {
            Ok(chunks) => chunks,
            Err(e) => {
                self.content.set_error(e.message());
                return;
            }
        };

        self.streaming = true;
        self.content.set_value(CompletionState::default());
        futures::pin_mut!(chunks);

        while let Some(chunk) = chunks.next().await {
            match chunk {
                Ok(CompletionChunk::Partial(partial)) => {
                    let mut state = self.content.value().clone();
                    state.stream.push_str(&partial.content);
                    self.content.set_value(state);
                }
                Ok(CompletionChunk::Final(fin)) => {
                    debug!(
                        tokens_predicted = fin.usage.tokens_predicted,
                        "completion finished"
                    );
                    self.content.set_value(CompletionState {
                        stream: fin.final_content.clone(),
                        fin: Some(fin),
                    });
                }
                Err(e) => {
                    self.content.set_error(e.message());
                }
            }
        }

        self.streaming = false;
    }
}
