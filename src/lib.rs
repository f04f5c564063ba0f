//! # docline - document-QA API client
//!
//! A small async client for a document retrieval and question-answering API
//! whose users sign in through a messaging-platform identity provider.
//!
//! ## Features
//! - Async-first, tokio compatible
//! - Server-Sent Events streaming as a `futures::Stream`
//! - Typed repositories for documents, answers, usage history and auth
//! - View-agnostic state containers ("stores") built on [`store::Loadable`]
//!
//! ## Architecture
//!
//! - **`stream`**: the stream reader. Posts a JSON payload and yields each
//!   `data:` frame of the event-stream response, ending with at most one error.
//! - **`repos`**: one repository per API area, sharing an [`ApiClient`].
//! - **`auth`**: the identity-provider seam and the ID-token expiry policy.
//! - **`store`**: state for views, driven by the repositories.
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use futures::StreamExt;
//! use docline::client::ApiClient;
//! use docline::model::CompletionChunk;
//! use docline::options::{ClientOptions, SecretString};
//! use docline::repos::AiRepo;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let options = ClientOptions::new("http://127.0.0.1:8081");
//!     let client = ApiClient::new(options, Arc::new(SecretString::from("id-token")))?;
//!     let ai = AiRepo::new(client);
//!
//!     let chunks = ai.stream_completion("fizzbuzz in rust")?;
//!     futures::pin_mut!(chunks);
//!     while let Some(chunk) = chunks.next().await {
//!         match chunk? {
//!             CompletionChunk::Partial(p) => print!("{}", p.content),
//!             CompletionChunk::Final(f) => println!("\n{:?}", f.usage),
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod http;
pub mod model;
pub mod options;
pub mod repos;
pub mod sse;
pub mod store;
pub mod stream;

// Re-exports for convenience
pub use client::{ApiClient, ClientError};
pub use model::CompletionChunk;
pub use stream::{frame_stream, read_frames, Frame, StreamRequest};
