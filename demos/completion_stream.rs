//! Stream a code completion from the API.
//!
//! Run with:
//! ```bash
//! export DOCLINE_API_ENDPOINT="http://127.0.0.1:8081"
//! export DOCLINE_ID_TOKEN="your-id-token"
//! RUST_LOG=docline=debug cargo run --example completion_stream -- "fizzbuzz in rust"
//! ```

use std::io::Write;
use std::sync::Arc;

use docline::client::ApiClient;
use docline::model::CompletionChunk;
use docline::options::{ClientOptions, SecretString};
use docline::repos::AiRepo;
use futures::StreamExt;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let token = std::env::var("DOCLINE_ID_TOKEN")?;
    let query = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "Write a function that reverses a string.".to_string());

    let client = ApiClient::new(ClientOptions::from_env()?, Arc::new(SecretString::new(token)))?;
    let ai = AiRepo::new(client);

    if !ai.health_check().await {
        eprintln!("API is offline");
        return Ok(());
    }

    let chunks = ai.stream_completion(&query)?;
    futures::pin_mut!(chunks);

    while let Some(chunk) = chunks.next().await {
        match chunk {
            Ok(CompletionChunk::Partial(partial)) => {
                print!("{}", partial.content);
                std::io::stdout().flush()?;
            }
            Ok(CompletionChunk::Final(fin)) => {
                let timings = &fin.usage.timings;
                println!("\n\n=== Usage ===");
                println!("Prompt tokens: {}", fin.usage.tokens_evaluated);
                println!("Predicted tokens: {}", fin.usage.tokens_predicted);
                println!("Tokens/sec: {:.1}", timings.predicted_per_second);
            }
            Err(e) => {
                eprintln!("\nError: {}", e.message());
                break;
            }
        }
    }

    Ok(())
}
