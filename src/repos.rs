//! Repositories for each area of the document-QA API.

pub mod ai;
pub mod auth;
pub mod document;
pub mod usage;

// Re-export for convenience
pub use ai::AiRepo;
pub use auth::AuthRepo;
pub use document::DocumentRepo;
pub use usage::UsageRepo;
