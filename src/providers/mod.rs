//! Completion service seam and provider implementations

pub mod openai;

use std::future::Future;

// Re-export for convenience
pub use openai::OpenAiClient;

/// Anything that turns an ordered message list into one text completion.
///
/// The generator only depends on this trait, so tests can swap in a fake.
pub trait CompletionService
{   fn complete(
      &self
    , request: &crate::request::CompletionRequest
    ) -> impl Future<Output = Result<String, crate::error::Error>> + Send;
}
