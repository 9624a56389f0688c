pub mod bing;

pub use bing::BingSpellClient;

use thiserror::Error;

/// Proposed spelling for a checked word, equal to the input when the word is
/// already spelled correctly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion(pub String);

#[derive(Debug, Error)]
pub enum SpellCheckError {
    /// The oracle answered with a non-success status.
    #[error("spell check request failed with status {status}: {message}")]
    RequestFailed { status: u16, message: String },

    /// The request never completed: connection failure or timeout.
    #[error("spell check transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The oracle answered success with a body that could not be decoded.
    #[error("malformed spell check response: {0}")]
    MalformedResponse(String),
}

/// External spelling oracle: one word in, one suggestion out.
///
/// Calls may block while awaiting a response, and must be safe to issue
/// concurrently from multiple workers. The client performs no retries of its
/// own; retry is the pipeline's decision.
pub trait SpellCheckClient: Send + Sync {
    fn check(&self, word: &str) -> Result<Suggestion, SpellCheckError>;
}
