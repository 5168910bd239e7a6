//! Categorization errors. Any of these fails the whole batch.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CategorizationError {
    #[error("missing OpenAI API key; run: finanzas auth paste-openai-api-key or set OPENAI_API_KEY")]
    MissingApiKey,

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("categorization service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("categorization service returned an empty response")]
    EmptyResponse,

    #[error("malformed categorization response: {0}")]
    Malformed(String),

    #[error("expected {expected} suggestions, got {got}")]
    CountMismatch { expected: usize, got: usize },

    #[error("runtime error: {0}")]
    Runtime(String),
}

pub type Result<T> = std::result::Result<T, CategorizationError>;
