use thiserror::Error;

/// Configuration problems detected before any network call is made.
/// These surface verbatim to the user and are never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no LLM provider selected")]
    NoProvider,

    #[error("{provider} API key is required")]
    MissingApiKey { provider: &'static str },
}

/// Failure modes of comment generation. Everything bubbles unmodified to
/// the calling surface, which alone decides how to display it.
#[derive(Error, Debug)]
pub enum CommentError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Non-success HTTP response or malformed response body, with the
    /// provider's own error message when one could be parsed out.
    #[error("{provider} API error: {message}")]
    Provider {
        provider: &'static str,
        message: String,
    },

    /// Network-level failure (DNS, connection reset), propagated unchanged.
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
}
