// Core error type. API errors pass through unchanged -- they are
// already normalized at the transport boundary and must be surfaced
// verbatim -- while configuration and input problems get their own
// variants.

use thiserror::Error;

use linkseal_api::ApiError;

#[derive(Debug, Error)]
pub enum CoreError {
    /// The input was neither a bare short code nor a `/l/{code}` URL.
    #[error("invalid link or short code: {input:?}")]
    InvalidShortCode { input: String },

    /// Normalized API failure, surfaced as-is.
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// The normalized API error, if this is one.
    pub fn api(&self) -> Option<&ApiError> {
        match self {
            Self::Api(err) => Some(err),
            _ => None,
        }
    }
}
