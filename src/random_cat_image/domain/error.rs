use thiserror::Error;

pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch cat image from API";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("{0}")]
    FetchFailed(String),
}

impl FetchError {
    /// Wraps an underlying transport error under the standard message.
    pub fn transport(cause: impl std::fmt::Display) -> Self {
        FetchError::FetchFailed(format!("{}: {}", FETCH_FAILED_MESSAGE, cause))
    }
}
