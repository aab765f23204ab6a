use thiserror::Error;

/// Failures talking to the marketplace backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("network error: {message}")]
    Network { message: String },
    #[error("request already exists: {message}")]
    Duplicate { message: String },
    #[error("not found")]
    NotFound,
    #[error("unauthorized")]
    Unauthorized,
    #[error("session expired")]
    SessionExpired,
    #[error("backend returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("could not decode response: {message}")]
    Decode { message: String },
    #[error("unsupported operation: {operation}")]
    Unsupported { operation: String },
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("storage backend error: {message}")]
    Backend { message: String },
    #[error("cached value under {key} is not valid json: {message}")]
    Decode { key: String, message: String },
    #[error("json encode failed: {message}")]
    Encode { message: String },
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error(transparent)]
    Id(#[from] crate::types::IdError),
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}
