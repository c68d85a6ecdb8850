use thiserror::Error;

/// The client's error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Input rejected locally, before any network call.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The identity service rejected the bearer token.
    #[error("Authentication expired")]
    Unauthorized,

    /// No response reached the identity service.
    #[error("Network error: {0}")]
    Network(String),

    /// The identity service answered but refused the request.
    #[error("Server error: {0}")]
    Server(String),

    /// The local credential store could not be read or written.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Another request of the same kind is still outstanding.
    #[error("A request is already in progress")]
    RequestInFlight,
}

/// A `Result` type that uses `AppError` as the error type.
pub type Result<T> = std::result::Result<T, AppError>;

/// Machine-distinguishable error kind, without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Unauthorized,
    Network,
    Server,
    Storage,
    RequestInFlight,
}

impl AppError {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Validation(_) => ErrorKind::Validation,
            AppError::Unauthorized => ErrorKind::Unauthorized,
            AppError::Network(_) => ErrorKind::Network,
            AppError::Server(_) => ErrorKind::Server,
            AppError::Storage(_) => ErrorKind::Storage,
            AppError::RequestInFlight => ErrorKind::RequestInFlight,
        }
    }

    /// Returns a message suitable for showing to the end user.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::Unauthorized => "Your session has expired. Please sign in again.".to_string(),
            AppError::Network(_) => {
                "Could not reach the server. Check your connection and try again.".to_string()
            }
            AppError::Server(msg) if msg.trim().is_empty() => {
                "The server rejected the request. Please try again later.".to_string()
            }
            AppError::Server(msg) => msg.clone(),
            AppError::Storage(_) => {
                "Local session data could not be saved. Please sign in again.".to_string()
            }
            AppError::RequestInFlight => "Please wait for the current request to finish.".to_string(),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            tracing::warn!("Malformed response body: {}", e);
            return AppError::Server("Malformed response from server".to_string());
        }
        if e.is_timeout() {
            tracing::warn!("Request timed out: {}", e);
            return AppError::Network("Request timed out".to_string());
        }
        tracing::warn!("Transport error: {}", e);
        AppError::Network(e.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        tracing::error!("Credential store I/O error: {}", e);
        AppError::Storage(e.to_string())
    }
}

impl From<sonic_rs::Error> for AppError {
    fn from(e: sonic_rs::Error) -> Self {
        tracing::error!("Credential record is not valid JSON: {}", e);
        AppError::Storage(format!("Corrupt credential record: {}", e))
    }
}
