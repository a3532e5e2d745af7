/// Failure of a single call to the ledger backend
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response
    #[error("Network error: {0}")]
    Network(String),
    /// The backend answered with a non-success status
    #[error("Server error {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Rejected { status: u16, message: Option<String> },
    /// The response body was not what we expected
    #[error("Failed to parse response: {0}")]
    Decode(String),
    /// The request body could not be encoded
    #[error("Failed to serialize request: {0}")]
    Serialize(String),
}

impl ApiError {
    /// Message the backend attached to a rejected request, if any
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            ApiError::Rejected { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}
