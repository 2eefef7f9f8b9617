use thiserror::Error;

/// Main error type for the employee proxy
#[derive(Debug, Error)]
pub enum EngineError {
    /// Invalid request parameters or body
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Request body over the configured size limit
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// Document does not exist in the engine
    #[error("Employee {0} not found")]
    NotFound(i64),

    /// Outbound call or request deadline exceeded
    #[error("Request timeout")]
    Timeout,

    /// Connection or body read failure talking to the engine
    #[error("Transport error: {0}")]
    Transport(String),

    /// The engine answered with a non-success status
    #[error("Engine error ({status}): {reason}")]
    Engine { status: u16, reason: String },

    /// Bulk seeding stopped at the given identifier
    #[error("Seeding failed at id {id}: {source}")]
    Seeding {
        id: i64,
        #[source]
        source: Box<EngineError>,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl EngineError {
    /// Check if error was produced by the engine itself rather than the network
    pub fn is_engine_error(&self) -> bool {
        matches!(self, EngineError::Engine { .. })
    }

    /// Check if error is a transport or timeout failure
    pub fn is_transport_error(&self) -> bool {
        matches!(self, EngineError::Transport(_) | EngineError::Timeout)
    }

    /// Get HTTP status code for the error
    pub fn status_code(&self) -> u16 {
        match self {
            EngineError::InvalidRequest(_) => 400,
            EngineError::PayloadTooLarge(_) => 413,
            EngineError::NotFound(_) => 404,
            EngineError::Timeout => 504,
            EngineError::Transport(_) => 500,
            EngineError::Engine { .. } => 500,
            EngineError::Seeding { source, .. } => source.status_code(),
            EngineError::ConfigError(_) => 500,
            EngineError::IoError(_) => 500,
            EngineError::SerializationError(_) => 500,
            EngineError::Internal(_) => 500,
        }
    }

    /// Get error type as string for logging
    pub fn error_type(&self) -> &'static str {
        match self {
            EngineError::InvalidRequest(_) => "invalid_request",
            EngineError::PayloadTooLarge(_) => "payload_too_large",
            EngineError::NotFound(_) => "not_found",
            EngineError::Timeout => "timeout",
            EngineError::Transport(_) => "transport_error",
            EngineError::Engine { .. } => "engine_error",
            EngineError::Seeding { .. } => "seeding_error",
            EngineError::ConfigError(_) => "config_error",
            EngineError::IoError(_) => "io_error",
            EngineError::SerializationError(_) => "serialization_error",
            EngineError::Internal(_) => "internal_error",
        }
    }
}

impl From<reqwest::Error> for EngineError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            EngineError::Timeout
        } else {
            EngineError::Transport(err.to_string())
        }
    }
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Validation error for inbound request parameters
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("missing query parameter '{0}'")]
    MissingParam(&'static str),

    #[error("query parameter 'id' must be an integer, got '{0}'")]
    InvalidId(String),

    #[error("invalid employee body: {0}")]
    InvalidBody(String),

    #[error("invalid query string: {0}")]
    InvalidQuery(String),
}

impl From<ValidationError> for EngineError {
    fn from(err: ValidationError) -> Self {
        EngineError::InvalidRequest(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(EngineError::InvalidRequest("x".to_string()).status_code(), 400);
        assert_eq!(EngineError::PayloadTooLarge("limit".to_string()).status_code(), 413);
        assert_eq!(EngineError::NotFound(3).status_code(), 404);
        assert_eq!(EngineError::Timeout.status_code(), 504);
        assert_eq!(EngineError::Transport("refused".to_string()).status_code(), 500);
        assert_eq!(
            EngineError::Engine { status: 400, reason: "bad query".to_string() }.status_code(),
            500
        );
    }

    #[test]
    fn test_seeding_error_reports_id() {
        let err = EngineError::Seeding {
            id: 6,
            source: Box::new(EngineError::Timeout),
        };
        assert!(err.to_string().contains("id 6"));
        assert_eq!(err.status_code(), 504);
        assert_eq!(err.error_type(), "seeding_error");
    }

    #[test]
    fn test_validation_error_maps_to_invalid_request() {
        let err: EngineError = ValidationError::InvalidId("abc".to_string()).into();
        assert_eq!(err.status_code(), 400);
        assert!(err.to_string().contains("abc"));
    }
}
