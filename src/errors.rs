use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("No entity type registered for {0}")]
    ResolutionError(String),

    #[error("Document has no usable identifier: {0}")]
    MissingIdentifierError(String),

    #[error("Failed to convert field '{field}': {reason}")]
    SerializationError { field: String, reason: String },

    #[error("Failed to deliver message to queue: {0}")]
    DeliveryError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

impl SyncError {
    /// True for the failures raised while converting between documents and records.
    #[must_use]
    pub fn is_conversion_error(&self) -> bool {
        matches!(
            self,
            SyncError::ResolutionError(_)
                | SyncError::MissingIdentifierError(_)
                | SyncError::SerializationError { .. }
        )
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(error: serde_json::Error) -> Self {
        SyncError::SerializationError {
            field: "<payload>".to_string(),
            reason: error.to_string(),
        }
    }
}

// Generic implementation for AWS SDK errors
impl<E, R> From<aws_sdk_sqs::error::SdkError<E, R>> for SyncError
where
    E: std::error::Error + 'static,
    R: std::fmt::Debug,
{
    fn from(error: aws_sdk_sqs::error::SdkError<E, R>) -> Self {
        use aws_sdk_sqs::error::DisplayErrorContext;
        SyncError::DeliveryError(DisplayErrorContext(error).to_string())
    }
}
