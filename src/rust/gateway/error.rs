use ort::Error as OrtError;

/// Failures reported by an inference service.
///
/// Neither is retried: an unavailable model needs operator action, and a
/// schema mismatch is a programming error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// The service cannot respond (model missing, corrupt, or failing to run)
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),
    /// The service rejected the shape of the record, or answered with
    /// something that is not a single binary label
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),
}

impl From<OrtError> for GatewayError {
    fn from(err: OrtError) -> Self {
        GatewayError::ModelUnavailable(err.to_string())
    }
}
