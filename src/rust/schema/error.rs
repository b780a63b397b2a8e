/// Startup failures while deriving the schema from the reference dataset.
///
/// Both are fatal: no record can be validated without a complete schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// The dataset could not be opened or read as CSV
    #[error("Reference dataset '{path}' is unavailable: {reason}")]
    DatasetUnavailable { path: String, reason: String },
    /// A required column is missing, empty, or holds unusable values
    #[error("Reference dataset column '{column}' is unusable: {reason}")]
    SchemaDegenerate { column: String, reason: String },
}

impl SchemaError {
    pub(crate) fn unavailable(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::DatasetUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn degenerate(column: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SchemaDegenerate {
            column: column.into(),
            reason: reason.into(),
        }
    }
}
