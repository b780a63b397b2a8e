use crate::schema::NumericBounds;

use super::attribute::Attribute;

/// Validation failures raised while assembling a feature record.
///
/// Every variant names the attribute involved and, where one exists, the
/// domain the value had to satisfy.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordError {
    /// No selection was supplied for the attribute
    #[error("Missing value for attribute '{0}'")]
    MissingAttribute(Attribute),
    /// A selection named something that is not a record attribute
    #[error("Unknown attribute '{0}'")]
    UnknownAttribute(String),
    /// The same attribute was selected twice
    #[error("Attribute '{0}' was supplied more than once")]
    DuplicateAttribute(Attribute),
    /// A numeric attribute received something that is not a usable number
    #[error("Value '{value}' for '{attribute}' is not a valid {expected}")]
    TypeMismatch {
        attribute: Attribute,
        value: String,
        expected: &'static str,
    },
    /// A categorical value outside the set seen in the reference data
    #[error("Value '{value}' for '{attribute}' is not one of [{}]", .allowed.join(", "))]
    OutOfDomain {
        attribute: Attribute,
        value: String,
        allowed: Vec<String>,
    },
    /// A numeric value outside the attribute's inclusive bounds
    #[error("Value {value} for '{attribute}' is outside {bounds}")]
    OutOfRange {
        attribute: Attribute,
        value: f64,
        bounds: NumericBounds,
    },
    /// A boolean choice other than the literal "Yes" or "No"
    #[error("Value '{value}' for '{attribute}' is not a valid choice (expected \"Yes\" or \"No\")")]
    InvalidBooleanEncoding { attribute: Attribute, value: String },
}

impl RecordError {
    /// The attribute the failure refers to, when it names a known one.
    pub fn attribute(&self) -> Option<Attribute> {
        match self {
            Self::MissingAttribute(attr) | Self::DuplicateAttribute(attr) => Some(*attr),
            Self::UnknownAttribute(_) => None,
            Self::TypeMismatch { attribute, .. }
            | Self::OutOfDomain { attribute, .. }
            | Self::OutOfRange { attribute, .. }
            | Self::InvalidBooleanEncoding { attribute, .. } => Some(*attribute),
        }
    }
}
