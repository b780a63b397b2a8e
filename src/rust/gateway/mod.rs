//! The boundary to the churn classifier.
//!
//! The core only needs [`InferenceGateway`]: one record in, one
//! [`ChurnLabel`] out. [`OnnxGateway`] is the bundled implementation.

use std::fmt;

use crate::record::CustomerProfile;

mod error;
pub mod onnx;

pub use error::GatewayError;
pub use onnx::{OnnxGateway, OnnxGatewayBuilder};

/// The binary churn outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChurnLabel {
    /// Class 0: the customer is expected to stay
    Retained,
    /// Class 1: the customer is expected to leave
    Churn,
}

impl ChurnLabel {
    pub fn from_class_id(id: i64) -> Option<Self> {
        match id {
            0 => Some(ChurnLabel::Retained),
            1 => Some(ChurnLabel::Churn),
            _ => None,
        }
    }

    pub fn class_id(self) -> i64 {
        match self {
            ChurnLabel::Retained => 0,
            ChurnLabel::Churn => 1,
        }
    }

    pub fn is_churn(self) -> bool {
        self == ChurnLabel::Churn
    }
}

impl fmt::Display for ChurnLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChurnLabel::Retained => f.write_str("not churn"),
            ChurnLabel::Churn => f.write_str("churn"),
        }
    }
}

/// A classifier that scores one customer record at a time.
///
/// Implementations must send the record's columns under the names and in the
/// order given by [`CustomerProfile::columns`], and report failures as
/// [`GatewayError`] without retrying.
pub trait InferenceGateway: Send + Sync {
    fn predict(&self, record: &CustomerProfile) -> Result<ChurnLabel, GatewayError>;
}

/// Decodes a classifier answer that must hold exactly one class id, 0 or 1.
pub fn single_label(class_ids: &[i64]) -> Result<ChurnLabel, GatewayError> {
    match class_ids {
        [id] => ChurnLabel::from_class_id(*id).ok_or_else(|| {
            GatewayError::SchemaMismatch(format!("Class id {} is not a binary churn label", id))
        }),
        ids => Err(GatewayError::SchemaMismatch(format!(
            "Expected exactly one label, got {}",
            ids.len()
        ))),
    }
}
