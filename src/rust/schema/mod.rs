//! Reference-dataset loading and the value domains derived from it.

mod dataset;
mod error;
mod profile;

pub use dataset::ReferenceDataset;
pub use error::SchemaError;
pub use profile::{
    NumericBounds, NumericSummary, SchemaProfile, AGE_BOUNDS, ESTIMATED_SALARY_BOUNDS,
};
