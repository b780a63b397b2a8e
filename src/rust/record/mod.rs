//! Feature-record assembly: raw selections in, validated [`CustomerProfile`] out.

mod attribute;
pub mod builder;
mod customer;
mod error;
mod raw;

pub use attribute::{Attribute, AttributeKind, ATTRIBUTE_COUNT, COLUMN_NAMES};
pub use builder::{build_record, FeatureRecordBuilder, NO, YES};
pub use customer::{CustomerProfile, FeatureValue};
pub use error::RecordError;
pub use raw::{RawSelections, RawValue};
