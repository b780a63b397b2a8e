//! A churn-prediction pipeline for bank customers.
//!
//! A [`SchemaProfile`] is derived once from a reference dataset and fixes the
//! legal values of the ten customer attributes. [`FeatureRecordBuilder`] turns
//! raw user selections into a validated [`CustomerProfile`], and an
//! [`InferenceGateway`] (by default an ONNX model, see [`OnnxGateway`]) labels
//! that record as churn or not churn.
//!
//! # Basic Usage
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use churnscope::{Attribute, FeatureRecordBuilder, RawSelections, SchemaProfile};
//!
//! let schema = SchemaProfile::from_csv_path("data/churn_data.csv")?;
//!
//! let selections = RawSelections::new()
//!     .with(Attribute::CreditScore, 650)
//!     .with(Attribute::Geography, "Germany")
//!     .with(Attribute::Gender, "Female")
//!     .with(Attribute::Age, 40)
//!     .with(Attribute::Tenure, 5)
//!     .with(Attribute::Balance, 75000.0)
//!     .with(Attribute::NumOfProducts, 2)
//!     .with(Attribute::HasCreditCard, "Yes")
//!     .with(Attribute::IsActiveMember, "No")
//!     .with(Attribute::EstimatedSalary, 50000.0);
//!
//! let record = FeatureRecordBuilder::new(&schema).build(&selections)?;
//! println!("{}", record);
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! The schema is never mutated after construction, and [`ChurnPredictor`] can
//! be shared across threads using `Arc`:
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use churnscope::{ChurnPredictor, OnnxGateway, FormDefaults, RawSelections};
//! use std::sync::Arc;
//! use std::thread;
//!
//! let gateway = OnnxGateway::builder()
//!     .with_model_file("models/churn_model.onnx")?
//!     .build()?;
//! let predictor = Arc::new(ChurnPredictor::from_dataset(
//!     "data/churn_data.csv",
//!     Arc::new(gateway),
//! )?);
//! let defaults = FormDefaults::from_schema(predictor.schema());
//!
//! let mut handles = vec![];
//! for _ in 0..3 {
//!     let predictor = Arc::clone(&predictor);
//!     let selections = defaults.fill(RawSelections::new());
//!     handles.push(thread::spawn(move || {
//!         predictor.predict(&selections).unwrap();
//!     }));
//! }
//!
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//! # Ok(())
//! # }
//! ```

pub mod artifacts;
pub mod gateway;
pub mod pipeline;
pub mod presentation;
pub mod record;
mod runtime;
pub mod schema;

pub use artifacts::{ArtifactError, ArtifactManager};
pub use gateway::{ChurnLabel, GatewayError, InferenceGateway, OnnxGateway, OnnxGatewayBuilder};
pub use pipeline::{ChurnError, ChurnPredictor, Prediction};
pub use presentation::{describe_domain, render_record_csv, verdict_message, FormDefaults};
pub use record::{
    build_record, Attribute, CustomerProfile, FeatureRecordBuilder, RawSelections, RawValue,
    RecordError,
};
pub use runtime::{create_session_builder, RuntimeConfig};
pub use schema::{NumericBounds, ReferenceDataset, SchemaError, SchemaProfile};

pub fn init_logger() {
    env_logger::init();
}
