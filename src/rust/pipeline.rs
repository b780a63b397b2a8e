use std::fmt;
use std::path::Path;
use std::sync::Arc;

use log::{debug, info, warn};

use crate::artifacts::ArtifactError;
use crate::gateway::{ChurnLabel, GatewayError, InferenceGateway};
use crate::record::{CustomerProfile, FeatureRecordBuilder, RawSelections, RecordError};
use crate::schema::{SchemaError, SchemaProfile};

/// Any failure along the churn pipeline.
///
/// Each variant keeps the concrete error so callers can still match on it.
#[derive(Debug, thiserror::Error)]
pub enum ChurnError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Record(#[from] RecordError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

/// The outcome of one request: the record that was scored and its label.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub record: CustomerProfile,
    pub label: ChurnLabel,
}

/// Runs record assembly and inference for one customer at a time.
///
/// The schema is fixed at construction; a `ChurnPredictor` can be shared
/// across threads behind an `Arc`.
///
/// # Example
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use std::sync::Arc;
/// use churnscope::{ChurnPredictor, OnnxGateway, RawSelections, SchemaProfile};
///
/// let schema = SchemaProfile::from_csv_path("data/churn_data.csv")?;
/// let gateway = OnnxGateway::builder()
///     .with_model_file("models/churn_model.onnx")?
///     .build()?;
/// let predictor = ChurnPredictor::new(Arc::new(schema), Arc::new(gateway));
///
/// let selections = RawSelections::from_pairs([
///     ("CreditScore", "650"),
///     ("Geography", "Germany"),
///     ("Gender", "Female"),
///     ("Age", "40"),
///     ("Tenure", "5"),
///     ("Balance", "75000"),
///     ("NumOfProducts", "2"),
///     ("HasCreditCard", "Yes"),
///     ("IsActiveMember", "No"),
///     ("EstimatedSalary", "50000"),
/// ])?;
/// let prediction = predictor.predict(&selections)?;
/// println!("{}", prediction.label);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ChurnPredictor {
    schema: Arc<SchemaProfile>,
    gateway: Arc<dyn InferenceGateway>,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<ChurnPredictor>();
        assert_send_sync::<Prediction>();
    }
};

impl ChurnPredictor {
    pub fn new(schema: Arc<SchemaProfile>, gateway: Arc<dyn InferenceGateway>) -> Self {
        Self { schema, gateway }
    }

    /// Derives the schema from the dataset at `path`, failing before any
    /// request can run if the dataset is absent or degenerate.
    pub fn from_dataset(
        path: impl AsRef<Path>,
        gateway: Arc<dyn InferenceGateway>,
    ) -> Result<Self, ChurnError> {
        let schema = SchemaProfile::from_csv_path(path)?;
        info!("Predictor ready ({} reference rows)", schema.rows());
        Ok(Self::new(Arc::new(schema), gateway))
    }

    pub fn schema(&self) -> &SchemaProfile {
        &self.schema
    }

    /// Validates the selections into a record without scoring it.
    pub fn assemble(&self, selections: &RawSelections) -> Result<CustomerProfile, RecordError> {
        FeatureRecordBuilder::new(&self.schema).build(selections)
    }

    /// Builds the record and asks the gateway for its label.
    pub fn predict(&self, selections: &RawSelections) -> Result<Prediction, ChurnError> {
        let record = self.assemble(selections).map_err(|e| {
            match e.attribute() {
                Some(attribute) => debug!("Rejected selection for {}: {}", attribute, e),
                None => debug!("Rejected selections: {}", e),
            }
            e
        })?;
        let label = self.predict_record(&record)?;
        Ok(Prediction { record, label })
    }

    /// Scores an already validated record.
    pub fn predict_record(&self, record: &CustomerProfile) -> Result<ChurnLabel, GatewayError> {
        let label = self.gateway.predict(record).map_err(|e| {
            warn!("Inference failed: {}", e);
            e
        })?;
        debug!("Predicted {} for {}", label, record);
        Ok(label)
    }
}

impl fmt::Debug for ChurnPredictor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChurnPredictor")
            .field("schema_rows", &self.schema.rows())
            .finish_non_exhaustive()
    }
}
