use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, error, info};
use ndarray::{Array2, ArrayD};
use ort::session::Session;
use ort::tensor::TensorElementType;
use ort::value::{DynValue, Tensor, ValueType};

use super::{single_label, ChurnLabel, GatewayError, InferenceGateway};
use crate::artifacts::ArtifactManager;
use crate::record::{Attribute, AttributeKind, CustomerProfile, FeatureValue, ATTRIBUTE_COUNT, COLUMN_NAMES};
use crate::runtime::{create_session_builder, RuntimeConfig};

/// Preferred name of the output holding the predicted class ids.
pub const LABEL_OUTPUT: &str = "label";

/// Element type the model declares for one input column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnEncoding {
    Float32,
    Float64,
    Int64,
    Int32,
    Utf8,
}

impl ColumnEncoding {
    /// The encoding for `attribute` given the model's declared element type,
    /// or `None` if that type cannot carry the attribute's values.
    fn for_input(attribute: Attribute, ty: TensorElementType) -> Option<Self> {
        let encoding = match ty {
            TensorElementType::Float32 => ColumnEncoding::Float32,
            TensorElementType::Float64 => ColumnEncoding::Float64,
            TensorElementType::Int64 => ColumnEncoding::Int64,
            TensorElementType::Int32 => ColumnEncoding::Int32,
            TensorElementType::String => ColumnEncoding::Utf8,
            _ => return None,
        };
        let compatible = match attribute.kind() {
            AttributeKind::Categorical => encoding == ColumnEncoding::Utf8,
            AttributeKind::BoundedFloat => {
                matches!(encoding, ColumnEncoding::Float32 | ColumnEncoding::Float64)
            }
            AttributeKind::IntegerCategorical | AttributeKind::BoundedInteger | AttributeKind::Boolean => {
                encoding != ColumnEncoding::Utf8
            }
        };
        compatible.then_some(encoding)
    }
}

/// A `[1, 1]` array holding one value.
fn cell<T: Clone>(value: T) -> ArrayD<T> {
    Array2::from_elem((1, 1), value).into_dyn()
}

/// Builds the `[1, 1]` input tensor for one column of the record.
fn column_tensor(
    encoding: ColumnEncoding,
    attribute: Attribute,
    value: FeatureValue<'_>,
) -> Result<DynValue, GatewayError> {
    let mismatch = || {
        GatewayError::SchemaMismatch(format!(
            "Value {} of '{}' cannot be encoded as {:?}",
            value,
            attribute.column_name(),
            encoding
        ))
    };

    let created = match (encoding, value) {
        (ColumnEncoding::Utf8, FeatureValue::Text(text)) => {
            let array = cell(text.to_string());
            Tensor::from_string_array(&array.as_standard_layout()).map(|t| t.into_dyn())
        }
        (ColumnEncoding::Utf8, _) | (_, FeatureValue::Text(_)) => return Err(mismatch()),
        (ColumnEncoding::Float32, number) => {
            let array = cell(number.as_f64().ok_or_else(mismatch)? as f32);
            Tensor::from_array(&array.as_standard_layout()).map(|t| t.into_dyn())
        }
        (ColumnEncoding::Float64, number) => {
            let array = cell(number.as_f64().ok_or_else(mismatch)?);
            Tensor::from_array(&array.as_standard_layout()).map(|t| t.into_dyn())
        }
        (ColumnEncoding::Int64, FeatureValue::Integer(v)) => {
            let array = cell(v);
            Tensor::from_array(&array.as_standard_layout()).map(|t| t.into_dyn())
        }
        (ColumnEncoding::Int32, FeatureValue::Integer(v)) => {
            let array = cell(i32::try_from(v).map_err(|_| mismatch())?);
            Tensor::from_array(&array.as_standard_layout()).map(|t| t.into_dyn())
        }
        (ColumnEncoding::Int64 | ColumnEncoding::Int32, FeatureValue::Float(_)) => return Err(mismatch()),
    };

    created.map_err(|e| {
        GatewayError::ModelUnavailable(format!(
            "Failed to create input tensor for '{}': {}",
            attribute.column_name(),
            e
        ))
    })
}

/// A builder for an [`OnnxGateway`].
///
/// # Example
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use churnscope::{OnnxGateway, RuntimeConfig};
///
/// let gateway = OnnxGateway::builder()
///     .with_runtime_config(RuntimeConfig::default().with_threads(1))
///     .with_model_file("models/churn_model.onnx")?
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct OnnxGatewayBuilder {
    model_path: Option<PathBuf>,
    expected_sha256: Option<String>,
    runtime_config: RuntimeConfig,
}

impl OnnxGatewayBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the runtime configuration for ONNX model execution
    pub fn with_runtime_config(mut self, config: RuntimeConfig) -> Self {
        self.runtime_config = config;
        self
    }

    /// Sets the ONNX model file to load
    ///
    /// # Returns
    /// * `Result<Self, GatewayError>` - The builder, or `ModelUnavailable` if:
    ///   - The path is empty
    ///   - A model path is already set
    ///   - The file does not exist
    pub fn with_model_file(mut self, path: impl AsRef<Path>) -> Result<Self, GatewayError> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(GatewayError::ModelUnavailable("Model path cannot be empty".to_string()));
        }
        if self.model_path.is_some() {
            return Err(GatewayError::ModelUnavailable("Model path already set".to_string()));
        }
        if !path.exists() {
            return Err(GatewayError::ModelUnavailable(format!(
                "Model file not found: {}",
                path.display()
            )));
        }
        self.model_path = Some(path.to_path_buf());
        Ok(self)
    }

    /// Requires the model file to have this SHA-256 (hex) before it is loaded
    pub fn with_expected_sha256(mut self, hash: impl Into<String>) -> Self {
        self.expected_sha256 = Some(hash.into());
        self
    }

    /// Loads the model and checks that its inputs match the record columns
    ///
    /// # Returns
    /// * `ModelUnavailable` if no model path is set, the checksum does not
    ///   match, or ONNX Runtime cannot load the file
    /// * `SchemaMismatch` if the graph inputs are not the record columns, in
    ///   record order, with compatible element types, or if the label output
    ///   is not an int64 tensor
    pub fn build(self) -> Result<OnnxGateway, GatewayError> {
        let model_path = self
            .model_path
            .ok_or_else(|| GatewayError::ModelUnavailable("Model path must be set".to_string()))?;

        if let Some(expected) = &self.expected_sha256 {
            ArtifactManager::new(model_path.parent().unwrap_or(Path::new(".")))
                .ensure_checksum(&model_path, expected, "model")
                .map_err(|e| GatewayError::ModelUnavailable(e.to_string()))?;
        }

        let session = create_session_builder(&self.runtime_config)?
            .commit_from_file(&model_path)
            .map_err(|e| {
                error!("Failed to load model {:?}: {}", model_path, e);
                GatewayError::ModelUnavailable(format!("Failed to load model: {}", e))
            })?;

        let (encodings, label_output) = OnnxGateway::validate_model(&session)?;
        info!("Model {:?} loaded and validated", model_path);

        Ok(OnnxGateway {
            model_path,
            session: Arc::new(session),
            encodings,
            label_output,
        })
    }
}

/// [`InferenceGateway`] backed by an ONNX model run through ONNX Runtime.
///
/// The model takes one `[1, 1]` input per record column, named and ordered as
/// the columns are; Geography and Gender are string tensors, the rest numeric.
/// It answers with an int64 class-id tensor named `label` (or its first
/// output). This is the layout a scikit-learn pipeline exported to ONNX uses.
#[derive(Debug)]
pub struct OnnxGateway {
    model_path: PathBuf,
    session: Arc<Session>,
    encodings: [ColumnEncoding; ATTRIBUTE_COUNT],
    label_output: usize,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<OnnxGateway>();
    }
};

impl OnnxGateway {
    /// Creates an OnnxGatewayBuilder for fluent construction
    pub fn builder() -> OnnxGatewayBuilder {
        OnnxGatewayBuilder::new()
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    fn validate_model(
        session: &Session,
    ) -> Result<([ColumnEncoding; ATTRIBUTE_COUNT], usize), GatewayError> {
        let inputs = &session.inputs;
        if inputs.len() != ATTRIBUTE_COUNT {
            return Err(GatewayError::SchemaMismatch(format!(
                "Model declares {} inputs, expected {} ({})",
                inputs.len(),
                ATTRIBUTE_COUNT,
                COLUMN_NAMES.join(", ")
            )));
        }

        let mut encodings = [ColumnEncoding::Float32; ATTRIBUTE_COUNT];
        for (position, (attr, input)) in Attribute::ALL.iter().zip(inputs).enumerate() {
            if input.name != attr.column_name() {
                return Err(GatewayError::SchemaMismatch(format!(
                    "Model input {} is '{}', expected '{}'",
                    position,
                    input.name,
                    attr.column_name()
                )));
            }
            let ty = match &input.input_type {
                ValueType::Tensor { ty, .. } => *ty,
                other => {
                    return Err(GatewayError::SchemaMismatch(format!(
                        "Model input '{}' is not a tensor: {:?}",
                        input.name, other
                    )))
                }
            };
            encodings[position] = ColumnEncoding::for_input(*attr, ty).ok_or_else(|| {
                GatewayError::SchemaMismatch(format!(
                    "Model input '{}' has element type {:?}, which cannot carry its values",
                    input.name, ty
                ))
            })?;
        }

        let outputs = &session.outputs;
        if outputs.is_empty() {
            return Err(GatewayError::SchemaMismatch(
                "Model must have at least 1 output for the label".to_string(),
            ));
        }
        let label_output = outputs
            .iter()
            .position(|output| output.name == LABEL_OUTPUT)
            .unwrap_or(0);
        match &outputs[label_output].output_type {
            ValueType::Tensor {
                ty: TensorElementType::Int64,
                ..
            } => {}
            other => {
                return Err(GatewayError::SchemaMismatch(format!(
                    "Label output '{}' must be an int64 tensor, found {:?}",
                    outputs[label_output].name, other
                )))
            }
        }

        Ok((encodings, label_output))
    }
}

impl InferenceGateway for OnnxGateway {
    fn predict(&self, record: &CustomerProfile) -> Result<ChurnLabel, GatewayError> {
        let mut inputs = HashMap::with_capacity(ATTRIBUTE_COUNT);
        for (position, (name, value)) in record.columns().into_iter().enumerate() {
            let attr = Attribute::ALL[position];
            inputs.insert(name, column_tensor(self.encodings[position], attr, value)?);
        }

        let outputs = self.session.run(inputs).map_err(|e| {
            error!("Model run failed: {}", e);
            GatewayError::ModelUnavailable(format!("Failed to run model: {}", e))
        })?;
        let labels = outputs[self.label_output]
            .try_extract_tensor::<i64>()
            .map_err(|e| GatewayError::SchemaMismatch(format!("Failed to extract label tensor: {}", e)))?;
        let class_ids: Vec<i64> = labels.iter().copied().collect();

        let label = single_label(&class_ids)?;
        debug!("Model answered {:?} for {}", class_ids, record);
        Ok(label)
    }
}
