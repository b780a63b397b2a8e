use std::io::Write;
use std::sync::Arc;

use churnscope::artifacts::sha256_file;
use churnscope::{
    build_record, ArtifactError, ArtifactManager, Attribute, ChurnLabel, ChurnPredictor,
    CustomerProfile, GatewayError, InferenceGateway, OnnxGateway, RawSelections, RuntimeConfig,
    SchemaProfile,
};
use env_logger::{Builder, Env};
use tempfile::{NamedTempFile, TempDir};

const SAMPLE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/churn_sample.csv");

// Answers 1 (churn) exactly when IsActiveMember is 0. Inputs are typed
// CreditScore f32, Geography/Gender string, Age/Tenure/HasCrCard/IsActiveMember
// i64, Balance f64, NumOfProducts i32, EstimatedSalary f32.
const RULE_MODEL: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/churn_rule.onnx");
// Same model with Gender declared before Geography
const SWAPPED_MODEL: &str =
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/churn_rule_swapped_inputs.onnx");
// Same model with the label cast to float
const FLOAT_LABEL_MODEL: &str =
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/churn_rule_float_label.onnx");
// Same model with Balance declared as a string tensor
const TEXT_BALANCE_MODEL: &str =
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/churn_rule_text_balance.onnx");

// Initialize test logger
fn init() {
    let _ = Builder::from_env(Env::default().default_filter_or("warn"))
        .is_test(true)
        .try_init();
}

fn load(path: &str) -> Result<OnnxGateway, GatewayError> {
    OnnxGateway::builder()
        .with_runtime_config(RuntimeConfig::default().with_threads(1))
        .with_model_file(path)?
        .build()
}

fn german_customer(active: &str) -> RawSelections {
    RawSelections::new()
        .with(Attribute::CreditScore, 650)
        .with(Attribute::Geography, "Germany")
        .with(Attribute::Gender, "Female")
        .with(Attribute::Age, 40)
        .with(Attribute::Tenure, 5)
        .with(Attribute::Balance, 75000.0)
        .with(Attribute::NumOfProducts, 2)
        .with(Attribute::HasCreditCard, "Yes")
        .with(Attribute::IsActiveMember, active)
        .with(Attribute::EstimatedSalary, 50000.0)
}

fn record(active: &str) -> CustomerProfile {
    let schema = SchemaProfile::from_csv_path(SAMPLE).unwrap();
    build_record(&german_customer(active), &schema).unwrap()
}

#[test]
fn test_rule_model_labels_records() -> Result<(), Box<dyn std::error::Error>> {
    init();
    let gateway = load(RULE_MODEL)?;
    assert!(gateway.model_path().ends_with("churn_rule.onnx"));

    assert_eq!(gateway.predict(&record("No"))?, ChurnLabel::Churn);
    assert_eq!(gateway.predict(&record("Yes"))?, ChurnLabel::Retained);
    Ok(())
}

#[test]
fn test_rule_model_behind_predictor() -> Result<(), Box<dyn std::error::Error>> {
    init();
    let hash = sha256_file(std::path::Path::new(RULE_MODEL))?;
    let gateway = OnnxGateway::builder()
        .with_model_file(RULE_MODEL)?
        .with_expected_sha256(hash)
        .build()?;
    let predictor = Arc::new(ChurnPredictor::from_dataset(SAMPLE, Arc::new(gateway))?);

    let handles: Vec<_> = ["No", "Yes", "No"]
        .into_iter()
        .map(|active| {
            let predictor = Arc::clone(&predictor);
            std::thread::spawn(move || predictor.predict(&german_customer(active)).unwrap().label)
        })
        .collect();
    let labels: Vec<ChurnLabel> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(labels, [ChurnLabel::Churn, ChurnLabel::Retained, ChurnLabel::Churn]);
    Ok(())
}

#[test]
fn test_inputs_out_of_column_order() {
    init();
    match load(SWAPPED_MODEL) {
        Err(GatewayError::SchemaMismatch(msg)) => {
            assert!(msg.contains("'Gender'"), "{}", msg);
            assert!(msg.contains("'Geography'"), "{}", msg);
        }
        other => panic!("expected SchemaMismatch, got {:?}", other),
    }
}

#[test]
fn test_float_label_output() {
    init();
    match load(FLOAT_LABEL_MODEL) {
        Err(GatewayError::SchemaMismatch(msg)) => assert!(msg.contains("int64"), "{}", msg),
        other => panic!("expected SchemaMismatch, got {:?}", other),
    }
}

#[test]
fn test_incompatible_input_type() {
    init();
    match load(TEXT_BALANCE_MODEL) {
        Err(GatewayError::SchemaMismatch(msg)) => assert!(msg.contains("'Balance'"), "{}", msg),
        other => panic!("expected SchemaMismatch, got {:?}", other),
    }
}

fn file_with(contents: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents).unwrap();
    file
}

#[test]
fn test_missing_model_file() {
    let result = OnnxGateway::builder().with_model_file("/nonexistent/churn_model.onnx");
    match result {
        Err(GatewayError::ModelUnavailable(msg)) => assert!(msg.contains("not found")),
        other => panic!("expected ModelUnavailable, got {:?}", other),
    }
}

#[test]
fn test_model_path_set_twice() {
    let file = file_with(b"first");
    let result = OnnxGateway::builder()
        .with_model_file(file.path())
        .unwrap()
        .with_model_file(file.path());
    assert!(matches!(result, Err(GatewayError::ModelUnavailable(_))));
}

#[test]
fn test_checksum_mismatch_blocks_loading() {
    let file = file_with(b"not the model you are looking for");
    let result = OnnxGateway::builder()
        .with_model_file(file.path())
        .unwrap()
        .with_expected_sha256("0000000000000000000000000000000000000000000000000000000000000000")
        .build();
    match result {
        Err(GatewayError::ModelUnavailable(msg)) => assert!(msg.contains("Hash mismatch")),
        other => panic!("expected ModelUnavailable, got {:?}", other),
    }
}

#[test]
fn test_garbage_model_is_unavailable() {
    let file = file_with(b"definitely not protobuf");
    let hash = sha256_file(file.path()).unwrap();
    let result = OnnxGateway::builder()
        .with_runtime_config(RuntimeConfig::default().with_threads(1))
        .with_model_file(file.path())
        .unwrap()
        .with_expected_sha256(hash)
        .build();
    assert!(matches!(result, Err(GatewayError::ModelUnavailable(_))));
}

#[test]
fn test_artifact_layout() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    let manager = ArtifactManager::new(home.path());

    assert_eq!(manager.home_dir(), home.path());
    assert!(manager.model_path().ends_with("churn_model.onnx"));
    assert!(manager.dataset_path().ends_with("churn_data.csv"));
    Ok(())
}

#[test]
fn test_checksum_verification() -> Result<(), Box<dyn std::error::Error>> {
    let file = file_with(b"abc");
    let manager = ArtifactManager::new(std::env::temp_dir());
    let abc = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

    manager.ensure_checksum(file.path(), abc, "model")?;
    manager.ensure_checksum(file.path(), &abc.to_uppercase(), "model")?;

    let err = manager
        .ensure_checksum(file.path(), &abc.replace('b', "c"), "model")
        .unwrap_err();
    assert!(matches!(err, ArtifactError::HashMismatch { .. }));
    Ok(())
}
