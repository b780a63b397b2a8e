use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;

use churnscope::{
    describe_domain, render_record_csv, verdict_message, ArtifactManager, Attribute,
    ChurnPredictor, FormDefaults, OnnxGateway, RawSelections, RawValue, RuntimeConfig,
    SchemaProfile,
};

#[derive(Parser)]
#[command(author, version, about = "Predict bank customer churn", long_about = None)]
struct Cli {
    /// Reference dataset CSV (defaults to $CHURNSCOPE_DATA or the artifact directory)
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the allowed values and suggested default of every attribute
    Profile,
    /// Validate a customer record without running the model
    Check(CustomerArgs),
    /// Validate a customer record and predict whether the customer churns
    Predict(PredictArgs),
}

/// Attribute values; any flag left out takes its suggested default.
#[derive(Args, Debug)]
struct CustomerArgs {
    #[arg(long)]
    credit_score: Option<String>,
    #[arg(long)]
    geography: Option<String>,
    #[arg(long)]
    gender: Option<String>,
    #[arg(long)]
    age: Option<String>,
    #[arg(long)]
    tenure: Option<String>,
    #[arg(long)]
    balance: Option<String>,
    #[arg(long)]
    num_of_products: Option<String>,
    /// "Yes" or "No"
    #[arg(long)]
    has_credit_card: Option<String>,
    /// "Yes" or "No"
    #[arg(long)]
    is_active_member: Option<String>,
    #[arg(long)]
    estimated_salary: Option<String>,
}

impl CustomerArgs {
    fn selections(&self) -> RawSelections {
        [
            (Attribute::CreditScore, &self.credit_score),
            (Attribute::Geography, &self.geography),
            (Attribute::Gender, &self.gender),
            (Attribute::Age, &self.age),
            (Attribute::Tenure, &self.tenure),
            (Attribute::Balance, &self.balance),
            (Attribute::NumOfProducts, &self.num_of_products),
            (Attribute::HasCreditCard, &self.has_credit_card),
            (Attribute::IsActiveMember, &self.is_active_member),
            (Attribute::EstimatedSalary, &self.estimated_salary),
        ]
        .into_iter()
        .filter_map(|(attr, value)| value.as_ref().map(|v| (attr, RawValue::Text(v.clone()))))
        .collect()
    }
}

#[derive(Args, Debug)]
struct PredictArgs {
    #[command(flatten)]
    customer: CustomerArgs,

    /// ONNX model (defaults to $CHURNSCOPE_MODEL or the artifact directory)
    #[arg(long)]
    model: Option<PathBuf>,

    /// Refuse to load the model unless its SHA-256 matches
    #[arg(long)]
    model_sha256: Option<String>,

    /// ONNX Runtime thread count (0 lets the runtime decide)
    #[arg(long, default_value_t = 0)]
    threads: usize,
}

fn load_schema(data: Option<PathBuf>, artifacts: &ArtifactManager) -> Result<SchemaProfile> {
    let path = data.unwrap_or_else(|| artifacts.dataset_path());
    info!("Loading reference dataset from {:?}", path);
    SchemaProfile::from_csv_path(&path)
        .with_context(|| format!("Cannot derive the schema from {}", path.display()))
}

fn print_profile(schema: &SchemaProfile) {
    let defaults = FormDefaults::from_schema(schema);
    println!("Reference rows: {}", schema.rows());
    for attr in Attribute::ALL {
        let default = defaults
            .get(attr)
            .map(ToString::to_string)
            .unwrap_or_default();
        println!("{:<16} {}  (default: {})", attr.display_name(), describe_domain(schema, attr), default);
    }
}

fn main() -> Result<()> {
    churnscope::init_logger();
    let cli = Cli::parse();
    let artifacts = ArtifactManager::new_default();

    let start_time = Instant::now();
    let schema = load_schema(cli.data, &artifacts)?;
    info!("Schema ready (took {:.2?})", start_time.elapsed());

    match cli.command {
        Command::Profile => print_profile(&schema),
        Command::Check(customer) => {
            let selections = FormDefaults::from_schema(&schema).fill(customer.selections());
            let record = churnscope::build_record(&selections, &schema)?;
            print!("{}", render_record_csv(&record)?);
        }
        Command::Predict(args) => {
            let model_path = args.model.unwrap_or_else(|| artifacts.model_path());
            let mut builder = OnnxGateway::builder()
                .with_runtime_config(RuntimeConfig::default().with_threads(args.threads))
                .with_model_file(&model_path)?;
            if let Some(hash) = args.model_sha256 {
                builder = builder.with_expected_sha256(hash);
            }
            let gateway = builder
                .build()
                .with_context(|| format!("Cannot load model {}", model_path.display()))?;

            let selections = FormDefaults::from_schema(&schema).fill(args.customer.selections());
            let predictor = ChurnPredictor::new(Arc::new(schema), Arc::new(gateway));
            let prediction = predictor.predict(&selections)?;

            print!("{}", render_record_csv(&prediction.record)?);
            println!("{}", verdict_message(prediction.label));
            info!("Prediction complete (took {:.2?})", start_time.elapsed());
        }
    }

    Ok(())
}
