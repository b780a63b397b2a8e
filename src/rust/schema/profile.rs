use std::collections::BTreeSet;
use std::fmt;
use std::io::Read;
use std::path::Path;

use log::info;

use super::dataset::{DatasetCell, ReferenceDataset};
use super::error::SchemaError;
use crate::record::Attribute;

/// Inclusive numeric bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericBounds {
    pub min: f64,
    pub max: f64,
}

impl NumericBounds {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

impl fmt::Display for NumericBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

/// Fixed bounds for Age, independent of the reference data.
pub const AGE_BOUNDS: NumericBounds = NumericBounds::new(18.0, 100.0);
/// Fixed bounds for EstimatedSalary, independent of the reference data.
pub const ESTIMATED_SALARY_BOUNDS: NumericBounds = NumericBounds::new(0.0, 200_000.0);

/// Bounds of a numeric attribute plus the reference mean, used to suggest
/// default values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericSummary {
    pub bounds: NumericBounds,
    pub mean: f64,
}

/// The legal value space of every record attribute, captured once from a
/// reference dataset.
///
/// A `SchemaProfile` has no mutating methods. Build it at startup and share it
/// (by reference or through `Arc`) with every request.
///
/// # Example
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use churnscope::SchemaProfile;
///
/// let schema = SchemaProfile::from_csv_path("data/churn_data.csv")?;
/// println!("Geographies: {:?}", schema.geography());
/// println!("Credit score range: {}", schema.credit_score().bounds);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaProfile {
    rows: usize,
    credit_score: NumericSummary,
    geography: Vec<String>,
    gender: Vec<String>,
    age: NumericSummary,
    tenure: Vec<i64>,
    balance: NumericSummary,
    num_of_products: Vec<i64>,
    estimated_salary: NumericSummary,
}

// Shared across request threads without locking.
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<SchemaProfile>();
    }
};

impl SchemaProfile {
    /// Derives the schema from a loaded dataset.
    ///
    /// # Errors
    /// `SchemaDegenerate` if any required column has no values, holds a
    /// non-numeric value where a number is required, or a flag column holds
    /// something other than 0/1.
    pub fn build(dataset: &ReferenceDataset) -> Result<Self, SchemaError> {
        let credit_score = summarize(&as_floats(&integer_column(dataset, Attribute::CreditScore)?));
        let geography = distinct_text(dataset, Attribute::Geography)?;
        let gender = distinct_text(dataset, Attribute::Gender)?;

        let ages = integer_column(dataset, Attribute::Age)?;
        let age = NumericSummary {
            bounds: AGE_BOUNDS,
            mean: mean(&as_floats(&ages)),
        };

        let tenure = distinct_integers(dataset, Attribute::Tenure)?;
        let balance = summarize(&float_column(dataset, Attribute::Balance)?);
        let num_of_products = distinct_integers(dataset, Attribute::NumOfProducts)?;

        check_flag_column(dataset, Attribute::HasCreditCard)?;
        check_flag_column(dataset, Attribute::IsActiveMember)?;

        let salaries = float_column(dataset, Attribute::EstimatedSalary)?;
        let estimated_salary = NumericSummary {
            bounds: ESTIMATED_SALARY_BOUNDS,
            mean: mean(&salaries),
        };

        let profile = Self {
            rows: dataset.rows(),
            credit_score,
            geography,
            gender,
            age,
            tenure,
            balance,
            num_of_products,
            estimated_salary,
        };

        info!("Schema profile built from {} rows of {}", profile.rows, dataset.source());
        info!("  CreditScore: {}", profile.credit_score.bounds);
        info!("  Geography: {:?}", profile.geography);
        info!("  Gender: {:?}", profile.gender);
        info!("  Tenure: {:?}", profile.tenure);
        info!("  Balance: {}", profile.balance.bounds);
        info!("  NumOfProducts: {:?}", profile.num_of_products);

        Ok(profile)
    }

    /// Loads the CSV at `path` and derives the schema from it.
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        Self::build(&ReferenceDataset::load(path)?)
    }

    /// Reads CSV from `reader` and derives the schema from it.
    pub fn from_reader<R: Read>(reader: R, source: impl Into<String>) -> Result<Self, SchemaError> {
        Self::build(&ReferenceDataset::from_reader(reader, source)?)
    }

    /// Number of reference rows the schema was derived from.
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn credit_score(&self) -> NumericSummary {
        self.credit_score
    }

    /// Distinct geographies, in order of first appearance.
    pub fn geography(&self) -> &[String] {
        &self.geography
    }

    /// Distinct genders, in order of first appearance.
    pub fn gender(&self) -> &[String] {
        &self.gender
    }

    /// Fixed [18, 100] bounds with the reference mean.
    pub fn age(&self) -> NumericSummary {
        self.age
    }

    /// Distinct tenures, ascending.
    pub fn tenure(&self) -> &[i64] {
        &self.tenure
    }

    pub fn balance(&self) -> NumericSummary {
        self.balance
    }

    /// Distinct product counts, ascending.
    pub fn num_of_products(&self) -> &[i64] {
        &self.num_of_products
    }

    /// Fixed [0, 200000] bounds with the reference mean.
    pub fn estimated_salary(&self) -> NumericSummary {
        self.estimated_salary
    }

    /// Numeric summary of a bounded attribute; `None` for categorical and
    /// boolean attributes.
    pub fn summary(&self, attribute: Attribute) -> Option<NumericSummary> {
        match attribute {
            Attribute::CreditScore => Some(self.credit_score),
            Attribute::Age => Some(self.age),
            Attribute::Balance => Some(self.balance),
            Attribute::EstimatedSalary => Some(self.estimated_salary),
            _ => None,
        }
    }

    /// Allowed values of a categorical attribute, rendered as text; `None`
    /// for bounded and boolean attributes.
    pub fn categories(&self, attribute: Attribute) -> Option<Vec<String>> {
        match attribute {
            Attribute::Geography => Some(self.geography.clone()),
            Attribute::Gender => Some(self.gender.clone()),
            Attribute::Tenure => Some(self.tenure.iter().map(i64::to_string).collect()),
            Attribute::NumOfProducts => Some(self.num_of_products.iter().map(i64::to_string).collect()),
            _ => None,
        }
    }
}

fn non_empty(dataset: &ReferenceDataset, attribute: Attribute) -> Result<&[DatasetCell], SchemaError> {
    let cells = dataset.cells(attribute);
    if cells.is_empty() {
        return Err(SchemaError::degenerate(attribute.column_name(), "Column has no values"));
    }
    Ok(cells)
}

fn not_a_number(attribute: Attribute, cell: &DatasetCell, expected: &str) -> SchemaError {
    SchemaError::degenerate(
        attribute.column_name(),
        format!("Line {}: '{}' is not a valid {}", cell.line, cell.value, expected),
    )
}

fn float_column(dataset: &ReferenceDataset, attribute: Attribute) -> Result<Vec<f64>, SchemaError> {
    non_empty(dataset, attribute)?
        .iter()
        .map(|cell| match cell.value.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(not_a_number(attribute, cell, "number")),
        })
        .collect()
}

fn integer_column(dataset: &ReferenceDataset, attribute: Attribute) -> Result<Vec<i64>, SchemaError> {
    non_empty(dataset, attribute)?
        .iter()
        .map(|cell| {
            if let Ok(v) = cell.value.parse::<i64>() {
                return Ok(v);
            }
            // Exports sometimes write integer columns as "5.0".
            match cell.value.parse::<f64>() {
                Ok(v) if v.is_finite() && v.fract() == 0.0 => Ok(v as i64),
                _ => Err(not_a_number(attribute, cell, "integer")),
            }
        })
        .collect()
}

fn distinct_text(dataset: &ReferenceDataset, attribute: Attribute) -> Result<Vec<String>, SchemaError> {
    let mut values: Vec<String> = Vec::new();
    for cell in non_empty(dataset, attribute)? {
        if !values.contains(&cell.value) {
            values.push(cell.value.clone());
        }
    }
    Ok(values)
}

fn distinct_integers(dataset: &ReferenceDataset, attribute: Attribute) -> Result<Vec<i64>, SchemaError> {
    let values: BTreeSet<i64> = integer_column(dataset, attribute)?.into_iter().collect();
    Ok(values.into_iter().collect())
}

fn check_flag_column(dataset: &ReferenceDataset, attribute: Attribute) -> Result<(), SchemaError> {
    for (cell, value) in non_empty(dataset, attribute)?
        .iter()
        .zip(integer_column(dataset, attribute)?)
    {
        if value != 0 && value != 1 {
            return Err(SchemaError::degenerate(
                attribute.column_name(),
                format!("Line {}: flag value '{}' is not 0 or 1", cell.line, cell.value),
            ));
        }
    }
    Ok(())
}

fn as_floats(values: &[i64]) -> Vec<f64> {
    values.iter().map(|&v| v as f64).collect()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn summarize(values: &[f64]) -> NumericSummary {
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    NumericSummary {
        bounds: NumericBounds::new(min, max),
        mean: mean(values),
    }
}
