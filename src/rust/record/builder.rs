use log::debug;

use super::attribute::Attribute;
use super::customer::CustomerProfile;
use super::error::RecordError;
use super::raw::{RawSelections, RawValue};
use crate::schema::{NumericBounds, SchemaProfile, AGE_BOUNDS, ESTIMATED_SALARY_BOUNDS};

/// Literal accepted as the affirmative boolean choice, stored as 1
pub const YES: &str = "Yes";
/// Literal accepted as the negative boolean choice, stored as 0
pub const NO: &str = "No";

/// Assembles validated [`CustomerProfile`] records against a [`SchemaProfile`].
///
/// The builder only borrows the schema, so one schema can serve any number of
/// builders on any number of threads.
///
/// # Validation rules
/// - Every attribute must be present
/// - Geography and Gender must be one of the values seen in the reference data
/// - Tenure and NumOfProducts must be one of the integers seen in the reference data
/// - CreditScore and Balance must lie within the observed [min, max]
/// - Age must lie within [18, 100], EstimatedSalary within [0, 200000]
/// - HasCreditCard and IsActiveMember must be exactly "Yes" or "No"
///
/// Attributes are checked in record order and the first failure is returned.
/// Nothing is clamped, defaulted or retried.
///
/// # Example
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use churnscope::{Attribute, FeatureRecordBuilder, RawSelections, SchemaProfile};
///
/// let schema = SchemaProfile::from_csv_path("data/churn_data.csv")?;
/// let selections = RawSelections::new()
///     .with(Attribute::CreditScore, 650)
///     .with(Attribute::Geography, "Germany")
///     .with(Attribute::Gender, "Female")
///     .with(Attribute::Age, 40)
///     .with(Attribute::Tenure, 5)
///     .with(Attribute::Balance, 75000.0)
///     .with(Attribute::NumOfProducts, 2)
///     .with(Attribute::HasCreditCard, "Yes")
///     .with(Attribute::IsActiveMember, "No")
///     .with(Attribute::EstimatedSalary, 50000.0);
///
/// let record = FeatureRecordBuilder::new(&schema).build(&selections)?;
/// assert_eq!(record.has_credit_card(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FeatureRecordBuilder<'a> {
    schema: &'a SchemaProfile,
}

impl<'a> FeatureRecordBuilder<'a> {
    pub fn new(schema: &'a SchemaProfile) -> Self {
        Self { schema }
    }

    /// Validates the selections and assembles the record.
    pub fn build(&self, selections: &RawSelections) -> Result<CustomerProfile, RecordError> {
        let schema = self.schema;

        let credit_score = bounded_integer(
            Attribute::CreditScore,
            require(selections, Attribute::CreditScore)?,
            schema.credit_score().bounds,
        )?;
        let geography = categorical_text(
            Attribute::Geography,
            require(selections, Attribute::Geography)?,
            schema.geography(),
        )?;
        let gender = categorical_text(
            Attribute::Gender,
            require(selections, Attribute::Gender)?,
            schema.gender(),
        )?;
        let age = bounded_integer(Attribute::Age, require(selections, Attribute::Age)?, AGE_BOUNDS)?;
        let tenure = categorical_integer(
            Attribute::Tenure,
            require(selections, Attribute::Tenure)?,
            schema.tenure(),
        )?;
        let balance = bounded_float(
            Attribute::Balance,
            require(selections, Attribute::Balance)?,
            schema.balance().bounds,
        )?;
        let num_of_products = categorical_integer(
            Attribute::NumOfProducts,
            require(selections, Attribute::NumOfProducts)?,
            schema.num_of_products(),
        )?;
        let has_credit_card = boolean(
            Attribute::HasCreditCard,
            require(selections, Attribute::HasCreditCard)?,
        )?;
        let is_active_member = boolean(
            Attribute::IsActiveMember,
            require(selections, Attribute::IsActiveMember)?,
        )?;
        let estimated_salary = bounded_float(
            Attribute::EstimatedSalary,
            require(selections, Attribute::EstimatedSalary)?,
            ESTIMATED_SALARY_BOUNDS,
        )?;

        let record = CustomerProfile {
            credit_score,
            geography,
            gender,
            age,
            tenure,
            balance,
            num_of_products,
            has_credit_card,
            is_active_member,
            estimated_salary,
        };
        debug!("Assembled feature record {}", record);
        Ok(record)
    }
}

/// Validates `selections` against `schema` and assembles one record.
pub fn build_record(
    selections: &RawSelections,
    schema: &SchemaProfile,
) -> Result<CustomerProfile, RecordError> {
    FeatureRecordBuilder::new(schema).build(selections)
}

fn require(selections: &RawSelections, attribute: Attribute) -> Result<&RawValue, RecordError> {
    selections
        .get(attribute)
        .ok_or(RecordError::MissingAttribute(attribute))
}

fn type_mismatch(attribute: Attribute, raw: &RawValue, expected: &'static str) -> RecordError {
    RecordError::TypeMismatch {
        attribute,
        value: raw.to_string(),
        expected,
    }
}

fn integer_value(attribute: Attribute, raw: &RawValue) -> Result<i64, RecordError> {
    match raw {
        RawValue::Integer(v) => Ok(*v),
        // Whole floats are accepted; anything with a fractional part is not an integer.
        RawValue::Float(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 => {
            Ok(*v as i64)
        }
        RawValue::Float(_) => Err(type_mismatch(attribute, raw, "integer")),
        RawValue::Text(text) => text
            .trim()
            .parse::<i64>()
            .map_err(|_| type_mismatch(attribute, raw, "integer")),
    }
}

fn float_value(attribute: Attribute, raw: &RawValue) -> Result<f64, RecordError> {
    let value = match raw {
        RawValue::Integer(v) => *v as f64,
        RawValue::Float(v) => *v,
        RawValue::Text(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|_| type_mismatch(attribute, raw, "number"))?,
    };
    if !value.is_finite() {
        return Err(type_mismatch(attribute, raw, "number"));
    }
    // -0.0 + 0.0 is +0.0
    Ok(value + 0.0)
}

fn check_range(attribute: Attribute, value: f64, bounds: NumericBounds) -> Result<(), RecordError> {
    if bounds.contains(value) {
        Ok(())
    } else {
        Err(RecordError::OutOfRange {
            attribute,
            value,
            bounds,
        })
    }
}

fn bounded_integer(
    attribute: Attribute,
    raw: &RawValue,
    bounds: NumericBounds,
) -> Result<i64, RecordError> {
    let value = integer_value(attribute, raw)?;
    check_range(attribute, value as f64, bounds)?;
    Ok(value)
}

fn bounded_float(
    attribute: Attribute,
    raw: &RawValue,
    bounds: NumericBounds,
) -> Result<f64, RecordError> {
    let value = float_value(attribute, raw)?;
    check_range(attribute, value, bounds)?;
    Ok(value)
}

fn categorical_text(
    attribute: Attribute,
    raw: &RawValue,
    allowed: &[String],
) -> Result<String, RecordError> {
    match raw {
        RawValue::Text(text) if allowed.iter().any(|v| v == text) => Ok(text.clone()),
        other => Err(RecordError::OutOfDomain {
            attribute,
            value: other.to_string(),
            allowed: allowed.to_vec(),
        }),
    }
}

fn categorical_integer(
    attribute: Attribute,
    raw: &RawValue,
    allowed: &[i64],
) -> Result<i64, RecordError> {
    let value = integer_value(attribute, raw)?;
    if allowed.binary_search(&value).is_ok() {
        Ok(value)
    } else {
        Err(RecordError::OutOfDomain {
            attribute,
            value: value.to_string(),
            allowed: allowed.iter().map(i64::to_string).collect(),
        })
    }
}

fn boolean(attribute: Attribute, raw: &RawValue) -> Result<u8, RecordError> {
    match raw {
        RawValue::Text(text) if text == YES => Ok(1),
        RawValue::Text(text) if text == NO => Ok(0),
        other => Err(RecordError::InvalidBooleanEncoding {
            attribute,
            value: other.to_string(),
        }),
    }
}
