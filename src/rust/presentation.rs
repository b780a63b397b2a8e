//! What a user-facing adapter needs beyond the core: pre-filled form values,
//! domain descriptions, the record echo and the verdict text.
//!
//! The core never fills in a missing attribute. An adapter that wants to
//! offer defaults uses [`FormDefaults`] and hands the completed selections
//! to the record builder.

use std::io;

use crate::gateway::ChurnLabel;
use crate::record::{Attribute, AttributeKind, CustomerProfile, RawSelections, RawValue, NO, YES};
use crate::schema::SchemaProfile;

pub const NOT_LIKELY_TO_CHURN: &str = "Customer is not likely to churn.";
pub const LIKELY_TO_CHURN: &str = "Customer is likely to churn.";

/// Suggested starting value for every attribute, derived from a schema.
///
/// - CreditScore, Age and EstimatedSalary: the reference mean, truncated
/// - Balance: the reference mean
/// - Geography: the second observed value (the first if there is only one)
/// - Gender: the first observed value
/// - Tenure: the sixth value in sorted order (the last if there are fewer)
/// - NumOfProducts: the second value in sorted order (the first if there is only one)
/// - HasCreditCard and IsActiveMember: "Yes"
#[derive(Debug, Clone, PartialEq)]
pub struct FormDefaults {
    values: RawSelections,
}

impl FormDefaults {
    pub fn from_schema(schema: &SchemaProfile) -> Self {
        let mut values = RawSelections::new();

        values.insert(Attribute::CreditScore, schema.credit_score().mean.trunc() as i64);
        if let Some(geography) = nth_or_fallback(schema.geography(), 1, <[String]>::first) {
            values.insert(Attribute::Geography, geography.as_str());
        }
        if let Some(gender) = schema.gender().first() {
            values.insert(Attribute::Gender, gender.as_str());
        }
        values.insert(Attribute::Age, schema.age().mean.trunc() as i64);
        if let Some(tenure) = nth_or_fallback(schema.tenure(), 5, <[i64]>::last) {
            values.insert(Attribute::Tenure, *tenure);
        }
        values.insert(Attribute::Balance, schema.balance().mean);
        if let Some(products) = nth_or_fallback(schema.num_of_products(), 1, <[i64]>::first) {
            values.insert(Attribute::NumOfProducts, *products);
        }
        values.insert(Attribute::HasCreditCard, YES);
        values.insert(Attribute::IsActiveMember, YES);
        values.insert(Attribute::EstimatedSalary, schema.estimated_salary().mean.trunc());

        Self { values }
    }

    pub fn get(&self, attribute: Attribute) -> Option<&RawValue> {
        self.values.get(attribute)
    }

    pub fn selections(&self) -> &RawSelections {
        &self.values
    }

    /// Adds the default for every attribute missing from `selections`.
    /// Values already present are left untouched.
    pub fn fill(&self, mut selections: RawSelections) -> RawSelections {
        for attribute in selections.missing() {
            if let Some(value) = self.values.get(attribute) {
                selections.insert(attribute, value.clone());
            }
        }
        selections
    }
}

fn nth_or_fallback<'a, T>(
    values: &'a [T],
    index: usize,
    fallback: fn(&'a [T]) -> Option<&'a T>,
) -> Option<&'a T> {
    values.get(index).or_else(|| fallback(values))
}

pub fn verdict_message(label: ChurnLabel) -> &'static str {
    match label {
        ChurnLabel::Retained => NOT_LIKELY_TO_CHURN,
        ChurnLabel::Churn => LIKELY_TO_CHURN,
    }
}

/// The record as a header line plus one data line, in column order.
pub fn render_record_csv(record: &CustomerProfile) -> csv::Result<String> {
    let mut bytes = Vec::new();
    {
        let mut writer = csv::Writer::from_writer(&mut bytes);
        writer.serialize(record)?;
        writer.flush()?;
    }
    String::from_utf8(bytes)
        .map_err(|e| csv::Error::from(io::Error::new(io::ErrorKind::InvalidData, e)))
}

/// Human-readable allowed values of one attribute.
pub fn describe_domain(schema: &SchemaProfile, attribute: Attribute) -> String {
    match attribute.kind() {
        AttributeKind::Boolean => format!("{} or {}", YES, NO),
        AttributeKind::BoundedInteger | AttributeKind::BoundedFloat => schema
            .summary(attribute)
            .map(|summary| summary.bounds.to_string())
            .unwrap_or_default(),
        AttributeKind::Categorical | AttributeKind::IntegerCategorical => schema
            .categories(attribute)
            .map(|values| values.join(", "))
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> SchemaProfile {
        let data = "\
CreditScore,Geography,Gender,Age,Tenure,Balance,NumOfProducts,HasCrCard,IsActiveMember,EstimatedSalary
601,France,Female,30,3,10.5,1,1,1,1000.9
700,Spain,Male,51,1,0,3,0,0,2000.4
";
        SchemaProfile::from_reader(data.as_bytes(), "inline").unwrap()
    }

    #[test]
    fn test_defaults() {
        let defaults = FormDefaults::from_schema(&schema());
        assert_eq!(defaults.get(Attribute::CreditScore), Some(&RawValue::Integer(650)));
        assert_eq!(defaults.get(Attribute::Geography), Some(&RawValue::from("Spain")));
        assert_eq!(defaults.get(Attribute::Gender), Some(&RawValue::from("Female")));
        assert_eq!(defaults.get(Attribute::Age), Some(&RawValue::Integer(40)));
        // Only two tenures observed, so the last one
        assert_eq!(defaults.get(Attribute::Tenure), Some(&RawValue::Integer(3)));
        assert_eq!(defaults.get(Attribute::Balance), Some(&RawValue::Float(5.25)));
        assert_eq!(defaults.get(Attribute::NumOfProducts), Some(&RawValue::Integer(3)));
        assert_eq!(defaults.get(Attribute::HasCreditCard), Some(&RawValue::from(YES)));
        assert_eq!(defaults.get(Attribute::IsActiveMember), Some(&RawValue::from(YES)));
        assert_eq!(defaults.get(Attribute::EstimatedSalary), Some(&RawValue::Float(1500.0)));
        assert!(defaults.selections().missing().is_empty());
    }

    #[test]
    fn test_fill_keeps_user_values() {
        let defaults = FormDefaults::from_schema(&schema());
        let filled = defaults.fill(RawSelections::new().with(Attribute::Geography, "France"));
        assert_eq!(filled.get(Attribute::Geography), Some(&RawValue::from("France")));
        assert_eq!(filled.get(Attribute::Age), Some(&RawValue::Integer(40)));
        assert!(filled.missing().is_empty());
    }

    #[test]
    fn test_verdict_message() {
        assert_eq!(verdict_message(ChurnLabel::Retained), "Customer is not likely to churn.");
        assert_eq!(verdict_message(ChurnLabel::Churn), "Customer is likely to churn.");
    }

    #[test]
    fn test_describe_domain() {
        let schema = schema();
        assert_eq!(describe_domain(&schema, Attribute::Geography), "France, Spain");
        assert_eq!(describe_domain(&schema, Attribute::Tenure), "1, 3");
        assert_eq!(describe_domain(&schema, Attribute::Age), "[18, 100]");
        assert_eq!(describe_domain(&schema, Attribute::CreditScore), "[601, 700]");
        assert_eq!(describe_domain(&schema, Attribute::HasCreditCard), "Yes or No");
    }
}
