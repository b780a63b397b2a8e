use std::fmt;

use serde::Serialize;

use super::attribute::{Attribute, ATTRIBUTE_COUNT};

/// One attribute value of an assembled record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeatureValue<'a> {
    Integer(i64),
    Float(f64),
    Text(&'a str),
}

impl FeatureValue<'_> {
    /// Numeric view of the value, `None` for text.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            FeatureValue::Integer(v) => Some(v as f64),
            FeatureValue::Float(v) => Some(v),
            FeatureValue::Text(_) => None,
        }
    }
}

impl fmt::Display for FeatureValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Integer(v) => write!(f, "{}", v),
            FeatureValue::Float(v) => write!(f, "{:?}", v),
            FeatureValue::Text(v) => f.write_str(v),
        }
    }
}

/// A validated, single-row customer feature record.
///
/// Values can only come out of [`FeatureRecordBuilder`](super::FeatureRecordBuilder),
/// so every instance satisfies the schema it was built against. Fields are
/// declared (and serialized) in classifier column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomerProfile {
    pub(crate) credit_score: i64,
    pub(crate) geography: String,
    pub(crate) gender: String,
    pub(crate) age: i64,
    pub(crate) tenure: i64,
    pub(crate) balance: f64,
    pub(crate) num_of_products: i64,
    #[serde(rename = "HasCrCard")]
    pub(crate) has_credit_card: u8,
    pub(crate) is_active_member: u8,
    pub(crate) estimated_salary: f64,
}

impl CustomerProfile {
    pub fn credit_score(&self) -> i64 {
        self.credit_score
    }

    pub fn geography(&self) -> &str {
        &self.geography
    }

    pub fn gender(&self) -> &str {
        &self.gender
    }

    pub fn age(&self) -> i64 {
        self.age
    }

    pub fn tenure(&self) -> i64 {
        self.tenure
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn num_of_products(&self) -> i64 {
        self.num_of_products
    }

    /// 1 when the customer holds a credit card, 0 otherwise
    pub fn has_credit_card(&self) -> u8 {
        self.has_credit_card
    }

    /// 1 when the customer is an active member, 0 otherwise
    pub fn is_active_member(&self) -> u8 {
        self.is_active_member
    }

    pub fn estimated_salary(&self) -> f64 {
        self.estimated_salary
    }

    /// The stored value of a single attribute.
    pub fn value(&self, attribute: Attribute) -> FeatureValue<'_> {
        match attribute {
            Attribute::CreditScore => FeatureValue::Integer(self.credit_score),
            Attribute::Geography => FeatureValue::Text(&self.geography),
            Attribute::Gender => FeatureValue::Text(&self.gender),
            Attribute::Age => FeatureValue::Integer(self.age),
            Attribute::Tenure => FeatureValue::Integer(self.tenure),
            Attribute::Balance => FeatureValue::Float(self.balance),
            Attribute::NumOfProducts => FeatureValue::Integer(self.num_of_products),
            Attribute::HasCreditCard => FeatureValue::Integer(i64::from(self.has_credit_card)),
            Attribute::IsActiveMember => FeatureValue::Integer(i64::from(self.is_active_member)),
            Attribute::EstimatedSalary => FeatureValue::Float(self.estimated_salary),
        }
    }

    /// `(column name, value)` pairs in the order the classifier expects.
    pub fn columns(&self) -> [(&'static str, FeatureValue<'_>); ATTRIBUTE_COUNT] {
        Attribute::ALL.map(|attr| (attr.column_name(), self.value(attr)))
    }
}

impl fmt::Display for CustomerProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (_, value)) in self.columns().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match value {
                FeatureValue::Text(text) => write!(f, "{:?}", text)?,
                other => write!(f, "{}", other)?,
            }
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CustomerProfile {
        CustomerProfile {
            credit_score: 650,
            geography: "Germany".into(),
            gender: "Female".into(),
            age: 40,
            tenure: 5,
            balance: 75000.0,
            num_of_products: 2,
            has_credit_card: 1,
            is_active_member: 0,
            estimated_salary: 50000.0,
        }
    }

    #[test]
    fn test_columns_in_classifier_order() {
        let record = sample();
        let names: Vec<_> = record.columns().iter().map(|(name, _)| *name).collect();
        assert_eq!(names, crate::record::COLUMN_NAMES.to_vec());
        assert_eq!(record.columns()[7].1, FeatureValue::Integer(1));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            sample().to_string(),
            r#"{650, "Germany", "Female", 40, 5, 75000.0, 2, 1, 0, 50000.0}"#
        );
    }
}
