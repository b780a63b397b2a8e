use std::collections::BTreeMap;
use std::fmt;

use super::attribute::Attribute;
use super::error::RecordError;

/// A value as selected by the user, before validation.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Integer(v) => write!(f, "{}", v),
            RawValue::Float(v) => write!(f, "{}", v),
            RawValue::Text(v) => f.write_str(v),
        }
    }
}

impl From<i64> for RawValue {
    fn from(v: i64) -> Self {
        RawValue::Integer(v)
    }
}

impl From<i32> for RawValue {
    fn from(v: i32) -> Self {
        RawValue::Integer(i64::from(v))
    }
}

impl From<f64> for RawValue {
    fn from(v: f64) -> Self {
        RawValue::Float(v)
    }
}

impl From<&str> for RawValue {
    fn from(v: &str) -> Self {
        RawValue::Text(v.to_string())
    }
}

impl From<String> for RawValue {
    fn from(v: String) -> Self {
        RawValue::Text(v)
    }
}

/// The raw selections for one customer, keyed by attribute.
///
/// Iteration follows record order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSelections {
    values: BTreeMap<Attribute, RawValue>,
}

impl RawSelections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a selection, replacing any previous value for the attribute
    ///
    /// # Example
    /// ```
    /// use churnscope::{Attribute, RawSelections, RawValue};
    ///
    /// let selections = RawSelections::new()
    ///     .with(Attribute::Age, 40)
    ///     .with(Attribute::HasCreditCard, "Yes");
    /// assert_eq!(selections.get(Attribute::Age), Some(&RawValue::Integer(40)));
    /// ```
    pub fn with(mut self, attribute: Attribute, value: impl Into<RawValue>) -> Self {
        self.values.insert(attribute, value.into());
        self
    }

    pub fn insert(&mut self, attribute: Attribute, value: impl Into<RawValue>) -> Option<RawValue> {
        self.values.insert(attribute, value.into())
    }

    pub fn get(&self, attribute: Attribute) -> Option<&RawValue> {
        self.values.get(&attribute)
    }

    pub fn contains(&self, attribute: Attribute) -> bool {
        self.values.contains_key(&attribute)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Attribute, &RawValue)> {
        self.values.iter().map(|(attr, value)| (*attr, value))
    }

    /// Attributes without a selection, in record order.
    pub fn missing(&self) -> Vec<Attribute> {
        Attribute::ALL
            .into_iter()
            .filter(|attr| !self.contains(*attr))
            .collect()
    }

    /// Builds selections from `(name, value)` pairs such as form fields.
    ///
    /// Names are resolved with [`Attribute::from_name`]. An unknown name fails
    /// with `UnknownAttribute`, a repeated one with `DuplicateAttribute`.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, RecordError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<RawValue>,
    {
        let mut selections = Self::new();
        for (name, value) in pairs {
            let name = name.as_ref();
            let attribute = Attribute::from_name(name)
                .ok_or_else(|| RecordError::UnknownAttribute(name.to_string()))?;
            if selections.insert(attribute, value).is_some() {
                return Err(RecordError::DuplicateAttribute(attribute));
            }
        }
        Ok(selections)
    }
}

impl FromIterator<(Attribute, RawValue)> for RawSelections {
    fn from_iter<T: IntoIterator<Item = (Attribute, RawValue)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
