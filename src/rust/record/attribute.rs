use std::fmt;

/// The attributes of a customer feature record.
///
/// Declaration order is the classifier's column order, so the derived `Ord`
/// sorts attributes the way the record is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Attribute {
    CreditScore,
    Geography,
    Gender,
    Age,
    Tenure,
    Balance,
    NumOfProducts,
    HasCreditCard,
    IsActiveMember,
    EstimatedSalary,
}

/// How an attribute's value is constrained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    /// Free-text value drawn from the set observed in the reference data
    Categorical,
    /// Integer drawn from the sorted set observed in the reference data
    IntegerCategorical,
    /// Integer inside inclusive bounds
    BoundedInteger,
    /// Float inside inclusive bounds
    BoundedFloat,
    /// "Yes"/"No" choice stored as 1/0
    Boolean,
}

/// Number of attributes in a feature record.
pub const ATTRIBUTE_COUNT: usize = 10;

/// Column names expected by the classifier, in record order.
pub const COLUMN_NAMES: [&str; ATTRIBUTE_COUNT] = [
    "CreditScore",
    "Geography",
    "Gender",
    "Age",
    "Tenure",
    "Balance",
    "NumOfProducts",
    "HasCrCard",
    "IsActiveMember",
    "EstimatedSalary",
];

impl Attribute {
    /// Every attribute, in record order.
    pub const ALL: [Attribute; ATTRIBUTE_COUNT] = [
        Attribute::CreditScore,
        Attribute::Geography,
        Attribute::Gender,
        Attribute::Age,
        Attribute::Tenure,
        Attribute::Balance,
        Attribute::NumOfProducts,
        Attribute::HasCreditCard,
        Attribute::IsActiveMember,
        Attribute::EstimatedSalary,
    ];

    /// Zero-based position of the attribute in the record.
    pub fn position(self) -> usize {
        self as usize
    }

    /// Column name used by the reference dataset and the classifier.
    pub fn column_name(self) -> &'static str {
        COLUMN_NAMES[self.position()]
    }

    /// Human-facing attribute name.
    pub fn display_name(self) -> &'static str {
        match self {
            Attribute::HasCreditCard => "HasCreditCard",
            other => other.column_name(),
        }
    }

    pub fn kind(self) -> AttributeKind {
        match self {
            Attribute::Geography | Attribute::Gender => AttributeKind::Categorical,
            Attribute::Tenure | Attribute::NumOfProducts => AttributeKind::IntegerCategorical,
            Attribute::CreditScore | Attribute::Age => AttributeKind::BoundedInteger,
            Attribute::Balance | Attribute::EstimatedSalary => AttributeKind::BoundedFloat,
            Attribute::HasCreditCard | Attribute::IsActiveMember => AttributeKind::Boolean,
        }
    }

    /// Resolves a column name or display name (surrounding whitespace ignored).
    ///
    /// # Example
    /// ```
    /// use churnscope::Attribute;
    ///
    /// assert_eq!(Attribute::from_name("HasCrCard"), Some(Attribute::HasCreditCard));
    /// assert_eq!(Attribute::from_name("HasCreditCard"), Some(Attribute::HasCreditCard));
    /// assert_eq!(Attribute::from_name("Exited"), None);
    /// ```
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|attr| attr.column_name() == name || attr.display_name() == name)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
