//! Compiled query descriptor and its MongoDB rendering.

use mongodb::bson::{Bson, Document, doc, oid::ObjectId};

use crate::policy::SortOrder;
use crate::populate::PopulateSpec;

/// A checked numeric bound
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Integer(i64),
    Decimal(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Integer(value) => value as f64,
            Number::Decimal(value) => value,
        }
    }
}

impl From<Number> for Bson {
    fn from(number: Number) -> Self {
        match number {
            Number::Integer(value) => Bson::Int64(value),
            Number::Decimal(value) => Bson::Double(value),
        }
    }
}

/// A value compared for equality
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Text(String),
    Id(ObjectId),
    Flag(bool),
}

impl From<Scalar> for Bson {
    fn from(scalar: Scalar) -> Self {
        match scalar {
            Scalar::Text(value) => Bson::String(value),
            Scalar::Id(value) => Bson::ObjectId(value),
            Scalar::Flag(value) => Bson::Boolean(value),
        }
    }
}

/// One constraint of a filter; all constraints are combined with logical AND
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Equals {
        path: &'static str,
        value: Scalar,
    },
    Contains {
        path: &'static str,
        needle: String,
    },
    Between {
        path: &'static str,
        min: Option<Number>,
        max: Option<Number>,
    },
    Search(String),
}

impl Condition {
    /// Case-insensitive, regex-escaped pattern used for substring matches
    pub fn contains_pattern(needle: &str) -> String {
        regex::escape(needle)
    }
}

/// Conjunction of conditions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    pub fn new(conditions: Vec<Condition>) -> Self {
        Self { conditions }
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Render as a MongoDB query document
    pub fn to_document(&self) -> Document {
        let mut document = Document::new();

        for condition in &self.conditions {
            match condition {
                Condition::Equals { path, value } => {
                    document.insert(*path, Bson::from(value.clone()));
                }
                Condition::Contains { path, needle } => {
                    document.insert(
                        *path,
                        doc! { "$regex": Condition::contains_pattern(needle), "$options": "i" },
                    );
                }
                Condition::Between { path, min, max } => {
                    let mut bounds = Document::new();
                    if let Some(min) = min {
                        bounds.insert("$gte", Bson::from(*min));
                    }
                    if let Some(max) = max {
                        bounds.insert("$lte", Bson::from(*max));
                    }
                    if !bounds.is_empty() {
                        document.insert(*path, bounds);
                    }
                }
                Condition::Search(text) => {
                    document.insert("$text", doc! { "$search": text.as_str() });
                }
            }
        }

        document
    }
}

/// Sort key and direction
#[derive(Debug, Clone, PartialEq)]
pub struct Sort {
    pub field: String,
    pub order: SortOrder,
}

impl Sort {
    /// Render as a MongoDB sort document; `_id` breaks ties so pages are stable
    pub fn to_document(&self) -> Document {
        let direction = self.order.direction();
        let mut document = Document::new();
        document.insert(self.field.as_str(), direction);
        if self.field != "_id" {
            document.insert("_id", direction);
        }
        document
    }
}

/// 1-based page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: u64,
    pub size: u64,
}

impl Page {
    /// Records before this page, clamped to what the store accepts
    pub fn skip(&self) -> u64 {
        self.number
            .saturating_sub(1)
            .saturating_mul(self.size)
            .min(i64::MAX as u64)
    }

    /// Number of pages needed for `total` records
    pub fn pages(&self, total: u64) -> u64 {
        if self.size == 0 {
            return 0;
        }
        total.div_ceil(self.size)
    }
}

/// Output of the compiler: what to fetch, in which order, which slice and
/// which references to resolve
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    pub filter: Filter,
    pub sort: Sort,
    pub page: Page,
    pub populate: Option<&'static PopulateSpec>,
}

impl QuerySpec {
    pub fn skip(&self) -> u64 {
        self.page.skip()
    }

    pub fn limit(&self) -> i64 {
        i64::try_from(self.page.size).unwrap_or(i64::MAX)
    }
}
