//! Static field-policy tables.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::populate::PopulateSpec;

/// First page when `page` is not supplied
pub const DEFAULT_PAGE: u64 = 1;
/// Page size when `limit` is not supplied
pub const DEFAULT_LIMIT: u64 = 10;
/// Largest page size a client can request; larger values are capped
pub const MAX_LIMIT: u64 = 100;

/// Numeric type accepted by a range parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberKind {
    Integer,
    Decimal,
}

/// How a request parameter is compared against the stored field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Equality on the raw value
    Exact,
    /// Equality after upper-casing the value (normalized fields such as SKUs)
    ExactUppercase,
    /// Equality on an ObjectId reference
    Reference,
    /// Case-insensitive substring match; the path may be dotted
    Contains,
    /// Inclusive bounds read from `<param>Min` and `<param>Max`
    Range(NumberKind),
    /// `"true"` / `"false"`
    Flag,
    /// Full-text search over the collection's text index
    FullText,
}

/// One filterable request parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    /// Request parameter name (for ranges, the stem of `<param>Min`/`<param>Max`)
    pub param: &'static str,
    /// Stored document path the parameter constrains
    pub path: &'static str,
    pub mode: MatchMode,
}

impl FieldRule {
    pub const fn new(param: &'static str, path: &'static str, mode: MatchMode) -> Self {
        Self { param, path, mode }
    }

    /// Name of the lower-bound parameter for range rules
    pub fn min_param(&self) -> String {
        format!("{}Min", self.param)
    }

    /// Name of the upper-bound parameter for range rules
    pub fn max_param(&self) -> String {
        format!("{}Max", self.param)
    }
}

/// Sort direction
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// MongoDB sort direction (`1` ascending, `-1` descending)
    pub fn direction(self) -> i32 {
        match self {
            SortOrder::Asc => 1,
            SortOrder::Desc => -1,
        }
    }
}

/// Everything the compiler needs to know about one entity's list endpoint
#[derive(Debug)]
pub struct QueryPolicy {
    pub fields: &'static [FieldRule],
    /// Allow-list of `sortBy` values
    pub sortable: &'static [&'static str],
    pub default_sort: &'static str,
    pub default_order: SortOrder,
    /// Reference resolution requested for every listed record
    pub populate: Option<&'static PopulateSpec>,
}

impl QueryPolicy {
    /// Find the rule for a request parameter
    pub fn rule(&self, param: &str) -> Option<&'static FieldRule> {
        self.fields.iter().find(|rule| rule.param == param)
    }

    pub fn is_sortable(&self, field: &str) -> bool {
        self.sortable.contains(&field)
    }
}

/// Entities exposing a list endpoint driven by a [`QueryPolicy`]
pub trait Filterable {
    fn query_policy() -> &'static QueryPolicy;
}
