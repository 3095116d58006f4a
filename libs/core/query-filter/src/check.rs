//! Parameter checking: the fallible half of the pipeline.
//!
//! Every parameter the policy names is parsed into a typed value. Problems are
//! collected rather than returned on first sight, so a client sees all of them
//! in one response. Parameters the policy does not name are ignored.

use std::str::FromStr;

use mongodb::bson::oid::ObjectId;
use serde::Serialize;

use crate::RawParams;
use crate::policy::{
    DEFAULT_LIMIT, FieldRule, MAX_LIMIT, MatchMode, NumberKind, QueryPolicy, SortOrder,
};
use crate::spec::Number;

/// One rejected request parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub field: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Violation {
    pub fn new(field: impl Into<String>, message: impl Into<String>, value: &str) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            value: Some(value.to_string()),
        }
    }
}

/// A parameter value that passed its rule
#[derive(Debug, Clone, PartialEq)]
pub enum Checked {
    Text(String),
    Id(ObjectId),
    Flag(bool),
    Bounds {
        min: Option<Number>,
        max: Option<Number>,
    },
}

/// Request parameters after checking, bound to the policy that checked them
#[derive(Debug, Clone)]
pub struct CheckedParams {
    policy: &'static QueryPolicy,
    values: Vec<(&'static FieldRule, Checked)>,
    sort_by: Option<&'static str>,
    order: Option<SortOrder>,
    page: Option<u64>,
    limit: Option<u64>,
}

impl CheckedParams {
    pub fn policy(&self) -> &'static QueryPolicy {
        self.policy
    }

    pub fn values(&self) -> &[(&'static FieldRule, Checked)] {
        &self.values
    }

    pub fn sort_by(&self) -> Option<&'static str> {
        self.sort_by
    }

    pub fn order(&self) -> Option<SortOrder> {
        self.order
    }

    pub fn page(&self) -> Option<u64> {
        self.page
    }

    /// Requested page size, already capped at [`MAX_LIMIT`]
    pub fn limit(&self) -> Option<u64> {
        self.limit
    }
}

/// Look a parameter up; blank values count as absent
fn present<'a>(params: &'a RawParams, name: &str) -> Option<&'a str> {
    params
        .get(name)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

fn parse_flag(field: &str, raw: &str) -> Result<bool, Violation> {
    match raw {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(Violation::new(field, "must be 'true' or 'false'", raw)),
    }
}

fn parse_bound(field: &str, raw: &str, kind: NumberKind) -> Result<Number, Violation> {
    match kind {
        NumberKind::Integer => match raw.parse::<i64>() {
            Ok(value) if value >= 0 => Ok(Number::Integer(value)),
            _ => Err(Violation::new(
                field,
                "must be a non-negative integer",
                raw,
            )),
        },
        NumberKind::Decimal => match raw.parse::<f64>() {
            Ok(value) if value.is_finite() && value >= 0.0 => Ok(Number::Decimal(value)),
            _ => Err(Violation::new(field, "must be a non-negative number", raw)),
        },
    }
}

fn parse_positive(field: &str, raw: &str) -> Result<u64, Violation> {
    match raw.parse::<u64>() {
        Ok(value) if value >= 1 => Ok(value),
        _ => Err(Violation::new(field, "must be a positive integer", raw)),
    }
}

/// Check the parameter(s) one rule reads; `None` when absent or rejected
fn check_rule(
    rule: &FieldRule,
    params: &RawParams,
    violations: &mut Vec<Violation>,
) -> Option<Checked> {
    if let MatchMode::Range(kind) = rule.mode {
        let min_param = rule.min_param();
        let max_param = rule.max_param();
        let min = present(params, &min_param)
            .and_then(|raw| collect(parse_bound(&min_param, raw, kind), violations));
        let max = present(params, &max_param)
            .and_then(|raw| collect(parse_bound(&max_param, raw, kind), violations));
        return (min.is_some() || max.is_some()).then_some(Checked::Bounds { min, max });
    }

    let raw = present(params, rule.param)?;
    let checked = match rule.mode {
        MatchMode::Reference => ObjectId::parse_str(raw)
            .map(Checked::Id)
            .map_err(|_| Violation::new(rule.param, "must be a valid identifier", raw)),
        MatchMode::Flag => parse_flag(rule.param, raw).map(Checked::Flag),
        _ => Ok(Checked::Text(raw.to_string())),
    };
    collect(checked, violations)
}

/// Keep the `Ok` side, record the `Err` side
fn collect<T>(result: Result<T, Violation>, violations: &mut Vec<Violation>) -> Option<T> {
    result.map_err(|violation| violations.push(violation)).ok()
}

impl QueryPolicy {
    /// Check raw request parameters against this policy
    pub fn check(&'static self, params: &RawParams) -> Result<CheckedParams, Vec<Violation>> {
        let mut violations = Vec::new();
        let mut values = Vec::new();

        for rule in self.fields {
            if let Some(value) = check_rule(rule, params, &mut violations) {
                values.push((rule, value));
            }
        }

        let sort_by = present(params, "sortBy").and_then(|raw| {
            let field = self.sortable.iter().copied().find(|field| *field == raw);
            if field.is_none() {
                violations.push(Violation::new(
                    "sortBy",
                    format!("must be one of: {}", self.sortable.join(", ")),
                    raw,
                ));
            }
            field
        });

        let order = present(params, "order").and_then(|raw| {
            collect(
                SortOrder::from_str(raw)
                    .map_err(|_| Violation::new("order", "must be 'asc' or 'desc'", raw)),
                &mut violations,
            )
        });

        let page = present(params, "page")
            .and_then(|raw| collect(parse_positive("page", raw), &mut violations));
        let limit = present(params, "limit")
            .and_then(|raw| collect(parse_positive("limit", raw), &mut violations))
            .map(|limit| limit.min(MAX_LIMIT));

        // the store takes skip as a signed 64-bit count
        if let Some(number) = page {
            let size = limit.unwrap_or(DEFAULT_LIMIT);
            let within = (number - 1)
                .checked_mul(size)
                .is_some_and(|skip| i64::try_from(skip).is_ok());
            if !within {
                violations.push(Violation::new(
                    "page",
                    "is beyond the last addressable page",
                    &number.to_string(),
                ));
            }
        }

        if !violations.is_empty() {
            tracing::debug!(count = violations.len(), "Query parameters rejected");
            return Err(violations);
        }

        Ok(CheckedParams {
            policy: self,
            values,
            sort_by,
            order,
            page,
            limit,
        })
    }
}
