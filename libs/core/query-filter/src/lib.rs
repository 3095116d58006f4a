//! Query compiler for list endpoints.
//!
//! Each filterable entity declares a static [`QueryPolicy`]: which request
//! parameters it understands, how each one is compared against the stored
//! document, which fields may be sorted on and which references are resolved
//! in the response. Turning a request into a database query is then a two-step
//! pipeline:
//!
//! ```text
//! raw params ──check──▶ CheckedParams ──compile──▶ QuerySpec ──▶ BSON filter / sort / skip / limit
//!               │
//!               └── Vec<Violation> (every problem, not just the first)
//! ```
//!
//! [`QueryPolicy::check`] is the only fallible step. [`compile`] is a pure
//! function over already-typed values.
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//! use query_filter::{compile, FieldRule, MatchMode, NumberKind, QueryPolicy, SortOrder};
//!
//! static POLICY: QueryPolicy = QueryPolicy {
//!     fields: &[
//!         FieldRule::new("name", "name", MatchMode::Contains),
//!         FieldRule::new("price", "price", MatchMode::Range(NumberKind::Decimal)),
//!     ],
//!     sortable: &["name", "price"],
//!     default_sort: "name",
//!     default_order: SortOrder::Asc,
//!     populate: None,
//! };
//!
//! let params = HashMap::from([("priceMin".to_string(), "10".to_string())]);
//! let checked = POLICY.check(&params).unwrap();
//! let query = compile(&checked);
//! assert_eq!(query.skip(), 0);
//! assert!(query.filter.to_document().contains_key("price"));
//! ```

pub mod check;
pub mod compile;
pub mod policy;
pub mod populate;
pub mod spec;

use std::collections::HashMap;

pub use check::{CheckedParams, Violation};
pub use compile::compile;
pub use policy::{
    DEFAULT_LIMIT, DEFAULT_PAGE, FieldRule, Filterable, MAX_LIMIT, MatchMode, NumberKind,
    QueryPolicy, SortOrder,
};
pub use populate::{PopulateSpec, Reference};
pub use spec::{Condition, Filter, Number, Page, QuerySpec, Scalar, Sort};

/// Flat request query parameters as received on the wire.
pub type RawParams = HashMap<String, String>;
