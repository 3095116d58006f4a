//! Reference population: resolving stored ids into embedded records.
//!
//! Population is an explicit second step after the primary fetch. A
//! [`PopulateSpec`] names the reference path, the projection applied to the
//! resolved record and, optionally, one further level to resolve on that
//! record. Resolution depth is therefore bounded by the static spec.

use std::collections::HashMap;

use mongodb::bson::{oid::ObjectId, serde_helpers::serialize_object_id_as_hex_string};
use serde::Serialize;

/// Which reference to resolve and how much of the target to keep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopulateSpec {
    pub path: &'static str,
    /// Fields kept on the resolved record (`_id` is always kept); `None` keeps all
    pub select: Option<&'static [&'static str]>,
    pub nested: Option<&'static PopulateSpec>,
}

impl PopulateSpec {
    pub const fn new(path: &'static str) -> Self {
        Self {
            path,
            select: None,
            nested: None,
        }
    }

    pub const fn select(mut self, fields: &'static [&'static str]) -> Self {
        self.select = Some(fields);
        self
    }

    pub const fn nested(mut self, nested: &'static PopulateSpec) -> Self {
        self.nested = Some(nested);
        self
    }

    /// Whether `field` survives the projection
    pub fn selects(&self, field: &str) -> bool {
        self.select.is_none_or(|fields| fields.contains(&field))
    }

    /// Number of transitive levels resolved below this one
    pub fn depth(&self) -> usize {
        self.nested.map_or(0, |nested| 1 + nested.depth())
    }

    /// Spec for the nested reference, if it is this `path`
    pub fn nested_for(&self, path: &str) -> Option<&'static PopulateSpec> {
        self.nested.filter(|nested| nested.path == path)
    }
}

/// A reference field as it appears in a response
///
/// - `Id`: not resolved (beyond the requested depth)
/// - `Resolved`: the embedded target record
/// - `Dangling`: resolution was requested but the target does not exist; renders as `null`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Reference<T> {
    Id(#[serde(serialize_with = "serialize_object_id_as_hex_string")] ObjectId),
    Resolved(Box<T>),
    Dangling,
}

impl<T: Clone> Reference<T> {
    /// Look `id` up in a batch of resolved targets
    pub fn lookup(id: ObjectId, resolved: &HashMap<ObjectId, T>) -> Self {
        match resolved.get(&id) {
            Some(target) => Reference::Resolved(Box::new(target.clone())),
            None => Reference::Dangling,
        }
    }
}

impl<T> Reference<T> {
    pub fn resolved(&self) -> Option<&T> {
        match self {
            Reference::Resolved(target) => Some(target),
            _ => None,
        }
    }
}
