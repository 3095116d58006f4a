//! In-memory stand-in for a MongoDB collection.
//!
//! Documents are held as BSON and queried with the same [`QuerySpec`] the
//! MongoDB repositories render, so handler tests exercise real filter, sort
//! and pagination semantics without a server. Unique fields are enforced on
//! insert and replace.
//!
//! ```
//! use mongodb::bson::{doc, oid::ObjectId, Document};
//! use query_filter::{Condition, Filter};
//! use test_utils::MemoryCollection;
//!
//! let products = MemoryCollection::new().unique("sku");
//! products.insert(&doc! { "_id": ObjectId::new(), "sku": "A-1", "price": 20.0 }).unwrap();
//! assert!(products.insert(&doc! { "_id": ObjectId::new(), "sku": "A-1" }).is_err());
//!
//! let cheap = Filter::new(vec![Condition::Contains { path: "sku", needle: "a-".into() }]);
//! assert_eq!(products.count(&cheap), 1);
//! ```

use std::cmp::Ordering;
use std::sync::Mutex;

use mongodb::bson::{self, Bson, Document, oid::ObjectId};
use query_filter::{Condition, Filter, QuerySpec, Sort, SortOrder};
use regex::RegexBuilder;
use serde::{Serialize, de::DeserializeOwned};

/// Write rejected by the in-memory collection
#[derive(Debug, Clone, PartialEq)]
pub enum MemoryError {
    DuplicateKey { field: String, value: String },
    Serialization(String),
}

impl std::fmt::Display for MemoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MemoryError::DuplicateKey { field, value } => {
                write!(f, "duplicate key: {{ {field}: {value} }}")
            }
            MemoryError::Serialization(message) => write!(f, "serialization: {message}"),
        }
    }
}

impl std::error::Error for MemoryError {}

#[derive(Debug, Default)]
pub struct MemoryCollection {
    documents: Mutex<Vec<Document>>,
    unique: Vec<&'static str>,
    text_fields: Vec<&'static str>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enforce uniqueness of `field`
    pub fn unique(mut self, field: &'static str) -> Self {
        self.unique.push(field);
        self
    }

    /// Fields searched by `$text` conditions
    pub fn text_index(mut self, fields: &[&'static str]) -> Self {
        self.text_fields.extend_from_slice(fields);
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Document>> {
        self.documents.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn to_document<T: Serialize>(value: &T) -> Result<Document, MemoryError> {
        bson::to_document(value).map_err(|e| MemoryError::Serialization(e.to_string()))
    }

    fn from_document<T: DeserializeOwned>(document: &Document) -> T {
        bson::from_document(document.clone()).expect("stored document deserializes")
    }

    fn check_unique(
        &self,
        documents: &[Document],
        candidate: &Document,
        skip_id: Option<&Bson>,
    ) -> Result<(), MemoryError> {
        for field in &self.unique {
            let Some(value) = lookup(candidate, field) else {
                continue;
            };
            let taken = documents
                .iter()
                .filter(|existing| skip_id.is_none_or(|id| existing.get("_id") != Some(id)))
                .any(|existing| lookup(existing, field) == Some(value));
            if taken {
                return Err(MemoryError::DuplicateKey {
                    field: field.to_string(),
                    value: display(value),
                });
            }
        }
        Ok(())
    }

    pub fn insert<T: Serialize>(&self, value: &T) -> Result<(), MemoryError> {
        let document = Self::to_document(value)?;
        let mut documents = self.lock();
        self.check_unique(&documents, &document, None)?;
        documents.push(document);
        Ok(())
    }

    /// Replace the document with the same `_id`; `false` when there is none
    pub fn replace<T: Serialize>(&self, value: &T) -> Result<bool, MemoryError> {
        let document = Self::to_document(value)?;
        let Some(id) = document.get("_id").cloned() else {
            return Ok(false);
        };
        let mut documents = self.lock();
        self.check_unique(&documents, &document, Some(&id))?;
        match documents.iter_mut().find(|existing| existing.get("_id") == Some(&id)) {
            Some(slot) => {
                *slot = document;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn delete(&self, id: ObjectId) -> bool {
        let mut documents = self.lock();
        let before = documents.len();
        documents.retain(|document| document.get_object_id("_id").ok() != Some(id));
        documents.len() != before
    }

    pub fn find_by_id<T: DeserializeOwned>(&self, id: ObjectId) -> Option<T> {
        self.lock()
            .iter()
            .find(|document| document.get_object_id("_id").ok() == Some(id))
            .map(Self::from_document)
    }

    pub fn find_by_ids<T: DeserializeOwned>(&self, ids: &[ObjectId]) -> Vec<T> {
        self.lock()
            .iter()
            .filter(|document| {
                document
                    .get_object_id("_id")
                    .is_ok_and(|id| ids.contains(&id))
            })
            .map(Self::from_document)
            .collect()
    }

    /// Documents where `field` equals `value`, excluding `_id == exclude`
    pub fn exists_where(&self, field: &str, value: impl Into<Bson>, exclude: Option<ObjectId>) -> bool {
        let value = value.into();
        self.lock().iter().any(|document| {
            lookup(document, field) == Some(&value)
                && exclude.is_none_or(|id| document.get_object_id("_id").ok() != Some(id))
        })
    }

    pub fn find<T: DeserializeOwned>(&self, query: &QuerySpec) -> Vec<T> {
        let mut matching: Vec<Document> = self
            .lock()
            .iter()
            .filter(|document| self.matches(document, &query.filter))
            .cloned()
            .collect();

        matching.sort_by(|a, b| compare_for_sort(a, b, &query.sort));

        let skip = usize::try_from(query.skip()).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.limit()).unwrap_or(usize::MAX);
        matching
            .iter()
            .skip(skip)
            .take(limit)
            .map(Self::from_document)
            .collect()
    }

    pub fn count(&self, filter: &Filter) -> u64 {
        self.lock()
            .iter()
            .filter(|document| self.matches(document, filter))
            .count() as u64
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn matches(&self, document: &Document, filter: &Filter) -> bool {
        filter
            .conditions()
            .iter()
            .all(|condition| self.satisfies(document, condition))
    }

    fn satisfies(&self, document: &Document, condition: &Condition) -> bool {
        match condition {
            Condition::Equals { path, value } => {
                lookup(document, path) == Some(&Bson::from(value.clone()))
            }
            Condition::Contains { path, needle } => {
                let Ok(pattern) = RegexBuilder::new(&Condition::contains_pattern(needle))
                    .case_insensitive(true)
                    .build()
                else {
                    return false;
                };
                lookup(document, path)
                    .and_then(Bson::as_str)
                    .is_some_and(|text| pattern.is_match(text))
            }
            Condition::Between { path, min, max } => {
                let Some(value) = lookup(document, path).and_then(as_number) else {
                    return min.is_none() && max.is_none();
                };
                min.is_none_or(|min| value >= min.as_f64()) && max.is_none_or(|max| value <= max.as_f64())
            }
            Condition::Search(text) => {
                let terms: Vec<String> = text.split_whitespace().map(str::to_lowercase).collect();
                self.text_fields.iter().any(|field| {
                    lookup(document, field)
                        .and_then(Bson::as_str)
                        .map(str::to_lowercase)
                        .is_some_and(|value| terms.iter().any(|term| value.contains(term)))
                })
            }
        }
    }
}

/// Resolve a dotted path
fn lookup<'a>(document: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut segments = path.split('.');
    let mut current = document.get(segments.next()?)?;
    for segment in segments {
        current = current.as_document()?.get(segment)?;
    }
    Some(current)
}

fn as_number(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(n) => Some(f64::from(*n)),
        Bson::Int64(n) => Some(*n as f64),
        Bson::Double(n) => Some(*n),
        _ => None,
    }
}

fn display(value: &Bson) -> String {
    match value {
        Bson::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn compare_bson(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => match (as_number(a), as_number(b)) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => match (a, b) {
                (Bson::String(x), Bson::String(y)) => x.cmp(y),
                (Bson::DateTime(x), Bson::DateTime(y)) => x.cmp(y),
                (Bson::Boolean(x), Bson::Boolean(y)) => x.cmp(y),
                (Bson::ObjectId(x), Bson::ObjectId(y)) => x.bytes().cmp(&y.bytes()),
                _ => Ordering::Equal,
            },
        },
    }
}

fn compare_for_sort(a: &Document, b: &Document, sort: &Sort) -> Ordering {
    let ordering = compare_bson(lookup(a, &sort.field), lookup(b, &sort.field))
        .then_with(|| compare_bson(a.get("_id"), b.get("_id")));
    match sort.order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;
    use query_filter::{Number, Page, Scalar};

    fn query(conditions: Vec<Condition>, field: &str, order: SortOrder, number: u64, size: u64) -> QuerySpec {
        QuerySpec {
            filter: Filter::new(conditions),
            sort: Sort {
                field: field.to_string(),
                order,
            },
            page: Page { number, size },
            populate: None,
        }
    }

    fn priced() -> MemoryCollection {
        let collection = MemoryCollection::new()
            .unique("sku")
            .text_index(&["name", "supplier.name"]);
        for (sku, price, name) in [
            ("P-5", 5.0, "Pencil"),
            ("P-20", 20.0, "Wireless Mouse"),
            ("P-30", 30.0, "Keyboard"),
            ("P-45", 45.0, "Monitor Stand"),
            ("P-60", 60.0, "Desk Lamp"),
        ] {
            collection
                .insert(&doc! {
                    "_id": ObjectId::new(),
                    "sku": sku,
                    "price": price,
                    "name": name,
                    "supplier": { "name": "Acme Office" },
                })
                .unwrap();
        }
        collection
    }

    #[test]
    fn test_range_sort_and_page() {
        let collection = priced();
        let between = Condition::Between {
            path: "price",
            min: Some(Number::Decimal(10.0)),
            max: Some(Number::Decimal(50.0)),
        };

        let page: Vec<Document> =
            collection.find(&query(vec![between.clone()], "price", SortOrder::Asc, 1, 2));
        let prices: Vec<f64> = page.iter().map(|d| d.get_f64("price").unwrap()).collect();
        assert_eq!(prices, vec![20.0, 30.0]);
        assert_eq!(collection.count(&Filter::new(vec![between])), 3);
    }

    #[test]
    fn test_descending_second_page() {
        let collection = priced();
        let page: Vec<Document> = collection.find(&query(vec![], "price", SortOrder::Desc, 2, 2));
        let prices: Vec<f64> = page.iter().map(|d| d.get_f64("price").unwrap()).collect();
        assert_eq!(prices, vec![30.0, 20.0]);
    }

    #[test]
    fn test_contains_and_dotted_paths() {
        let collection = priced();
        let filter = Filter::new(vec![Condition::Contains {
            path: "supplier.name",
            needle: "acme".to_string(),
        }]);
        assert_eq!(collection.count(&filter), 5);
    }

    #[test]
    fn test_text_search_matches_any_term() {
        let collection = priced();
        let filter = Filter::new(vec![Condition::Search("mouse lamp".to_string())]);
        assert_eq!(collection.count(&filter), 2);
    }

    #[test]
    fn test_unique_field_is_enforced() {
        let collection = priced();
        let error = collection
            .insert(&doc! { "_id": ObjectId::new(), "sku": "P-5" })
            .unwrap_err();
        assert_eq!(
            error,
            MemoryError::DuplicateKey {
                field: "sku".to_string(),
                value: "P-5".to_string()
            }
        );
    }

    #[test]
    fn test_replace_and_delete() {
        let collection = MemoryCollection::new().unique("name");
        let id = ObjectId::new();
        collection.insert(&doc! { "_id": id, "name": "Tools", "isActive": true }).unwrap();
        collection.insert(&doc! { "_id": ObjectId::new(), "name": "Garden" }).unwrap();

        assert!(collection.replace(&doc! { "_id": id, "name": "Tools", "isActive": false }).unwrap());
        let flag = Filter::new(vec![Condition::Equals {
            path: "isActive",
            value: Scalar::Flag(false),
        }]);
        assert_eq!(collection.count(&flag), 1);

        assert!(collection.replace(&doc! { "_id": id, "name": "Garden" }).is_err());
        assert!(collection.delete(id));
        assert!(!collection.delete(id));
        assert_eq!(collection.len(), 1);
    }
}
