//! Shared test utilities for domain testing
//!
//! This crate provides reusable test infrastructure for the domain crates:
//! - `TestMongo`: MongoDB container with automatic cleanup (feature: "mongo")
//! - `MemoryCollection`: in-memory collection that evaluates compiled queries (always available)
//! - `TestDataBuilder`: Deterministic test data generation (always available)
//! - `assertions`: Custom assertion helpers (always available)
//!
//! # Features
//!
//! - `mongo` (default): Enables the MongoDB container
//!
//! # Usage
//!
//! ```rust,no_run
//! use test_utils::{TestDataBuilder, TestMongo};
//!
//! #[tokio::test]
//! #[ignore = "requires Docker"]
//! async fn my_mongo_test() {
//!     let mongo = TestMongo::new().await;
//!     let builder = TestDataBuilder::from_test_name("my_test");
//!
//!     let db = mongo.database(&builder.name("db", "main"));
//!     let sku = builder.sku("main");
//! }
//! ```

use mongodb::bson::oid::ObjectId;

pub mod memory;

#[cfg(feature = "mongo")]
mod mongo;

pub use memory::{MemoryCollection, MemoryError};

#[cfg(feature = "mongo")]
pub use mongo::TestMongo;

/// Builder for test data with deterministic randomization
///
/// This ensures tests are reproducible by using seeded data.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    /// Create a new builder with a seed (for deterministic tests)
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Create from test name (generates seed from test name hash)
    ///
    /// # Example
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::from_test_name("test_create_product");
    /// ```
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// Deterministic ObjectId derived from the seed and `n`
    pub fn object_id(&self, n: u32) -> ObjectId {
        let mut bytes = [0u8; 12];
        bytes[..8].copy_from_slice(&self.seed.to_be_bytes());
        bytes[8..].copy_from_slice(&n.to_be_bytes());
        ObjectId::from_bytes(bytes)
    }

    /// Generate a unique name for testing
    ///
    /// # Example
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::new(7);
    /// assert_eq!(builder.name("category", "main"), "test-category-7-main");
    /// ```
    pub fn name(&self, prefix: &str, suffix: &str) -> String {
        format!("test-{}-{}-{}", prefix, self.seed, suffix)
    }

    /// SKU within the 3-20 character, letters/digits/hyphens format
    pub fn sku(&self, suffix: &str) -> String {
        let mut sku = format!("T{:X}-{}", self.seed % 0xFFFF_FFFF, suffix.to_uppercase());
        sku.retain(|c| c.is_ascii_alphanumeric() || c == '-');
        sku.truncate(20);
        sku
    }
}

/// Test assertion helpers
pub mod assertions {
    use mongodb::bson::oid::ObjectId;

    /// Assert that a JSON `_id` is the hex form of `expected`
    pub fn assert_id_eq(actual: &str, expected: ObjectId, context: &str) {
        assert_eq!(
            actual,
            expected.to_hex(),
            "{}: expected id {}, got {}",
            context,
            expected,
            actual
        );
    }

    /// Assert that an optional value is Some
    pub fn assert_some<T>(value: Option<T>, context: &str) -> T {
        value.unwrap_or_else(|| panic!("{}: expected Some, got None", context))
    }
}
