//! Custom extractors for Axum handlers.
//!
//! Each extractor is one piece of the validation gate: it rejects malformed
//! input with an [`AppError`](crate::errors::AppError) before the handler runs.

pub mod delete_mode;
pub mod filter_query;
pub mod object_id_path;
pub mod validated_json;

pub use delete_mode::DeleteMode;
pub use filter_query::FilterQuery;
pub use object_id_path::ObjectIdPath;
pub use validated_json::ValidatedJson;
