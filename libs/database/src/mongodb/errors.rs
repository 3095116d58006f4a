//! Classification of MongoDB write failures that callers turn into client errors.

use std::sync::LazyLock;

use mongodb::error::{Error, ErrorKind, WriteFailure};
use regex::Regex;

/// Server code for a unique index violation
pub const DUPLICATE_KEY_CODE: i32 = 11000;
/// Server code for a `$jsonSchema` / validator rejection
pub const DOCUMENT_VALIDATION_CODE: i32 = 121;

static DUP_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"dup key: \{\s*"?([^":\s]+)"?\s*:\s*(.*?)\s*\}"#).expect("valid dup key regex")
});

/// What a failed write means for the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreFailure {
    /// A unique index rejected `value` for `field`
    DuplicateKey { field: String, value: String },
    /// The collection validator rejected the document
    DocumentValidation(String),
    /// Anything else; not the client's fault
    Other,
}

/// Server error code and message, when the failure came from the server
fn server_error(error: &Error) -> Option<(i32, &str)> {
    match error.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write)) => Some((write.code, &write.message)),
        ErrorKind::Command(command) => Some((command.code, &command.message)),
        _ => None,
    }
}

/// Pull `field` and `value` out of an `E11000 ... dup key: { field: value }` message
fn parse_duplicate_key(message: &str) -> (String, String) {
    DUP_KEY
        .captures(message)
        .map(|captures| {
            let field = captures[1].to_string();
            let value = captures[2].trim_matches('"').to_string();
            (field, value)
        })
        .unwrap_or_else(|| ("unknown".to_string(), "unknown".to_string()))
}

/// Classify a driver error
pub fn classify(error: &Error) -> StoreFailure {
    match server_error(error) {
        Some((DUPLICATE_KEY_CODE, message)) => {
            let (field, value) = parse_duplicate_key(message);
            StoreFailure::DuplicateKey { field, value }
        }
        Some((DOCUMENT_VALIDATION_CODE, message)) => {
            StoreFailure::DocumentValidation(message.to_string())
        }
        _ => StoreFailure::Other,
    }
}
