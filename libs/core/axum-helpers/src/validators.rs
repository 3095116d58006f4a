//! Custom `validator` functions shared by request bodies.
//!
//! ```rust,ignore
//! #[derive(Deserialize, Validate)]
//! struct CreateProduct {
//!     #[validate(custom(function = "axum_helpers::validators::object_id"))]
//!     category: String,
//!     #[validate(custom(function = "axum_helpers::validators::url_list"))]
//!     images: Vec<String>,
//! }
//! ```

use std::borrow::Cow;

use mongodb::bson::oid::ObjectId;
use validator::{ValidateUrl, ValidationError};

/// The value must be a 24 character hex ObjectId
pub fn object_id(value: &str) -> Result<(), ValidationError> {
    if ObjectId::parse_str(value).is_ok() {
        return Ok(());
    }
    let mut error = ValidationError::new("object_id")
        .with_message(Cow::Borrowed("must be a valid identifier"));
    error.add_param(Cow::Borrowed("value"), &value);
    Err(error)
}

/// Every entry must be a URL; the first bad entry is reported with its index
#[allow(clippy::ptr_arg)]
pub fn url_list(urls: &Vec<String>) -> Result<(), ValidationError> {
    match urls.iter().position(|url| !url.validate_url()) {
        None => Ok(()),
        Some(index) => {
            let mut error =
                ValidationError::new("url").with_message(Cow::Borrowed("must be a valid URL"));
            error.add_param(Cow::Borrowed("index"), &index);
            error.add_param(Cow::Borrowed("value"), &urls[index]);
            Err(error)
        }
    }
}
