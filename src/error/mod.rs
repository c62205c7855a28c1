mod catalog;
mod validation;

pub use catalog::{CatalogError, ErrorBody, ErrorReport};
pub use validation::{FieldIssue, Validate, ValidationErrors};
