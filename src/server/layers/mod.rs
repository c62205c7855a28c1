//! Cross-cutting middleware wrapped around the catalog router.

pub mod errors;
pub mod security;
pub mod statics;
