//! Error type of the crate.

use thiserror::Error;

/// Errors raised while converting between geometry representations.
#[derive(Debug, Error, PartialEq)]
pub enum TypesError {
    /// Input cannot be represented as the requested geometry.
    #[error("conversion error: {0}")]
    Conversion(String),
}
