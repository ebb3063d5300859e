//! Error types for the metadata model

use thiserror::Error;

/// Result type alias for model operations
pub type ModelResult<T> = Result<T, ModelError>;

/// Error type for model construction
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// A primitive was attached to a struct-kind node
    #[error("cannot attach primitive {primitive} to struct {name}")]
    PrimitiveOnStruct { name: String, primitive: String },
}
