//! Compile-time (plan-validity) failures. None of these are retryable:
//! they abort the walk and the whole sink is discarded.

use sluice_core::schema::DataType;
use thiserror::Error;

/// Canonical result for codegen.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("aggregate function {0} not implemented")]
    UnsupportedFunction(String),

    #[error("aggregate function {name} not implemented for type {ty:?}")]
    UnsupportedType { name: String, ty: DataType },

    #[error("aggregate call {0} should have exactly one argument")]
    InvalidArgumentCount(String),

    #[error("count over filtered or nullable input is unsupported ({0})")]
    UnsupportedSemantics(String),

    #[error("expression compilation: {0}")]
    Expr(String),

    #[error(transparent)]
    Fmt(#[from] std::fmt::Error),
}
