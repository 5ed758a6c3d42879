//! Lightweight value model for tuples flowing between generated stages.
//!
//! The generated pipeline is dynamically typed over `Scalar`; the plan
//! compiler guarantees (via the function resolver) that values reaching an
//! aggregate implementation have the declared type.

use serde::{Deserialize, Serialize};

use crate::schema::DataType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Scalar {
    Null,
    Bool(bool),
    I32(i32),
    I64(i64),
    F64(f64),
    Str(String),
}

impl Scalar {
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Scalar::Null => None,
            Scalar::Bool(_) => Some(DataType::Boolean),
            Scalar::I32(_) => Some(DataType::Int32),
            Scalar::I64(_) => Some(DataType::Int64),
            Scalar::F64(_) => Some(DataType::Float64),
            Scalar::Str(_) => Some(DataType::Utf8),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    /// Truthiness as filter stages test it: only `Bool(true)` passes.
    pub fn is_true(&self) -> bool {
        matches!(self, Scalar::Bool(true))
    }
}

/// One row of column values. `Option<Tuple>` is the unit of delivery to a
/// stage; `None` is the end-of-stream sentinel.
pub type Tuple = Vec<Scalar>;
