//! Convenient re-exports for downstream crates.

pub use crate::error::{Error, Result};
pub use crate::expr::{BinaryOp, ScalarExpr};
pub use crate::funcs::AggDescriptor;
pub use crate::id::NodeId;
pub use crate::plan::{AggCall, PlanNode, PlanOp};
pub use crate::schema::{DataType, Field, Schema};
pub use crate::types::{Scalar, Tuple};
