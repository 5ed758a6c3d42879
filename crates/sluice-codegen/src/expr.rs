//! Expression-compiler seam.
//!
//! The plan compiler is agnostic about how scalar expressions become code:
//! it asks an `ExprCompiler` for a fragment plus its nullability and
//! splices the fragment into the stage body. `BasicExprCompiler` is the
//! reference implementation covering column references, literals, and
//! comparison/boolean operators over one input schema; a richer frontend
//! can plug in its own.

use sluice_core::expr::{BinaryOp, ScalarExpr};
use sluice_core::schema::Schema;
use sluice_core::types::Scalar;

use crate::error::{Error, Result};

/// A compiled scalar expression: a Rust expression over the in-scope
/// binding `row`, plus whether its value can be `Null`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledExpr {
    pub fragment: String,
    pub nullable: bool,
}

pub trait ExprCompiler {
    fn compile(&mut self, expr: &ScalarExpr) -> Result<CompiledExpr>;
}

/// Compiles expressions against a fixed input-column nullability vector.
#[derive(Debug, Clone)]
pub struct BasicExprCompiler {
    nullable: Vec<bool>,
}

impl BasicExprCompiler {
    pub fn new(nullable: Vec<bool>) -> Self {
        Self { nullable }
    }

    pub fn for_schema(schema: &Schema) -> Self {
        Self::new(schema.nullability())
    }
}

impl ExprCompiler for BasicExprCompiler {
    fn compile(&mut self, expr: &ScalarExpr) -> Result<CompiledExpr> {
        match expr {
            ScalarExpr::Column(idx) => {
                let nullable = *self.nullable.get(*idx).ok_or_else(|| {
                    Error::Expr(format!("column {idx} out of range for input schema"))
                })?;
                Ok(CompiledExpr {
                    fragment: format!("row[{idx}].clone()"),
                    nullable,
                })
            }
            ScalarExpr::Literal(v) => Ok(CompiledExpr {
                fragment: literal_fragment(v),
                nullable: v.is_null(),
            }),
            ScalarExpr::Binary { op, lhs, rhs } => {
                let l = self.compile(lhs)?;
                let r = self.compile(rhs)?;
                Ok(CompiledExpr {
                    fragment: format!(
                        "sluice_runtime::ops::{}({}, {})",
                        op_fn(*op),
                        l.fragment,
                        r.fragment
                    ),
                    nullable: l.nullable || r.nullable,
                })
            }
        }
    }
}

fn op_fn(op: BinaryOp) -> &'static str {
    use BinaryOp::*;
    match op {
        Eq => "eq",
        NotEq => "not_eq",
        Lt => "lt",
        LtEq => "lt_eq",
        Gt => "gt",
        GtEq => "gt_eq",
        And => "and",
        Or => "or",
    }
}

fn literal_fragment(v: &Scalar) -> String {
    match v {
        Scalar::Null => "sluice_runtime::Scalar::Null".to_string(),
        Scalar::Bool(b) => format!("sluice_runtime::Scalar::Bool({b})"),
        Scalar::I32(n) => format!("sluice_runtime::Scalar::I32({n})"),
        Scalar::I64(n) => format!("sluice_runtime::Scalar::I64({n})"),
        Scalar::F64(f) => format!("sluice_runtime::Scalar::F64({f:?})"),
        Scalar::Str(s) => format!("sluice_runtime::Scalar::Str({s:?}.to_string())"),
    }
}
