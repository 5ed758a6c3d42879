//! Scalar expression AST consumed by the expression compiler.
//!
//! An already-validated optimizer hands these in; the plan compiler never
//! evaluates them, it only asks an `ExprCompiler` for a code fragment.

use serde::{Deserialize, Serialize};

use crate::types::Scalar;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScalarExpr {
    /// Zero-based input column reference.
    Column(usize),
    Literal(Scalar),
    Binary {
        op: BinaryOp,
        lhs: Box<ScalarExpr>,
        rhs: Box<ScalarExpr>,
    },
}

impl ScalarExpr {
    pub fn column(idx: usize) -> Self {
        ScalarExpr::Column(idx)
    }

    pub fn literal(v: Scalar) -> Self {
        ScalarExpr::Literal(v)
    }

    pub fn binary(op: BinaryOp, lhs: ScalarExpr, rhs: ScalarExpr) -> Self {
        ScalarExpr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }
}
