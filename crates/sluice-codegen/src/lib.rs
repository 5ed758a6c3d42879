#![forbid(unsafe_code)]
//! sluice-codegen: turns an optimized relational plan into the source text
//! of a linear streaming pipeline.
//!
//! One stage is emitted per plan node, in post-order, so the emission
//! order is also the pipeline order. Scalar sub-expressions are compiled
//! through the `ExprCompiler` seam; aggregate calls are matched to a
//! concrete implementation by the `FunctionRegistry`. The emitted text
//! targets the `sluice-runtime` stage-handler convention.
//!
//! Compilation is single-threaded, single-pass, and atomic: on any error
//! the caller discards the whole sink.

pub mod compiler;
pub mod emit;
pub mod error;
pub mod expr;
pub mod resolve;

pub use compiler::PlanCompiler;
pub use emit::stage_name;
pub use error::{Error, Result};
pub use expr::{BasicExprCompiler, CompiledExpr, ExprCompiler};
pub use resolve::{builtins, FunctionRegistry, TypeMatch};
