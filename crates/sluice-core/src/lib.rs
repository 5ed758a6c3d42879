#![forbid(unsafe_code)]
//! sluice-core: the data model shared by the plan compiler and the
//! generated-pipeline runtime.
//!
//! This crate is pure data: the relational plan tree produced by an
//! external optimizer, the scalar expression AST handed to the expression
//! compiler, schemas, and the aggregate call/descriptor types the
//! function resolver works with. No I/O, no codegen, no execution here.

pub mod error;
pub mod expr;
pub mod funcs;
pub mod id;
pub mod plan;
pub mod prelude;
pub mod schema;
pub mod types;
