#![forbid(unsafe_code)]
//! sluice: the code-generation backend of a SQL-on-streams compiler.
//!
//! Takes an optimized relational plan tree and emits a linear sequence of
//! named processing stages implementing the query as a streaming
//! pipeline. See `sluice-codegen` for the compiler, `sluice-runtime` for
//! the stage-handler convention the generated code targets, and
//! `sluice-core` for the shared data model.

pub use sluice_codegen as codegen;
pub use sluice_core as core;
pub use sluice_runtime as runtime;
