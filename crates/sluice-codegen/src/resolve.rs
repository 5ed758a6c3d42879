//! Aggregate function resolution.
//!
//! A registry maps a function name to an ordered list of
//! `(TypeMatch, AggDescriptor)` entries. Resolution is a linear scan that
//! takes the first entry whose declared type matches exactly *or* is
//! generic — registration order is the tie-break. An earlier generic entry
//! therefore wins over a later exact match; callers who care must control
//! registration order.
//!
//! User-defined calls carry their descriptor inline and bypass the
//! registry entirely.

use std::collections::HashMap;

use sluice_core::funcs::AggDescriptor;
use sluice_core::plan::AggCall;
use sluice_core::schema::DataType;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeMatch {
    Exact(DataType),
    /// Accepts any requested result type.
    Generic,
}

impl TypeMatch {
    fn matches(&self, ty: DataType) -> bool {
        match self {
            TypeMatch::Generic => true,
            TypeMatch::Exact(t) => *t == ty,
        }
    }
}

/// Ordered implementation table for built-in aggregate functions.
#[derive(Debug, Default)]
pub struct FunctionRegistry {
    table: HashMap<String, Vec<(TypeMatch, AggDescriptor)>>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        matcher: TypeMatch,
        descriptor: AggDescriptor,
    ) {
        self.table
            .entry(name.into())
            .or_default()
            .push((matcher, descriptor));
    }

    pub fn lookup(&self, name: &str) -> Option<&[(TypeMatch, AggDescriptor)]> {
        self.table.get(name).map(|v| v.as_slice())
    }

    /// Resolves one aggregate call to a concrete descriptor.
    pub fn resolve(&self, call: &AggCall) -> Result<AggDescriptor> {
        if let Some(udf) = &call.udf {
            return Ok(udf.clone());
        }
        let entries = self
            .lookup(&call.name)
            .ok_or_else(|| Error::UnsupportedFunction(call.name.clone()))?;
        entries
            .iter()
            .find(|(m, _)| m.matches(call.result_type))
            .map(|(_, d)| d.clone())
            .ok_or_else(|| Error::UnsupportedType {
                name: call.name.clone(),
                ty: call.result_type,
            })
    }
}

/// The built-in table, in its contractual registration order.
pub fn builtins() -> FunctionRegistry {
    let mut reg = FunctionRegistry::new();

    reg.register(
        "COUNT",
        TypeMatch::Generic,
        AggDescriptor::fixed("sluice_runtime::builtin::count"),
    );

    reg.register(
        "SUM",
        TypeMatch::Exact(DataType::Int32),
        AggDescriptor::fixed("sluice_runtime::builtin::sum_i32"),
    );
    reg.register(
        "SUM",
        TypeMatch::Exact(DataType::Int64),
        AggDescriptor::fixed("sluice_runtime::builtin::sum_i64"),
    );
    reg.register(
        "SUM",
        TypeMatch::Exact(DataType::Float64),
        AggDescriptor::fixed("sluice_runtime::builtin::sum_f64"),
    );

    reg.register(
        "MIN",
        TypeMatch::Generic,
        AggDescriptor::fixed("sluice_runtime::builtin::min"),
    );
    reg.register(
        "MAX",
        TypeMatch::Generic,
        AggDescriptor::fixed("sluice_runtime::builtin::max"),
    );

    reg.register(
        "AVG",
        TypeMatch::Exact(DataType::Int64),
        AggDescriptor::stateful(
            "sluice_runtime::builtin::avg_i64",
            "sluice_runtime::builtin::avg_i64::Instance",
        ),
    );
    reg.register(
        "AVG",
        TypeMatch::Exact(DataType::Float64),
        AggDescriptor::stateful(
            "sluice_runtime::builtin::avg_f64",
            "sluice_runtime::builtin::avg_f64::Instance",
        ),
    );

    reg
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str, ty: DataType) -> AggCall {
        AggCall::new(name, vec![1], ty)
    }

    #[test]
    fn exact_type_lookup() {
        let reg = builtins();
        let d = reg.resolve(&call("SUM", DataType::Int64)).unwrap();
        assert_eq!(d.symbol, "sluice_runtime::builtin::sum_i64");
        assert!(d.is_static());
    }

    #[test]
    fn generic_entry_accepts_any_type() {
        let reg = builtins();
        let d = reg.resolve(&call("MAX", DataType::Utf8)).unwrap();
        assert_eq!(d.symbol, "sluice_runtime::builtin::max");
    }

    #[test]
    fn unknown_function_is_unsupported() {
        let reg = builtins();
        let err = reg.resolve(&call("MEDIAN", DataType::Int64)).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFunction(_)));
    }

    #[test]
    fn known_function_without_type_entry_is_unsupported_type() {
        let reg = builtins();
        let err = reg.resolve(&call("SUM", DataType::Utf8)).unwrap_err();
        assert!(matches!(err, Error::UnsupportedType { .. }));
    }

    #[test]
    fn registration_order_beats_exact_match() {
        // A generic entry registered before an exact-type entry wins even
        // for the exact type; order is the documented tie-break.
        let mut reg = FunctionRegistry::new();
        reg.register("SUM", TypeMatch::Generic, AggDescriptor::fixed("generic"));
        reg.register(
            "SUM",
            TypeMatch::Exact(DataType::Int64),
            AggDescriptor::fixed("exact"),
        );
        let d = reg.resolve(&call("SUM", DataType::Int64)).unwrap();
        assert_eq!(d.symbol, "generic");
    }

    #[test]
    fn user_defined_descriptor_bypasses_registry() {
        let reg = FunctionRegistry::new();
        let c = AggCall::user_defined(
            "MY_AGG",
            vec![1],
            DataType::Int64,
            AggDescriptor::fixed("my_crate::my_agg"),
        );
        let d = reg.resolve(&c).unwrap();
        assert_eq!(d.symbol, "my_crate::my_agg");
    }
}
