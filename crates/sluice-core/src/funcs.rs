//! Aggregate function descriptors.
//!
//! A descriptor names a concrete implementation the generated code calls
//! into: a module exposing `init`/`add`/`result`. Stateful implementations
//! additionally expose an `Instance` type that lives in the stage's
//! instance map for the duration of one group.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggDescriptor {
    /// Fully qualified module path of the implementation, e.g.
    /// `sluice_runtime::builtin::sum_i64`. The emitted code appends
    /// `::init`, `::add`, `::result` to it.
    pub symbol: String,

    /// Fully qualified path of the live-instance type for stateful
    /// functions; `None` for static functions.
    pub instance_type: Option<String>,
}

impl AggDescriptor {
    /// Static (stateless) implementation.
    pub fn fixed(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            instance_type: None,
        }
    }

    /// Stateful implementation carrying a live instance per group.
    pub fn stateful(symbol: impl Into<String>, instance_type: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            instance_type: Some(instance_type.into()),
        }
    }

    pub fn is_static(&self) -> bool {
        self.instance_type.is_none()
    }
}
