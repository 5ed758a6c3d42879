//! Built-in aggregate function implementations.
//!
//! Each module is one implementation the resolver can hand out: `init`
//! produces the neutral accumulator, `add` folds one input value in,
//! `result` projects the final value. Stateful implementations (`avg_*`)
//! also expose an `Instance` type that the generated stage keeps alive for
//! the current group and passes by `&mut` to all three operations.
//!
//! Contract: the plan compiler resolves each call against the declared
//! result type before any of these run, so `add` panics on a value of the
//! wrong type rather than returning an error the generated handler could
//! not propagate. `Null` input values are skipped (SQL semantics); COUNT
//! is the zero-argument form and never sees a column value at all.

use sluice_core::types::Scalar;

/// COUNT(*): generic over the (ignored) input, zero-argument.
pub mod count {
    use super::Scalar;

    pub fn init() -> Scalar {
        Scalar::I64(0)
    }

    pub fn add(acc: Scalar, _v: Scalar) -> Scalar {
        match acc {
            Scalar::I64(n) => Scalar::I64(n + 1),
            other => panic!("COUNT accumulator must be Int64, got {other:?}"),
        }
    }

    pub fn result(acc: Scalar) -> Scalar {
        acc
    }
}

macro_rules! sum_impl {
    ($mod_name:ident, $variant:ident, $ty:ty, $sql:literal) => {
        pub mod $mod_name {
            use super::Scalar;

            pub fn init() -> Scalar {
                Scalar::$variant(0 as $ty)
            }

            pub fn add(acc: Scalar, v: Scalar) -> Scalar {
                match (acc, v) {
                    (acc, Scalar::Null) => acc,
                    (Scalar::$variant(a), Scalar::$variant(b)) => Scalar::$variant(a + b),
                    (a, b) => panic!(concat!($sql, " applied to {:?}/{:?}"), a, b),
                }
            }

            pub fn result(acc: Scalar) -> Scalar {
                acc
            }
        }
    };
}

sum_impl!(sum_i32, I32, i32, "SUM(Int32)");
sum_impl!(sum_i64, I64, i64, "SUM(Int64)");
sum_impl!(sum_f64, F64, f64, "SUM(Float64)");

/// MIN: generic over any comparable scalar type.
pub mod min {
    use super::Scalar;
    use crate::ops::compare;
    use std::cmp::Ordering;

    pub fn init() -> Scalar {
        Scalar::Null
    }

    pub fn add(acc: Scalar, v: Scalar) -> Scalar {
        if v.is_null() {
            return acc;
        }
        if acc.is_null() {
            return v;
        }
        match compare(&v, &acc) {
            Some(Ordering::Less) => v,
            _ => acc,
        }
    }

    pub fn result(acc: Scalar) -> Scalar {
        acc
    }
}

/// MAX: generic over any comparable scalar type.
pub mod max {
    use super::Scalar;
    use crate::ops::compare;
    use std::cmp::Ordering;

    pub fn init() -> Scalar {
        Scalar::Null
    }

    pub fn add(acc: Scalar, v: Scalar) -> Scalar {
        if v.is_null() {
            return acc;
        }
        if acc.is_null() {
            return v;
        }
        match compare(&v, &acc) {
            Some(Ordering::Greater) => v,
            _ => acc,
        }
    }

    pub fn result(acc: Scalar) -> Scalar {
        acc
    }
}

/// AVG over Int64: stateful, keeps a live row counter per group while the
/// accumulator carries the running sum.
pub mod avg_i64 {
    use super::Scalar;

    #[derive(Debug, Default)]
    pub struct Instance {
        count: u64,
    }

    pub fn init(_inst: &mut Instance) -> Scalar {
        Scalar::I64(0)
    }

    pub fn add(inst: &mut Instance, acc: Scalar, v: Scalar) -> Scalar {
        match (acc, v) {
            (acc, Scalar::Null) => acc,
            (Scalar::I64(a), Scalar::I64(b)) => {
                inst.count += 1;
                Scalar::I64(a + b)
            }
            (a, b) => panic!("AVG(Int64) applied to {a:?}/{b:?}"),
        }
    }

    pub fn result(inst: &mut Instance, acc: Scalar) -> Scalar {
        match acc {
            Scalar::I64(sum) if inst.count > 0 => Scalar::I64(sum / inst.count as i64),
            _ => Scalar::Null,
        }
    }
}

/// AVG over Float64: stateful, same shape as `avg_i64`.
pub mod avg_f64 {
    use super::Scalar;

    #[derive(Debug, Default)]
    pub struct Instance {
        count: u64,
    }

    pub fn init(_inst: &mut Instance) -> Scalar {
        Scalar::F64(0.0)
    }

    pub fn add(inst: &mut Instance, acc: Scalar, v: Scalar) -> Scalar {
        match (acc, v) {
            (acc, Scalar::Null) => acc,
            (Scalar::F64(a), Scalar::F64(b)) => {
                inst.count += 1;
                Scalar::F64(a + b)
            }
            (a, b) => panic!("AVG(Float64) applied to {a:?}/{b:?}"),
        }
    }

    pub fn result(inst: &mut Instance, acc: Scalar) -> Scalar {
        match acc {
            Scalar::F64(sum) if inst.count > 0 => Scalar::F64(sum / inst.count as f64),
            _ => Scalar::Null,
        }
    }
}
