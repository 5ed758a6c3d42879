//! Scalar operators referenced by compiled expression fragments.
//!
//! Comparisons use SQL three-valued logic: any operand that is `Null`
//! (or a pair of incomparable types) yields `Null`, which filter stages
//! treat as "not passed".

use std::cmp::Ordering;

use sluice_core::types::Scalar;

/// Total-enough ordering over same-typed scalars; `None` for nulls and
/// mixed types.
pub fn compare(a: &Scalar, b: &Scalar) -> Option<Ordering> {
    use Scalar::*;
    match (a, b) {
        (Null, _) | (_, Null) => None,
        (Bool(x), Bool(y)) => Some(x.cmp(y)),
        (I32(x), I32(y)) => Some(x.cmp(y)),
        (I64(x), I64(y)) => Some(x.cmp(y)),
        (F64(x), F64(y)) => x.partial_cmp(y),
        (Str(x), Str(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn cmp_op(a: Scalar, b: Scalar, pred: fn(Ordering) -> bool) -> Scalar {
    match compare(&a, &b) {
        Some(ord) => Scalar::Bool(pred(ord)),
        None => Scalar::Null,
    }
}

pub fn eq(a: Scalar, b: Scalar) -> Scalar {
    cmp_op(a, b, |o| o == Ordering::Equal)
}

pub fn not_eq(a: Scalar, b: Scalar) -> Scalar {
    cmp_op(a, b, |o| o != Ordering::Equal)
}

pub fn lt(a: Scalar, b: Scalar) -> Scalar {
    cmp_op(a, b, |o| o == Ordering::Less)
}

pub fn lt_eq(a: Scalar, b: Scalar) -> Scalar {
    cmp_op(a, b, |o| o != Ordering::Greater)
}

pub fn gt(a: Scalar, b: Scalar) -> Scalar {
    cmp_op(a, b, |o| o == Ordering::Greater)
}

pub fn gt_eq(a: Scalar, b: Scalar) -> Scalar {
    cmp_op(a, b, |o| o != Ordering::Less)
}

/// Three-valued AND: false dominates, then null.
pub fn and(a: Scalar, b: Scalar) -> Scalar {
    use Scalar::*;
    match (a, b) {
        (Bool(false), _) | (_, Bool(false)) => Bool(false),
        (Bool(true), Bool(true)) => Bool(true),
        _ => Null,
    }
}

/// Three-valued OR: true dominates, then null.
pub fn or(a: Scalar, b: Scalar) -> Scalar {
    use Scalar::*;
    match (a, b) {
        (Bool(true), _) | (_, Bool(true)) => Bool(true),
        (Bool(false), Bool(false)) => Bool(false),
        _ => Null,
    }
}
