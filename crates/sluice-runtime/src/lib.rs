#![forbid(unsafe_code)]
//! sluice-runtime: the contract generated stages are written against.
//!
//! The plan compiler emits Rust source whose items reference this crate by
//! fully qualified path, so each stage stays self-contained. The crate is
//! deliberately small: a tuple-delivery trait pair, the pass-through
//! handler shared by scan/change-marker stages, scalar operators for
//! compiled expressions, and the built-in aggregate implementations.
//!
//! Scheduling, buffering, and routing between stages belong to the
//! surrounding runtime framework, not here. The only guarantee stages
//! need from that framework is in-order, single-consumer delivery.

pub mod builtin;
pub mod ops;

pub use sluice_core::types::{Scalar, Tuple};

/// Downstream side of a stage: where forwarded tuples go.
///
/// `None` is the end-of-stream sentinel and is forwarded like any tuple.
pub trait ChannelContext {
    fn emit(&mut self, data: Option<Tuple>);
}

/// Stateless stages are plain functions of this shape.
pub type StageFn = fn(&mut dyn ChannelContext, Option<Tuple>);

/// Stateful stages (grouped aggregation) implement this; state is private
/// to the stage and touched by exactly one delivery thread at a time.
pub trait StageHandler {
    fn data_received(&mut self, ctx: &mut dyn ChannelContext, data: Option<Tuple>);
}

/// Shared no-op forwarder; scan and change-marker stages alias this.
pub fn pass_through(ctx: &mut dyn ChannelContext, data: Option<Tuple>) {
    ctx.emit(data);
}

/// Placeholder argument for zero-argument aggregate calls (COUNT). The
/// built-in `count` ignores its value argument entirely.
pub const EMPTY_VALUES: Scalar = Scalar::Null;

/// A `ChannelContext` that buffers everything it receives. Used by tests
/// and by assemblers that want to drain a stage synchronously.
#[derive(Debug, Default)]
pub struct BufferedContext {
    pub emitted: Vec<Option<Tuple>>,
}

impl BufferedContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forwarded data tuples, sentinel deliveries excluded.
    pub fn rows(&self) -> Vec<&Tuple> {
        self.emitted.iter().filter_map(|d| d.as_ref()).collect()
    }
}

impl ChannelContext for BufferedContext {
    fn emit(&mut self, data: Option<Tuple>) {
        self.emitted.push(data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pass_through_forwards_tuples_and_sentinel() {
        let mut ctx = BufferedContext::new();
        pass_through(&mut ctx, Some(vec![Scalar::I64(1)]));
        pass_through(&mut ctx, None);
        assert_eq!(ctx.emitted.len(), 2);
        assert_eq!(ctx.rows().len(), 1);
        assert_eq!(ctx.emitted[1], None);
    }
}
