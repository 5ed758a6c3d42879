//! Runtime semantics of generated aggregate stages.
//!
//! The handlers below are written exactly as `sluice-codegen` emits them
//! (a golden-text test at the bottom pins the generator to this shape), so
//! driving them through the runtime exercises the incremental grouped
//! aggregation algorithm end to end: boundary detection, lazy accumulator
//! init, one emission per completed group, state reset between groups.

use sluice_codegen::{builtins, BasicExprCompiler, PlanCompiler};
use sluice_core::id::NodeId;
use sluice_core::plan::{AggCall, PlanNode, PlanOp};
use sluice_core::schema::{DataType, Field, Schema};
use sluice_runtime::{BufferedContext, Scalar, StageHandler};

// --- mirrors of generated stages ------------------------------------------

/// SUM(col 1) grouped by col 0, as emitted for an Aggregate node with id 2.
#[allow(non_camel_case_types)]
#[derive(Default)]
pub struct aggregate_2 {
    prev_group: Option<Vec<sluice_runtime::Scalar>>,
    accumulators: std::collections::HashMap<String, sluice_runtime::Scalar>,
    instances: std::collections::HashMap<String, Box<dyn std::any::Any>>,
}

impl aggregate_2 {
    const GROUP_INDICES: &'static [usize] = &[0];

    fn group_key(row: &sluice_runtime::Tuple) -> Vec<sluice_runtime::Scalar> {
        Self::GROUP_INDICES.iter().map(|&i| row[i].clone()).collect()
    }
}

impl sluice_runtime::StageHandler for aggregate_2 {
    fn data_received(
        &mut self,
        ctx: &mut dyn sluice_runtime::ChannelContext,
        data: Option<sluice_runtime::Tuple>,
    ) {
        let cur_group = data.as_ref().map(|row| Self::group_key(row));
        if cur_group.is_none() || (self.prev_group.is_some() && self.prev_group != cur_group) {
            if let Some(prev) = self.prev_group.as_ref() {
                let sum_1_result = sluice_runtime::builtin::sum_i64::result(self.accumulators["sum_1"].clone());
                ctx.emit(Some(vec![prev[0].clone(), sum_1_result]));
            }
            self.accumulators.clear();
            self.instances.clear();
        }
        if let Some(row) = data.as_ref() {
            let sum_1_acc = match self.accumulators.get("sum_1") { Some(v) => v.clone(), None => sluice_runtime::builtin::sum_i64::init() };
            self.accumulators.insert("sum_1".to_string(), sluice_runtime::builtin::sum_i64::add(sum_1_acc, row[1].clone()));
        }
        if self.prev_group != cur_group {
            self.prev_group = cur_group;
        }
    }
}

/// Zero-argument COUNT grouped by col 0.
#[allow(non_camel_case_types, unused_variables)]
#[derive(Default)]
pub struct aggregate_3 {
    prev_group: Option<Vec<sluice_runtime::Scalar>>,
    accumulators: std::collections::HashMap<String, sluice_runtime::Scalar>,
    instances: std::collections::HashMap<String, Box<dyn std::any::Any>>,
}

impl aggregate_3 {
    const GROUP_INDICES: &'static [usize] = &[0];

    fn group_key(row: &sluice_runtime::Tuple) -> Vec<sluice_runtime::Scalar> {
        Self::GROUP_INDICES.iter().map(|&i| row[i].clone()).collect()
    }
}

impl sluice_runtime::StageHandler for aggregate_3 {
    #[allow(unused_variables)]
    fn data_received(
        &mut self,
        ctx: &mut dyn sluice_runtime::ChannelContext,
        data: Option<sluice_runtime::Tuple>,
    ) {
        let cur_group = data.as_ref().map(|row| Self::group_key(row));
        if cur_group.is_none() || (self.prev_group.is_some() && self.prev_group != cur_group) {
            if let Some(prev) = self.prev_group.as_ref() {
                let count_1_result = sluice_runtime::builtin::count::result(self.accumulators["count_1"].clone());
                ctx.emit(Some(vec![prev[0].clone(), count_1_result]));
            }
            self.accumulators.clear();
            self.instances.clear();
        }
        if let Some(row) = data.as_ref() {
            let count_1_acc = match self.accumulators.get("count_1") { Some(v) => v.clone(), None => sluice_runtime::builtin::count::init() };
            self.accumulators.insert("count_1".to_string(), sluice_runtime::builtin::count::add(count_1_acc, sluice_runtime::EMPTY_VALUES));
        }
        if self.prev_group != cur_group {
            self.prev_group = cur_group;
        }
    }
}

/// Stateful AVG(col 1) grouped by col 0: exercises the live-instance map.
#[allow(non_camel_case_types)]
#[derive(Default)]
pub struct aggregate_4 {
    prev_group: Option<Vec<sluice_runtime::Scalar>>,
    accumulators: std::collections::HashMap<String, sluice_runtime::Scalar>,
    instances: std::collections::HashMap<String, Box<dyn std::any::Any>>,
}

impl aggregate_4 {
    const GROUP_INDICES: &'static [usize] = &[0];

    fn group_key(row: &sluice_runtime::Tuple) -> Vec<sluice_runtime::Scalar> {
        Self::GROUP_INDICES.iter().map(|&i| row[i].clone()).collect()
    }
}

impl sluice_runtime::StageHandler for aggregate_4 {
    fn data_received(
        &mut self,
        ctx: &mut dyn sluice_runtime::ChannelContext,
        data: Option<sluice_runtime::Tuple>,
    ) {
        let cur_group = data.as_ref().map(|row| Self::group_key(row));
        if cur_group.is_none() || (self.prev_group.is_some() && self.prev_group != cur_group) {
            if let Some(prev) = self.prev_group.as_ref() {
                let avg_1_obj = self.instances.get_mut("avg_1_obj").and_then(|o| o.downcast_mut::<sluice_runtime::builtin::avg_i64::Instance>()).expect("missing aggregate instance");
                let avg_1_result = sluice_runtime::builtin::avg_i64::result(avg_1_obj, self.accumulators["avg_1"].clone());
                ctx.emit(Some(vec![prev[0].clone(), avg_1_result]));
            }
            self.accumulators.clear();
            self.instances.clear();
        }
        if let Some(row) = data.as_ref() {
            self.instances.entry("avg_1_obj".to_string()).or_insert_with(|| Box::new(sluice_runtime::builtin::avg_i64::Instance::default()));
            let avg_1_obj = self.instances.get_mut("avg_1_obj").and_then(|o| o.downcast_mut::<sluice_runtime::builtin::avg_i64::Instance>()).expect("missing aggregate instance");
            let avg_1_acc = match self.accumulators.get("avg_1") { Some(v) => v.clone(), None => sluice_runtime::builtin::avg_i64::init(avg_1_obj) };
            self.accumulators.insert("avg_1".to_string(), sluice_runtime::builtin::avg_i64::add(avg_1_obj, avg_1_acc, row[1].clone()));
        }
        if self.prev_group != cur_group {
            self.prev_group = cur_group;
        }
    }
}

// --- scenario tests --------------------------------------------------------

fn row(key: &str, v: i64) -> Option<Vec<Scalar>> {
    Some(vec![Scalar::Str(key.into()), Scalar::I64(v)])
}

#[test]
fn sum_emits_one_row_per_group_at_the_boundary() {
    let mut stage = aggregate_2::default();
    let mut ctx = BufferedContext::new();

    stage.data_received(&mut ctx, row("A", 1));
    stage.data_received(&mut ctx, row("A", 2));
    // No emission before the first boundary.
    assert!(ctx.emitted.is_empty());

    stage.data_received(&mut ctx, row("B", 3));
    assert_eq!(
        ctx.rows(),
        vec![&vec![Scalar::Str("A".into()), Scalar::I64(3)]]
    );

    stage.data_received(&mut ctx, None);
    assert_eq!(
        ctx.rows(),
        vec![
            &vec![Scalar::Str("A".into()), Scalar::I64(3)],
            &vec![Scalar::Str("B".into()), Scalar::I64(3)],
        ]
    );
}

#[test]
fn sentinel_on_empty_stream_emits_nothing() {
    let mut stage = aggregate_2::default();
    let mut ctx = BufferedContext::new();
    stage.data_received(&mut ctx, None);
    assert!(ctx.emitted.is_empty());
}

#[test]
fn zero_argument_count_counts_rows() {
    let mut stage = aggregate_3::default();
    let mut ctx = BufferedContext::new();
    stage.data_received(&mut ctx, row("A", 7));
    stage.data_received(&mut ctx, row("A", 8));
    stage.data_received(&mut ctx, None);
    assert_eq!(
        ctx.rows(),
        vec![&vec![Scalar::Str("A".into()), Scalar::I64(2)]]
    );
}

#[test]
fn stateful_avg_resets_its_instance_at_group_boundaries() {
    let mut stage = aggregate_4::default();
    let mut ctx = BufferedContext::new();
    stage.data_received(&mut ctx, row("A", 2));
    stage.data_received(&mut ctx, row("A", 4));
    stage.data_received(&mut ctx, row("B", 9));
    stage.data_received(&mut ctx, None);
    assert_eq!(
        ctx.rows(),
        vec![
            &vec![Scalar::Str("A".into()), Scalar::I64(3)],
            &vec![Scalar::Str("B".into()), Scalar::I64(9)],
        ]
    );
}

#[test]
fn single_group_emits_only_at_end_of_stream() {
    let mut stage = aggregate_2::default();
    let mut ctx = BufferedContext::new();
    for v in 1..=4 {
        stage.data_received(&mut ctx, row("A", v));
    }
    assert!(ctx.emitted.is_empty());
    stage.data_received(&mut ctx, None);
    assert_eq!(
        ctx.rows(),
        vec![&vec![Scalar::Str("A".into()), Scalar::I64(10)]]
    );
}

// --- generator/mirror agreement -------------------------------------------

#[test]
fn generated_sum_stage_matches_the_mirrored_handler_text() {
    let scan = PlanNode::new(
        NodeId::new(1),
        PlanOp::TableScan {
            source: "orders".into(),
            schema: Schema::new(vec![
                Field::new("uid", DataType::Utf8, false),
                Field::new("amount", DataType::Int64, false),
            ]),
        },
    );
    let agg = PlanNode::new(
        NodeId::new(2),
        PlanOp::Aggregate {
            input: Box::new(scan),
            group_by: vec![0],
            calls: vec![AggCall::new("SUM", vec![1], DataType::Int64)],
        },
    );

    let registry = builtins();
    let mut out = String::new();
    let mut exprs = BasicExprCompiler::new(vec![false, false]);
    PlanCompiler::new(&mut out, &registry)
        .compile(&agg, &mut exprs)
        .unwrap();

    let expected = "\
pub use sluice_runtime::pass_through as table_scan_1;

#[allow(non_camel_case_types)]
#[derive(Default)]
pub struct aggregate_2 {
    prev_group: Option<Vec<sluice_runtime::Scalar>>,
    accumulators: std::collections::HashMap<String, sluice_runtime::Scalar>,
    instances: std::collections::HashMap<String, Box<dyn std::any::Any>>,
}

impl aggregate_2 {
    const GROUP_INDICES: &'static [usize] = &[0];

    fn group_key(row: &sluice_runtime::Tuple) -> Vec<sluice_runtime::Scalar> {
        Self::GROUP_INDICES.iter().map(|&i| row[i].clone()).collect()
    }
}

impl sluice_runtime::StageHandler for aggregate_2 {
    fn data_received(
        &mut self,
        ctx: &mut dyn sluice_runtime::ChannelContext,
        data: Option<sluice_runtime::Tuple>,
    ) {
        let cur_group = data.as_ref().map(|row| Self::group_key(row));
        if cur_group.is_none() || (self.prev_group.is_some() && self.prev_group != cur_group) {
            if let Some(prev) = self.prev_group.as_ref() {
                let sum_1_result = sluice_runtime::builtin::sum_i64::result(self.accumulators[\"sum_1\"].clone());
                ctx.emit(Some(vec![prev[0].clone(), sum_1_result]));
            }
            self.accumulators.clear();
            self.instances.clear();
        }
        if let Some(row) = data.as_ref() {
            let sum_1_acc = match self.accumulators.get(\"sum_1\") { Some(v) => v.clone(), None => sluice_runtime::builtin::sum_i64::init() };
            self.accumulators.insert(\"sum_1\".to_string(), sluice_runtime::builtin::sum_i64::add(sum_1_acc, row[1].clone()));
        }
        if self.prev_group != cur_group {
            self.prev_group = cur_group;
        }
    }
}

";
    assert_eq!(out, expected);
}
