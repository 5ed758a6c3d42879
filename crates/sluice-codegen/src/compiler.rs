//! The plan compiler: one strict post-order walk, one stage per node.
//!
//! Stage text is streamed append-only into the sink as each node
//! completes; nothing is revisited. The walk dispatches on the (closed)
//! operator enum, so an unrecognized operator kind is unrepresentable
//! rather than a runtime fallback.

use std::collections::HashMap;
use std::fmt::Write;

use tracing::debug;

use sluice_core::id::NodeId;
use sluice_core::plan::{AggCall, PlanNode, PlanOp};

use crate::emit;
use crate::error::{Error, Result};
use crate::expr::ExprCompiler;
use crate::resolve::FunctionRegistry;

/// Compiles one plan tree into stage source text.
///
/// The name counter and the per-call variable reservation map live for
/// exactly one compiler instance: the counter never resets mid-compile,
/// so generated aggregate variable names cannot collide across nodes.
pub struct PlanCompiler<'a, W: Write> {
    out: &'a mut W,
    registry: &'a FunctionRegistry,
    name_count: u64,
    agg_var_names: HashMap<(NodeId, usize), String>,
}

impl<'a, W: Write> PlanCompiler<'a, W> {
    pub fn new(out: &'a mut W, registry: &'a FunctionRegistry) -> Self {
        Self {
            out,
            registry,
            name_count: 0,
            agg_var_names: HashMap::new(),
        }
    }

    /// Walks the plan bottom-up and writes every stage to the sink.
    ///
    /// On error the sink contents are unusable as a whole; the caller
    /// discards them.
    pub fn compile(&mut self, root: &PlanNode, exprs: &mut dyn ExprCompiler) -> Result<()> {
        self.visit(root, exprs)
    }

    fn visit(&mut self, node: &PlanNode, exprs: &mut dyn ExprCompiler) -> Result<()> {
        if let Some(input) = node.input() {
            self.visit(input, exprs)?;
        }
        debug!(stage = %emit::stage_name(node), "emitting stage");
        match &node.op {
            PlanOp::TableScan { .. } => self.visit_pass_through(node),
            PlanOp::ChangeMarker { .. } => self.visit_pass_through(node),
            PlanOp::Filter { condition, .. } => self.visit_filter(node, condition, exprs),
            PlanOp::Project { exprs: cols, .. } => self.visit_project(node, cols, exprs),
            PlanOp::Aggregate {
                group_by, calls, ..
            } => self.visit_aggregate(node, group_by, calls),
        }
    }

    /// Scan and change-marker stages only forward; the scan itself is the
    /// business of an external collaborator.
    fn visit_pass_through(&mut self, node: &PlanNode) -> Result<()> {
        self.out
            .write_str(&emit::pass_through_stage(&emit::stage_name(node)))?;
        self.out.write_char('\n')?;
        Ok(())
    }

    fn visit_filter(
        &mut self,
        node: &PlanNode,
        condition: &sluice_core::expr::ScalarExpr,
        exprs: &mut dyn ExprCompiler,
    ) -> Result<()> {
        self.begin_stage(node)?;
        let r = exprs.compile(condition)?;
        writeln!(self.out, "            let r = {};", r.fragment)?;
        if r.nullable {
            // A null condition result behaves as "not passed", never as an
            // error, so both checks are emitted together.
            writeln!(self.out, "            if !r.is_null() && r.is_true() {{")?;
        } else {
            writeln!(self.out, "            if r.is_true() {{")?;
        }
        writeln!(self.out, "                ctx.emit(Some(row));")?;
        writeln!(self.out, "            }}")?;
        self.end_stage()?;
        Ok(())
    }

    fn visit_project(
        &mut self,
        node: &PlanNode,
        cols: &[sluice_core::expr::ScalarExpr],
        exprs: &mut dyn ExprCompiler,
    ) -> Result<()> {
        self.begin_stage(node)?;
        let mut fragments = Vec::with_capacity(cols.len());
        for col in cols {
            fragments.push(exprs.compile(col)?.fragment);
        }
        // Exactly one output tuple per input tuple, unconditionally.
        writeln!(
            self.out,
            "            ctx.emit(Some(vec![{}]));",
            fragments.join(", ")
        )?;
        self.end_stage()?;
        Ok(())
    }

    fn visit_aggregate(
        &mut self,
        node: &PlanNode,
        group_by: &[usize],
        calls: &[AggCall],
    ) -> Result<()> {
        for call in calls {
            check_arg_count(call)?;
        }
        self.begin_aggregate_stage(node, group_by)?;

        writeln!(
            self.out,
            "        let cur_group = data.as_ref().map(|row| Self::group_key(row));"
        )?;
        writeln!(
            self.out,
            "        if cur_group.is_none() || (self.prev_group.is_some() && self.prev_group != cur_group) {{"
        )?;
        writeln!(
            self.out,
            "            if let Some(prev) = self.prev_group.as_ref() {{"
        )?;
        let mut values: Vec<String> = (0..group_by.len())
            .map(|i| format!("prev[{i}].clone()"))
            .collect();
        for (idx, call) in calls.iter().enumerate() {
            values.push(self.aggregate_result(node.id, idx, call)?);
        }
        writeln!(
            self.out,
            "                ctx.emit(Some(vec![{}]));",
            values.join(", ")
        )?;
        writeln!(self.out, "            }}")?;
        writeln!(self.out, "            self.accumulators.clear();")?;
        writeln!(self.out, "            self.instances.clear();")?;
        writeln!(self.out, "        }}")?;

        writeln!(self.out, "        if let Some(row) = data.as_ref() {{")?;
        for (idx, call) in calls.iter().enumerate() {
            self.aggregate_add(node.id, idx, call)?;
        }
        writeln!(self.out, "        }}")?;

        writeln!(self.out, "        if self.prev_group != cur_group {{")?;
        writeln!(self.out, "            self.prev_group = cur_group;")?;
        writeln!(self.out, "        }}")?;

        self.end_aggregate_stage()?;
        Ok(())
    }

    /// Emits the result projection for one call inside the boundary
    /// branch; returns the name of the local holding the result value.
    fn aggregate_result(&mut self, id: NodeId, idx: usize, call: &AggCall) -> Result<String> {
        let desc = self.registry.resolve(call)?;
        let var = self.reserve_agg_var_name(id, idx, call);
        let sym = &desc.symbol;
        if let Some(ty) = &desc.instance_type {
            writeln!(
                self.out,
                "                let {var}_obj = self.instances.get_mut(\"{var}_obj\").and_then(|o| o.downcast_mut::<{ty}>()).expect(\"missing aggregate instance\");"
            )?;
            writeln!(
                self.out,
                "                let {var}_result = {sym}::result({var}_obj, self.accumulators[\"{var}\"].clone());"
            )?;
        } else {
            writeln!(
                self.out,
                "                let {var}_result = {sym}::result(self.accumulators[\"{var}\"].clone());"
            )?;
        }
        Ok(format!("{var}_result"))
    }

    /// Emits the per-tuple accumulator update for one call. Zero-argument
    /// calls (COUNT) fold in the fixed placeholder instead of a column.
    fn aggregate_add(&mut self, id: NodeId, idx: usize, call: &AggCall) -> Result<()> {
        let desc = self.registry.resolve(call)?;
        let var = self.reserve_agg_var_name(id, idx, call);
        let sym = &desc.symbol;
        let input = match call.args.first() {
            Some(arg) => format!("row[{arg}].clone()"),
            None => "sluice_runtime::EMPTY_VALUES".to_string(),
        };
        if let Some(ty) = &desc.instance_type {
            writeln!(
                self.out,
                "            self.instances.entry(\"{var}_obj\".to_string()).or_insert_with(|| Box::new({ty}::default()));"
            )?;
            writeln!(
                self.out,
                "            let {var}_obj = self.instances.get_mut(\"{var}_obj\").and_then(|o| o.downcast_mut::<{ty}>()).expect(\"missing aggregate instance\");"
            )?;
            writeln!(
                self.out,
                "            let {var}_acc = match self.accumulators.get(\"{var}\") {{ Some(v) => v.clone(), None => {sym}::init({var}_obj) }};"
            )?;
            writeln!(
                self.out,
                "            self.accumulators.insert(\"{var}\".to_string(), {sym}::add({var}_obj, {var}_acc, {input}));"
            )?;
        } else {
            writeln!(
                self.out,
                "            let {var}_acc = match self.accumulators.get(\"{var}\") {{ Some(v) => v.clone(), None => {sym}::init() }};"
            )?;
            writeln!(
                self.out,
                "            self.accumulators.insert(\"{var}\".to_string(), {sym}::add({var}_acc, {input}));"
            )?;
        }
        Ok(())
    }

    /// A call's variable name is reserved once, on first use, and reused
    /// for the same call thereafter; the counter is monotonic for the
    /// compiler's lifetime.
    fn reserve_agg_var_name(&mut self, id: NodeId, idx: usize, call: &AggCall) -> String {
        if let Some(v) = self.agg_var_names.get(&(id, idx)) {
            return v.clone();
        }
        self.name_count += 1;
        let v = format!("{}_{}", call.name.to_lowercase(), self.name_count);
        self.agg_var_names.insert((id, idx), v.clone());
        v
    }

    fn begin_stage(&mut self, node: &PlanNode) -> Result<()> {
        self.out
            .write_str(&emit::stage_prologue(&emit::stage_name(node)))?;
        Ok(())
    }

    fn end_stage(&mut self) -> Result<()> {
        self.out.write_str(emit::stage_epilogue())?;
        self.out.write_char('\n')?;
        Ok(())
    }

    fn begin_aggregate_stage(&mut self, node: &PlanNode, group_by: &[usize]) -> Result<()> {
        self.out
            .write_str(&emit::aggregate_prologue(&emit::stage_name(node), group_by))?;
        Ok(())
    }

    fn end_aggregate_stage(&mut self) -> Result<()> {
        self.out.write_str(emit::aggregate_epilogue())?;
        self.out.write_char('\n')?;
        Ok(())
    }
}

/// Any aggregate other than zero-argument COUNT must take exactly one
/// argument; COUNT with an argument would need filtered/nullable count
/// semantics, which are unsupported.
fn check_arg_count(call: &AggCall) -> Result<()> {
    if call.args.len() != 1 {
        if call.name == "COUNT" {
            if !call.args.is_empty() {
                return Err(Error::UnsupportedSemantics(call.name.clone()));
            }
        } else {
            return Err(Error::InvalidArgumentCount(call.name.clone()));
        }
    }
    Ok(())
}
