//! Stage templates: the prologue/epilogue text around compiler-supplied
//! body lines.
//!
//! Stateless stages are plain `fn` items; the epilogue's `None` arm is the
//! default branch that forwards the end-of-stream sentinel unchanged, so a
//! filter's only way to drop a tuple is its explicit reject path.
//! Aggregate stages are structs implementing `StageHandler` with all state
//! private to the stage.

use sluice_core::plan::PlanNode;

/// Stage names derive from (operator kind, node id); node ids are unique
/// within a plan, so stage names are too.
pub fn stage_name(node: &PlanNode) -> String {
    format!("{}_{}", node.kind_name(), node.id)
}

/// A no-op forwarder stage: an alias of the shared pass-through handler.
pub fn pass_through_stage(name: &str) -> String {
    format!("pub use sluice_runtime::pass_through as {name};\n")
}

pub fn stage_prologue(name: &str) -> String {
    format!(
        "pub fn {name}(ctx: &mut dyn sluice_runtime::ChannelContext, data: Option<sluice_runtime::Tuple>) {{\n\
         \x20   match data {{\n\
         \x20       Some(row) => {{\n"
    )
}

pub fn stage_epilogue() -> &'static str {
    "        }\n        None => ctx.emit(None),\n    }\n}\n"
}

pub fn aggregate_prologue(name: &str, group_indices: &[usize]) -> String {
    let indices = group_indices
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "#[allow(non_camel_case_types)]\n\
         #[derive(Default)]\n\
         pub struct {name} {{\n\
         \x20   prev_group: Option<Vec<sluice_runtime::Scalar>>,\n\
         \x20   accumulators: std::collections::HashMap<String, sluice_runtime::Scalar>,\n\
         \x20   instances: std::collections::HashMap<String, Box<dyn std::any::Any>>,\n\
         }}\n\
         \n\
         impl {name} {{\n\
         \x20   const GROUP_INDICES: &'static [usize] = &[{indices}];\n\
         \n\
         \x20   fn group_key(row: &sluice_runtime::Tuple) -> Vec<sluice_runtime::Scalar> {{\n\
         \x20       Self::GROUP_INDICES.iter().map(|&i| row[i].clone()).collect()\n\
         \x20   }}\n\
         }}\n\
         \n\
         impl sluice_runtime::StageHandler for {name} {{\n\
         \x20   fn data_received(\n\
         \x20       &mut self,\n\
         \x20       ctx: &mut dyn sluice_runtime::ChannelContext,\n\
         \x20       data: Option<sluice_runtime::Tuple>,\n\
         \x20   ) {{\n"
    )
}

pub fn aggregate_epilogue() -> &'static str {
    "    }\n}\n"
}
