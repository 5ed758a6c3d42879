//! The relational plan tree handed to the compiler by an external
//! optimizer.
//!
//! The operator set is intentionally closed: adding a variant must force
//! an exhaustive-match update in the plan compiler. Every node carries a
//! `NodeId` unique within its plan; stage names derive from (kind, id).

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::expr::ScalarExpr;
use crate::funcs::AggDescriptor;
use crate::id::NodeId;
use crate::schema::{DataType, Schema};

/// One aggregate-function invocation inside an `Aggregate` node.
///
/// `args` holds input-column positions; this model admits zero arguments
/// (COUNT) or exactly one. A user-defined call carries its implementation
/// inline in `udf` and bypasses the built-in registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggCall {
    pub name: String,
    pub args: Vec<usize>,
    pub result_type: DataType,
    #[serde(default)]
    pub udf: Option<AggDescriptor>,
}

impl AggCall {
    pub fn new(name: impl Into<String>, args: Vec<usize>, result_type: DataType) -> Self {
        Self {
            name: name.into(),
            args,
            result_type,
            udf: None,
        }
    }

    pub fn user_defined(
        name: impl Into<String>,
        args: Vec<usize>,
        result_type: DataType,
        descriptor: AggDescriptor,
    ) -> Self {
        Self {
            name: name.into(),
            args,
            result_type,
            udf: Some(descriptor),
        }
    }
}

/// Operator payloads. Children live inside the variant (at most one input
/// in this model).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PlanOp {
    TableScan {
        source: String,
        schema: Schema,
    },
    /// Marks the changelog boundary of incremental input; forwarded
    /// unchanged by the generated pipeline.
    ChangeMarker {
        input: Box<PlanNode>,
    },
    Filter {
        input: Box<PlanNode>,
        condition: ScalarExpr,
    },
    Project {
        input: Box<PlanNode>,
        exprs: Vec<ScalarExpr>,
    },
    Aggregate {
        input: Box<PlanNode>,
        /// Group-by column positions, in group-column order.
        group_by: Vec<usize>,
        calls: Vec<AggCall>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanNode {
    pub id: NodeId,
    pub op: PlanOp,
}

impl PlanNode {
    pub fn new(id: NodeId, op: PlanOp) -> Self {
        Self { id, op }
    }

    /// The input node, if any. All operators in this model are nullary or
    /// unary.
    pub fn input(&self) -> Option<&PlanNode> {
        use PlanOp::*;
        match &self.op {
            TableScan { .. } => None,
            ChangeMarker { input }
            | Filter { input, .. }
            | Project { input, .. }
            | Aggregate { input, .. } => Some(input),
        }
    }

    /// Snake-case operator kind, the first half of the stage name.
    pub fn kind_name(&self) -> &'static str {
        use PlanOp::*;
        match &self.op {
            TableScan { .. } => "table_scan",
            ChangeMarker { .. } => "change_marker",
            Filter { .. } => "filter",
            Project { .. } => "project",
            Aggregate { .. } => "aggregate",
        }
    }

    /// Number of nodes in this subtree (1 stage is emitted per node).
    pub fn len(&self) -> usize {
        1 + self.input().map(|n| n.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Checks the unique-id invariant over the whole tree.
    pub fn validate_ids(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        let mut cur = Some(self);
        while let Some(node) = cur {
            if !seen.insert(node.id) {
                return Err(Error::Plan(format!("duplicate node id {}", node.id)));
            }
            cur = node.input();
        }
        Ok(())
    }
}
