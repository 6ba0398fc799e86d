//! Reconstruct the visual state at any point of a step log.
//!
//! [`project`] is a pure function of `(steps, index)`: it scans
//! `steps[0..=index]` from the start every time and keeps nothing between
//! calls. Scrubbing backwards is therefore the same operation as stepping
//! forwards. At UI scale the linear rescan is cheap; an incremental variant
//! that keeps running stack and memo diffs would produce identical
//! projections.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::engine::MemoSnapshot;
use crate::error::{Error, Result};
use crate::step::{Step, StepKind, TableIndex, Value};
use crate::tree::{CallTree, NodeId};

/// Display status of a tree node at a given step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    /// Not reached yet.
    #[default]
    Idle,
    /// Called and still on the stack, or the node of the current step.
    Active,
    /// Returned after computing its value.
    Visited,
    /// Resolved from the memo.
    Memoized,
}

/// An open call frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallFrame {
    pub node_id: NodeId,
    /// Position of the opening `call` step in the log.
    pub step_index: usize,
    pub message: String,
}

/// Table cells written so far. `None` marks a cell no `table-fill` event has
/// reached yet, distinct from a written zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableSnapshot {
    /// A 1-D table, stored as a single row.
    pub linear: bool,
    pub cells: Vec<Vec<Option<Value>>>,
}

impl TableSnapshot {
    /// Size the grid from every table index in the whole log, so that the
    /// shape stays fixed while scrubbing.
    fn sized_for(steps: &[Step]) -> Self {
        let mut indices = steps.iter().filter_map(|s| s.table_index);
        let Some(first) = indices.next() else {
            return Self::default();
        };
        let linear = matches!(first, TableIndex::Linear(_));
        let (mut rows, mut cols) = first.as_pair();
        for (r, c) in indices.map(TableIndex::as_pair) {
            rows = rows.max(r);
            cols = cols.max(c);
        }
        Self {
            linear,
            cells: vec![vec![None; cols + 1]; rows + 1],
        }
    }

    pub fn get(&self, index: TableIndex) -> Option<&Value> {
        let (r, c) = index.as_pair();
        self.cells.get(r)?.get(c)?.as_ref()
    }

    fn set(&mut self, index: TableIndex, value: Value) {
        let (r, c) = index.as_pair();
        if let Some(cell) = self.cells.get_mut(r).and_then(|row| row.get_mut(c)) {
            *cell = Some(value);
        }
    }

    /// `(rows, cols)`.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.cells.len(), self.cells.first().map_or(0, Vec::len))
    }

    pub fn filled(&self) -> usize {
        self.cells.iter().flatten().filter(|c| c.is_some()).count()
    }
}

/// Cumulative state after applying `steps[0..=index]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    pub index: usize,
    /// Kind of the step at `index`.
    pub current: Option<StepKind>,
    /// Narration of the step at `index`.
    pub message: Option<String>,
    /// Open frames, outermost first.
    pub call_stack: Vec<CallFrame>,
    pub memo: MemoSnapshot,
    /// Set when the current step is a memo hit.
    pub highlighted_memo_key: Option<String>,
    /// Statuses of every node touched so far; absent nodes are idle.
    pub statuses: BTreeMap<NodeId, NodeStatus>,
    pub table: TableSnapshot,
    /// Cell of the current `table-fill` or `solution` step.
    pub active_cell: Option<TableIndex>,
    /// Cells read by the current step.
    pub dependencies: Vec<TableIndex>,
    /// Answer, once the `solution` step has been reached.
    pub solution: Option<Value>,
}

/// A tree node as drawn at a given step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeView {
    pub id: NodeId,
    pub label: String,
    pub status: NodeStatus,
    /// Only revealed once the node has resolved.
    pub result: Option<Value>,
}

impl Projection {
    pub fn status(&self, id: NodeId) -> NodeStatus {
        self.statuses.get(&id).copied().unwrap_or_default()
    }

    pub fn depth(&self) -> usize {
        self.call_stack.len()
    }

    /// Pair every node of `tree` with its status, in allocation order.
    pub fn node_views(&self, tree: &CallTree) -> Vec<NodeView> {
        tree.iter()
            .map(|node| {
                let status = self.status(node.id);
                let result = match status {
                    NodeStatus::Visited | NodeStatus::Memoized => node.result.clone(),
                    NodeStatus::Idle | NodeStatus::Active => None,
                };
                NodeView {
                    id: node.id,
                    label: node.label.clone(),
                    status,
                    result,
                }
            })
            .collect()
    }
}

/// Rebuild the state at `index` by replaying `steps[0..=index]`.
///
/// An empty log projects to the empty state at index 0; any other index
/// past the end is [`Error::StepOutOfRange`].
pub fn project(steps: &[Step], index: usize) -> Result<Projection> {
    if steps.is_empty() && index == 0 {
        return Ok(Projection::default());
    }
    if index >= steps.len() {
        return Err(Error::StepOutOfRange {
            index,
            len: steps.len(),
        });
    }

    let mut out = Projection {
        index,
        table: TableSnapshot::sized_for(steps),
        ..Projection::default()
    };

    for (i, step) in steps[..=index].iter().enumerate() {
        match step.kind {
            StepKind::Call => {
                if let Some(id) = step.node_id {
                    out.call_stack.push(CallFrame {
                        node_id: id,
                        step_index: i,
                        message: step.message.clone(),
                    });
                    out.statuses.insert(id, NodeStatus::Active);
                }
            }
            StepKind::Return | StepKind::MemoHit => {
                out.call_stack.pop();
                if let Some(id) = step.node_id {
                    let status = if step.kind == StepKind::MemoHit {
                        NodeStatus::Memoized
                    } else {
                        NodeStatus::Visited
                    };
                    out.statuses.insert(id, status);
                }
            }
            StepKind::TableFill => {
                if let (Some(idx), Some(value)) = (step.table_index, &step.table_value) {
                    out.table.set(idx, value.clone());
                }
            }
            StepKind::Solution => {
                out.solution = step.table_value.clone();
            }
        }

        if let Some((key, value)) = step.memo_entry() {
            out.memo.insert(key.to_string(), value.clone());
        }
    }

    let current = &steps[index];
    out.current = Some(current.kind);
    out.message = Some(current.message.clone());
    if let Some(id) = current.node_id {
        out.statuses.insert(id, NodeStatus::Active);
    }
    if current.kind == StepKind::MemoHit {
        out.highlighted_memo_key = current.memo_key.clone();
    }
    if matches!(current.kind, StepKind::TableFill | StepKind::Solution) {
        out.active_cell = current.table_index;
        out.dependencies = current.dependencies.clone();
    }

    Ok(out)
}

/// Verify call/return stack discipline over a whole log.
///
/// Every `return` / `memo-hit` must close the most recent open `call` of the
/// same node, and no frame may remain open at the end. Returns the maximum
/// stack depth reached.
pub fn check_nesting(steps: &[Step]) -> Result<usize> {
    let mut stack: Vec<NodeId> = Vec::new();
    let mut max_depth = 0;
    for (index, step) in steps.iter().enumerate() {
        match step.kind {
            StepKind::Call => {
                let id = step.node_id.ok_or_else(|| Error::UnbalancedLog {
                    index,
                    reason: "call without a node".into(),
                })?;
                stack.push(id);
                max_depth = max_depth.max(stack.len());
            }
            StepKind::Return | StepKind::MemoHit => {
                let Some(open) = stack.pop() else {
                    return Err(Error::UnbalancedLog {
                        index,
                        reason: format!("{} with no open call", step.kind),
                    });
                };
                if step.node_id != Some(open) {
                    return Err(Error::UnbalancedLog {
                        index,
                        reason: format!("{} does not close the innermost call ({open})", step.kind),
                    });
                }
            }
            StepKind::TableFill | StepKind::Solution => {}
        }
    }
    if let Some(open) = stack.last() {
        return Err(Error::UnbalancedLog {
            index: steps.len(),
            reason: format!("{} call(s) left open, innermost {open}", stack.len()),
        });
    }
    Ok(max_depth)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: usize) -> NodeId {
        NodeId::new(n)
    }

    /// fib(2): call 0, call 1, ret 1, call 2, ret 2, ret 0
    fn fib2() -> Vec<Step> {
        vec![
            Step::call(id(0), "Calling fib(2)"),
            Step::call(id(1), "Calling fib(1)"),
            Step::ret(id(1), Some(("1".into(), Value::Int(1))), ""),
            Step::call(id(2), "Calling fib(0)"),
            Step::ret(id(2), Some(("0".into(), Value::Int(0))), ""),
            Step::ret(id(0), Some(("2".into(), Value::Int(1))), ""),
        ]
    }

    #[test]
    fn stack_and_statuses_mid_run() {
        let steps = fib2();
        let p = project(&steps, 3).unwrap();
        let open: Vec<_> = p.call_stack.iter().map(|f| f.node_id).collect();
        assert_eq!(open, vec![id(0), id(2)]);
        assert_eq!(p.status(id(0)), NodeStatus::Active);
        assert_eq!(p.status(id(1)), NodeStatus::Visited);
        assert_eq!(p.status(id(2)), NodeStatus::Active);
        assert_eq!(p.memo.keys().collect::<Vec<_>>(), vec!["1"]);
        assert_eq!(p.call_stack[1].step_index, 3);
    }

    #[test]
    fn current_node_is_forced_active() {
        let steps = fib2();
        let p = project(&steps, 2).unwrap();
        assert_eq!(p.status(id(1)), NodeStatus::Active);
        let p = project(&steps, 3).unwrap();
        assert_eq!(p.status(id(1)), NodeStatus::Visited);
    }

    #[test]
    fn memo_hit_highlights_key() {
        let steps = vec![
            Step::call(id(0), ""),
            Step::memo_hit(id(0), "k".into(), Value::Int(4), ""),
        ];
        let p = project(&steps, 1).unwrap();
        assert_eq!(p.highlighted_memo_key.as_deref(), Some("k"));
        assert_eq!(p.memo.get("k"), Some(&Value::Int(4)));
        assert!(p.call_stack.is_empty());
        assert!(project(&steps, 0).unwrap().highlighted_memo_key.is_none());
    }

    #[test]
    fn table_shape_is_fixed_from_whole_log() {
        let steps = vec![
            Step::table_fill(TableIndex::Grid(1, 1), Value::Int(0), vec![], ""),
            Step::table_fill(TableIndex::Grid(1, 2), Value::Int(1), vec![TableIndex::Grid(1, 1)], ""),
            Step::solution(TableIndex::Grid(1, 2), Value::Int(1), vec![], ""),
        ];
        let p = project(&steps, 0).unwrap();
        assert_eq!(p.table.dimensions(), (2, 3));
        assert_eq!(p.table.filled(), 1);
        assert_eq!(p.table.get(TableIndex::Grid(1, 2)), None);
        assert!(p.solution.is_none());

        let p = project(&steps, 1).unwrap();
        assert_eq!(p.active_cell, Some(TableIndex::Grid(1, 2)));
        assert_eq!(p.dependencies, vec![TableIndex::Grid(1, 1)]);

        let p = project(&steps, 2).unwrap();
        assert_eq!(p.solution, Some(Value::Int(1)));
        assert!(!p.table.linear);
    }

    #[test]
    fn out_of_range_and_empty() {
        assert_eq!(project(&[], 0).unwrap(), Projection::default());
        assert_eq!(
            project(&fib2(), 6),
            Err(Error::StepOutOfRange { index: 6, len: 6 })
        );
    }

    #[test]
    fn results_hidden_until_resolved() {
        let mut tree = CallTree::new();
        let root = tree.alloc(None, "f".into(), vec![]);
        tree.get_mut(root).unwrap().result = Some(Value::Int(7));
        let steps = vec![
            Step::call(root, ""),
            Step::ret(root, None, ""),
        ];
        let views = project(&steps, 0).unwrap().node_views(&tree);
        assert_eq!(views[0].result, None);
        // the current step's node is drawn active even after it returned
        let views = project(&steps, 1).unwrap().node_views(&tree);
        assert_eq!(views[0].status, NodeStatus::Active);
        assert_eq!(views[0].result, None);
    }

    #[test]
    fn nesting_checks() {
        assert_eq!(check_nesting(&fib2()), Ok(2));
        assert_eq!(check_nesting(&[]), Ok(0));

        let dangling = vec![Step::call(id(0), "")];
        assert!(matches!(check_nesting(&dangling), Err(Error::UnbalancedLog { index: 1, .. })));

        let crossed = vec![
            Step::call(id(0), ""),
            Step::call(id(1), ""),
            Step::ret(id(0), None, ""),
        ];
        assert!(matches!(check_nesting(&crossed), Err(Error::UnbalancedLog { index: 2, .. })));

        let orphan = vec![Step::ret(id(0), None, "")];
        assert!(matches!(check_nesting(&orphan), Err(Error::UnbalancedLog { index: 0, .. })));
    }
}
