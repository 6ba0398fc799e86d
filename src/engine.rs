//! Per-run state shared by every solver.
//!
//! Each solver owns one [`Recorder`] privately. The recorder holds the step
//! log, the recursion tree, the memo, the DP table and the call counter, and
//! is the only place that appends steps. Solvers drive it through a small
//! set of operations that keep the log consistent with the tree and memo:
//!
//! 1. [`Recorder::reset`] at the start of every `solve_*` run.
//! 2. Recursive strategies: [`spawn`](Recorder::spawn) a node,
//!    [`enter`](Recorder::enter) it, then close it with exactly one of
//!    [`hit`](Recorder::hit) or [`leave`](Recorder::leave).
//! 3. Tabulated strategies: [`fill`](Recorder::fill) cells in iteration
//!    order, then [`finish`](Recorder::finish) once.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::step::{Step, TableIndex, Value};
use crate::tree::{CallTree, NodeId};

/// Snapshot of the memo in insertion order.
pub type MemoSnapshot = IndexMap<String, Value>;

/// Dense DP table of the tabulated strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Table {
    /// No tabulated run has happened since the last reset.
    #[default]
    Empty,
    Linear(Vec<Value>),
    Grid(Vec<Vec<Value>>),
}

impl Table {
    /// A `rows x cols` grid pre-seeded with `fill`.
    pub fn grid(rows: usize, cols: usize, fill: Value) -> Self {
        Table::Grid(vec![vec![fill; cols]; rows])
    }

    pub fn get(&self, index: TableIndex) -> Option<&Value> {
        match (self, index) {
            (Table::Linear(cells), TableIndex::Linear(i)) => cells.get(i),
            (Table::Grid(rows), TableIndex::Grid(r, c)) => rows.get(r).and_then(|row| row.get(c)),
            _ => None,
        }
    }

    fn set(&mut self, index: TableIndex, value: Value) {
        match (self, index) {
            (Table::Linear(cells), TableIndex::Linear(i)) => {
                if i >= cells.len() {
                    cells.resize(i + 1, Value::Int(0));
                }
                cells[i] = value;
            }
            (Table::Grid(rows), TableIndex::Grid(r, c)) => {
                if let Some(cell) = rows.get_mut(r).and_then(|row| row.get_mut(c)) {
                    *cell = value;
                }
            }
            _ => debug_assert!(false, "table index {index} does not match table shape"),
        }
    }

    /// `(rows, cols)`; a linear table is one row.
    pub fn dimensions(&self) -> (usize, usize) {
        match self {
            Table::Empty => (0, 0),
            Table::Linear(cells) => (1, cells.len()),
            Table::Grid(rows) => (rows.len(), rows.first().map_or(0, Vec::len)),
        }
    }
}

/// Mutable state of a single run.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    steps: Vec<Step>,
    tree: CallTree,
    memo: MemoSnapshot,
    table: Table,
    recursive_calls: usize,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop everything from the previous run. Node ids restart at 0.
    pub fn reset(&mut self) {
        #[cfg(feature = "tracing")]
        tracing::trace!(
            steps = self.steps.len(),
            nodes = self.tree.len(),
            "resetting run state"
        );
        self.steps.clear();
        self.tree.clear();
        self.memo.clear();
        self.table = Table::Empty;
        self.recursive_calls = 0;
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn tree(&self) -> &CallTree {
        &self.tree
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Copy of the memo; later runs cannot be affected through it.
    pub fn memo_snapshot(&self) -> MemoSnapshot {
        self.memo.clone()
    }

    pub fn recursive_calls(&self) -> usize {
        self.recursive_calls
    }

    /// Allocate a call node. Does not emit a step.
    pub(crate) fn spawn(&mut self, parent: Option<NodeId>, label: String, params: Vec<i64>) -> NodeId {
        self.tree.alloc(parent, label, params)
    }

    /// Open the call frame of `node`.
    pub(crate) fn enter(&mut self, node: NodeId, message: impl Into<String>) {
        self.recursive_calls += 1;
        self.steps.push(Step::call(node, message));
    }

    pub(crate) fn lookup(&self, key: &str) -> Option<Value> {
        self.memo.get(key).cloned()
    }

    /// Close `node` with a value served from the memo.
    pub(crate) fn hit(&mut self, node: NodeId, key: String, value: Value, message: impl Into<String>) {
        self.resolve(node, &value);
        self.steps.push(Step::memo_hit(node, key, value, message));
    }

    /// Close `node` with a freshly computed value, caching it under `key`
    /// when one is given. A key is written at most once per run.
    pub(crate) fn leave(
        &mut self,
        node: NodeId,
        value: Value,
        key: Option<String>,
        message: impl Into<String>,
    ) {
        self.resolve(node, &value);
        let cached = key.map(|k| {
            debug_assert!(!self.memo.contains_key(&k), "memo key {k} written twice");
            self.memo.entry(k.clone()).or_insert_with(|| value.clone());
            (k, value)
        });
        self.steps.push(Step::ret(node, cached, message));
    }

    fn resolve(&mut self, node: NodeId, value: &Value) {
        if let Some(n) = self.tree.get_mut(node) {
            n.result = Some(value.clone());
        }
    }

    /// Install the table a tabulated run is about to fill.
    pub(crate) fn init_table(&mut self, table: Table) {
        self.table = table;
    }

    /// Cell value currently in the table.
    ///
    /// Panics if `index` lies outside the installed table; tabulation only
    /// reads cells it has already sized.
    pub(crate) fn cell(&self, index: TableIndex) -> Value {
        match self.table.get(index) {
            Some(v) => v.clone(),
            None => panic!("table read out of bounds at {index}"),
        }
    }

    pub(crate) fn fill(
        &mut self,
        index: TableIndex,
        value: Value,
        dependencies: Vec<TableIndex>,
        message: impl Into<String>,
    ) {
        self.table.set(index, value.clone());
        self.steps.push(Step::table_fill(index, value, dependencies, message));
    }

    /// Terminal step of a tabulated run.
    pub(crate) fn finish(
        &mut self,
        index: TableIndex,
        value: Value,
        dependencies: Vec<TableIndex>,
        message: impl Into<String>,
    ) {
        self.steps.push(Step::solution(index, value, dependencies, message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::StepKind;

    #[test]
    fn call_and_cached_return() {
        let mut rec = Recorder::new();
        let root = rec.spawn(None, "fib(1)".into(), vec![1]);
        rec.enter(root, "Calling fib(1)");
        rec.leave(root, Value::Int(1), Some("1".into()), "base");

        let kinds: Vec<_> = rec.steps().iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![StepKind::Call, StepKind::Return]);
        assert_eq!(rec.recursive_calls(), 1);
        assert_eq!(rec.lookup("1"), Some(Value::Int(1)));
        assert_eq!(rec.tree().root().and_then(|n| n.result.clone()), Some(Value::Int(1)));
    }

    #[test]
    fn memo_snapshot_is_detached() {
        let mut rec = Recorder::new();
        let root = rec.spawn(None, "f".into(), vec![]);
        rec.enter(root, "");
        rec.leave(root, Value::Int(5), Some("k".into()), "");
        let mut snap = rec.memo_snapshot();
        snap.insert("k".into(), Value::Int(99));
        snap.insert("other".into(), Value::Int(1));
        assert_eq!(rec.lookup("k"), Some(Value::Int(5)));
        assert_eq!(rec.memo_snapshot().len(), 1);
    }

    #[test]
    fn reset_restarts_ids_and_clears_state() {
        let mut rec = Recorder::new();
        let a = rec.spawn(None, "a".into(), vec![]);
        rec.enter(a, "");
        rec.leave(a, Value::Int(0), Some("a".into()), "");
        rec.init_table(Table::Linear(vec![Value::Int(0)]));
        rec.reset();

        assert!(rec.steps().is_empty());
        assert!(rec.tree().is_empty());
        assert!(rec.memo_snapshot().is_empty());
        assert_eq!(rec.table(), &Table::Empty);
        assert_eq!(rec.recursive_calls(), 0);
        let again = rec.spawn(None, "a".into(), vec![]);
        assert_eq!(again, a);
    }

    #[test]
    fn fill_writes_table_and_log() {
        let mut rec = Recorder::new();
        rec.init_table(Table::grid(2, 2, Value::Infinity));
        rec.fill(TableIndex::Grid(1, 1), Value::Int(3), vec![TableIndex::Grid(0, 1)], "");
        assert_eq!(rec.cell(TableIndex::Grid(1, 1)), Value::Int(3));
        assert_eq!(rec.cell(TableIndex::Grid(0, 1)), Value::Infinity);
        assert_eq!(rec.table().dimensions(), (2, 2));
        rec.finish(TableIndex::Grid(1, 1), Value::Int(3), vec![], "done");
        assert_eq!(rec.steps().last().map(|s| s.kind), Some(StepKind::Solution));
    }

    #[test]
    fn linear_table_grows_on_write() {
        let mut rec = Recorder::new();
        rec.init_table(Table::Linear(Vec::new()));
        rec.fill(TableIndex::Linear(0), Value::Int(0), vec![], "");
        rec.fill(TableIndex::Linear(1), Value::Int(1), vec![], "");
        assert_eq!(rec.table().dimensions(), (1, 2));
    }
}
