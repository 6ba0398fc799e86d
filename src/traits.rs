//! The solver contract shared by every problem.
//!
//! To add a problem to the visualizer, implement [`DpSolver`] for a struct
//! that owns a private [`Recorder`] and the problem's normalized input.
//!
//! The trait encodes the lifecycle every view relies on:
//! - Three strategies (`solve_tree`, `solve_memo`, `solve_table`), each of
//!   which fully resets the recorder before running.
//! - Read-only accessors over the finished run (steps, tree, table, memo,
//!   call counter) for the statistics panel.
//! - Static metadata (description, complexity strings).
//!
//! Solvers do not validate their input: callers coerce and default values
//! before invoking them. Strategies must still terminate on any input.

use serde::Serialize;

use crate::builder::{Problem, View};
use crate::engine::{MemoSnapshot, Recorder, Table};
use crate::step::{Step, StepKind, Value};
use crate::tree::CallTree;

/// Asymptotic cost of each strategy, as display strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Complexity {
    pub recursive: &'static str,
    pub memoized: &'static str,
    pub tabulated: &'static str,
}

impl Complexity {
    /// The figure matching the strategy behind `view`.
    pub fn for_view(&self, view: View) -> &'static str {
        match view {
            View::Tree => self.recursive,
            View::Memo => self.memoized,
            View::Table => self.tabulated,
        }
    }
}

/// Final answers of the memoized and tabulated strategies.
///
/// Both are passed through [`Value::into_answer`], so "impossible" reads as
/// `-1` on either side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Solution {
    pub memoized: Value,
    pub tabulated: Value,
}

/// A dynamic program that narrates its own execution as a step log.
///
/// Semantics:
/// - `solve_tree` and `solve_memo` run the same memoized recursion; the log
///   is a properly nested sequence of `call` / `return` / `memo-hit` events
///   and [`tree`](Self::tree) holds one node per call.
/// - `solve_table` runs bottom-up tabulation; the log is the `table-fill`
///   events in fill order followed by exactly one `solution` event.
/// - Every strategy resets the previous run first, so node ids, counters
///   and memo contents never leak between runs.
pub trait DpSolver {
    /// Already-typed instance data (numbers are numbers, lists are lists).
    type Input: ?Sized;

    fn problem(&self) -> Problem;

    /// Recursive strategy feeding the tree view.
    fn solve_tree(&mut self, input: &Self::Input) -> &[Step];

    /// Recursive strategy feeding the memo view.
    fn solve_memo(&mut self, input: &Self::Input) -> &[Step];

    /// Bottom-up strategy feeding the table view.
    fn solve_table(&mut self, input: &Self::Input) -> &[Step];

    /// State of the most recent run.
    fn recorder(&self) -> &Recorder;

    fn time_complexity(&self) -> Complexity;

    fn space_complexity(&self) -> Complexity;

    fn description(&self) -> &'static str;

    /// Run the memoized and tabulated strategies and collect both answers.
    ///
    /// The memoized answer is the root call's result; the tabulated answer is
    /// the value of the terminal `solution` step. After this call the
    /// recorder holds the tabulated run.
    fn solve(&mut self, input: &Self::Input) -> Solution {
        self.solve_memo(input);
        let memoized = self
            .tree()
            .root()
            .and_then(|root| root.result.clone())
            .unwrap_or(Value::Int(0));

        let tabulated = self
            .solve_table(input)
            .iter()
            .rev()
            .find(|s| s.kind == StepKind::Solution)
            .and_then(|s| s.table_value.clone())
            .unwrap_or(Value::Int(0));

        Solution {
            memoized: memoized.into_answer(),
            tabulated: tabulated.into_answer(),
        }
    }

    fn steps(&self) -> &[Step] {
        self.recorder().steps()
    }

    fn tree(&self) -> &CallTree {
        self.recorder().tree()
    }

    fn table(&self) -> &Table {
        self.recorder().table()
    }

    fn memo(&self) -> MemoSnapshot {
        self.recorder().memo_snapshot()
    }

    /// Number of `call` events in the most recent run.
    fn recursive_calls(&self) -> usize {
        self.recorder().recursive_calls()
    }
}
