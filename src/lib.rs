//! Step-by-step narration of classic dynamic programs.
//!
//! This crate runs small dynamic programs while recording *what the algorithm
//! does*, one event at a time, so a front end can animate it. Every run
//! produces a flat log of [`Step`]s: recursive calls and returns, memo hits,
//! table fills and a final solution. Alongside the log, recursive runs build
//! a [`CallTree`] that the tree view draws.
//!
//! ## Core idea
//! 1. Each problem implements [`DpSolver`] with three strategies over the
//!    same recurrence: plain recursion (tree view), memoized recursion (memo
//!    view) and bottom-up tabulation (table view).
//! 2. A strategy resets the solver's private [`Recorder`], runs, and returns
//!    the finished log.
//! 3. [`project`] replays a prefix of the log into the state a view shows at
//!    that step: the open call frames, memo contents, node statuses and the
//!    partially filled table.
//!
//! ## Quick start
//! ```
//! use dp_stepper::{project, DpSolver, problems::FibonacciSolver, StepKind};
//!
//! let mut solver = FibonacciSolver::new();
//! let steps = solver.solve_memo(&5).to_vec();
//! assert_eq!(steps.first().map(|s| s.kind), Some(StepKind::Call));
//!
//! // fib(5) -> fib(4) -> fib(3) are open after the third call
//! let state = project(&steps, 2).unwrap();
//! assert_eq!(state.call_stack.len(), 3);
//! assert_eq!(solver.solve(&5).memoized.as_int(), Some(5));
//! ```
//!
//! ## Built-in problems
//! - Fibonacci
//! - Coin Change (minimum number of coins)
//! - 0/1 Knapsack
//! - Longest Common Subsequence (LCS)
//!
//! [`builder`] selects among them by name for callers that only know the
//! problem at runtime.

pub mod builder;
pub mod engine;
pub mod error;
pub mod problems;
pub mod replay;
pub mod step;
pub mod traits;
pub mod tree;
pub mod utils;

pub use crate::builder::{
    solve_all_views, AllViews, Problem, ProblemInput, Run, Solver, SolverBuilder, Stats, View,
};
pub use crate::engine::{MemoSnapshot, Recorder, Table};
pub use crate::error::{Error, Result};
pub use crate::replay::{check_nesting, project, CallFrame, NodeStatus, NodeView, Projection};
pub use crate::step::{Step, StepKind, TableIndex, Value};
pub use crate::traits::{Complexity, DpSolver, Solution};
pub use crate::tree::{CallTree, NodeId, TreeNode};
