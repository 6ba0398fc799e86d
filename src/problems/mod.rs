//! The four narrated dynamic programs.
//!
//! Each module implements [`DpSolver`](crate::traits::DpSolver) with three
//! strategies over the same recurrence:
//! - [`fibonacci`]   : 1-D table, single-argument recursion.
//! - [`coin_change`] : minimisation with an "impossible" sentinel.
//! - [`knapsack`]    : two-argument state, item backtrace.
//! - [`lcs`]         : two-argument state, subsequence backtrace.

pub mod coin_change;
pub mod fibonacci;
pub mod knapsack;
pub mod lcs;

pub use coin_change::{CoinChangeInput, CoinChangeSolver};
pub use fibonacci::FibonacciSolver;
pub use knapsack::{Item, KnapsackInput, KnapsackSolver};
pub use lcs::{LcsInput, LcsSolver};
