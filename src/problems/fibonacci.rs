//! Fibonacci numbers: the smallest problem with overlapping subproblems.
//!
//! The recursion issues `fib(n-1)` before `fib(n-2)` and caches every value
//! under the key `"n"`. Since the left spine is expanded first, every right
//! child except `fib(0)` under `fib(2)` resolves as a memo hit, giving
//! `2n - 1` calls in total for `n >= 1`.
//!
//! The table is 1-D: `dp[0] = 0`, `dp[1] = 1`, then
//! `dp[i] = dp[i-1] + dp[i-2]` for increasing `i`. Values saturate at
//! `i64::MAX` instead of overflowing.

use crate::builder::Problem;
use crate::engine::{Recorder, Table};
use crate::step::{Step, TableIndex, Value};
use crate::traits::{Complexity, DpSolver};
use crate::tree::NodeId;

#[derive(Debug, Default)]
pub struct FibonacciSolver {
    rec: Recorder,
}

impl FibonacciSolver {
    pub fn new() -> Self {
        Self::default()
    }

    fn run_recursive(&mut self, n: usize) {
        self.rec.reset();
        self.fib(None, to_param(n));
        #[cfg(feature = "tracing")]
        tracing::debug!(
            n,
            calls = self.rec.recursive_calls(),
            steps = self.rec.steps().len(),
            "fibonacci recursion finished"
        );
    }

    fn fib(&mut self, parent: Option<NodeId>, n: i64) -> i64 {
        let node = self.rec.spawn(parent, format!("fib({n})"), vec![n]);
        self.rec.enter(node, format!("Calling fib({n})"));

        let key = n.to_string();
        if let Some(cached) = self.rec.lookup(&key) {
            let value = cached.as_int().unwrap_or_default();
            self.rec.hit(node, key, cached, format!("Cache hit for fib({n}): {value}"));
            return value;
        }

        if n <= 1 {
            self.rec.leave(
                node,
                Value::Int(n),
                Some(key),
                format!("Base case: fib({n}) = {n}. Returning and caching."),
            );
            return n;
        }

        let left = self.fib(Some(node), n - 1);
        let right = self.fib(Some(node), n - 2);
        let value = left.saturating_add(right);
        self.rec.leave(
            node,
            Value::Int(value),
            Some(key),
            format!(
                "fib({n}) = fib({}) + fib({}) = {left} + {right} = {value}. Returning and caching.",
                n - 1,
                n - 2
            ),
        );
        value
    }

    fn tabulate(&mut self, n: usize) {
        self.rec.reset();
        self.rec.init_table(Table::Linear(vec![Value::Int(0); n + 1]));

        self.rec.fill(
            TableIndex::Linear(0),
            Value::Int(0),
            Vec::new(),
            "Initialize dp[0] = 0",
        );
        if n >= 1 {
            self.rec.fill(
                TableIndex::Linear(1),
                Value::Int(1),
                Vec::new(),
                "Initialize dp[1] = 1",
            );
        }

        let (mut two_back, mut one_back) = (0i64, 1i64);
        for i in 2..=n {
            let value = one_back.saturating_add(two_back);
            self.rec.fill(
                TableIndex::Linear(i),
                Value::Int(value),
                vec![TableIndex::Linear(i - 1), TableIndex::Linear(i - 2)],
                format!(
                    "dp[{i}] = dp[{}] + dp[{}] = {one_back} + {two_back} = {value}",
                    i - 1,
                    i - 2
                ),
            );
            two_back = one_back;
            one_back = value;
        }

        let answer = self.rec.cell(TableIndex::Linear(n));
        self.rec.finish(
            TableIndex::Linear(n),
            answer.clone(),
            Vec::new(),
            format!("Final result: fib({n}) = {answer}"),
        );
    }
}

fn to_param(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

impl DpSolver for FibonacciSolver {
    type Input = usize;

    fn problem(&self) -> Problem {
        Problem::Fibonacci
    }

    fn solve_tree(&mut self, n: &usize) -> &[Step] {
        #[cfg(feature = "tracing")]
        let span = tracing::info_span!("solve_tree", problem = "fibonacci", n = *n);
        #[cfg(feature = "tracing")]
        let _enter = span.enter();
        self.run_recursive(*n);
        self.rec.steps()
    }

    fn solve_memo(&mut self, n: &usize) -> &[Step] {
        #[cfg(feature = "tracing")]
        let span = tracing::info_span!("solve_memo", problem = "fibonacci", n = *n);
        #[cfg(feature = "tracing")]
        let _enter = span.enter();
        self.run_recursive(*n);
        self.rec.steps()
    }

    fn solve_table(&mut self, n: &usize) -> &[Step] {
        #[cfg(feature = "tracing")]
        let span = tracing::info_span!("solve_table", problem = "fibonacci", n = *n);
        #[cfg(feature = "tracing")]
        let _enter = span.enter();
        self.tabulate(*n);
        self.rec.steps()
    }

    fn recorder(&self) -> &Recorder {
        &self.rec
    }

    fn time_complexity(&self) -> Complexity {
        Complexity {
            recursive: "O(2^n)",
            memoized: "O(n)",
            tabulated: "O(n)",
        }
    }

    fn space_complexity(&self) -> Complexity {
        Complexity {
            recursive: "O(n)",
            memoized: "O(n)",
            tabulated: "O(n)",
        }
    }

    fn description(&self) -> &'static str {
        "Calculate the nth Fibonacci number. Classic DP problem showing overlapping subproblems."
    }
}
