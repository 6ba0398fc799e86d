//! Coin change: fewest coins that sum to a target amount.
//!
//! Recursion: `minCoins(a)` tries every coin in ascending order as a child
//! call on `a - coin` and keeps the minimum `1 + child` over reachable
//! children. Negative amounts are impossible (uncached); `minCoins(0) = 0`
//! is cached under `"0"` like every other amount.
//!
//! Table: `dp[i][j]` = fewest coins for amount `j` using the first `i`
//! denominations. Column 0 is stepped for every row; the rest of row 0 is
//! implicitly unreachable.
//!
//! Unreachable values are [`Value::Infinity`] throughout and only become
//! `-1` in the terminal `solution` step.

use serde::{Deserialize, Serialize};

use crate::builder::Problem;
use crate::engine::{Recorder, Table};
use crate::step::{Step, TableIndex, Value};
use crate::traits::{Complexity, DpSolver};
use crate::tree::NodeId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinChangeInput {
    pub coins: Vec<i64>,
    pub amount: usize,
}

impl CoinChangeInput {
    pub fn new(coins: Vec<i64>, amount: usize) -> Self {
        Self { coins, amount }
    }
}

#[derive(Debug, Default)]
pub struct CoinChangeSolver {
    rec: Recorder,
    coins: Vec<i64>,
}

impl CoinChangeSolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Denominations of the last run: ascending, zero and negative values
    /// removed (a zero coin would never shrink the amount).
    pub fn coins(&self) -> &[i64] {
        &self.coins
    }

    fn load(&mut self, input: &CoinChangeInput) {
        self.rec.reset();
        self.coins = input.coins.iter().copied().filter(|&c| c > 0).collect();
        self.coins.sort_unstable();
    }

    fn run_recursive(&mut self, input: &CoinChangeInput) {
        self.load(input);
        let amount = i64::try_from(input.amount).unwrap_or(i64::MAX);
        self.min_coins(None, amount);
        #[cfg(feature = "tracing")]
        tracing::debug!(
            amount,
            calls = self.rec.recursive_calls(),
            steps = self.rec.steps().len(),
            "coin change recursion finished"
        );
    }

    /// `None` means the amount cannot be formed.
    fn min_coins(&mut self, parent: Option<NodeId>, amount: i64) -> Option<i64> {
        let node = self.rec.spawn(parent, format!("minCoins({amount})"), vec![amount]);
        self.rec.enter(node, format!("Calling minCoins({amount})"));

        if amount < 0 {
            self.rec.leave(
                node,
                Value::Infinity,
                None,
                "Amount is negative, returning Infinity.",
            );
            return None;
        }

        let key = amount.to_string();
        if let Some(cached) = self.rec.lookup(&key) {
            let message = format!("Cache hit for minCoins({amount}): {cached}");
            let reach = cached.as_int();
            self.rec.hit(node, key, cached, message);
            return reach;
        }

        if amount == 0 {
            self.rec.leave(
                node,
                Value::Int(0),
                Some(key),
                "Base case: amount is 0, returning 0.",
            );
            return Some(0);
        }

        let mut best: Option<i64> = None;
        for idx in 0..self.coins.len() {
            let coin = self.coins[idx];
            if let Some(sub) = self.min_coins(Some(node), amount - coin) {
                best = min_reach(best, Some(sub + 1));
            }
        }

        let outcome = match best {
            Some(v) => v.to_string(),
            None => "impossible".to_string(),
        };
        self.rec.leave(
            node,
            Value::from(best),
            Some(key),
            format!("minCoins({amount}) = {outcome}. Returning and caching."),
        );
        best
    }

    fn tabulate(&mut self, input: &CoinChangeInput) {
        self.load(input);
        let amount = input.amount;
        let n = self.coins.len();
        self.rec.init_table(Table::grid(n + 1, amount + 1, Value::Infinity));

        for i in 0..=n {
            self.rec.fill(
                TableIndex::Grid(i, 0),
                Value::Int(0),
                Vec::new(),
                "Base case: For amount 0, 0 coins are needed.",
            );
        }

        for i in 1..=n {
            let coin = usize::try_from(self.coins[i - 1]).unwrap_or(usize::MAX);
            for j in 1..=amount {
                let without = self.rec.cell(TableIndex::Grid(i - 1, j));
                let mut dependencies = vec![TableIndex::Grid(i - 1, j)];

                let (value, message) = if coin <= j {
                    let prior = self.rec.cell(TableIndex::Grid(i, j - coin));
                    dependencies.push(TableIndex::Grid(i, j - coin));
                    let with = prior.as_int().map(|c| c + 1);
                    let value = Value::from(min_reach(without.as_int(), with));
                    let message = format!(
                        "dp[{i}][{j}] = min(without: {without}, with: 1 + {prior}) = {value}"
                    );
                    (value, message)
                } else {
                    let message = format!("dp[{i}][{j}] = {without} (coin {coin} is too large)");
                    (without, message)
                };

                self.rec
                    .fill(TableIndex::Grid(i, j), value, dependencies, message);
            }
        }

        let answer = self.rec.cell(TableIndex::Grid(n, amount)).into_answer();
        let outcome = match answer {
            Value::Int(-1) => "impossible".to_string(),
            ref v => v.to_string(),
        };
        self.rec.finish(
            TableIndex::Grid(n, amount),
            answer,
            Vec::new(),
            format!("Final result for amount {amount} is {outcome}"),
        );
    }
}

fn min_reach(a: Option<i64>, b: Option<i64>) -> Option<i64> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.min(y)),
        (x, None) => x,
        (None, y) => y,
    }
}

impl DpSolver for CoinChangeSolver {
    type Input = CoinChangeInput;

    fn problem(&self) -> Problem {
        Problem::CoinChange
    }

    fn solve_tree(&mut self, input: &CoinChangeInput) -> &[Step] {
        #[cfg(feature = "tracing")]
        let span = tracing::info_span!("solve_tree", problem = "coinChange", amount = input.amount);
        #[cfg(feature = "tracing")]
        let _enter = span.enter();
        self.run_recursive(input);
        self.rec.steps()
    }

    fn solve_memo(&mut self, input: &CoinChangeInput) -> &[Step] {
        #[cfg(feature = "tracing")]
        let span = tracing::info_span!("solve_memo", problem = "coinChange", amount = input.amount);
        #[cfg(feature = "tracing")]
        let _enter = span.enter();
        self.run_recursive(input);
        self.rec.steps()
    }

    fn solve_table(&mut self, input: &CoinChangeInput) -> &[Step] {
        #[cfg(feature = "tracing")]
        let span = tracing::info_span!("solve_table", problem = "coinChange", amount = input.amount);
        #[cfg(feature = "tracing")]
        let _enter = span.enter();
        self.tabulate(input);
        self.rec.steps()
    }

    fn recorder(&self) -> &Recorder {
        &self.rec
    }

    fn time_complexity(&self) -> Complexity {
        Complexity {
            recursive: "O(c^a)",
            memoized: "O(c * a)",
            tabulated: "O(c * a)",
        }
    }

    fn space_complexity(&self) -> Complexity {
        Complexity {
            recursive: "O(a)",
            memoized: "O(a)",
            tabulated: "O(c * a)",
        }
    }

    fn description(&self) -> &'static str {
        "Find the minimum number of coins needed to make a target amount."
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::StepKind;

    #[test]
    fn coins_are_sorted_and_filtered() {
        let mut solver = CoinChangeSolver::new();
        solver.solve_memo(&CoinChangeInput::new(vec![5, 0, 1, -2, 2], 3));
        assert_eq!(solver.coins(), &[1, 2, 5]);
    }

    #[test]
    fn negative_amount_is_uncached_infinity() {
        let mut solver = CoinChangeSolver::new();
        let steps = solver.solve_memo(&CoinChangeInput::new(vec![2], 1)).to_vec();
        // minCoins(1) -> minCoins(-1)
        assert_eq!(steps.len(), 4);
        assert_eq!(steps[2].kind, StepKind::Return);
        assert!(steps[2].memo_key.is_none());
        assert_eq!(steps[3].memo_value, Some(Value::Infinity));
        assert_eq!(
            solver.tree().get(NodeId::new(1)).and_then(|n| n.result.clone()),
            Some(Value::Infinity)
        );
    }

    #[test]
    fn zero_amount_is_cached_once() {
        let mut solver = CoinChangeSolver::new();
        let steps = solver.solve_memo(&CoinChangeInput::new(vec![1, 2], 2)).to_vec();
        let writes = steps
            .iter()
            .filter(|s| s.kind == StepKind::Return && s.memo_key.as_deref() == Some("0"))
            .count();
        let hits = steps
            .iter()
            .filter(|s| s.kind == StepKind::MemoHit && s.memo_key.as_deref() == Some("0"))
            .count();
        assert_eq!(writes, 1);
        assert_eq!(hits, 1);
        assert_eq!(solver.memo().get("2"), Some(&Value::Int(1)));
    }

    #[test]
    fn table_dependencies() {
        let mut solver = CoinChangeSolver::new();
        let steps = solver.solve_table(&CoinChangeInput::new(vec![2], 3)).to_vec();
        let deps = |i, j| {
            steps
                .iter()
                .find(|s| s.kind == StepKind::TableFill && s.table_index == Some(TableIndex::Grid(i, j)))
                .map(|s| s.dependencies.clone())
                .unwrap()
        };
        assert_eq!(deps(1, 1), vec![TableIndex::Grid(0, 1)]);
        assert_eq!(deps(1, 2), vec![TableIndex::Grid(0, 2), TableIndex::Grid(1, 0)]);
        assert!(deps(0, 0).is_empty());
        let last = steps.last().unwrap();
        assert_eq!(last.kind, StepKind::Solution);
        assert_eq!(last.table_value, Some(Value::Int(-1)));
        assert_eq!(solver.table().get(TableIndex::Grid(0, 3)), Some(&Value::Infinity));
    }

    #[test]
    fn no_usable_coins() {
        let mut solver = CoinChangeSolver::new();
        let steps = solver.solve_table(&CoinChangeInput::new(vec![0], 4)).to_vec();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[1].table_value, Some(Value::Int(-1)));
        assert_eq!(steps[1].table_index, Some(TableIndex::Grid(0, 4)));

        let solution = solver.solve(&CoinChangeInput::new(vec![], 0));
        assert_eq!(solution.memoized, Value::Int(0));
        assert_eq!(solution.tabulated, Value::Int(0));
    }
}
