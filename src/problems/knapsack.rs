//! 0/1 knapsack: best total value within a weight capacity.
//!
//! Recursion: `ks(i, c)` is the best value using items `0..=i` with capacity
//! `c`. It always evaluates "exclude item `i`" first and "include item `i`"
//! only when the item fits. `i < 0` or `c <= 0` returns 0 without caching;
//! everything else is cached under `"i,c"`.
//!
//! Table: `dp[i][w]` over the first `i` items. Row 0 and column 0 are
//! implicitly zero and never stepped. After filling, the table is walked
//! back from `dp[n][W]` to recover which items were taken.

use serde::{Deserialize, Serialize};

use crate::builder::Problem;
use crate::engine::{Recorder, Table};
use crate::error::{Error, Result};
use crate::step::{Step, TableIndex, Value};
use crate::traits::{Complexity, DpSolver};
use crate::tree::NodeId;
use crate::utils::pair_key;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub weight: usize,
    pub value: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnapsackInput {
    pub items: Vec<Item>,
    pub capacity: usize,
}

impl KnapsackInput {
    pub fn new(items: Vec<Item>, capacity: usize) -> Self {
        Self { items, capacity }
    }

    /// Build the item list from `(weight, value)` pairs, naming the items
    /// `Item1`, `Item2`, ...
    pub fn from_pairs(pairs: impl IntoIterator<Item = (usize, i64)>, capacity: usize) -> Self {
        let items = pairs
            .into_iter()
            .enumerate()
            .map(|(i, (weight, value))| Item {
                weight,
                value,
                name: format!("Item{}", i + 1),
            })
            .collect();
        Self { items, capacity }
    }

    /// [`from_pairs`](Self::from_pairs) over parallel weight and value
    /// lists, which must have the same length.
    pub fn from_parallel(weights: &[usize], values: &[i64], capacity: usize) -> Result<Self> {
        if weights.len() != values.len() {
            return Err(Error::MismatchedItems {
                weights: weights.len(),
                values: values.len(),
            });
        }
        Ok(Self::from_pairs(
            weights.iter().copied().zip(values.iter().copied()),
            capacity,
        ))
    }
}

#[derive(Debug, Default)]
pub struct KnapsackSolver {
    rec: Recorder,
    items: Vec<Item>,
    selected: Vec<usize>,
}

impl KnapsackSolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Items chosen by the backtrace of the last tabulated run, in item
    /// order. Empty after a recursive run.
    pub fn selected_items(&self) -> impl Iterator<Item = &Item> + '_ {
        self.selected.iter().filter_map(|&i| self.items.get(i))
    }

    fn load(&mut self, input: &KnapsackInput) {
        self.rec.reset();
        self.items = input.items.clone();
        self.selected.clear();
    }

    fn run_recursive(&mut self, input: &KnapsackInput) {
        self.load(input);
        let last = i64::try_from(self.items.len()).unwrap_or(i64::MAX) - 1;
        let capacity = i64::try_from(input.capacity).unwrap_or(i64::MAX);
        self.ks(None, last, capacity);
        #[cfg(feature = "tracing")]
        tracing::debug!(
            items = self.items.len(),
            capacity,
            calls = self.rec.recursive_calls(),
            "knapsack recursion finished"
        );
    }

    fn ks(&mut self, parent: Option<NodeId>, index: i64, capacity: i64) -> i64 {
        let node = self
            .rec
            .spawn(parent, format!("ks({index},{capacity})"), vec![index, capacity]);
        self.rec.enter(node, format!("Calling ks({index},{capacity})"));

        if index < 0 || capacity <= 0 {
            let why = if index < 0 { "no items left" } else { "no capacity" };
            self.rec.leave(
                node,
                Value::Int(0),
                None,
                format!("Base case: {why}, returning 0."),
            );
            return 0;
        }

        let key = pair_key(index, capacity);
        if let Some(cached) = self.rec.lookup(&key) {
            let value = cached.as_int().unwrap_or_default();
            self.rec.hit(
                node,
                key,
                cached,
                format!("Cache hit for ks({index},{capacity}): {value}"),
            );
            return value;
        }

        let Some(item) = usize::try_from(index).ok().and_then(|i| self.items.get(i)).cloned() else {
            self.rec.leave(node, Value::Int(0), Some(key), "No such item, returning 0.");
            return 0;
        };

        let without = self.ks(Some(node), index - 1, capacity);
        let mut best = without;
        let mut detail = format!("Result is from not taking item {}: {without}", item.name);

        let weight = i64::try_from(item.weight).unwrap_or(i64::MAX);
        if weight <= capacity {
            let with = item
                .value
                .saturating_add(self.ks(Some(node), index - 1, capacity - weight));
            if with > without {
                best = with;
                detail = format!("Taking item {} is better. Value: {with}", item.name);
            }
        }

        self.rec.leave(
            node,
            Value::Int(best),
            Some(key),
            format!("ks({index},{capacity}) = {best}. {detail}. Returning and caching."),
        );
        best
    }

    fn tabulate(&mut self, input: &KnapsackInput) {
        self.load(input);
        let n = self.items.len();
        let capacity = input.capacity;
        self.rec.init_table(Table::grid(n + 1, capacity + 1, Value::Int(0)));

        for i in 1..=n {
            let weight = self.items[i - 1].weight;
            let value = self.items[i - 1].value;
            for w in 1..=capacity {
                let without = self.int_at(i - 1, w);
                let mut dependencies = vec![TableIndex::Grid(i - 1, w)];

                let (best, message) = if weight <= w {
                    let with = value.saturating_add(self.int_at(i - 1, w - weight));
                    dependencies.push(TableIndex::Grid(i - 1, w - weight));
                    let best = with.max(without);
                    (
                        best,
                        format!("dp[{i}][{w}] = max(with: {with}, without: {without}) = {best}"),
                    )
                } else {
                    (without, format!("dp[{i}][{w}] = {without} (item too heavy)"))
                };

                self.rec
                    .fill(TableIndex::Grid(i, w), Value::Int(best), dependencies, message);
            }
        }

        let path = self.backtrack(n, capacity);
        let answer = self.int_at(n, capacity);
        let names: Vec<&str> = self.selected_items().map(|it| it.name.as_str()).collect();
        let message = if names.is_empty() {
            format!("Maximum value: {answer}")
        } else {
            format!("Maximum value: {answer} (items: {})", names.join(", "))
        };
        self.rec
            .finish(TableIndex::Grid(n, capacity), Value::Int(answer), path, message);
    }

    /// Walk from `dp[n][capacity]` to row 0. An item was taken wherever a
    /// row differs from the row above it. Returns those cells top-down.
    fn backtrack(&mut self, n: usize, capacity: usize) -> Vec<TableIndex> {
        let mut w = capacity;
        let mut path = Vec::new();
        for i in (1..=n).rev() {
            if self.int_at(i, w) != self.int_at(i - 1, w) {
                self.selected.push(i - 1);
                path.push(TableIndex::Grid(i, w));
                w = w.saturating_sub(self.items[i - 1].weight);
            }
        }
        self.selected.reverse();
        path.reverse();
        path
    }

    fn int_at(&self, row: usize, col: usize) -> i64 {
        self.rec
            .cell(TableIndex::Grid(row, col))
            .as_int()
            .unwrap_or_default()
    }
}

impl DpSolver for KnapsackSolver {
    type Input = KnapsackInput;

    fn problem(&self) -> Problem {
        Problem::Knapsack
    }

    fn solve_tree(&mut self, input: &KnapsackInput) -> &[Step] {
        #[cfg(feature = "tracing")]
        let span = tracing::info_span!("solve_tree", problem = "knapsack", items = input.items.len());
        #[cfg(feature = "tracing")]
        let _enter = span.enter();
        self.run_recursive(input);
        self.rec.steps()
    }

    fn solve_memo(&mut self, input: &KnapsackInput) -> &[Step] {
        #[cfg(feature = "tracing")]
        let span = tracing::info_span!("solve_memo", problem = "knapsack", items = input.items.len());
        #[cfg(feature = "tracing")]
        let _enter = span.enter();
        self.run_recursive(input);
        self.rec.steps()
    }

    fn solve_table(&mut self, input: &KnapsackInput) -> &[Step] {
        #[cfg(feature = "tracing")]
        let span = tracing::info_span!("solve_table", problem = "knapsack", items = input.items.len());
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
            recursive: "O(2^n)",
            memoized: "O(n * W)",
            tabulated: "O(n * W)",
        }
    }

    fn space_complexity(&self) -> Complexity {
        Complexity {
            recursive: "O(n)",
            memoized: "O(n * W)",
            tabulated: "O(n * W)",
        }
    }

    fn description(&self) -> &'static str {
        "0/1 Knapsack: Maximize value while staying within weight capacity. Each item can be taken at most once."
    }
}
