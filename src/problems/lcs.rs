//! Longest Common Subsequence (LCS) with a narrated execution.
//!
//! Recursion: `LCS(i, j)` is the LCS length of the prefixes `a[..i]` and
//! `b[..j]`. On a character match it issues the single diagonal call
//! `LCS(i-1, j-1)`; otherwise `LCS(i-1, j)` ("up") then `LCS(i, j-1)`
//! ("left"). Unlike the other problems, boundary calls (`i == 0` or
//! `j == 0`) are cached too, under `"i,j"`.
//!
//! Table: `dp[i][j]` for `0..=m` x `0..=n` with row and column 0 implicitly
//! zero. After filling, the subsequence is reconstructed by walking from
//! `(m, n)` toward `(0, 0)`: diagonal on a match, otherwise toward the larger
//! neighbour with ties going up. The `solution` step carries the string.
//!
//! Characters are compared as Unicode scalar values.

use serde::{Deserialize, Serialize};

use crate::builder::Problem;
use crate::engine::{Recorder, Table};
use crate::step::{Step, TableIndex, Value};
use crate::traits::{Complexity, DpSolver};
use crate::tree::NodeId;
use crate::utils::pair_key;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LcsInput {
    pub str1: String,
    pub str2: String,
}

impl LcsInput {
    pub fn new(str1: impl Into<String>, str2: impl Into<String>) -> Self {
        Self {
            str1: str1.into(),
            str2: str2.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct LcsSolver {
    rec: Recorder,
    s: Vec<char>,
    t: Vec<char>,
}

impl LcsSolver {
    pub fn new() -> Self {
        Self::default()
    }

    fn load(&mut self, input: &LcsInput) {
        self.rec.reset();
        self.s = input.str1.chars().collect();
        self.t = input.str2.chars().collect();
    }

    fn run_recursive(&mut self, input: &LcsInput) {
        self.load(input);
        self.lcs(None, self.s.len(), self.t.len());
        #[cfg(feature = "tracing")]
        tracing::debug!(
            m = self.s.len(),
            n = self.t.len(),
            calls = self.rec.recursive_calls(),
            "lcs recursion finished"
        );
    }

    fn lcs(&mut self, parent: Option<NodeId>, i: usize, j: usize) -> i64 {
        let (pi, pj) = (to_param(i), to_param(j));
        let node = self.rec.spawn(parent, format!("LCS({i},{j})"), vec![pi, pj]);
        self.rec.enter(node, format!("Calling LCS(i={i}, j={j})"));

        let key = pair_key(pi, pj);
        if let Some(cached) = self.rec.lookup(&key) {
            let value = cached.as_int().unwrap_or_default();
            self.rec
                .hit(node, key, cached, format!("Cache hit for LCS({i}, {j}): {value}"));
            return value;
        }

        if i == 0 || j == 0 {
            self.rec.leave(
                node,
                Value::Int(0),
                Some(key),
                format!("Base case: i={i} or j={j} is 0, returning 0"),
            );
            return 0;
        }

        let (value, message) = if self.s[i - 1] == self.t[j - 1] {
            let diag = self.lcs(Some(node), i - 1, j - 1);
            let value = diag + 1;
            (
                value,
                format!(
                    "Match '{}': LCS({i}, {j}) = 1 + LCS({}, {}) = {value}. Returning and caching.",
                    self.s[i - 1],
                    i - 1,
                    j - 1
                ),
            )
        } else {
            let up = self.lcs(Some(node), i - 1, j);
            let left = self.lcs(Some(node), i, j - 1);
            let value = up.max(left);
            (
                value,
                format!(
                    "LCS({i}, {j}) = max({up}, {left}) = {value}. Returning and caching."
                ),
            )
        };

        self.rec.leave(node, Value::Int(value), Some(key), message);
        value
    }

    fn tabulate(&mut self, input: &LcsInput) {
        self.load(input);
        let m = self.s.len();
        let n = self.t.len();
        self.rec.init_table(Table::grid(m + 1, n + 1, Value::Int(0)));

        for i in 1..=m {
            for j in 1..=n {
                let (value, dependencies, message) = if self.s[i - 1] == self.t[j - 1] {
                    let value = self.int_at(i - 1, j - 1) + 1;
                    (
                        value,
                        vec![TableIndex::Grid(i - 1, j - 1)],
                        format!(
                            "Match: '{}'. dp[{i}][{j}] = 1 + dp[{}][{}] = {value}",
                            self.s[i - 1],
                            i - 1,
                            j - 1
                        ),
                    )
                } else {
                    let up = self.int_at(i - 1, j);
                    let left = self.int_at(i, j - 1);
                    let value = up.max(left);
                    (
                        value,
                        vec![TableIndex::Grid(i - 1, j), TableIndex::Grid(i, j - 1)],
                        format!(
                            "No match. dp[{i}][{j}] = max(dp[{}][{j}], dp[{i}][{}]) = max({up}, {left}) = {value}",
                            i - 1,
                            j - 1
                        ),
                    )
                };
                self.rec
                    .fill(TableIndex::Grid(i, j), Value::Int(value), dependencies, message);
            }
        }

        let (subsequence, matched) = self.backtrack();
        let len = subsequence.chars().count();
        self.rec.finish(
            TableIndex::Grid(m, n),
            Value::Text(subsequence.clone()),
            matched,
            format!("LCS: \"{subsequence}\" (length: {len})"),
        );
    }

    /// Rebuild one LCS from the filled table. Also returns the matched
    /// cells, top-left first.
    fn backtrack(&self) -> (String, Vec<TableIndex>) {
        let (mut i, mut j) = (self.s.len(), self.t.len());
        let mut rev = Vec::new();
        let mut matched = Vec::new();
        while i > 0 && j > 0 {
            if self.s[i - 1] == self.t[j - 1] {
                rev.push(self.s[i - 1]);
                matched.push(TableIndex::Grid(i, j));
                i -= 1;
                j -= 1;
            } else if self.int_at(i - 1, j) >= self.int_at(i, j - 1) {
                i -= 1;
            } else {
                j -= 1;
            }
        }
        matched.reverse();
        (rev.into_iter().rev().collect(), matched)
    }

    fn int_at(&self, row: usize, col: usize) -> i64 {
        self.rec
            .cell(TableIndex::Grid(row, col))
            .as_int()
            .unwrap_or_default()
    }
}

fn to_param(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

impl DpSolver for LcsSolver {
    type Input = LcsInput;

    fn problem(&self) -> Problem {
        Problem::Lcs
    }

    fn solve_tree(&mut self, input: &LcsInput) -> &[Step] {
        #[cfg(feature = "tracing")]
        let span = tracing::info_span!("solve_tree", problem = "lcs", m = input.str1.len(), n = input.str2.len());
        #[cfg(feature = "tracing")]
        let _enter = span.enter();
        self.run_recursive(input);
        self.rec.steps()
    }

    fn solve_memo(&mut self, input: &LcsInput) -> &[Step] {
        #[cfg(feature = "tracing")]
        let span = tracing::info_span!("solve_memo", problem = "lcs", m = input.str1.len(), n = input.str2.len());
        #[cfg(feature = "tracing")]
        let _enter = span.enter();
        self.run_recursive(input);
        self.rec.steps()
    }

    fn solve_table(&mut self, input: &LcsInput) -> &[Step] {
        #[cfg(feature = "tracing")]
        let span = tracing::info_span!("solve_table", problem = "lcs", m = input.str1.len(), n = input.str2.len());
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
            recursive: "O(2^(m+n))",
            memoized: "O(m * n)",
            tabulated: "O(m * n)",
        }
    }

    fn space_complexity(&self) -> Complexity {
        Complexity {
            recursive: "O(m + n)",
            memoized: "O(m * n)",
            tabulated: "O(m * n)",
        }
    }

    fn description(&self) -> &'static str {
        "Find the Longest Common Subsequence between two strings."
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::StepKind;

    #[test]
    fn match_issues_single_diagonal_call() {
        let mut solver = LcsSolver::new();
        solver.solve_tree(&LcsInput::new("A", "A"));
        let tree = solver.tree();
        let root = tree.root().unwrap();
        assert_eq!(root.label, "LCS(1,1)");
        let labels: Vec<_> = tree.children(root.id).map(|c| c.label.clone()).collect();
        assert_eq!(labels, vec!["LCS(0,0)"]);
        assert_eq!(root.result, Some(Value::Int(1)));
    }

    #[test]
    fn mismatch_goes_up_then_left() {
        let mut solver = LcsSolver::new();
        solver.solve_tree(&LcsInput::new("AB", "C"));
        let tree = solver.tree();
        let labels: Vec<_> = tree
            .children(NodeId::new(0))
            .map(|c| c.label.clone())
            .collect();
        assert_eq!(labels, vec!["LCS(1,1)", "LCS(2,0)"]);
    }

    #[test]
    fn boundary_cells_are_cached_once() {
        let mut solver = LcsSolver::new();
        let steps = solver.solve_memo(&LcsInput::new("AB", "CD")).to_vec();
        let writes: Vec<_> = steps
            .iter()
            .filter(|s| s.kind == StepKind::Return)
            .filter_map(|s| s.memo_key.clone())
            .collect();
        let mut deduped = writes.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(writes.len(), deduped.len(), "a memo key was written twice");
        assert!(writes.contains(&"0,2".to_string()));
        assert!(steps.iter().any(|s| s.kind == StepKind::MemoHit));
    }

    #[test]
    fn backtrace_prefers_up_on_ties() {
        let mut solver = LcsSolver::new();
        let steps = solver.solve_table(&LcsInput::new("AB", "BA")).to_vec();
        let last = steps.last().unwrap();
        // From (2,2): 'B' vs 'A' mismatch, up = dp[1][2] = 1, left = dp[2][1] = 1 -> up.
        // (1,2): 'A' == 'A' -> take 'A'.
        assert_eq!(last.table_value, Some(Value::Text("A".into())));
        assert_eq!(last.dependencies, vec![TableIndex::Grid(1, 2)]);
    }

    #[test]
    fn empty_string_table() {
        let mut solver = LcsSolver::new();
        let steps = solver.solve_table(&LcsInput::new("", "ABC")).to_vec();
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].kind, StepKind::Solution);
        assert_eq!(steps[0].table_value, Some(Value::Text(String::new())));
    }

    #[test]
    fn memoized_answer_is_a_length() {
        let mut solver = LcsSolver::new();
        let solution = solver.solve(&LcsInput::new("ABCBDAB", "BDCABA"));
        assert_eq!(solution.memoized, Value::Int(4));
        assert_eq!(solution.tabulated.as_text().map(|s| s.chars().count()), Some(4));
    }
}
