//! Problem selection and one-shot runs.
//!
//! The presentation layer picks a problem and a view by name; this module
//! maps those names onto the concrete solvers, runs the requested strategy,
//! and packages everything a view needs into a [`Run`].

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "parallel")]
use rayon::join;
use serde::{Deserialize, Serialize};

use crate::engine::{MemoSnapshot, Recorder, Table};
use crate::error::{Error, Result};
use crate::problems::{
    CoinChangeInput, CoinChangeSolver, FibonacciSolver, KnapsackInput, KnapsackSolver,
    LcsInput, LcsSolver,
};
use crate::step::Step;
use crate::traits::{Complexity, DpSolver, Solution};
use crate::tree::CallTree;

/// Which dynamic program to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Problem {
    #[serde(rename = "fibonacci")]
    Fibonacci,
    #[serde(rename = "coinChange")]
    CoinChange,
    #[serde(rename = "knapsack")]
    Knapsack,
    #[serde(rename = "lcs")]
    Lcs,
}

impl Problem {
    pub const ALL: [Problem; 4] = [
        Problem::Fibonacci,
        Problem::CoinChange,
        Problem::Knapsack,
        Problem::Lcs,
    ];

    /// Selector id, as accepted by [`FromStr`].
    pub fn id(self) -> &'static str {
        match self {
            Problem::Fibonacci => "fibonacci",
            Problem::CoinChange => "coinChange",
            Problem::Knapsack => "knapsack",
            Problem::Lcs => "lcs",
        }
    }

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            Problem::Fibonacci => "Fibonacci",
            Problem::CoinChange => "Coin Change",
            Problem::Knapsack => "0/1 Knapsack",
            Problem::Lcs => "Longest Common Subsequence",
        }
    }

    /// Stock instance shown before the user edits any input.
    pub fn default_input(self) -> ProblemInput {
        match self {
            Problem::Fibonacci => ProblemInput::Fibonacci(7),
            Problem::CoinChange => ProblemInput::CoinChange(CoinChangeInput::new(vec![1, 2, 5], 11)),
            Problem::Knapsack => ProblemInput::Knapsack(KnapsackInput::from_pairs(
                [(2, 3), (3, 4), (4, 5), (5, 6)],
                8,
            )),
            Problem::Lcs => ProblemInput::Lcs(LcsInput::new("ABCBDAB", "BDCABA")),
        }
    }

    /// LCS opens on the memo view, whose call tree gets large quickly.
    pub fn default_view(self) -> View {
        match self {
            Problem::Lcs => View::Memo,
            _ => View::Tree,
        }
    }

    pub fn solver(self) -> Solver {
        Solver::new(self)
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Problem {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fibonacci" | "fib" => Ok(Problem::Fibonacci),
            "coinchange" | "coin-change" | "coin_change" => Ok(Problem::CoinChange),
            "knapsack" => Ok(Problem::Knapsack),
            "lcs" => Ok(Problem::Lcs),
            _ => Err(Error::UnknownProblem(s.to_string())),
        }
    }
}

/// Which strategy, and therefore which visualization, to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    Tree,
    Memo,
    Table,
}

impl View {
    pub const ALL: [View; 3] = [View::Tree, View::Memo, View::Table];

    pub fn as_str(self) -> &'static str {
        match self {
            View::Tree => "tree",
            View::Memo => "memo",
            View::Table => "table",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for View {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tree" => Ok(View::Tree),
            "memo" => Ok(View::Memo),
            "table" => Ok(View::Table),
            _ => Err(Error::UnknownView(s.to_string())),
        }
    }
}

/// Typed input for any of the four problems.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "problem", content = "input", rename_all = "camelCase")]
pub enum ProblemInput {
    Fibonacci(usize),
    CoinChange(CoinChangeInput),
    Knapsack(KnapsackInput),
    Lcs(LcsInput),
}

impl ProblemInput {
    pub fn problem(&self) -> Problem {
        match self {
            ProblemInput::Fibonacci(_) => Problem::Fibonacci,
            ProblemInput::CoinChange(_) => Problem::CoinChange,
            ProblemInput::Knapsack(_) => Problem::Knapsack,
            ProblemInput::Lcs(_) => Problem::Lcs,
        }
    }
}

/// One solver of each kind behind a single type.
#[derive(Debug)]
pub enum Solver {
    Fibonacci(FibonacciSolver),
    CoinChange(CoinChangeSolver),
    Knapsack(KnapsackSolver),
    Lcs(LcsSolver),
}

impl Solver {
    pub fn new(problem: Problem) -> Self {
        match problem {
            Problem::Fibonacci => Solver::Fibonacci(FibonacciSolver::new()),
            Problem::CoinChange => Solver::CoinChange(CoinChangeSolver::new()),
            Problem::Knapsack => Solver::Knapsack(KnapsackSolver::new()),
            Problem::Lcs => Solver::Lcs(LcsSolver::new()),
        }
    }

    /// Select a solver by name; unknown names are an error, never a
    /// fallback.
    pub fn for_id(id: &str) -> Result<Self> {
        id.parse::<Problem>().map(Solver::new)
    }

    pub fn problem(&self) -> Problem {
        match self {
            Solver::Fibonacci(_) => Problem::Fibonacci,
            Solver::CoinChange(_) => Problem::CoinChange,
            Solver::Knapsack(_) => Problem::Knapsack,
            Solver::Lcs(_) => Problem::Lcs,
        }
    }

    /// Run the strategy behind `view` and return its step log.
    pub fn run(&mut self, view: View, input: &ProblemInput) -> Result<&[Step]> {
        match (self, input) {
            (Solver::Fibonacci(s), ProblemInput::Fibonacci(n)) => Ok(run_view(s, view, n)),
            (Solver::CoinChange(s), ProblemInput::CoinChange(i)) => Ok(run_view(s, view, i)),
            (Solver::Knapsack(s), ProblemInput::Knapsack(i)) => Ok(run_view(s, view, i)),
            (Solver::Lcs(s), ProblemInput::Lcs(i)) => Ok(run_view(s, view, i)),
            (solver, input) => Err(Error::InputMismatch {
                expected: solver.problem(),
                found: input.problem(),
            }),
        }
    }

    pub fn solve(&mut self, input: &ProblemInput) -> Result<Solution> {
        match (self, input) {
            (Solver::Fibonacci(s), ProblemInput::Fibonacci(n)) => Ok(s.solve(n)),
            (Solver::CoinChange(s), ProblemInput::CoinChange(i)) => Ok(s.solve(i)),
            (Solver::Knapsack(s), ProblemInput::Knapsack(i)) => Ok(s.solve(i)),
            (Solver::Lcs(s), ProblemInput::Lcs(i)) => Ok(s.solve(i)),
            (solver, input) => Err(Error::InputMismatch {
                expected: solver.problem(),
                found: input.problem(),
            }),
        }
    }

    pub fn recorder(&self) -> &Recorder {
        match self {
            Solver::Fibonacci(s) => s.recorder(),
            Solver::CoinChange(s) => s.recorder(),
            Solver::Knapsack(s) => s.recorder(),
            Solver::Lcs(s) => s.recorder(),
        }
    }

    pub fn time_complexity(&self) -> Complexity {
        match self {
            Solver::Fibonacci(s) => s.time_complexity(),
            Solver::CoinChange(s) => s.time_complexity(),
            Solver::Knapsack(s) => s.time_complexity(),
            Solver::Lcs(s) => s.time_complexity(),
        }
    }

    pub fn space_complexity(&self) -> Complexity {
        match self {
            Solver::Fibonacci(s) => s.space_complexity(),
            Solver::CoinChange(s) => s.space_complexity(),
            Solver::Knapsack(s) => s.space_complexity(),
            Solver::Lcs(s) => s.space_complexity(),
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Solver::Fibonacci(s) => s.description(),
            Solver::CoinChange(s) => s.description(),
            Solver::Knapsack(s) => s.description(),
            Solver::Lcs(s) => s.description(),
        }
    }

    /// Package the state of the last run as produced by `view`.
    pub fn capture(&self, view: View) -> Run {
        let rec = self.recorder();
        Run {
            problem: self.problem(),
            view,
            steps: rec.steps().to_vec(),
            tree: (view != View::Table).then(|| rec.tree().clone()),
            table: rec.table().clone(),
            memo: rec.memo_snapshot(),
            stats: Stats {
                recursive_calls: rec.recursive_calls(),
                time_complexity: self.time_complexity().for_view(view),
                space_complexity: self.space_complexity().for_view(view),
            },
        }
    }
}

fn run_view<'a, S: DpSolver>(solver: &'a mut S, view: View, input: &S::Input) -> &'a [Step] {
    match view {
        View::Tree => solver.solve_tree(input),
        View::Memo => solver.solve_memo(input),
        View::Table => solver.solve_table(input),
    }
}

/// Figures for the statistics panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub recursive_calls: usize,
    pub time_complexity: &'static str,
    pub space_complexity: &'static str,
}

/// Everything one view needs, detached from the solver that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct Run {
    pub problem: Problem,
    pub view: View,
    pub steps: Vec<Step>,
    /// `None` for the table view, which builds no tree.
    pub tree: Option<CallTree>,
    pub table: Table,
    pub memo: MemoSnapshot,
    pub stats: Stats,
}

/// Assemble a [`Run`] from a problem, an optional view and an optional
/// input; missing pieces come from the problem's defaults.
pub struct SolverBuilder {
    problem: Problem,
    view: Option<View>,
    input: Option<ProblemInput>,
}

impl SolverBuilder {
    pub fn new(problem: Problem) -> Self {
        Self {
            problem,
            view: None,
            input: None,
        }
    }

    pub fn with_view(mut self, view: View) -> Self {
        self.view = Some(view);
        self
    }

    pub fn with_input(mut self, input: ProblemInput) -> Self {
        self.input = Some(input);
        self
    }

    pub fn build(self) -> Result<Run> {
        let view = self.view.unwrap_or_else(|| self.problem.default_view());
        let input = match self.input {
            Some(input) => input,
            None => self.problem.default_input(),
        };
        capture_one(self.problem, view, &input)
    }
}

fn capture_one(problem: Problem, view: View, input: &ProblemInput) -> Result<Run> {
    let mut solver = Solver::new(problem);
    solver.run(view, input)?;
    Ok(solver.capture(view))
}

/// The three views of one input.
#[derive(Debug, Clone, Serialize)]
pub struct AllViews {
    pub tree: Run,
    pub memo: Run,
    pub table: Run,
}

/// Produce every view of `input`, each on its own solver.
#[cfg(feature = "parallel")]
pub fn solve_all_views(input: &ProblemInput) -> Result<AllViews> {
    let problem = input.problem();
    let (tree, (memo, table)) = join(
        || capture_one(problem, View::Tree, input),
        || {
            join(
                || capture_one(problem, View::Memo, input),
                || capture_one(problem, View::Table, input),
            )
        },
    );
    Ok(AllViews {
        tree: tree?,
        memo: memo?,
        table: table?,
    })
}

/// Produce every view of `input`, each on its own solver.
#[cfg(not(feature = "parallel"))]
pub fn solve_all_views(input: &ProblemInput) -> Result<AllViews> {
    let problem = input.problem();
    Ok(AllViews {
        tree: capture_one(problem, View::Tree, input)?,
        memo: capture_one(problem, View::Memo, input)?,
        table: capture_one(problem, View::Table, input)?,
    })
}
