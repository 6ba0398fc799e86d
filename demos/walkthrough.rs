//! Walk through every problem and view with the stock inputs, then scrub the
//! coin change table run back and forth.
//!
//! Run with `cargo run --example walkthrough`.

use dp_stepper::{project, DpSolver, Problem, SolverBuilder, View};
use dp_stepper::problems::{KnapsackInput, KnapsackSolver};

fn main() -> dp_stepper::Result<()> {
    for problem in Problem::ALL {
        println!("== {} ==", problem.name());
        for view in View::ALL {
            let run = SolverBuilder::new(problem).with_view(view).build()?;
            let answer = run
                .steps
                .last()
                .and_then(|s| s.table_value.clone().or_else(|| s.memo_value.clone()))
                .map(|v| v.to_string())
                .unwrap_or_default();
            println!(
                "  {:<5} {:>4} steps  {:>3} calls  {:<12} last value {answer}",
                view.as_str(),
                run.steps.len(),
                run.stats.recursive_calls,
                run.stats.time_complexity,
            );
        }
    }

    println!();
    let run = SolverBuilder::new(Problem::CoinChange)
        .with_view(View::Table)
        .build()?;
    let probes = [0, run.steps.len() / 2, run.steps.len() - 1, 3];
    for index in probes {
        let state = project(&run.steps, index)?;
        println!(
            "step {index:>2}: {} cells written, active {:?}, solution {:?}",
            state.table.filled(),
            state.active_cell.map(|c| c.to_string()),
            state.solution.map(|v| v.to_string()),
        );
    }

    println!();
    let mut knapsack = KnapsackSolver::new();
    let input = KnapsackInput::from_parallel(&[1, 3, 4], &[15, 20, 30], 4)?;
    let solution = knapsack.solve(&input);
    let chosen: Vec<_> = knapsack.selected_items().map(|i| i.name.as_str()).collect();
    println!("knapsack best value {} using {chosen:?}", solution.tabulated);

    Ok(())
}
