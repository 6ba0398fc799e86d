use std::env;

use dp_stepper::problems::KnapsackInput;
use dp_stepper::utils::{parse_count, parse_int_list};
use dp_stepper::{
    project, Error, NodeStatus, Problem, ProblemInput, Projection, Run, SolverBuilder, Step, View,
};

fn main() {
    let options = match Options::parse(env::args().skip(1)) {
        Ok(opts) => opts,
        Err(err) => {
            eprintln!("dp_trace: {err}");
            Options::print_help();
            std::process::exit(2);
        }
    };

    #[cfg(feature = "tracing")]
    init_tracing();

    if let Err(err) = run(&options) {
        eprintln!("dp_trace: {err}");
        std::process::exit(1);
    }
}

#[cfg(feature = "tracing")]
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(options: &Options) -> Result<(), String> {
    let problem: Problem = options.problem.parse().map_err(|e: Error| e.to_string())?;
    let view = match &options.view {
        Some(v) => v.parse::<View>().map_err(|e| e.to_string())?,
        None => problem.default_view(),
    };
    let input = options.input_for(problem).map_err(|e| e.to_string())?;
    let run = SolverBuilder::new(problem)
        .with_view(view)
        .with_input(input)
        .build()
        .map_err(|e| e.to_string())?;

    match options.at {
        Some(index) => {
            let projection = project(&run.steps, index).map_err(|e| e.to_string())?;
            options.format.write_projection(&run, &projection)
        }
        None => options.format.write_run(&run),
    }
}

struct Options {
    problem: String,
    view: Option<String>,
    n: Option<String>,
    coins: Option<String>,
    amount: Option<String>,
    weights: Option<String>,
    values: Option<String>,
    capacity: Option<String>,
    str1: Option<String>,
    str2: Option<String>,
    at: Option<usize>,
    format: OutputFormat,
}

/// Flags that take a value, in `--flag value` or `--flag=value` form.
const VALUE_FLAGS: [&str; 12] = [
    "problem", "view", "n", "coins", "amount", "weights", "values", "capacity", "str1", "str2",
    "at", "format",
];

impl Options {
    fn parse<I, T>(mut args: I) -> Result<Self, String>
    where
        I: Iterator<Item = T>,
        T: Into<String>,
    {
        let mut options = Options {
            problem: "fibonacci".to_string(),
            view: None,
            n: None,
            coins: None,
            amount: None,
            weights: None,
            values: None,
            capacity: None,
            str1: None,
            str2: None,
            at: None,
            format: OutputFormat::Text,
        };

        while let Some(arg) = args.next() {
            let arg = arg.into();
            if arg == "--help" || arg == "-h" {
                Options::print_help();
                std::process::exit(0);
            }
            let Some(flag) = arg.strip_prefix("--") else {
                return Err(format!("unrecognized argument '{arg}'"));
            };
            let (name, value) = match flag.split_once('=') {
                Some((name, value)) => (name.to_string(), value.to_string()),
                None => {
                    if !VALUE_FLAGS.contains(&flag) {
                        return Err(format!("unrecognized argument '{arg}'"));
                    }
                    let value = args
                        .next()
                        .ok_or_else(|| format!("missing value after --{flag}"))?
                        .into();
                    (flag.to_string(), value)
                }
            };

            match name.as_str() {
                "problem" => options.problem = value,
                "view" => options.view = Some(value),
                "n" => options.n = Some(value),
                "coins" => options.coins = Some(value),
                "amount" => options.amount = Some(value),
                "weights" => options.weights = Some(value),
                "values" => options.values = Some(value),
                "capacity" => options.capacity = Some(value),
                "str1" => options.str1 = Some(value),
                "str2" => options.str2 = Some(value),
                "at" => {
                    options.at = Some(
                        value
                            .parse::<usize>()
                            .map_err(|_| "step index must be a non-negative integer".to_string())?,
                    )
                }
                "format" => options.format = OutputFormat::from_str(&value)?,
                _ => return Err(format!("unrecognized argument '{arg}'")),
            }
        }

        Ok(options)
    }

    /// Overlay the flags given on the command line onto the problem's stock
    /// input.
    fn input_for(&self, problem: Problem) -> dp_stepper::Result<ProblemInput> {
        let input = match problem.default_input() {
            ProblemInput::Fibonacci(n) => ProblemInput::Fibonacci(match &self.n {
                Some(text) => parse_count("n", text)?,
                None => n,
            }),
            ProblemInput::CoinChange(mut stock) => {
                if let Some(text) = &self.coins {
                    stock.coins = parse_int_list("coins", text)?;
                }
                if let Some(text) = &self.amount {
                    stock.amount = parse_count("amount", text)?;
                }
                ProblemInput::CoinChange(stock)
            }
            ProblemInput::Knapsack(stock) => {
                let weights = match &self.weights {
                    Some(text) => parse_weights(text)?,
                    None => stock.items.iter().map(|item| item.weight).collect(),
                };
                let values = match &self.values {
                    Some(text) => parse_int_list("values", text)?,
                    None => stock.items.iter().map(|item| item.value).collect(),
                };
                let capacity = match &self.capacity {
                    Some(text) => parse_count("capacity", text)?,
                    None => stock.capacity,
                };
                ProblemInput::Knapsack(KnapsackInput::from_parallel(&weights, &values, capacity)?)
            }
            ProblemInput::Lcs(mut stock) => {
                if let Some(text) = &self.str1 {
                    stock.str1 = text.clone();
                }
                if let Some(text) = &self.str2 {
                    stock.str2 = text.clone();
                }
                ProblemInput::Lcs(stock)
            }
        };
        Ok(input)
    }

    fn print_help() {
        println!(
            "\
Usage: cargo run --bin dp_trace [-- <options>]

Options:
  --problem <fibonacci|coinChange|knapsack|lcs>   Problem to run (default: fibonacci)
  --view <tree|memo|table>      Strategy to narrate (default: memo for lcs, tree otherwise)
  --n <N>                       Fibonacci index (default: 7)
  --coins <LIST>                Coin denominations, comma separated (default: 1,2,5)
  --amount <N>                  Coin change target (default: 11)
  --weights <LIST>              Knapsack item weights (default: 2,3,4,5)
  --values <LIST>               Knapsack item values (default: 3,4,5,6)
  --capacity <N>                Knapsack capacity (default: 8)
  --str1 <TEXT>                 First LCS string (default: ABCBDAB)
  --str2 <TEXT>                 Second LCS string (default: BDCABA)
  --at <INDEX>                  Print the replayed state at this step instead of the log
  --format <text|json>          Output format (default: text)
  -h, --help                    Print this help message

Examples:
  cargo run --bin dp_trace -- --problem coinChange --view table
  cargo run --bin dp_trace -- --problem lcs --str1 ABC --str2 AC --at 5
  cargo run --bin dp_trace -- --problem knapsack --format=json
"
        );
    }
}

fn parse_weights(text: &str) -> dp_stepper::Result<Vec<usize>> {
    parse_int_list("weights", text)?
        .into_iter()
        .map(|w| {
            usize::try_from(w).map_err(|_| Error::InvalidNumber {
                field: "weights",
                value: w.to_string(),
            })
        })
        .collect()
}

#[derive(Copy, Clone)]
enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    fn from_str(value: &str) -> Result<Self, String> {
        match value {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown format '{other}'")),
        }
    }

    fn write_run(self, run: &Run) -> Result<(), String> {
        match self {
            OutputFormat::Text => {
                write_run_text(run);
                Ok(())
            }
            OutputFormat::Json => write_json(run),
        }
    }

    fn write_projection(self, run: &Run, projection: &Projection) -> Result<(), String> {
        match self {
            OutputFormat::Text => {
                write_projection_text(run, projection);
                Ok(())
            }
            OutputFormat::Json => write_json(projection),
        }
    }
}

fn write_json<T: serde::Serialize>(value: &T) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| format!("failed to serialise output: {e}"))?;
    println!("{text}");
    Ok(())
}

fn write_run_text(run: &Run) {
    println!("{} / {} view", run.problem.name(), run.view);
    println!(
        "{} steps, {} recursive calls, time {}, space {}",
        run.steps.len(),
        run.stats.recursive_calls,
        run.stats.time_complexity,
        run.stats.space_complexity
    );
    println!();
    let width = run.steps.len().to_string().len();
    for (i, step) in run.steps.iter().enumerate() {
        println!("{i:>width$}  {}", describe(step));
    }
}

fn describe(step: &Step) -> String {
    let mut line = format!("{:<10}", step.kind.as_str());
    if let Some(node) = step.node_id {
        line.push_str(&format!(" {node:<8}"));
    }
    if let Some(index) = step.table_index {
        line.push_str(&format!(" {index:<8}"));
    }
    line.push(' ');
    line.push_str(&step.message);
    line
}

fn write_projection_text(run: &Run, p: &Projection) {
    println!(
        "{} / {} view, step {} of {}",
        run.problem.name(),
        run.view,
        p.index + 1,
        run.steps.len()
    );
    if let Some(message) = &p.message {
        println!("  {message}");
    }

    if let Some(tree) = &run.tree {
        println!();
        println!("call stack (outermost first):");
        for frame in &p.call_stack {
            let label = tree
                .get(frame.node_id)
                .map_or_else(|| frame.node_id.to_string(), |n| n.label.clone());
            println!("  {label}  (opened at step {})", frame.step_index);
        }
        println!();
        println!("nodes:");
        for node in p.node_views(tree) {
            if node.status == NodeStatus::Idle {
                continue;
            }
            let result = node.result.map(|v| format!(" = {v}")).unwrap_or_default();
            println!("  {:<12} {:?}{result}", node.label, node.status);
        }
    }

    if !p.memo.is_empty() {
        println!();
        println!("memo:");
        for (key, value) in &p.memo {
            let marker = if p.highlighted_memo_key.as_deref() == Some(key.as_str()) {
                "*"
            } else {
                " "
            };
            println!(" {marker}{key:>8} -> {value}");
        }
    }

    if !p.table.cells.is_empty() {
        println!();
        println!("table:");
        for row in &p.table.cells {
            let cells: Vec<String> = row
                .iter()
                .map(|c| c.as_ref().map_or_else(|| ".".to_string(), ToString::to_string))
                .map(|c| format!("{c:>4}"))
                .collect();
            println!("  {}", cells.join(""));
        }
        if let Some(cell) = p.active_cell {
            let deps: Vec<String> = p.dependencies.iter().map(ToString::to_string).collect();
            println!("  active {cell}, reads [{}]", deps.join(", "));
        }
    }

    if let Some(solution) = &p.solution {
        println!();
        println!("solution: {solution}");
    }
}
