use dp_stepper::{
    problems::CoinChangeInput, project, Error, NodeStatus, Problem, ProblemInput, Solver, Step,
    StepKind, TableIndex, Value, View,
};

fn solver_for(input: &ProblemInput, view: View) -> Solver {
    let mut solver = Solver::new(input.problem());
    solver.run(view, input).unwrap();
    solver
}

#[test]
fn final_projection_matches_solver_state() {
    for problem in Problem::ALL {
        let input = problem.default_input();
        for view in [View::Tree, View::Memo] {
            let solver = solver_for(&input, view);
            let rec = solver.recorder();
            let steps = rec.steps();
            let end = project(steps, steps.len() - 1).unwrap();

            assert!(end.call_stack.is_empty());
            assert_eq!(end.memo, rec.memo_snapshot());
            assert!(end.solution.is_none());

            let views = end.node_views(rec.tree());
            assert_eq!(views.len(), rec.tree().len());
            let root = &views[0];
            // The root closes the log, so it is the current node.
            assert_eq!(root.status, NodeStatus::Active);
            assert!(views[1..].iter().all(|v| v.status != NodeStatus::Idle));
        }
    }
}

#[test]
fn final_table_matches_stepped_cells() {
    for problem in Problem::ALL {
        let input = problem.default_input();
        let solver = solver_for(&input, View::Table);
        let rec = solver.recorder();
        let steps = rec.steps();
        let end = project(steps, steps.len() - 1).unwrap();

        for step in steps.iter().filter(|s| s.kind == StepKind::TableFill) {
            let index = step.table_index.unwrap();
            assert_eq!(end.table.get(index), rec.table().get(index), "{problem} {index}");
        }
        assert_eq!(end.solution.as_ref(), steps.last().unwrap().table_value.as_ref());
        assert_eq!(end.active_cell, steps.last().unwrap().table_index);
    }
}

#[test]
fn projection_is_pure() {
    let input = Problem::Lcs.default_input();
    let solver = solver_for(&input, View::Memo);
    let steps = solver.recorder().steps();
    let mid = steps.len() / 2;

    let forward = project(steps, mid).unwrap();
    let _ = project(steps, steps.len() - 1).unwrap();
    let _ = project(steps, 0).unwrap();
    let again = project(steps, mid).unwrap();
    assert_eq!(forward, again);
}

#[test]
fn stack_depth_tracks_nesting() {
    let input = ProblemInput::Fibonacci(6);
    let solver = solver_for(&input, View::Tree);
    let steps = solver.recorder().steps();
    let mut depth = 0usize;
    for (i, step) in steps.iter().enumerate() {
        match step.kind {
            StepKind::Call => depth += 1,
            StepKind::Return | StepKind::MemoHit => depth -= 1,
            _ => {}
        }
        let p = project(steps, i).unwrap();
        assert_eq!(p.depth(), depth, "step {i}");
        assert_eq!(p.current, Some(step.kind));
    }
}

#[test]
fn memo_grows_monotonically() {
    let input = Problem::CoinChange.default_input();
    let solver = solver_for(&input, View::Memo);
    let steps = solver.recorder().steps();
    let mut previous = 0;
    for i in 0..steps.len() {
        let p = project(steps, i).unwrap();
        assert!(p.memo.len() >= previous);
        previous = p.memo.len();
        if steps[i].kind == StepKind::MemoHit {
            let key = p.highlighted_memo_key.as_deref().unwrap();
            assert!(p.memo.contains_key(key));
        } else {
            assert!(p.highlighted_memo_key.is_none());
        }
    }
}

#[test]
fn memo_hit_nodes_show_memoized() {
    let input = ProblemInput::Fibonacci(5);
    let solver = solver_for(&input, View::Memo);
    let rec = solver.recorder();
    let steps = rec.steps();
    let hit = steps
        .iter()
        .position(|s| s.kind == StepKind::MemoHit)
        .expect("fib(5) has memo hits");
    let hit_node = steps[hit].node_id.unwrap();

    let at_hit = project(steps, hit).unwrap();
    assert_eq!(at_hit.status(hit_node), NodeStatus::Active);
    let after = project(steps, hit + 1).unwrap();
    assert_eq!(after.status(hit_node), NodeStatus::Memoized);

    let view = after
        .node_views(rec.tree())
        .into_iter()
        .find(|v| v.id == hit_node)
        .unwrap();
    assert!(view.result.is_some());
}

#[test]
fn untouched_nodes_are_idle_with_hidden_results() {
    let input = ProblemInput::Fibonacci(4);
    let solver = solver_for(&input, View::Tree);
    let rec = solver.recorder();
    let p = project(rec.steps(), 0).unwrap();
    let views = p.node_views(rec.tree());
    assert_eq!(views[0].status, NodeStatus::Active);
    assert!(views[1..].iter().all(|v| v.status == NodeStatus::Idle));
    assert!(views.iter().all(|v| v.result.is_none()));
}

#[test]
fn table_snapshot_fills_in_order() {
    let input = Problem::Knapsack.default_input();
    let solver = solver_for(&input, View::Table);
    let steps = solver.recorder().steps();

    let first = project(steps, 0).unwrap();
    assert_eq!(first.table.dimensions(), (5, 9));
    assert_eq!(first.table.filled(), 1);
    assert_eq!(first.active_cell, Some(TableIndex::Grid(1, 1)));
    assert_eq!(first.dependencies, vec![TableIndex::Grid(0, 1)]);
    // Implicit boundary cells are never written.
    assert_eq!(first.table.get(TableIndex::Grid(0, 1)), None);

    for i in 0..steps.len() - 1 {
        assert_eq!(project(steps, i).unwrap().table.filled(), i + 1);
    }
    let end = project(steps, steps.len() - 1).unwrap();
    assert_eq!(end.solution, Some(Value::Int(10)));
    assert_eq!(end.table.get(TableIndex::Grid(4, 8)), Some(&Value::Int(10)));
}

#[test]
fn linear_table_snapshot() {
    let input = ProblemInput::Fibonacci(5);
    let solver = solver_for(&input, View::Table);
    let steps = solver.recorder().steps();
    let p = project(steps, 3).unwrap();
    assert!(p.table.linear);
    assert_eq!(p.table.dimensions(), (1, 6));
    assert_eq!(p.table.get(TableIndex::Linear(2)), Some(&Value::Int(1)));
    assert_eq!(p.table.get(TableIndex::Linear(4)), None);
    assert_eq!(
        p.dependencies,
        vec![TableIndex::Linear(2), TableIndex::Linear(1)]
    );
}

#[test]
fn index_past_end_is_an_error() {
    let input = ProblemInput::Fibonacci(3);
    let solver = solver_for(&input, View::Table);
    let steps = solver.recorder().steps();
    let err = project(steps, steps.len()).unwrap_err();
    assert_eq!(
        err,
        Error::StepOutOfRange {
            index: steps.len(),
            len: steps.len()
        }
    );
}

#[test]
fn impossible_values_survive_json() {
    let input = ProblemInput::CoinChange(CoinChangeInput::new(vec![2], 3));

    let solver = solver_for(&input, View::Memo);
    let steps = solver.recorder().steps();
    let text = serde_json::to_string(steps).unwrap();
    let back: Vec<Step> = serde_json::from_str(&text).unwrap();
    assert_eq!(back, steps);
    let last = steps.len() - 1;
    assert_eq!(project(&back, last).unwrap(), project(steps, last).unwrap());
    assert!(back
        .iter()
        .filter_map(Step::memo_entry)
        .any(|(_, v)| *v == Value::Infinity));

    // An impossible cell and an unwritten cell stay distinguishable.
    let solver = solver_for(&input, View::Table);
    let steps = solver.recorder().steps();
    let end = project(steps, steps.len() - 1).unwrap();
    let json = serde_json::to_value(&end).unwrap();
    assert_eq!(json["table"]["cells"][0][1], serde_json::Value::Null);
    assert_eq!(json["table"]["cells"][1][1], serde_json::json!({ "infinite": true }));
    assert_eq!(json["table"]["cells"][1][2], 1);
}
