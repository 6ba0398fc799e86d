use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dp_stepper::{
    check_nesting, problems::LcsInput, project, Problem, ProblemInput, Solver, Step, View,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn random_dna(rng: &mut StdRng, len: usize) -> String {
    const ALPHABET: &[u8] = b"ACGT";
    (0..len)
        .map(|_| char::from(ALPHABET[rng.gen_range(0..ALPHABET.len())]))
        .collect()
}

fn log_for(input: &ProblemInput, view: View) -> Vec<Step> {
    let mut solver = Solver::new(input.problem());
    match solver.run(view, input) {
        Ok(steps) => steps.to_vec(),
        Err(err) => panic!("bench input rejected: {err}"),
    }
}

/// Scrub through a whole log the way an animation clock does: one full
/// projection per index.
fn bench_full_scrub(c: &mut Criterion) {
    let mut group = c.benchmark_group("replay_full_scrub");
    for problem in Problem::ALL {
        let input = problem.default_input();
        let steps = log_for(&input, problem.default_view());
        group.bench_function(format!("{}_{}_steps", problem.id(), steps.len()), |b| {
            b.iter(|| {
                for i in 0..steps.len() {
                    black_box(project(&steps, i).map(|p| p.depth()).unwrap_or_default());
                }
            })
        });
    }
    group.finish();
}

/// Random seeks into a large memo log.
fn bench_random_seek(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0xD0_57E9);
    let input = ProblemInput::Lcs(LcsInput::new(random_dna(&mut rng, 40), random_dna(&mut rng, 40)));
    let steps = log_for(&input, View::Memo);
    let seeks: Vec<usize> = (0..64).map(|_| rng.gen_range(0..steps.len())).collect();

    c.bench_function("replay_random_seek_lcs_40", |b| {
        b.iter(|| {
            for &i in &seeks {
                black_box(project(&steps, i).map(|p| p.memo.len()).unwrap_or_default());
            }
        })
    });
    c.bench_function("check_nesting_lcs_40", |b| {
        b.iter(|| black_box(check_nesting(&steps).unwrap_or_default()))
    });
}

criterion_group!(benches, bench_full_scrub, bench_random_seek);
criterion_main!(benches);
