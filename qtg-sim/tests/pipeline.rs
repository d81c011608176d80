//! End-to-end solves on small instances

use qtg_core::{
    exhaustive, generate_instance, greedy_deletion, read_instance, write_instance, GeneratorConfig, Instance,
};
use qtg_sim::{
    Backend, BenchmarkReport, MixerKind, OptimizationState, QtgQaoaSolver, ResultSink, SolverConfig,
    SolverError,
};
use tempfile::NamedTempFile;

fn three_items() -> Instance {
    let profits = vec![vec![10, 0, 0], vec![0, 20, 0], vec![0, 0, 30]];
    Instance::new(3, profits, vec![2, 3, 4], 5).unwrap()
}

#[test]
fn finds_optimum_of_three_item_instance() {
    let solver = QtgQaoaSolver::new(SolverConfig::default()).unwrap();
    let evaluator = solver.evaluator().unwrap();
    let solution = solver.solve(&three_items(), evaluator.as_ref(), None).unwrap();

    assert!(solution.converged);
    assert!(solution.iterations < SolverConfig::default().max_iterations);
    assert_eq!(solution.value, 30);
    let text = solution.selection.to_string();
    assert!(text == "110" || text == "001", "unexpected selection {}", text);
    assert!(solution.feasible);
    assert_eq!(solution.parameters.len(), 6);
    assert!(solution.expectation < -25.0);
    assert_eq!(solution.counts.shots(), 1000);
    assert!(solution.infeasible_fraction == 0.0);
}

#[test]
fn progress_callback_sees_every_iteration() {
    let solver = QtgQaoaSolver::new(SolverConfig::fast()).unwrap();
    let evaluator = solver.evaluator().unwrap();

    let mut calls = 0usize;
    let mut last_best = f64::INFINITY;
    let mut progress = |state: &OptimizationState| {
        assert_eq!(state.iteration, calls);
        assert!(state.best_value <= last_best);
        last_best = state.best_value;
        calls += 1;
    };
    let solution = solver
        .solve(&three_items(), evaluator.as_ref(), Some(&mut progress))
        .unwrap();

    assert!(calls >= solution.iterations);
    assert!(calls <= solution.iterations + 1);
}

#[test]
fn shot_backend_reports_feasible_selection() {
    let config = SolverConfig::fast().with_backend(Backend::Shots).with_shots(512);
    let solver = QtgQaoaSolver::new(config).unwrap();
    let evaluator = solver.evaluator().unwrap();
    assert_eq!(evaluator.name(), "shots");

    let solution = solver.solve(&three_items(), evaluator.as_ref(), None).unwrap();
    assert!(solution.feasible);
    assert_eq!(solution.counts.shots(), 512);
    assert_eq!(solution.infeasible_fraction, 0.0);
}

#[test]
fn solve_is_reproducible() {
    let solver = QtgQaoaSolver::new(SolverConfig::fast().with_seed(9)).unwrap();
    let evaluator = solver.evaluator().unwrap();
    let a = solver.solve(&three_items(), evaluator.as_ref(), None).unwrap();
    let b = solver.solve(&three_items(), evaluator.as_ref(), None).unwrap();
    assert_eq!(a, b);
}

#[test]
fn iteration_cap_is_an_optimization_error() {
    let config = SolverConfig {
        max_iterations: 2,
        allow_unconverged: false,
        ..SolverConfig::default()
    };
    let solver = QtgQaoaSolver::new(config).unwrap();
    let evaluator = solver.evaluator().unwrap();
    let result = solver.solve(&three_items(), evaluator.as_ref(), None);
    assert!(matches!(result, Err(SolverError::Optimization(_))));
}

#[test]
fn generated_instance_stays_within_capacity() {
    let instance = generate_instance(&GeneratorConfig::new(10, 100, 60, 5)).unwrap();
    let solver = QtgQaoaSolver::new(SolverConfig::fast().with_bias_per_item(0.5)).unwrap();
    let evaluator = solver.evaluator().unwrap();
    let solution = solver.solve(&instance, evaluator.as_ref(), None).unwrap();

    assert!(solution.feasible);
    assert!(solution.value <= exhaustive(&instance).value);
    assert_eq!(solution.infeasible_fraction, 0.0);
}

#[test]
fn hamming_weight_mixer_stays_feasible_with_unit_weights() {
    // with unit weights the capacity only bounds the number of items
    let profits = vec![
        vec![3, 4, 0, 1],
        vec![4, 2, 5, 0],
        vec![0, 5, 1, 2],
        vec![1, 0, 2, 6],
    ];
    let instance = Instance::new(4, profits, vec![1, 1, 1, 1], 2).unwrap();
    let config = SolverConfig::fast().with_mixer(MixerKind::HammingWeight);
    let solver = QtgQaoaSolver::new(config).unwrap();
    let evaluator = solver.evaluator().unwrap();
    let solution = solver.solve(&instance, evaluator.as_ref(), None).unwrap();

    assert!(solution.feasible);
    assert_eq!(solution.infeasible_fraction, 0.0);
    assert!(solution.selection.count_ones() <= 2);
    assert_eq!(solution.value, instance.value(&solution.selection));
    assert!(solution.value <= exhaustive(&instance).value);
}

#[test]
fn appended_report_keeps_instance_readable() {
    let instance = three_items();
    let file = NamedTempFile::new().unwrap();
    write_instance(file.path(), "three_items", &instance).unwrap();

    let solver = QtgQaoaSolver::new(SolverConfig::fast()).unwrap();
    let evaluator = solver.evaluator().unwrap();
    let solution = solver.solve(&instance, evaluator.as_ref(), None).unwrap();
    let report = BenchmarkReport::new(&solution)
        .with_exact(exhaustive(&instance))
        .with_greedy(greedy_deletion(&instance));
    ResultSink::append(file.path(), &report).unwrap();

    let text = std::fs::read_to_string(file.path()).unwrap();
    assert!(text.contains("\nQTG-QAOA solution:\n"));
    assert!(text.contains(&format!("Best Solution: {}\n", solution.selection)));
    assert!(text.contains("Classical solution (exhaustive):\nBest Value:  30\n"));

    let reread = read_instance(file.path()).unwrap();
    assert_eq!(reread.instance, instance);
    assert_eq!(reread.reference, "three_items");
}
