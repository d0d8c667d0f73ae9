use approx::assert_abs_diff_eq;
use ndarray::{Array1, Array2, array};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use sparsetrack::config::{EngineConfig, RunConfig};
use sparsetrack::coordinate::{CoordinateOrder, DegeneracyPolicy};
use sparsetrack::report::{SelectionTrace, render_stacked_bars, write_tsv};
use sparsetrack::simulate::{SimulationConfig, SimulationError, generate_data};
use sparsetrack::{LassoError, LassoState, NoopArrivalObserver, Observation, OnlineLasso};

fn step(
    engine: &OnlineLasso,
    state: &LassoState,
    label: f64,
    features: &Array1<f64>,
) -> LassoState {
    engine
        .step(state, &Observation::new(label, features.view()))
        .unwrap()
        .state
}

fn assert_all_close(actual: ndarray::ArrayView1<f64>, expected: &[f64], epsilon: f64) {
    assert_eq!(actual.len(), expected.len());
    for (&a, &e) in actual.iter().zip(expected) {
        assert_abs_diff_eq!(a, e, epsilon = epsilon);
    }
}

#[test]
fn two_feature_scenario_recovers_the_observed_coordinate() {
    let engine = OnlineLasso::new(2, 1.0).unwrap();
    let outcome = engine
        .step(
            &engine.initial_state(),
            &Observation::new(2.0, array![1.0, 0.0].view()),
        )
        .unwrap();

    assert_eq!(outcome.state.xy(), array![2.0, 0.0]);
    assert_eq!(outcome.state.xx(), array![1.0, 0.0]);
    assert_eq!(outcome.penalty, 1.0);
    assert_eq!(outcome.state.theta(), array![1.0, 0.0]);
    assert_eq!(outcome.degenerate, vec![1]);
}

#[test]
fn single_feature_matches_the_scalar_closed_form() {
    let var_y = 0.3;
    let engine = OnlineLasso::new(1, var_y).unwrap();
    let mut rng = StdRng::seed_from_u64(11);
    let mut state = engine.initial_state();
    let (mut xy, mut xx) = (0.0_f64, 0.0_f64);

    for _ in 0..40 {
        let x: f64 = rng.sample(StandardNormal);
        let y: f64 = 1.7 * x + 0.1 * rng.sample::<f64, _>(StandardNormal);
        state = step(&engine, &state, y, &array![x]);

        xy += x * y;
        xx += x * x;
        let penalty = (xx * var_y).sqrt();
        let expected = xy.signum() * (xy.abs() - penalty).max(0.0) / xx;
        assert_abs_diff_eq!(state.xy()[0], xy, epsilon = 1e-9);
        assert_abs_diff_eq!(state.theta()[0], expected, epsilon = 1e-9);
    }
}

#[test]
fn zero_noise_variance_gives_plain_ratios() {
    let engine = OnlineLasso::new(2, 0.0).unwrap();
    let outcome = engine
        .step(
            &engine.initial_state(),
            &Observation::new(4.0, array![2.0, -1.0].view()),
        )
        .unwrap();

    assert_eq!(outcome.penalty, 0.0);
    assert_eq!(outcome.state.xy(), array![8.0, 0.0]);
    assert_eq!(outcome.state.theta(), array![2.0, 0.0]);

    let mut rng = StdRng::seed_from_u64(3);
    let mut state = outcome.state;
    for _ in 0..25 {
        let features = Array1::from_shape_fn(2, |_| rng.sample::<f64, _>(StandardNormal));
        let outcome = engine
            .step(&state, &Observation::new(rng.sample(StandardNormal), features.view()))
            .unwrap();
        assert_eq!(outcome.penalty, 0.0);
        for j in 0..2 {
            let (xy, xx) = (outcome.state.xy()[j], outcome.state.xx()[j]);
            assert_abs_diff_eq!(outcome.state.theta()[j], xy / xx, epsilon = 1e-12);
        }
        state = outcome.state;
    }
}

#[test]
fn energy_is_non_negative_and_non_decreasing() {
    let engine = OnlineLasso::new(6, 0.8).unwrap();
    let mut rng = StdRng::seed_from_u64(2024);
    let mut state = engine.initial_state();

    for t in 0..200 {
        // Every third arrival leaves feature 5 silent.
        let features = Array1::from_shape_fn(6, |j| {
            if j == 5 && t % 3 == 0 {
                0.0
            } else {
                rng.sample::<f64, _>(StandardNormal)
            }
        });
        let next = step(&engine, &state, rng.sample(StandardNormal), &features);
        for j in 0..6 {
            assert!(next.xx()[j] >= 0.0);
            assert!(next.xx()[j] >= state.xx()[j]);
        }
        state = next;
    }
}

#[test]
fn sweep_order_changes_the_estimate() {
    let engine_for = |order| {
        OnlineLasso::with_config(
            3,
            &EngineConfig {
                noise_variance: 0.0,
                coordinate_order: order,
                degeneracy: DegeneracyPolicy::HoldAtZero,
            },
        )
        .unwrap()
    };
    let ascending = engine_for(CoordinateOrder::Ascending);
    let descending = engine_for(CoordinateOrder::Descending);
    let first = array![1.0, 2.0, -1.0];
    let second = array![0.5, 1.0, 1.0];

    // After accumulation: xy = [3, 6, -3], xx = [1, 4, 1], penalty 0.
    // Ascending solves coordinate 0 first and explains the label with it;
    // descending solves coordinate 2 first and explains it with that one.
    let asc = step(&ascending, &ascending.initial_state(), 3.0, &first);
    let desc = step(&descending, &descending.initial_state(), 3.0, &first);
    assert_eq!(asc.theta(), array![3.0, 0.0, 0.0]);
    assert_eq!(desc.theta(), array![0.0, 0.0, -3.0]);
    assert_eq!(asc.xy(), array![3.0, 0.0, 0.0]);
    assert_eq!(desc.xy(), array![0.0, 0.0, -3.0]);

    // The second arrival starts from the mutated accumulators, not from the
    // plain running sum xy = [3.5, 7, -2].
    let asc = step(&ascending, &asc, 1.0, &second);
    let desc = step(&descending, &desc, 1.0, &second);
    assert_all_close(asc.theta(), &[2.8, -0.08, -0.16], 1e-12);
    assert_all_close(asc.xy(), &[3.5, -0.4, -0.32], 1e-12);
    assert_all_close(desc.theta(), &[0.64, 0.4, -1.0], 1e-12);
    assert_all_close(desc.xy(), &[0.8, 2.0, -2.0], 1e-12);
    assert_ne!(asc.theta(), desc.theta());
}

#[test]
fn rejected_arrival_keeps_the_previous_state_usable() {
    let engine = OnlineLasso::new(3, 1.0).unwrap();
    let state = step(&engine, &engine.initial_state(), 1.0, &array![1.0, 1.0, 1.0]);
    let snapshot = state.clone();

    let err = engine
        .step(&state, &Observation::new(1.0, array![1.0, 1.0].view()))
        .unwrap_err();
    assert!(matches!(err, LassoError::DimensionMismatch { expected: 3, found: 2, .. }));
    assert_eq!(state, snapshot);

    // The untouched state still accepts a valid arrival.
    let next = step(&engine, &state, 2.0, &array![0.0, 1.0, 0.0]);
    assert_eq!(next.xx(), array![1.0, 2.0, 1.0]);
}

#[test]
fn reject_policy_refuses_unseen_features() {
    let engine = OnlineLasso::with_config(
        2,
        &EngineConfig {
            degeneracy: DegeneracyPolicy::Reject,
            ..EngineConfig::default()
        },
    )
    .unwrap();
    let err = engine
        .step(
            &engine.initial_state(),
            &Observation::new(2.0, array![1.0, 0.0].view()),
        )
        .unwrap_err();
    assert_eq!(err, LassoError::NumericalDegeneracy { index: 1 });
}

#[test]
fn resumed_stream_matches_an_uninterrupted_one() {
    let data = generate_data(&SimulationConfig {
        total_features: 8,
        true_features: 2,
        arrivals: 40,
        ..SimulationConfig::default()
    })
    .unwrap();
    let engine = OnlineLasso::new(8, 0.5).unwrap();

    let whole = engine
        .run(
            engine.initial_state(),
            data.labels.view(),
            data.features.view(),
            &mut NoopArrivalObserver,
        )
        .unwrap();

    let split = 17;
    let head = engine
        .run(
            engine.initial_state(),
            data.labels.slice(ndarray::s![..split]),
            data.features.slice(ndarray::s![..split, ..]),
            &mut NoopArrivalObserver,
        )
        .unwrap();
    let (xy, xx, theta) = head.into_parts();
    let resumed = LassoState::from_parts(xy, xx, theta).unwrap();
    let tail = engine
        .run(
            resumed,
            data.labels.slice(ndarray::s![split..]),
            data.features.slice(ndarray::s![split.., ..]),
            &mut NoopArrivalObserver,
        )
        .unwrap();

    assert_eq!(whole, tail);
}

#[test]
fn simulated_experiment_produces_consistent_selection_counts() {
    let config = RunConfig::from_toml_str(
        r#"
        [engine]
        noise_variance = 0.1

        [simulation]
        total_features = 15
        true_features = 3
        arrivals = 120
        seed = 5

        [report]
        first_arrival = 100
        chart_height = 5
        "#,
    )
    .unwrap();

    let data = generate_data(&config.simulation).unwrap();
    let engine = OnlineLasso::with_config(15, &config.engine).unwrap();
    let mut trace = SelectionTrace::new(data.support.clone());
    let state = engine
        .run(
            engine.initial_state(),
            data.labels.view(),
            data.features.view(),
            &mut trace,
        )
        .unwrap();

    assert_eq!(trace.counts().len(), 120);
    for counts in trace.counts() {
        assert!(counts.correct <= 3);
        assert!(counts.selected() <= 15);
    }
    let last = trace.counts()[119];
    assert_eq!(last.selected(), state.support().len());

    let mut table = Vec::new();
    write_tsv(trace.counts(), &mut table).unwrap();
    assert_eq!(String::from_utf8(table).unwrap().lines().count(), 121);

    let mut chart = Vec::new();
    render_stacked_bars(trace.counts(), 3, 15, &config.report, &mut chart).unwrap();
    let chart = String::from_utf8(chart).unwrap();
    let bar_rows: Vec<&str> = chart
        .lines()
        .filter_map(|line| line.split_once('|').map(|(_, bars)| bars))
        .collect();
    assert_eq!(bar_rows.len(), 5);
    assert!(bar_rows.iter().all(|bars| bars.chars().count() == 20));
}

#[test]
fn oversized_true_support_never_generates() {
    let err = generate_data(&SimulationConfig {
        total_features: 4,
        true_features: 9,
        ..SimulationConfig::default()
    })
    .unwrap_err();
    assert_eq!(
        err,
        SimulationError::InvalidConfiguration {
            true_features: 9,
            total_features: 4
        }
    );
}

#[test]
fn demo_configuration_loads() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/simulation.toml");
    let config = RunConfig::from_toml_file(&path).unwrap();
    assert!(config.simulation.true_features <= config.simulation.total_features);
    let features = Array2::<f64>::zeros((0, config.simulation.total_features));
    let engine = OnlineLasso::with_config(config.simulation.total_features, &config.engine).unwrap();
    let state = engine
        .run(
            engine.initial_state(),
            Array1::<f64>::zeros(0).view(),
            features.view(),
            &mut NoopArrivalObserver,
        )
        .unwrap();
    assert!(state.support().is_empty());
}
