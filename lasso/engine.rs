//! # The Online Lasso Engine
//!
//! `OnlineLasso` turns one arrival into one new state record. It holds nothing
//! but its configuration: the feature dimension, the noise variance, and the
//! sweep policies. Every accumulator lives in the `LassoState` that the caller
//! passes in and receives back.
//!
//! Each arrival runs the same three steps, always in this order:
//!
//! 1. `accumulate::accumulate` folds the observation into `xy` and `xx`.
//! 2. `penalty::compute_penalty` derives the global threshold from `xx`.
//! 3. `coordinate::update_coordinates` sweeps every coordinate.
//!
//! Arrivals must be processed one at a time. The engine is immutable and
//! therefore shareable, but two arrivals applied to the same state in parallel
//! would each produce a different successor and one of them would be lost.

use crate::accumulate::accumulate;
use crate::config::EngineConfig;
use crate::coordinate::{ComplementSets, CoordinateOrder, DegeneracyPolicy, update_coordinates};
use crate::error::LassoError;
use crate::penalty::{compute_penalty, validate_noise_variance};
use crate::state::{LassoState, ensure_finite};
use ndarray::{ArrayView1, ArrayView2};

/// One incoming `(label, features)` pair.
#[derive(Debug, Clone, Copy)]
pub struct Observation<'a> {
    pub label: f64,
    pub features: ArrayView1<'a, f64>,
}

impl<'a> Observation<'a> {
    pub fn new(label: f64, features: ArrayView1<'a, f64>) -> Self {
        Self { label, features }
    }
}

/// Everything one arrival produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrivalOutcome {
    /// The successor state, to be passed to the next call.
    pub state: LassoState,
    /// The global threshold used for this arrival's sweep.
    pub penalty: f64,
    /// Coordinates pinned at zero because their feature had no energy yet.
    pub degenerate: Vec<usize>,
}

/// Observer notified after every arrival of a streamed run.
pub trait ArrivalObserver {
    /// `total_arrivals` is `None` when the stream length is not known upfront.
    fn on_run_start(&mut self, total_arrivals: Option<usize>) {
        let _ = total_arrivals;
    }
    fn on_arrival(&mut self, arrival: usize, outcome: &ArrivalOutcome) {
        let _ = (arrival, outcome);
    }
    fn on_run_finish(&mut self, final_state: &LassoState) {
        let _ = final_state;
    }
}

#[derive(Default)]
pub struct NoopArrivalObserver;

impl ArrivalObserver for NoopArrivalObserver {}

/// Fans every callback out to two observers, in order.
impl<A: ArrivalObserver, B: ArrivalObserver> ArrivalObserver for (A, B) {
    fn on_run_start(&mut self, total_arrivals: Option<usize>) {
        self.0.on_run_start(total_arrivals);
        self.1.on_run_start(total_arrivals);
    }
    fn on_arrival(&mut self, arrival: usize, outcome: &ArrivalOutcome) {
        self.0.on_arrival(arrival, outcome);
        self.1.on_arrival(arrival, outcome);
    }
    fn on_run_finish(&mut self, final_state: &LassoState) {
        self.0.on_run_finish(final_state);
        self.1.on_run_finish(final_state);
    }
}

/// The stateless per-arrival update operator.
#[derive(Debug, Clone)]
pub struct OnlineLasso {
    complements: ComplementSets,
    noise_variance: f64,
    order: CoordinateOrder,
    degeneracy: DegeneracyPolicy,
}

impl OnlineLasso {
    /// An engine for `dimension` features with the default ascending sweep and
    /// zero-energy coordinates held at zero.
    pub fn new(dimension: usize, noise_variance: f64) -> Result<Self, LassoError> {
        Self::with_config(dimension, &EngineConfig::new(noise_variance))
    }

    pub fn with_config(dimension: usize, config: &EngineConfig) -> Result<Self, LassoError> {
        if dimension == 0 {
            return Err(LassoError::EmptyDimension);
        }
        let noise_variance = validate_noise_variance(config.noise_variance)?;
        log::debug!(
            "Online lasso engine: {} features, noise variance {}, {:?} sweep, {:?} on zero energy",
            dimension,
            noise_variance,
            config.coordinate_order,
            config.degeneracy
        );
        Ok(Self {
            complements: ComplementSets::new(dimension),
            noise_variance,
            order: config.coordinate_order,
            degeneracy: config.degeneracy,
        })
    }

    pub fn dimension(&self) -> usize {
        self.complements.dimension()
    }

    pub fn noise_variance(&self) -> f64 {
        self.noise_variance
    }

    /// A fresh zero state sized for this engine.
    pub fn initial_state(&self) -> LassoState {
        LassoState::new(self.dimension())
    }

    /// Processes one arrival and returns the successor state.
    ///
    /// On any error the borrowed `state` is untouched and remains the valid
    /// current state.
    pub fn step(
        &self,
        state: &LassoState,
        observation: &Observation<'_>,
    ) -> Result<ArrivalOutcome, LassoError> {
        let dimension = self.dimension();
        if state.dimension() != dimension {
            return Err(LassoError::DimensionMismatch {
                context: "state",
                expected: dimension,
                found: state.dimension(),
            });
        }
        if observation.features.len() != dimension {
            return Err(LassoError::DimensionMismatch {
                context: "feature vector",
                expected: dimension,
                found: observation.features.len(),
            });
        }
        if !observation.label.is_finite() {
            return Err(LassoError::NonFiniteLabel(observation.label));
        }
        if let Some(index) = observation.features.iter().position(|x| !x.is_finite()) {
            return Err(LassoError::NonFiniteObservation { index });
        }

        let (xy, xx) = accumulate(
            state.xy(),
            state.xx(),
            observation.features,
            observation.label,
        )?;
        // Finite inputs can still overflow once multiplied.
        ensure_finite("cross-correlation accumulator", xy.view())?;
        ensure_finite("energy accumulator", xx.view())?;
        let penalty = compute_penalty(xx.view(), self.noise_variance);

        let sweep = update_coordinates(
            observation.features,
            xy,
            state.theta().to_owned(),
            xx.view(),
            penalty,
            &self.complements,
            self.order,
            self.degeneracy,
        )?;
        ensure_finite("cross-correlation accumulator", sweep.xy.view())?;
        ensure_finite("weight vector", sweep.theta.view())?;

        if !sweep.degenerate.is_empty() {
            log::debug!(
                "Held {} zero-energy coordinate(s) at zero: {:?}",
                sweep.degenerate.len(),
                sweep.degenerate
            );
        }

        Ok(ArrivalOutcome {
            state: LassoState::from_parts_unchecked(sweep.xy, xx, sweep.theta),
            penalty,
            degenerate: sweep.degenerate,
        })
    }

    /// Streams every row of `features` (with the matching entry of `labels`)
    /// through `step`, starting from `initial`.
    ///
    /// Stops at the first rejected arrival and returns its error.
    pub fn run<O: ArrivalObserver>(
        &self,
        initial: LassoState,
        labels: ArrayView1<f64>,
        features: ArrayView2<f64>,
        observer: &mut O,
    ) -> Result<LassoState, LassoError> {
        if labels.len() != features.nrows() {
            return Err(LassoError::DimensionMismatch {
                context: "label sequence",
                expected: features.nrows(),
                found: labels.len(),
            });
        }
        log::info!(
            "Streaming {} arrivals through the online lasso ({} features).",
            labels.len(),
            self.dimension()
        );
        observer.on_run_start(Some(labels.len()));

        let mut state = initial;
        for (arrival, (&label, row)) in labels.iter().zip(features.rows()).enumerate() {
            let outcome = self.step(&state, &Observation::new(label, row))?;
            log::debug!(
                "Arrival {}: penalty {:.6e}, support size {}",
                arrival,
                outcome.penalty,
                outcome.state.support().len()
            );
            observer.on_arrival(arrival, &outcome);
            state = outcome.state;
        }

        observer.on_run_finish(&state);
        log::info!(
            "Online lasso finished: {} of {} features selected.",
            state.support().len(),
            self.dimension()
        );
        Ok(state)
    }
}
