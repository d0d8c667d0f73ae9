#![deny(unused_variables)]
#![deny(dead_code)]
#![deny(unused_imports)]
#![deny(clippy::no_effect_underscore_binding)]
pub mod accumulate;
pub mod config;
pub mod coordinate;
pub mod data;
pub mod engine;
pub mod error;
pub mod penalty;
pub mod state;

#[path = "../simulate/mod.rs"]
pub mod simulate;

#[path = "../report/mod.rs"]
pub mod report;

pub use engine::{ArrivalObserver, ArrivalOutcome, NoopArrivalObserver, Observation, OnlineLasso};
pub use error::LassoError;
pub use state::LassoState;
