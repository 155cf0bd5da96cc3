//! Simulation-and-update engine for flights moving over a globe.
//!
//! Flights are built once from a [`Dataset`](types::dataset::Dataset) and then
//! driven by [`Engine::tick`](types::engine::Engine::tick), called once per
//! rendered frame.

pub mod types;

pub use types::engine::{Engine, PickInfo, TickReport};
pub use types::sim_error::SimError;
