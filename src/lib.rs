//! Hourly simulation of a wind farm, a battery and a community load.
//!
//! One run covers 24 hours. Each hour the farm's supply and the
//! community's demand are estimated, the imbalance is routed through the
//! battery and then the grid, and alerts are raised for unusual wind,
//! grid use and battery state.

pub mod config;
pub mod devices;
pub mod error;
pub mod io;
pub mod logging;
pub mod predictor;
pub mod runner;
/// Simulation engine, allocation, alerts and run post-processing.
pub mod sim;
pub mod weather;
