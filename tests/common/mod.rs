//! Shared test fixtures for integration tests.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use windfarm_sim::devices::NoNoise;
use windfarm_sim::predictor::{ReferenceSupplyModel, UnavailableModel};
use windfarm_sim::sim::engine::Engine;
use windfarm_sim::sim::types::{HOURS_PER_RUN, HourlyInput, SimulationConfig};

/// Midnight at the start of the fixture day (2024-06-01).
pub fn start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("valid start timestamp")
}

/// Builds one day of inputs from per-hour wind speeds (direction 250°).
pub fn day_of(speeds: &[f64]) -> Vec<HourlyInput> {
    let start = start();
    speeds
        .iter()
        .enumerate()
        .map(|(h, &speed)| HourlyInput {
            timestamp: start + Duration::hours(h as i64),
            hour: h as u32,
            wind_speed_mps: speed,
            wind_direction_deg: 250.0,
        })
        .collect()
}

/// A full day of constant wind.
pub fn constant_day(speed: f64) -> Vec<HourlyInput> {
    day_of(&[speed; HOURS_PER_RUN])
}

/// Default configuration with demand pinned to `demand_mw` and no noise.
pub fn fixed_demand_config(demand_mw: f64) -> SimulationConfig {
    SimulationConfig {
        demand_min_mw: demand_mw,
        demand_max_mw: demand_mw,
        demand_noise_std_mw: 0.0,
        ..SimulationConfig::default()
    }
}

/// Engine using the reference supply model and noise-free demand.
pub fn quiet_engine(config: SimulationConfig) -> Engine<ReferenceSupplyModel, NoNoise> {
    Engine::from_config(config, ReferenceSupplyModel, NoNoise).expect("valid config")
}

/// Engine that always falls back to the physical power curve.
pub fn physical_engine(config: SimulationConfig) -> Engine<UnavailableModel, NoNoise> {
    windfarm_sim::logging::init_test();
    Engine::from_config(config, UnavailableModel, NoNoise).expect("valid config")
}
