//! Wires a scenario into weather, predictors and the engine.

use std::time::Instant;

use serde::Serialize;
use tracing::info;

use crate::config::ScenarioConfig;
use crate::devices::{CommunityLoad, SeededNoise, WindFarm};
use crate::error::RunError;
use crate::predictor::{ReferenceDemandModel, ReferenceSupplyModel, SupplyPredictor, UnavailableModel};
use crate::sim::alert::Alert;
use crate::sim::engine::Engine;
use crate::sim::maintenance::{MaintenanceWindow, find_maintenance_windows};
use crate::sim::summary::RunSummary;
use crate::sim::types::{HourlyInput, HourlyResult, SimulationConfig};
use crate::weather::{ConstantWeather, CsvWeather, SyntheticWeather, WeatherSource, WeatherSummary};

/// Everything produced by one scenario run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub config: SimulationConfig,
    pub results: Vec<HourlyResult>,
    pub alerts: Vec<Alert>,
    pub maintenance_windows: Vec<MaintenanceWindow>,
    pub summary: RunSummary,
    pub weather: WeatherSummary,
    /// Wall-clock time spent simulating and post-processing (ms).
    pub processing_time_ms: f64,
}

/// Validates `scenario`, fetches its weather and runs the simulation.
///
/// # Errors
///
/// Returns [`RunError::InvalidConfig`] with every violated constraint,
/// [`RunError::Weather`] when the weather source fails, or
/// [`RunError::Sim`] when the hourly inputs are rejected.
pub fn run_scenario(scenario: &ScenarioConfig) -> Result<RunReport, RunError> {
    check_scenario(scenario)?;

    let start = scenario
        .start_time()
        .map_err(|e| RunError::InvalidConfig(vec![e]))?;
    let mut weather = weather_source(scenario);
    let inputs = weather.hourly_inputs(start)?;

    run_with_inputs(scenario, &inputs)
}

/// Runs `scenario` against caller-supplied hourly inputs.
///
/// # Errors
///
/// Returns [`RunError::InvalidConfig`] with every violated constraint, or
/// [`RunError::Sim`] when the inputs are rejected by the engine.
pub fn run_with_inputs(scenario: &ScenarioConfig, inputs: &[HourlyInput]) -> Result<RunReport, RunError> {
    check_scenario(scenario)?;

    let config = scenario.to_simulation_config();
    let noise = SeededNoise::new(scenario.simulation.seed.wrapping_add(1));
    let started = Instant::now();

    let (results, alerts) = match scenario.simulation.supply_model.as_str() {
        "physical" => simulate(&config, UnavailableModel, noise, inputs)?,
        _ => simulate(&config, ReferenceSupplyModel, noise, inputs)?,
    };

    let maintenance_windows = find_maintenance_windows(&results, scenario.maintenance.window_hours);
    let summary = RunSummary::from_run(&results, &alerts, &config);
    let processing_time_ms = started.elapsed().as_secs_f64() * 1000.0;

    info!(
        windows = maintenance_windows.len(),
        self_sufficiency_pct = summary.grid.self_sufficiency_pct,
        processing_time_ms,
        "scenario complete"
    );

    Ok(RunReport {
        config,
        results,
        alerts,
        maintenance_windows,
        summary,
        weather: WeatherSummary::from_inputs(inputs),
        processing_time_ms,
    })
}

fn check_scenario(scenario: &ScenarioConfig) -> Result<(), RunError> {
    let errors = scenario.validate();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(RunError::InvalidConfig(errors))
    }
}

fn weather_source(scenario: &ScenarioConfig) -> Box<dyn WeatherSource> {
    let w = &scenario.weather;
    match w.source.as_str() {
        "csv" => Box::new(CsvWeather::new(w.csv_path.clone().unwrap_or_default())),
        "constant" => Box::new(ConstantWeather {
            wind_speed_mps: w.constant_speed_mps,
            wind_direction_deg: w.constant_direction_deg,
        }),
        _ => Box::new(SyntheticWeather::new(scenario.simulation.seed)),
    }
}

fn simulate<S: SupplyPredictor>(
    config: &SimulationConfig,
    predictor: S,
    noise: SeededNoise,
    inputs: &[HourlyInput],
) -> Result<(Vec<HourlyResult>, Vec<Alert>), RunError> {
    let wind_farm = WindFarm::new(config.turbine_count, config.turbine_availability, predictor);
    let mut load = CommunityLoad::new(
        config.demand_base_load_mw,
        config.demand_percent,
        config.demand_min_mw,
        config.demand_max_mw,
        config.demand_noise_std_mw,
        noise,
    );
    if config.demand_predictor_blend > 0.0 {
        load = load.with_predictor(Box::new(ReferenceDemandModel), config.demand_predictor_blend);
    }

    let mut engine = Engine::new(config.clone(), wind_farm, load)?;
    Ok(engine.run(inputs)?)
}
