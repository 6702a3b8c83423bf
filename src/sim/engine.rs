//! Hourly simulation loop that threads the battery through 24 hours.

use tracing::{debug, info};

use crate::devices::{Battery, CommunityLoad, Device, HourContext, NoiseSource, WindFarm};
use crate::error::{ConfigError, SimError};
use crate::predictor::SupplyPredictor;

use super::alert::{Alert, AlertLevel, AlertLog, observe_battery, observe_flows, observe_wind};
use super::allocator::allocate;
use super::power_balance::{classify, net_balance_mw};
use super::types::{BalanceStatus, HOURS_PER_RUN, HourlyInput, HourlyResult, SimulationConfig};

/// Simulation engine owning the farm, the load, the battery and the run's
/// alert log.
///
/// Generic over the supply predictor and the noise source for static
/// dispatch; the device set is fixed.
pub struct Engine<S: SupplyPredictor, N: NoiseSource> {
    config: SimulationConfig,
    wind_farm: WindFarm<S>,
    load: CommunityLoad<N>,
    battery: Battery,
    alerts: AlertLog,
}

impl<S: SupplyPredictor, N: NoiseSource> Engine<S, N> {
    /// Creates an engine from prepared devices.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfig`] when `config` violates an
    /// invariant or a device was built with parameters that differ from
    /// it; nothing is simulated in that case.
    pub fn new(
        config: SimulationConfig,
        wind_farm: WindFarm<S>,
        load: CommunityLoad<N>,
    ) -> Result<Self, SimError> {
        config.validate()?;
        check_devices(&config, &wind_farm, &load)?;
        let battery = Battery::from_config(&config);
        Ok(Self {
            config,
            wind_farm,
            load,
            battery,
            alerts: AlertLog::new(),
        })
    }

    /// Creates an engine whose farm and load are built from `config`.
    ///
    /// # Errors
    ///
    /// Same as [`Engine::new`].
    pub fn from_config(config: SimulationConfig, predictor: S, noise: N) -> Result<Self, SimError> {
        let wind_farm = WindFarm::new(config.turbine_count, config.turbine_availability, predictor);
        let load = CommunityLoad::new(
            config.demand_base_load_mw,
            config.demand_percent,
            config.demand_min_mw,
            config.demand_max_mw,
            config.demand_noise_std_mw,
            noise,
        );
        Self::new(config, wind_farm, load)
    }

    /// Executes one simulated hour and returns its record.
    ///
    /// Allocation reads the battery before this hour's update; alerts are
    /// appended to the engine's log.
    pub fn step(&mut self, input: &HourlyInput) -> HourlyResult {
        let context = HourContext::from(input);
        let at = input.timestamp;

        // 1. Supply, with the operating wind window enforced
        observe_wind(&mut self.alerts, input.wind_speed_mps, &self.config, at);
        let supply_mw = if input.wind_speed_mps < self.config.low_wind_threshold_mps
            || input.wind_speed_mps > self.config.high_wind_threshold_mps
        {
            0.0
        } else {
            self.wind_farm.power_mw(&context)
        };

        // 2. Demand and net balance
        let demand_mw = self.load.power_mw(&context);
        let net_balance = net_balance_mw(supply_mw, demand_mw);

        // 3. Flows from the pre-update battery
        let soc_before = self.battery.soc();
        let flows = allocate(net_balance, self.battery.energy_mwh(), &self.config);
        observe_flows(&mut self.alerts, &flows, soc_before, &self.config, at);

        // 4. Battery update
        let battery_mwh = self.battery.apply(&flows);
        observe_battery(&mut self.alerts, self.battery.soc(), &self.config, at);

        let status = classify(net_balance);
        debug!(
            hour = input.hour,
            supply_mw,
            demand_mw,
            net_balance_mw = net_balance,
            to_battery_mw = flows.to_battery_mw,
            from_battery_mw = flows.from_battery_mw,
            to_grid_mw = flows.to_grid_mw,
            from_grid_mw = flows.from_grid_mw,
            battery_percent = self.battery.percent(),
            %status,
            "hour simulated"
        );

        HourlyResult {
            timestamp: input.timestamp,
            hour: input.hour,
            wind_speed_mps: input.wind_speed_mps,
            wind_direction_deg: input.wind_direction_deg,
            supply_mw,
            demand_mw,
            net_balance_mw: net_balance,
            battery_mwh,
            battery_percent: self.battery.percent(),
            flows,
            status,
        }
    }

    /// Simulates a full day and returns the hourly records and alerts.
    ///
    /// The battery restarts at the configured initial energy and the alert
    /// log is emptied, so repeated runs are independent.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::HourCount`] unless exactly 24 inputs are given,
    /// or [`SimError::InvalidInput`] for the first out-of-range input. All
    /// inputs are checked before any hour is simulated.
    pub fn run(&mut self, inputs: &[HourlyInput]) -> Result<(Vec<HourlyResult>, Vec<Alert>), SimError> {
        if inputs.len() != HOURS_PER_RUN {
            return Err(SimError::HourCount {
                expected: HOURS_PER_RUN,
                actual: inputs.len(),
            });
        }
        for (index, input) in inputs.iter().enumerate() {
            input.validate(index)?;
        }

        self.battery = Battery::from_config(&self.config);
        self.alerts = AlertLog::new();

        info!(
            turbines = self.config.turbine_count,
            capacity_mw = self.wind_farm.capacity_mw(),
            battery_mwh = self.battery.energy_mwh(),
            battery_floor_mwh = self.config.battery_floor_mwh(),
            battery_ceiling_mwh = self.config.battery_ceiling_mwh(),
            demand_base_mw = self.config.demand_base_load_mw,
            "starting simulation"
        );

        let results: Vec<HourlyResult> = inputs.iter().map(|input| self.step(input)).collect();
        let alerts = std::mem::take(&mut self.alerts).into_vec();

        log_completion(&results, &alerts);
        Ok((results, alerts))
    }

    /// Current battery state.
    pub fn battery(&self) -> &Battery {
        &self.battery
    }

    /// Alerts raised by [`Engine::step`] calls since the last run.
    pub fn alerts(&self) -> &[Alert] {
        self.alerts.alerts()
    }
}

/// Rejects a farm or load whose parameters disagree with `config`.
fn check_devices<S: SupplyPredictor, N: NoiseSource>(
    config: &SimulationConfig,
    wind_farm: &WindFarm<S>,
    load: &CommunityLoad<N>,
) -> Result<(), ConfigError> {
    if wind_farm.turbine_count != config.turbine_count {
        return Err(ConfigError::new(
            "turbine_count",
            format!(
                "wind farm has {} turbines, config has {}",
                wind_farm.turbine_count, config.turbine_count
            ),
        ));
    }

    let pairs = [
        (wind_farm.turbine_availability, config.turbine_availability, "turbine_availability"),
        (load.base_load_mw, config.demand_base_load_mw, "demand_base_load_mw"),
        (load.demand_percent, config.demand_percent, "demand_percent"),
        (load.min_mw, config.demand_min_mw, "demand_min_mw"),
        (load.max_mw, config.demand_max_mw, "demand_max_mw"),
        (load.noise_std_mw, config.demand_noise_std_mw, "demand_noise_std_mw"),
        (load.blend(), config.demand_predictor_blend, "demand_predictor_blend"),
    ];
    match pairs.into_iter().find(|(device, cfg, _)| device != cfg) {
        Some((device, cfg, field)) => Err(ConfigError::new(
            field,
            format!("device uses {device}, config has {cfg}"),
        )),
        None => Ok(()),
    }
}

fn log_completion(results: &[HourlyResult], alerts: &[Alert]) {
    let range = |f: fn(&HourlyResult) -> f64| {
        results.iter().map(f).fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        })
    };
    let (supply_min, supply_max) = range(|r| r.supply_mw);
    let (demand_min, demand_max) = range(|r| r.demand_mw);
    let count = |status: BalanceStatus| results.iter().filter(|r| r.status == status).count();

    info!(
        hours = results.len(),
        supply_min,
        supply_max,
        demand_min,
        demand_max,
        final_battery_percent = results.last().map_or(0.0, |r| r.battery_percent),
        surplus_hours = count(BalanceStatus::Surplus),
        deficit_hours = count(BalanceStatus::Deficit),
        balanced_hours = count(BalanceStatus::Balanced),
        alerts = alerts.len(),
        critical_alerts = alerts.iter().filter(|a| a.level == AlertLevel::Critical).count(),
        "simulation complete"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::NoNoise;
    use crate::predictor::{ReferenceSupplyModel, UnavailableModel};
    use chrono::{Duration, NaiveDate};

    fn day(speeds: impl Fn(u32) -> f64) -> Vec<HourlyInput> {
        let start = NaiveDate::from_ymd_opt(2024, 6, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .expect("valid timestamp");
        (0..24u32)
            .map(|h| HourlyInput {
                timestamp: start + Duration::hours(i64::from(h)),
                hour: h,
                wind_speed_mps: speeds(h),
                wind_direction_deg: 250.0,
            })
            .collect()
    }

    fn quiet_engine(config: SimulationConfig) -> Engine<ReferenceSupplyModel, NoNoise> {
        crate::logging::init_test();
        Engine::from_config(config, ReferenceSupplyModel, NoNoise).expect("valid config")
    }

    #[test]
    fn test_run_produces_24_hours() {
        let mut engine = quiet_engine(SimulationConfig::default());
        let (results, _) = engine.run(&day(|_| 9.0)).expect("run");
        assert_eq!(results.len(), 24);
        for (h, r) in results.iter().enumerate() {
            assert_eq!(r.hour as usize, h);
        }
    }

    #[test]
    fn test_calm_day_drains_to_floor_and_imports() {
        let mut engine = quiet_engine(SimulationConfig::default());
        let (results, alerts) = engine.run(&day(|_| 0.0)).expect("run");

        assert!(results.iter().all(|r| r.supply_mw == 0.0));
        assert!(results.iter().all(|r| r.status == BalanceStatus::Deficit));
        assert!((results[23].battery_mwh - 30.0).abs() < 1e-9);
        assert!(results.iter().any(|r| r.flows.from_grid_mw > 0.0));

        // every hour under 2.5 m/s is reported
        let very_low = alerts
            .iter()
            .filter(|a| a.message.contains("Very low wind"))
            .count();
        assert_eq!(very_low, 24);
        assert!(alerts.iter().any(|a| a.level == AlertLevel::Critical));
    }

    #[test]
    fn test_extreme_wind_shuts_farm_down() {
        let mut engine = quiet_engine(SimulationConfig::default());
        let (results, alerts) = engine.run(&day(|_| 30.0)).expect("run");
        assert!(results.iter().all(|r| r.supply_mw == 0.0));
        let shutdowns = alerts
            .iter()
            .filter(|a| a.level == AlertLevel::Critical && a.message.contains("Extreme wind"))
            .count();
        assert_eq!(shutdowns, 24);
    }

    #[test]
    fn test_wind_between_threshold_and_cut_in_is_silent() {
        let mut engine = quiet_engine(SimulationConfig::default());
        let (results, alerts) = engine.run(&day(|_| 2.8)).expect("run");
        assert!(results.iter().all(|r| r.supply_mw == 0.0));
        assert!(!alerts.iter().any(|a| a.message.contains("wind")));
    }

    #[test]
    fn test_allocation_reads_pre_update_battery() {
        let config = SimulationConfig {
            initial_battery_mwh: 260.0,
            ..SimulationConfig::default()
        };
        let mut engine = quiet_engine(config);
        let (results, _) = engine.run(&day(|_| 12.0)).expect("run");
        // only 10 MWh of room before the first update
        assert!((results[0].flows.to_battery_mw - 10.0).abs() < 1e-9);
        assert!((results[0].battery_mwh - (260.0 + 10.0 * 0.94)).abs() < 1e-9);
    }

    #[test]
    fn test_physical_fallback_still_produces_power() {
        let engine_config = SimulationConfig::default();
        let mut engine = Engine::from_config(engine_config, UnavailableModel, NoNoise).expect("valid");
        let (results, _) = engine.run(&day(|_| 12.0)).expect("run");
        assert!(results.iter().all(|r| (r.supply_mw - 142.5).abs() < 1e-9));
    }

    #[test]
    fn test_rejects_wrong_hour_count() {
        let mut engine = quiet_engine(SimulationConfig::default());
        let mut inputs = day(|_| 9.0);
        inputs.pop();
        assert_eq!(
            engine.run(&inputs).map(|_| ()),
            Err(SimError::HourCount {
                expected: 24,
                actual: 23
            })
        );
    }

    #[test]
    fn test_rejects_invalid_input_before_simulating() {
        let mut engine = quiet_engine(SimulationConfig::default());
        let mut inputs = day(|_| 9.0);
        inputs[17].wind_direction_deg = 400.0;
        let err = engine.run(&inputs).map(|_| ());
        assert!(matches!(err, Err(SimError::InvalidInput { index: 17, .. })));
        assert_eq!(engine.battery().energy_mwh(), 150.0);
        assert!(engine.alerts().is_empty());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = SimulationConfig {
            battery_min_soc: 0.95,
            ..SimulationConfig::default()
        };
        let engine = Engine::from_config(config, ReferenceSupplyModel, NoNoise);
        assert!(matches!(engine, Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn test_mismatched_devices_are_rejected() {
        let config = SimulationConfig::default();
        let wind_farm = WindFarm::new(10, config.turbine_availability, ReferenceSupplyModel);
        let load = CommunityLoad::new(
            config.demand_base_load_mw,
            config.demand_percent,
            config.demand_min_mw,
            config.demand_max_mw,
            config.demand_noise_std_mw,
            NoNoise,
        );
        match Engine::new(config.clone(), wind_farm, load) {
            Err(SimError::InvalidConfig(e)) => assert_eq!(e.field, "turbine_count"),
            Err(other) => panic!("expected turbine_count mismatch, got {other:?}"),
            Ok(_) => panic!("expected turbine_count mismatch"),
        }

        let wind_farm = WindFarm::new(config.turbine_count, config.turbine_availability, ReferenceSupplyModel);
        let load = CommunityLoad::new(90.0, 1.0, 55.0, 120.0, 3.0, NoNoise);
        match Engine::new(config, wind_farm, load) {
            Err(SimError::InvalidConfig(e)) => assert_eq!(e.field, "demand_base_load_mw"),
            Err(other) => panic!("expected demand_base_load_mw mismatch, got {other:?}"),
            Ok(_) => panic!("expected demand_base_load_mw mismatch"),
        }
    }

    #[test]
    fn test_repeated_runs_are_independent() {
        let mut engine = quiet_engine(SimulationConfig::default());
        let inputs = day(|h| 4.0 + f64::from(h) * 0.5);
        let first = engine.run(&inputs).expect("run");
        let second = engine.run(&inputs).expect("run");
        assert_eq!(first, second);
    }
}
