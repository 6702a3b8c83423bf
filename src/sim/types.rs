//! Core simulation types: run configuration, hourly inputs, and hourly records.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, SimError};

/// Number of hours in one simulation run.
pub const HOURS_PER_RUN: usize = 24;

/// Immutable per-run parameters of the wind farm, battery and community load.
///
/// `Default` is the reference configuration: a 50 × 3 MW farm feeding a
/// 75 MW community through a 300 MWh battery.
///
/// # Examples
///
/// ```
/// use windfarm_sim::sim::types::SimulationConfig;
///
/// let cfg = SimulationConfig::default();
/// assert!(cfg.validate().is_ok());
/// assert_eq!(cfg.battery_floor_mwh(), 30.0);
/// assert_eq!(cfg.battery_ceiling_mwh(), 270.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of turbines in the farm.
    pub turbine_count: u32,
    /// Fraction of turbines available for generation (0.0 to 1.0).
    pub turbine_availability: f64,
    /// Battery energy capacity (MWh).
    pub battery_capacity_mwh: f64,
    /// Maximum battery charging power (MW).
    pub battery_max_charge_mw: f64,
    /// Maximum battery discharging power (MW).
    pub battery_max_discharge_mw: f64,
    /// Stored energy at the start of the run (MWh).
    pub initial_battery_mwh: f64,
    /// Round-trip efficiency, applied on the charging leg only (0.0 to 1.0].
    pub battery_efficiency: f64,
    /// Operational SOC floor (fraction of capacity).
    pub battery_min_soc: f64,
    /// Operational SOC ceiling (fraction of capacity).
    pub battery_max_soc: f64,
    /// Multiplier applied to the community demand before the band clamp
    /// (1.0 = 100 %).
    pub demand_percent: f64,
    /// Community base load (MW).
    pub demand_base_load_mw: f64,
    /// Lower edge of the realistic demand band (MW).
    pub demand_min_mw: f64,
    /// Upper edge of the realistic demand band (MW).
    pub demand_max_mw: f64,
    /// Standard deviation of the demand noise term (MW).
    pub demand_noise_std_mw: f64,
    /// Weight of the demand predictor signal when one is attached (0.0 to 1.0).
    pub demand_predictor_blend: f64,
    /// Wind speed below which the farm produces nothing (m/s).
    pub low_wind_threshold_mps: f64,
    /// Wind speed above which the farm is shut down (m/s).
    pub high_wind_threshold_mps: f64,
    /// SOC below which a critical alert is raised.
    pub battery_low_alert_soc: f64,
    /// SOC above which a warning alert is raised.
    pub battery_high_alert_soc: f64,
    /// SOC above which charging raises an informational alert.
    pub charging_info_soc: f64,
    /// Price received per exported MWh.
    pub export_price_per_mwh: f64,
    /// Price paid per imported MWh.
    pub import_price_per_mwh: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            turbine_count: 50,
            turbine_availability: 0.95,
            battery_capacity_mwh: 300.0,
            battery_max_charge_mw: 50.0,
            battery_max_discharge_mw: 100.0,
            initial_battery_mwh: 150.0,
            battery_efficiency: 0.94,
            battery_min_soc: 0.1,
            battery_max_soc: 0.9,
            demand_percent: 1.0,
            demand_base_load_mw: 75.0,
            demand_min_mw: 55.0,
            demand_max_mw: 120.0,
            demand_noise_std_mw: 3.0,
            demand_predictor_blend: 0.0,
            low_wind_threshold_mps: 3.0,
            high_wind_threshold_mps: 25.0,
            battery_low_alert_soc: 0.2,
            battery_high_alert_soc: 0.8,
            charging_info_soc: 0.85,
            export_price_per_mwh: 40.0,
            import_price_per_mwh: 150.0,
        }
    }
}

impl SimulationConfig {
    /// Lowest energy the battery may hold (MWh).
    pub fn battery_floor_mwh(&self) -> f64 {
        self.battery_min_soc * self.battery_capacity_mwh
    }

    /// Highest energy the battery may hold (MWh).
    pub fn battery_ceiling_mwh(&self) -> f64 {
        self.battery_max_soc * self.battery_capacity_mwh
    }

    /// Returns every violated invariant; empty when the configuration is usable.
    pub fn check(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let mut require = |ok: bool, field: &str, message: &str| {
            if !ok {
                errors.push(ConfigError::new(field, message));
            }
        };

        let fractions = [
            (self.turbine_availability, "turbine_availability"),
            (self.battery_min_soc, "battery_min_soc"),
            (self.battery_max_soc, "battery_max_soc"),
            (self.demand_predictor_blend, "demand_predictor_blend"),
            (self.battery_low_alert_soc, "battery_low_alert_soc"),
            (self.battery_high_alert_soc, "battery_high_alert_soc"),
            (self.charging_info_soc, "charging_info_soc"),
        ];
        for (value, field) in fractions {
            require(
                (0.0..=1.0).contains(&value),
                field,
                "must be in [0.0, 1.0]",
            );
        }

        let non_negative = [
            (self.battery_max_charge_mw, "battery_max_charge_mw"),
            (self.battery_max_discharge_mw, "battery_max_discharge_mw"),
            (self.demand_percent, "demand_percent"),
            (self.demand_base_load_mw, "demand_base_load_mw"),
            (self.demand_min_mw, "demand_min_mw"),
            (self.demand_noise_std_mw, "demand_noise_std_mw"),
            (self.low_wind_threshold_mps, "low_wind_threshold_mps"),
            (self.export_price_per_mwh, "export_price_per_mwh"),
            (self.import_price_per_mwh, "import_price_per_mwh"),
        ];
        for (value, field) in non_negative {
            require(
                value.is_finite() && value >= 0.0,
                field,
                "must be finite and >= 0",
            );
        }

        require(self.turbine_count > 0, "turbine_count", "must be > 0");
        require(
            self.battery_capacity_mwh.is_finite() && self.battery_capacity_mwh > 0.0,
            "battery_capacity_mwh",
            "must be finite and > 0",
        );
        require(
            self.battery_efficiency > 0.0 && self.battery_efficiency <= 1.0,
            "battery_efficiency",
            "must be in (0.0, 1.0]",
        );
        require(
            self.battery_min_soc < self.battery_max_soc,
            "battery_min_soc",
            "must be < battery_max_soc",
        );
        require(
            self.initial_battery_mwh >= self.battery_floor_mwh()
                && self.initial_battery_mwh <= self.battery_ceiling_mwh(),
            "initial_battery_mwh",
            "must lie within [battery_min_soc, battery_max_soc] of capacity",
        );
        require(
            self.demand_max_mw.is_finite() && self.demand_min_mw <= self.demand_max_mw,
            "demand_min_mw",
            "must be <= demand_max_mw",
        );
        require(
            self.high_wind_threshold_mps.is_finite()
                && self.low_wind_threshold_mps < self.high_wind_threshold_mps,
            "low_wind_threshold_mps",
            "must be < high_wind_threshold_mps",
        );
        require(
            self.battery_low_alert_soc <= self.battery_high_alert_soc,
            "battery_low_alert_soc",
            "must be <= battery_high_alert_soc",
        );

        errors
    }

    /// Rejects the configuration on its first violated invariant.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfig`] naming the offending field.
    pub fn validate(&self) -> Result<(), SimError> {
        match self.check().into_iter().next() {
            Some(err) => Err(SimError::InvalidConfig(err)),
            None => Ok(()),
        }
    }
}

/// Exogenous conditions for one simulated hour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyInput {
    /// Start of the hour.
    pub timestamp: NaiveDateTime,
    /// Hour of day (0 to 23).
    pub hour: u32,
    /// Wind speed at hub height (m/s, >= 0).
    pub wind_speed_mps: f64,
    /// Wind direction (degrees, [0, 360)).
    pub wind_direction_deg: f64,
}

impl HourlyInput {
    /// Checks the physical ranges of this input.
    ///
    /// `index` is the position in the run and is only used for reporting.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidInput`] for the first out-of-range field.
    pub fn validate(&self, index: usize) -> Result<(), SimError> {
        let invalid = |field: &'static str, message: String| SimError::InvalidInput {
            index,
            field,
            message,
        };

        if self.hour > 23 {
            return Err(invalid("hour", format!("must be in [0, 23], got {}", self.hour)));
        }
        if !self.wind_speed_mps.is_finite() || self.wind_speed_mps < 0.0 {
            return Err(invalid(
                "wind_speed_mps",
                format!("must be finite and >= 0, got {}", self.wind_speed_mps),
            ));
        }
        if !(0.0..360.0).contains(&self.wind_direction_deg) {
            return Err(invalid(
                "wind_direction_deg",
                format!("must be in [0, 360), got {}", self.wind_direction_deg),
            ));
        }
        Ok(())
    }
}

/// Power split between battery and grid for one hour (all MW, >= 0).
///
/// At most one of `to_battery_mw`/`from_battery_mw` and at most one of
/// `to_grid_mw`/`from_grid_mw` is nonzero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EnergyFlows {
    pub to_battery_mw: f64,
    pub from_battery_mw: f64,
    pub to_grid_mw: f64,
    pub from_grid_mw: f64,
}

impl EnergyFlows {
    /// Signed sum of the flows; equals the hour's net balance.
    pub fn net_mw(&self) -> f64 {
        self.to_battery_mw + self.to_grid_mw - self.from_battery_mw - self.from_grid_mw
    }
}

/// Classification of an hour by its net balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BalanceStatus {
    Surplus,
    Deficit,
    Balanced,
}

impl fmt::Display for BalanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BalanceStatus::Surplus => "Surplus",
            BalanceStatus::Deficit => "Deficit",
            BalanceStatus::Balanced => "Balanced",
        };
        f.write_str(label)
    }
}

/// Complete record of one simulated hour.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyResult {
    /// Start of the hour.
    pub timestamp: NaiveDateTime,
    /// Hour of day (0 to 23).
    pub hour: u32,
    /// Wind speed (m/s).
    pub wind_speed_mps: f64,
    /// Wind direction (degrees).
    pub wind_direction_deg: f64,
    /// Farm output (MW).
    pub supply_mw: f64,
    /// Community demand (MW).
    pub demand_mw: f64,
    /// `supply_mw - demand_mw`.
    pub net_balance_mw: f64,
    /// Stored energy after this hour (MWh).
    pub battery_mwh: f64,
    /// Stored energy after this hour as a percentage of capacity.
    pub battery_percent: f64,
    /// Battery and grid flows for this hour.
    #[serde(flatten)]
    pub flows: EnergyFlows,
    pub status: BalanceStatus,
}

impl fmt::Display for HourlyResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} h={:>2} | wind={:>5.1} m/s | supply={:>6.1} MW  demand={:>6.1} MW  \
             net={:>7.1} MW | bat=+{:.1}/-{:.1}  grid=+{:.1}/-{:.1} | SoC={:>5.1}% | {}",
            self.timestamp.format("%Y-%m-%d %H:%M"),
            self.hour,
            self.wind_speed_mps,
            self.supply_mw,
            self.demand_mw,
            self.net_balance_mw,
            self.flows.to_battery_mw,
            self.flows.from_battery_mw,
            self.flows.to_grid_mw,
            self.flows.from_grid_mw,
            self.battery_percent,
            self.status,
        )
    }
}
