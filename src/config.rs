//! TOML-based scenario configuration and preset definitions.

use std::fs;
use std::path::Path;

use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::error::ConfigError;
use crate::sim::maintenance::DEFAULT_WINDOW_HOURS;
use crate::sim::types::{HOURS_PER_RUN, SimulationConfig};

/// Accepted layouts for `simulation.start`.
const START_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the baseline scenario. Load from
/// TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Seed, start time and supply model.
    #[serde(default)]
    pub simulation: RunSection,
    /// Turbine fleet and operating wind window.
    #[serde(default)]
    pub wind_farm: WindFarmSection,
    /// Battery storage parameters and alert thresholds.
    #[serde(default)]
    pub battery: BatterySection,
    /// Community load parameters.
    #[serde(default)]
    pub demand: DemandSection,
    /// Where the hourly wind comes from.
    #[serde(default)]
    pub weather: WeatherSection,
    /// Grid prices.
    #[serde(default)]
    pub market: MarketSection,
    /// Maintenance window search.
    #[serde(default)]
    pub maintenance: MaintenanceSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunSection {
    /// Master random seed for weather and demand noise.
    pub seed: u64,
    /// First simulated hour, `YYYY-MM-DDTHH:MM:SS`.
    pub start: String,
    /// Supply model: `"reference"` or `"physical"`.
    pub supply_model: String,
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            seed: 42,
            start: "2024-06-01T00:00:00".to_string(),
            supply_model: "reference".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindFarmSection {
    pub turbine_count: u32,
    /// Fraction of turbines available (0.0–1.0).
    pub availability: f64,
    /// Below this the farm produces nothing (m/s).
    pub low_wind_threshold_mps: f64,
    /// Above this the farm is shut down (m/s).
    pub high_wind_threshold_mps: f64,
}

impl Default for WindFarmSection {
    fn default() -> Self {
        let d = SimulationConfig::default();
        Self {
            turbine_count: d.turbine_count,
            availability: d.turbine_availability,
            low_wind_threshold_mps: d.low_wind_threshold_mps,
            high_wind_threshold_mps: d.high_wind_threshold_mps,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatterySection {
    pub capacity_mwh: f64,
    pub max_charge_mw: f64,
    pub max_discharge_mw: f64,
    pub initial_mwh: f64,
    /// Charging-leg efficiency (0.0–1.0].
    pub efficiency: f64,
    pub min_soc: f64,
    pub max_soc: f64,
    pub low_alert_soc: f64,
    pub high_alert_soc: f64,
    /// Charging above this SOC raises an info alert.
    pub charging_info_soc: f64,
}

impl Default for BatterySection {
    fn default() -> Self {
        let d = SimulationConfig::default();
        Self {
            capacity_mwh: d.battery_capacity_mwh,
            max_charge_mw: d.battery_max_charge_mw,
            max_discharge_mw: d.battery_max_discharge_mw,
            initial_mwh: d.initial_battery_mwh,
            efficiency: d.battery_efficiency,
            min_soc: d.battery_min_soc,
            max_soc: d.battery_max_soc,
            low_alert_soc: d.battery_low_alert_soc,
            high_alert_soc: d.battery_high_alert_soc,
            charging_info_soc: d.charging_info_soc,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DemandSection {
    /// Multiplier on the whole profile (1.0 = 100 %).
    pub percent: f64,
    pub base_load_mw: f64,
    pub min_mw: f64,
    pub max_mw: f64,
    pub noise_std_mw: f64,
    /// Weight of the demand model signal (0 disables it).
    pub predictor_blend: f64,
}

impl Default for DemandSection {
    fn default() -> Self {
        let d = SimulationConfig::default();
        Self {
            percent: d.demand_percent,
            base_load_mw: d.demand_base_load_mw,
            min_mw: d.demand_min_mw,
            max_mw: d.demand_max_mw,
            noise_std_mw: d.demand_noise_std_mw,
            predictor_blend: d.demand_predictor_blend,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WeatherSection {
    /// `"synthetic"`, `"csv"` or `"constant"`.
    pub source: String,
    /// Forecast file for the `csv` source.
    pub csv_path: Option<String>,
    /// Wind speed for the `constant` source (m/s).
    pub constant_speed_mps: f64,
    /// Wind direction for the `constant` source (degrees).
    pub constant_direction_deg: f64,
}

impl Default for WeatherSection {
    fn default() -> Self {
        Self {
            source: "synthetic".to_string(),
            csv_path: None,
            constant_speed_mps: 10.0,
            constant_direction_deg: 250.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarketSection {
    pub export_price_per_mwh: f64,
    pub import_price_per_mwh: f64,
}

impl Default for MarketSection {
    fn default() -> Self {
        let d = SimulationConfig::default();
        Self {
            export_price_per_mwh: d.export_price_per_mwh,
            import_price_per_mwh: d.import_price_per_mwh,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MaintenanceSection {
    pub window_hours: usize,
}

impl Default for MaintenanceSection {
    fn default() -> Self {
        Self {
            window_hours: DEFAULT_WINDOW_HOURS,
        }
    }
}

impl ScenarioConfig {
    /// Reference farm with synthetic weather.
    pub fn baseline() -> Self {
        Self::default()
    }

    /// A still day: light constant wind keeps the farm near cut-in.
    pub fn calm() -> Self {
        Self {
            weather: WeatherSection {
                source: "constant".to_string(),
                constant_speed_mps: 5.0,
                ..WeatherSection::default()
            },
            ..Self::default()
        }
    }

    /// A storm day: constant wind above the shutdown threshold.
    pub fn storm() -> Self {
        Self {
            weather: WeatherSection {
                source: "constant".to_string(),
                constant_speed_mps: 27.0,
                constant_direction_deg: 220.0,
                ..WeatherSection::default()
            },
            ..Self::default()
        }
    }

    /// The deployed service's settings, including its 1 % demand fraction
    /// that pins demand to the band floor.
    pub fn reference_service() -> Self {
        Self {
            demand: DemandSection {
                percent: 0.01,
                ..DemandSection::default()
            },
            ..Self::default()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "calm", "storm", "reference_service"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "calm" => Ok(Self::calm()),
            "storm" => Ok(Self::storm()),
            "reference_service" => Ok(Self::reference_service()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// The run parameters handed to the engine.
    pub fn to_simulation_config(&self) -> SimulationConfig {
        let (farm, bat, demand) = (&self.wind_farm, &self.battery, &self.demand);
        SimulationConfig {
            turbine_count: farm.turbine_count,
            turbine_availability: farm.availability,
            battery_capacity_mwh: bat.capacity_mwh,
            battery_max_charge_mw: bat.max_charge_mw,
            battery_max_discharge_mw: bat.max_discharge_mw,
            initial_battery_mwh: bat.initial_mwh,
            battery_efficiency: bat.efficiency,
            battery_min_soc: bat.min_soc,
            battery_max_soc: bat.max_soc,
            demand_percent: demand.percent,
            demand_base_load_mw: demand.base_load_mw,
            demand_min_mw: demand.min_mw,
            demand_max_mw: demand.max_mw,
            demand_noise_std_mw: demand.noise_std_mw,
            demand_predictor_blend: demand.predictor_blend,
            low_wind_threshold_mps: farm.low_wind_threshold_mps,
            high_wind_threshold_mps: farm.high_wind_threshold_mps,
            battery_low_alert_soc: bat.low_alert_soc,
            battery_high_alert_soc: bat.high_alert_soc,
            charging_info_soc: bat.charging_info_soc,
            export_price_per_mwh: self.market.export_price_per_mwh,
            import_price_per_mwh: self.market.import_price_per_mwh,
        }
    }

    /// Parsed `simulation.start`.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the timestamp matches no accepted layout.
    pub fn start_time(&self) -> Result<NaiveDateTime, ConfigError> {
        let raw = self.simulation.start.trim();
        START_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .ok_or_else(|| {
                ConfigError::new(
                    "simulation.start",
                    format!("expected YYYY-MM-DDTHH:MM:SS, got \"{raw}\""),
                )
            })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors: Vec<ConfigError> = self
            .to_simulation_config()
            .check()
            .into_iter()
            .map(|e| ConfigError::new(scenario_path(&e.field), e.message))
            .collect();

        if let Err(e) = self.start_time() {
            errors.push(e);
        }

        let s = &self.simulation;
        if s.supply_model != "reference" && s.supply_model != "physical" {
            errors.push(ConfigError::new(
                "simulation.supply_model",
                format!(
                    "must be \"reference\" or \"physical\", got \"{}\"",
                    s.supply_model
                ),
            ));
        }

        let w = &self.weather;
        match w.source.as_str() {
            "synthetic" => {}
            "csv" => {
                if w.csv_path.as_deref().is_none_or(|p| p.trim().is_empty()) {
                    errors.push(ConfigError::new(
                        "weather.csv_path",
                        "required when weather.source = \"csv\"",
                    ));
                }
            }
            "constant" => {
                if !w.constant_speed_mps.is_finite() || w.constant_speed_mps < 0.0 {
                    errors.push(ConfigError::new(
                        "weather.constant_speed_mps",
                        "must be finite and >= 0",
                    ));
                }
                if !w.constant_direction_deg.is_finite() {
                    errors.push(ConfigError::new(
                        "weather.constant_direction_deg",
                        "must be finite",
                    ));
                }
            }
            other => errors.push(ConfigError::new(
                "weather.source",
                format!("must be \"synthetic\", \"csv\" or \"constant\", got \"{other}\""),
            )),
        }

        let m = &self.maintenance;
        if m.window_hours == 0 || m.window_hours > HOURS_PER_RUN {
            errors.push(ConfigError::new(
                "maintenance.window_hours",
                format!("must be in [1, {HOURS_PER_RUN}]"),
            ));
        }

        errors
    }
}

/// Maps a [`SimulationConfig`] field to its dotted scenario path.
fn scenario_path(field: &str) -> String {
    let path = match field {
        "turbine_count" => "wind_farm.turbine_count",
        "turbine_availability" => "wind_farm.availability",
        "low_wind_threshold_mps" => "wind_farm.low_wind_threshold_mps",
        "high_wind_threshold_mps" => "wind_farm.high_wind_threshold_mps",
        "battery_capacity_mwh" => "battery.capacity_mwh",
        "battery_max_charge_mw" => "battery.max_charge_mw",
        "battery_max_discharge_mw" => "battery.max_discharge_mw",
        "initial_battery_mwh" => "battery.initial_mwh",
        "battery_efficiency" => "battery.efficiency",
        "battery_min_soc" => "battery.min_soc",
        "battery_max_soc" => "battery.max_soc",
        "battery_low_alert_soc" => "battery.low_alert_soc",
        "battery_high_alert_soc" => "battery.high_alert_soc",
        "charging_info_soc" => "battery.charging_info_soc",
        "demand_percent" => "demand.percent",
        "demand_base_load_mw" => "demand.base_load_mw",
        "demand_min_mw" => "demand.min_mw",
        "demand_max_mw" => "demand.max_mw",
        "demand_noise_std_mw" => "demand.noise_std_mw",
        "demand_predictor_blend" => "demand.predictor_blend",
        "export_price_per_mwh" => "market.export_price_per_mwh",
        "import_price_per_mwh" => "market.import_price_per_mwh",
        other => return other.to_string(),
    };
    path.to_string()
}
