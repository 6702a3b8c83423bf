use crate::sim::types::{EnergyFlows, SimulationConfig};

/// Next stored energy after one hour of flows.
///
/// `new = current + to_battery · efficiency − from_battery`, clamped to
/// `[floor_frac · capacity, ceiling_frac · capacity]`. Efficiency applies
/// to the charging leg only; discharge is 1:1.
///
/// # Examples
///
/// ```
/// use windfarm_sim::devices::battery::update;
///
/// let next = update(150.0, 40.0, 0.0, 0.94, 0.1, 0.9, 300.0);
/// assert!((next - 187.6).abs() < 1e-9);
/// ```
pub fn update(
    current_mwh: f64,
    to_battery_mw: f64,
    from_battery_mw: f64,
    efficiency: f64,
    floor_frac: f64,
    ceiling_frac: f64,
    capacity_mwh: f64,
) -> f64 {
    let next = current_mwh + to_battery_mw * efficiency - from_battery_mw;
    next.clamp(floor_frac * capacity_mwh, ceiling_frac * capacity_mwh)
}

/// Battery energy storage threaded through one run.
///
/// Holds a single scalar (stored MWh) together with the limits it is
/// updated against. Every update keeps the energy within the configured
/// SOC floor and ceiling.
#[derive(Debug, Clone, PartialEq)]
pub struct Battery {
    /// Battery capacity in megawatt-hours.
    pub capacity_mwh: f64,

    /// Charging-leg efficiency (0..1.0].
    pub efficiency: f64,

    /// SOC floor as a fraction of capacity.
    pub floor_frac: f64,

    /// SOC ceiling as a fraction of capacity.
    pub ceiling_frac: f64,

    energy_mwh: f64,
}

impl Battery {
    /// Creates the run's battery at `config.initial_battery_mwh`.
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            capacity_mwh: config.battery_capacity_mwh,
            efficiency: config.battery_efficiency,
            floor_frac: config.battery_min_soc,
            ceiling_frac: config.battery_max_soc,
            energy_mwh: config.initial_battery_mwh,
        }
    }

    /// Stored energy (MWh).
    pub fn energy_mwh(&self) -> f64 {
        self.energy_mwh
    }

    /// State of charge as a fraction of capacity.
    pub fn soc(&self) -> f64 {
        self.energy_mwh / self.capacity_mwh
    }

    /// State of charge as a percentage (0 to 100).
    pub fn percent(&self) -> f64 {
        self.soc() * 100.0
    }

    /// Applies one hour of battery flows and returns the new stored energy.
    pub fn apply(&mut self, flows: &EnergyFlows) -> f64 {
        self.energy_mwh = update(
            self.energy_mwh,
            flows.to_battery_mw,
            flows.from_battery_mw,
            self.efficiency,
            self.floor_frac,
            self.ceiling_frac,
            self.capacity_mwh,
        );
        self.energy_mwh
    }
}
