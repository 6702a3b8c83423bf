//! Energy flow allocation between the battery and the grid.

use super::types::{EnergyFlows, SimulationConfig};

/// Splits one hour's net balance between the battery and the grid.
///
/// Surplus charges the battery first, bounded by the charge rate and the
/// room left below the SOC ceiling; the rest is exported. A deficit (or an
/// exactly zero balance) discharges the battery first, bounded by the
/// discharge rate and the energy held above the SOC floor; the rest is
/// imported. Each bound is clamped to `>= 0` before taking the minimum.
///
/// `current_battery_mwh` is the battery energy before this hour's update.
///
/// # Examples
///
/// ```
/// use windfarm_sim::sim::allocator::allocate;
/// use windfarm_sim::sim::types::SimulationConfig;
///
/// let cfg = SimulationConfig::default();
/// // Battery already at the 90 % ceiling: everything is exported.
/// let flows = allocate(40.0, 270.0, &cfg);
/// assert_eq!(flows.to_battery_mw, 0.0);
/// assert_eq!(flows.to_grid_mw, 40.0);
/// ```
pub fn allocate(
    net_balance_mw: f64,
    current_battery_mwh: f64,
    config: &SimulationConfig,
) -> EnergyFlows {
    if net_balance_mw > 0.0 {
        let surplus = net_balance_mw;
        let room_mwh = config.battery_ceiling_mwh() - current_battery_mwh;
        let to_battery = config
            .battery_max_charge_mw
            .max(0.0)
            .min(room_mwh.max(0.0))
            .min(surplus);

        EnergyFlows {
            to_battery_mw: to_battery,
            to_grid_mw: surplus - to_battery,
            ..EnergyFlows::default()
        }
    } else {
        let deficit = -net_balance_mw;
        let available_mwh = current_battery_mwh - config.battery_floor_mwh();
        let from_battery = config
            .battery_max_discharge_mw
            .max(0.0)
            .min(available_mwh.max(0.0))
            .min(deficit);

        EnergyFlows {
            from_battery_mw: from_battery,
            from_grid_mw: deficit - from_battery,
            ..EnergyFlows::default()
        }
    }
}
