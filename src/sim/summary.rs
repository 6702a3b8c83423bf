//! Post-hoc rollup statistics over a finished run.

use std::fmt;

use serde::Serialize;

use super::alert::{Alert, AlertLevel, count_level};
use super::types::{BalanceStatus, HourlyResult, SimulationConfig};

/// Hour counts, energy totals and power extremes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OperationalSummary {
    pub surplus_hours: usize,
    pub deficit_hours: usize,
    pub balanced_hours: usize,
    pub total_generation_mwh: f64,
    pub total_consumption_mwh: f64,
    pub total_export_mwh: f64,
    pub total_import_mwh: f64,
    /// Generation minus consumption (MWh).
    pub net_energy_mwh: f64,
    pub avg_supply_mw: f64,
    pub min_supply_mw: f64,
    pub max_supply_mw: f64,
    pub avg_demand_mw: f64,
    pub min_demand_mw: f64,
    pub max_demand_mw: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatterySummary {
    pub initial_mwh: f64,
    pub initial_percent: f64,
    pub final_mwh: f64,
    pub final_percent: f64,
    pub min_mwh: f64,
    pub max_mwh: f64,
    pub min_percent: f64,
    pub max_percent: f64,
    pub avg_percent: f64,
    /// Total discharged energy divided by capacity.
    pub cycles_equivalent: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GridSummary {
    /// Generation as a percentage of consumption; exceeds 100 on net export.
    pub self_sufficiency_pct: f64,
    /// Import as a percentage of consumption.
    pub import_dependency_pct: f64,
    pub export_revenue: f64,
    pub import_cost: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AlertCounts {
    pub total: usize,
    pub critical: usize,
    pub warning: usize,
    pub info: usize,
}

/// Aggregate statistics derived from a complete run.
///
/// A pure projection of the hourly records and alerts; each record stands
/// for one hour, so MW sums are MWh totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub operational: OperationalSummary,
    pub battery: BatterySummary,
    pub grid: GridSummary,
    pub alerts: AlertCounts,
}

impl RunSummary {
    /// Computes the summary of one run.
    ///
    /// An empty run yields zeroed statistics with the initial battery taken
    /// from `config`.
    pub fn from_run(results: &[HourlyResult], alerts: &[Alert], config: &SimulationConfig) -> Self {
        let initial_percent = if config.battery_capacity_mwh > 0.0 {
            config.initial_battery_mwh / config.battery_capacity_mwh * 100.0
        } else {
            0.0
        };
        let alert_counts = AlertCounts {
            total: alerts.len(),
            critical: count_level(alerts, AlertLevel::Critical),
            warning: count_level(alerts, AlertLevel::Warning),
            info: count_level(alerts, AlertLevel::Info),
        };

        let Some(last) = results.last() else {
            return Self {
                battery: BatterySummary {
                    initial_mwh: config.initial_battery_mwh,
                    initial_percent,
                    ..BatterySummary::default()
                },
                alerts: alert_counts,
                ..Self::default()
            };
        };

        let n = results.len() as f64;
        let count = |status: BalanceStatus| results.iter().filter(|r| r.status == status).count();
        let sum = |f: fn(&HourlyResult) -> f64| results.iter().map(f).sum::<f64>();
        let min = |f: fn(&HourlyResult) -> f64| results.iter().map(f).fold(f64::INFINITY, f64::min);
        let max = |f: fn(&HourlyResult) -> f64| {
            results.iter().map(f).fold(f64::NEG_INFINITY, f64::max)
        };

        let total_supply = sum(|r| r.supply_mw);
        let total_demand = sum(|r| r.demand_mw);
        let total_export = sum(|r| r.flows.to_grid_mw);
        let total_import = sum(|r| r.flows.from_grid_mw);
        let total_discharge = sum(|r| r.flows.from_battery_mw);

        let share_of_demand = |value: f64| {
            if total_demand > 0.0 {
                value / total_demand * 100.0
            } else {
                0.0
            }
        };

        Self {
            operational: OperationalSummary {
                surplus_hours: count(BalanceStatus::Surplus),
                deficit_hours: count(BalanceStatus::Deficit),
                balanced_hours: count(BalanceStatus::Balanced),
                total_generation_mwh: total_supply,
                total_consumption_mwh: total_demand,
                total_export_mwh: total_export,
                total_import_mwh: total_import,
                net_energy_mwh: total_supply - total_demand,
                avg_supply_mw: total_supply / n,
                min_supply_mw: min(|r| r.supply_mw),
                max_supply_mw: max(|r| r.supply_mw),
                avg_demand_mw: total_demand / n,
                min_demand_mw: min(|r| r.demand_mw),
                max_demand_mw: max(|r| r.demand_mw),
            },
            battery: BatterySummary {
                initial_mwh: config.initial_battery_mwh,
                initial_percent,
                final_mwh: last.battery_mwh,
                final_percent: last.battery_percent,
                min_mwh: min(|r| r.battery_mwh),
                max_mwh: max(|r| r.battery_mwh),
                min_percent: min(|r| r.battery_percent),
                max_percent: max(|r| r.battery_percent),
                avg_percent: sum(|r| r.battery_percent) / n,
                cycles_equivalent: if config.battery_capacity_mwh > 0.0 {
                    total_discharge / config.battery_capacity_mwh
                } else {
                    0.0
                },
            },
            grid: GridSummary {
                self_sufficiency_pct: share_of_demand(total_supply),
                import_dependency_pct: share_of_demand(total_import),
                export_revenue: total_export * config.export_price_per_mwh,
                import_cost: total_import * config.import_price_per_mwh,
            },
            alerts: alert_counts,
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = &self.operational;
        let bat = &self.battery;
        let grid = &self.grid;

        writeln!(f, "--- Run Summary ---")?;
        writeln!(
            f,
            "Hours (surplus/deficit/balanced): {}/{}/{}",
            op.surplus_hours, op.deficit_hours, op.balanced_hours
        )?;
        writeln!(f, "Total generation:      {:.2} MWh", op.total_generation_mwh)?;
        writeln!(f, "Total consumption:     {:.2} MWh", op.total_consumption_mwh)?;
        writeln!(f, "Net energy:            {:.2} MWh", op.net_energy_mwh)?;
        writeln!(f, "Total export:          {:.2} MWh", op.total_export_mwh)?;
        writeln!(f, "Total import:          {:.2} MWh", op.total_import_mwh)?;
        writeln!(
            f,
            "Supply avg/min/max:    {:.2}/{:.2}/{:.2} MW",
            op.avg_supply_mw, op.min_supply_mw, op.max_supply_mw
        )?;
        writeln!(
            f,
            "Demand avg/min/max:    {:.2}/{:.2}/{:.2} MW",
            op.avg_demand_mw, op.min_demand_mw, op.max_demand_mw
        )?;
        writeln!(f, "Battery initial:       {:.1} %", bat.initial_percent)?;
        writeln!(f, "Battery final:         {:.1} %", bat.final_percent)?;
        writeln!(
            f,
            "Battery min/max/avg:   {:.1}/{:.1}/{:.1} %",
            bat.min_percent, bat.max_percent, bat.avg_percent
        )?;
        writeln!(f, "Battery cycles:        {:.3}", bat.cycles_equivalent)?;
        writeln!(f, "Self-sufficiency:      {:.1} %", grid.self_sufficiency_pct)?;
        writeln!(f, "Import dependency:     {:.1} %", grid.import_dependency_pct)?;
        writeln!(f, "Export revenue:        {:.2}", grid.export_revenue)?;
        writeln!(f, "Import cost:           {:.2}", grid.import_cost)?;
        write!(
            f,
            "Alerts:                {} ({} critical, {} warning, {} info)",
            self.alerts.total, self.alerts.critical, self.alerts.warning, self.alerts.info
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::types::EnergyFlows;
    use chrono::NaiveDate;

    fn make_result(supply: f64, demand: f64, battery_mwh: f64, flows: EnergyFlows) -> HourlyResult {
        let ts = NaiveDate::from_ymd_opt(2024, 6, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .expect("valid timestamp");
        let net = supply - demand;
        HourlyResult {
            timestamp: ts,
            hour: 0,
            wind_speed_mps: 8.0,
            wind_direction_deg: 250.0,
            supply_mw: supply,
            demand_mw: demand,
            net_balance_mw: net,
            battery_mwh,
            battery_percent: battery_mwh / 300.0 * 100.0,
            flows,
            status: crate::sim::power_balance::classify(net),
        }
    }

    fn alert(level: AlertLevel) -> Alert {
        Alert {
            level,
            message: String::new(),
            timestamp: NaiveDate::from_ymd_opt(2024, 6, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .expect("valid timestamp"),
            detail: None,
        }
    }

    fn sample_run() -> Vec<HourlyResult> {
        vec![
            make_result(
                120.0,
                80.0,
                187.6,
                EnergyFlows {
                    to_battery_mw: 40.0,
                    ..EnergyFlows::default()
                },
            ),
            make_result(
                20.0,
                80.0,
                127.6,
                EnergyFlows {
                    from_battery_mw: 60.0,
                    ..EnergyFlows::default()
                },
            ),
            make_result(
                81.0,
                80.0,
                127.6,
                EnergyFlows {
                    to_battery_mw: 1.0,
                    ..EnergyFlows::default()
                },
            ),
            make_result(
                0.0,
                100.0,
                30.0,
                EnergyFlows {
                    from_battery_mw: 97.6,
                    from_grid_mw: 2.4,
                    ..EnergyFlows::default()
                },
            ),
        ]
    }

    #[test]
    fn status_counts_and_totals() {
        let summary = RunSummary::from_run(&sample_run(), &[], &SimulationConfig::default());
        let op = &summary.operational;
        assert_eq!(op.surplus_hours, 1);
        assert_eq!(op.deficit_hours, 2);
        assert_eq!(op.balanced_hours, 1);
        assert_eq!(op.total_generation_mwh, 221.0);
        assert_eq!(op.total_consumption_mwh, 340.0);
        assert_eq!(op.net_energy_mwh, -119.0);
        assert_eq!(op.max_supply_mw, 120.0);
        assert_eq!(op.min_supply_mw, 0.0);
        assert_eq!(op.max_demand_mw, 100.0);
        assert!((op.total_import_mwh - 2.4).abs() < 1e-9);
    }

    #[test]
    fn battery_rollup() {
        let summary = RunSummary::from_run(&sample_run(), &[], &SimulationConfig::default());
        let bat = &summary.battery;
        assert_eq!(bat.initial_mwh, 150.0);
        assert_eq!(bat.initial_percent, 50.0);
        assert_eq!(bat.final_mwh, 30.0);
        assert_eq!(bat.min_mwh, 30.0);
        assert_eq!(bat.max_mwh, 187.6);
        assert!((bat.cycles_equivalent - 157.6 / 300.0).abs() < 1e-9);
    }

    #[test]
    fn grid_ratios_and_money() {
        let summary = RunSummary::from_run(&sample_run(), &[], &SimulationConfig::default());
        let grid = &summary.grid;
        assert!((grid.self_sufficiency_pct - 221.0 / 340.0 * 100.0).abs() < 1e-9);
        assert!((grid.import_dependency_pct - 2.4 / 340.0 * 100.0).abs() < 1e-9);
        assert_eq!(grid.export_revenue, 0.0);
        assert!((grid.import_cost - 360.0).abs() < 1e-9);
    }

    #[test]
    fn self_sufficiency_is_not_capped() {
        let results = vec![make_result(
            150.0,
            60.0,
            270.0,
            EnergyFlows {
                to_grid_mw: 90.0,
                ..EnergyFlows::default()
            },
        )];
        let summary = RunSummary::from_run(&results, &[], &SimulationConfig::default());
        assert_eq!(summary.grid.self_sufficiency_pct, 250.0);
        assert_eq!(summary.grid.export_revenue, 3600.0);
    }

    #[test]
    fn zero_demand_gives_zero_ratios() {
        let results = vec![make_result(10.0, 0.0, 150.0, EnergyFlows::default())];
        let summary = RunSummary::from_run(&results, &[], &SimulationConfig::default());
        assert_eq!(summary.grid.self_sufficiency_pct, 0.0);
        assert_eq!(summary.grid.import_dependency_pct, 0.0);
    }

    #[test]
    fn alert_counts_by_level() {
        let alerts = vec![
            alert(AlertLevel::Critical),
            alert(AlertLevel::Warning),
            alert(AlertLevel::Warning),
            alert(AlertLevel::Info),
        ];
        let summary = RunSummary::from_run(&sample_run(), &alerts, &SimulationConfig::default());
        assert_eq!(
            summary.alerts,
            AlertCounts {
                total: 4,
                critical: 1,
                warning: 2,
                info: 1
            }
        );
    }

    #[test]
    fn empty_run() {
        let summary = RunSummary::from_run(&[], &[], &SimulationConfig::default());
        assert_eq!(summary.operational, OperationalSummary::default());
        assert_eq!(summary.battery.initial_mwh, 150.0);
        assert_eq!(summary.battery.final_mwh, 0.0);
    }

    #[test]
    fn display_contains_key_lines() {
        let summary = RunSummary::from_run(&sample_run(), &[], &SimulationConfig::default());
        let text = summary.to_string();
        assert!(text.contains("Total generation:"));
        assert!(text.contains("Self-sufficiency:"));
    }
}
