//! Maintenance window ranking over a finished run.

use chrono::NaiveDateTime;
use serde::Serialize;

use super::types::HourlyResult;

/// Default maintenance window length (hours).
pub const DEFAULT_WINDOW_HOURS: usize = 6;

/// Number of windows returned.
pub const TOP_WINDOWS: usize = 3;

/// A contiguous span of hours scored as a maintenance opportunity.
///
/// Windows rank by ascending `score`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaintenanceWindow {
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub start_hour: u32,
    pub end_hour: u32,
    pub score: f64,
    /// Generation that a full shutdown over the window would forgo (MWh).
    pub lost_generation_mwh: f64,
    pub avg_wind_speed_mps: f64,
    pub avg_demand_mw: f64,
    /// Mean battery state of charge as a fraction (0 to 1).
    pub avg_battery_soc: f64,
}

/// Ranks every contiguous `window_hours` span and returns the best three.
///
/// Each hour scores `((1 − supply/max_supply) + (1 − demand/max_demand)) / 2`
/// with the maxima taken over the whole run; a window scores the mean of its
/// hours. Windows are sorted ascending, ties kept in chronological order.
/// Fewer hours than `window_hours` (or a zero length) gives an empty list.
pub fn find_maintenance_windows(results: &[HourlyResult], window_hours: usize) -> Vec<MaintenanceWindow> {
    if window_hours == 0 || results.len() < window_hours {
        return Vec::new();
    }

    let max_supply = results.iter().map(|r| r.supply_mw).fold(0.0, f64::max);
    let max_demand = results.iter().map(|r| r.demand_mw).fold(0.0, f64::max);
    let hour_scores: Vec<f64> = results
        .iter()
        .map(|r| (headroom(r.supply_mw, max_supply) + headroom(r.demand_mw, max_demand)) / 2.0)
        .collect();

    let n = window_hours as f64;
    let mut windows: Vec<MaintenanceWindow> = results
        .windows(window_hours)
        .zip(hour_scores.windows(window_hours))
        .map(|(span, scores)| {
            let first = &span[0];
            let last = &span[span.len() - 1];
            MaintenanceWindow {
                start_time: first.timestamp,
                end_time: last.timestamp,
                start_hour: first.hour,
                end_hour: last.hour,
                score: scores.iter().sum::<f64>() / n,
                lost_generation_mwh: span.iter().map(|r| r.supply_mw).sum(),
                avg_wind_speed_mps: span.iter().map(|r| r.wind_speed_mps).sum::<f64>() / n,
                avg_demand_mw: span.iter().map(|r| r.demand_mw).sum::<f64>() / n,
                avg_battery_soc: span.iter().map(|r| r.battery_percent).sum::<f64>() / n / 100.0,
            }
        })
        .collect();

    windows.sort_by(|a, b| a.score.total_cmp(&b.score));
    windows.truncate(TOP_WINDOWS);
    windows
}

/// `1 − value/max`, treating a zero maximum as a zero ratio.
fn headroom(value: f64, max: f64) -> f64 {
    if max > 0.0 { 1.0 - value / max } else { 1.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::types::{BalanceStatus, EnergyFlows};
    use chrono::{Duration, NaiveDate};

    fn result(hour: u32, supply: f64, demand: f64) -> HourlyResult {
        let start = NaiveDate::from_ymd_opt(2024, 6, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .expect("valid timestamp");
        HourlyResult {
            timestamp: start + Duration::hours(i64::from(hour)),
            hour,
            wind_speed_mps: 8.0,
            wind_direction_deg: 250.0,
            supply_mw: supply,
            demand_mw: demand,
            net_balance_mw: supply - demand,
            battery_mwh: 150.0,
            battery_percent: 50.0,
            flows: EnergyFlows::default(),
            status: BalanceStatus::Balanced,
        }
    }

    #[test]
    fn lowest_combined_span_ranks_first() {
        // hours 10..=15 have the lowest combined wind and demand score
        let results: Vec<HourlyResult> = (0..24)
            .map(|h| {
                if (10..=15).contains(&h) {
                    result(h, 140.0, 110.0)
                } else {
                    result(h, 40.0, 60.0)
                }
            })
            .collect();
        let windows = find_maintenance_windows(&results, DEFAULT_WINDOW_HOURS);
        assert_eq!(windows.len(), 3);
        assert_eq!(windows[0].start_hour, 10);
        assert_eq!(windows[0].end_hour, 15);
        assert!(windows[0].score < windows[1].score);
        assert!(windows[1].score <= windows[2].score);
    }

    #[test]
    fn window_statistics() {
        let results: Vec<HourlyResult> = (0..6).map(|h| result(h, 10.0, 60.0)).collect();
        let windows = find_maintenance_windows(&results, 6);
        assert_eq!(windows.len(), 1);
        let w = &windows[0];
        assert_eq!(w.lost_generation_mwh, 60.0);
        assert_eq!(w.avg_demand_mw, 60.0);
        assert_eq!(w.avg_wind_speed_mps, 8.0);
        assert!((w.avg_battery_soc - 0.5).abs() < 1e-12);
        assert!(w.score.abs() < 1e-12);
    }

    #[test]
    fn too_few_hours_gives_empty() {
        let results: Vec<HourlyResult> = (0..5).map(|h| result(h, 10.0, 60.0)).collect();
        assert!(find_maintenance_windows(&results, 6).is_empty());
        assert!(find_maintenance_windows(&[], 6).is_empty());
        assert!(find_maintenance_windows(&results, 0).is_empty());
    }

    #[test]
    fn zero_supply_run_does_not_divide_by_zero() {
        let results: Vec<HourlyResult> = (0..24).map(|h| result(h, 0.0, 55.0)).collect();
        let windows = find_maintenance_windows(&results, 6);
        assert_eq!(windows.len(), 3);
        assert!(windows.iter().all(|w| w.score.is_finite()));
        assert!((windows[0].score - 0.5).abs() < 1e-12);
        // ties keep chronological order
        assert_eq!(windows[0].start_hour, 0);
        assert_eq!(windows[1].start_hour, 1);
    }
}
