//! Run-scoped alerts.
//!
//! Alerts are observations only: the observer functions read the hour's
//! inputs and outputs and append to an [`AlertLog`], they never feed back
//! into supply, flows or battery state. Repeated conditions raise one alert
//! per hour; there is no deduplication.

use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;

use super::types::{EnergyFlows, SimulationConfig};

/// Wind speed below which a low-wind hour is also reported (m/s).
pub const VERY_LOW_WIND_MPS: f64 = 2.5;

/// Alert severity, ordered `Info < Warning < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Info,
    Warning,
    Critical,
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AlertLevel::Info => "info",
            AlertLevel::Warning => "warning",
            AlertLevel::Critical => "critical",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub level: AlertLevel,
    pub message: String,
    pub timestamp: NaiveDateTime,
    pub detail: Option<String>,
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:<8}] {} {}",
            self.level,
            self.timestamp.format("%Y-%m-%d %H:%M"),
            self.message
        )?;
        if let Some(detail) = &self.detail {
            write!(f, " ({detail})")?;
        }
        Ok(())
    }
}

/// Append-only alert list owned by a single run.
#[derive(Debug, Clone, Default)]
pub struct AlertLog {
    alerts: Vec<Alert>,
}

impl AlertLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, level: AlertLevel, message: String, timestamp: NaiveDateTime) {
        self.push_with_detail(level, message, timestamp, None);
    }

    pub fn push_with_detail(
        &mut self,
        level: AlertLevel,
        message: String,
        timestamp: NaiveDateTime,
        detail: Option<String>,
    ) {
        self.alerts.push(Alert {
            level,
            message,
            timestamp,
            detail,
        });
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    /// Number of alerts at exactly `level`.
    pub fn count(&self, level: AlertLevel) -> usize {
        count_level(&self.alerts, level)
    }

    pub fn into_vec(self) -> Vec<Alert> {
        self.alerts
    }
}

/// Number of alerts in `alerts` at exactly `level`.
pub fn count_level(alerts: &[Alert], level: AlertLevel) -> usize {
    alerts.iter().filter(|a| a.level == level).count()
}

/// Reports wind conditions that force the farm to zero output.
///
/// Below the low-wind threshold only speeds under [`VERY_LOW_WIND_MPS`]
/// are reported; above the high-wind threshold every hour is critical.
pub fn observe_wind(
    log: &mut AlertLog,
    wind_speed_mps: f64,
    config: &SimulationConfig,
    at: NaiveDateTime,
) {
    if wind_speed_mps < config.low_wind_threshold_mps {
        if wind_speed_mps < VERY_LOW_WIND_MPS {
            log.push(
                AlertLevel::Warning,
                format!("Very low wind: {wind_speed_mps:.1} m/s"),
                at,
            );
        }
    } else if wind_speed_mps > config.high_wind_threshold_mps {
        log.push_with_detail(
            AlertLevel::Critical,
            format!("Extreme wind shutdown: {wind_speed_mps:.1} m/s"),
            at,
            Some(format!(
                "above {:.1} m/s shutdown threshold",
                config.high_wind_threshold_mps
            )),
        );
    }
}

/// Reports charging near the ceiling and any grid import.
///
/// `soc_before` is the battery SOC before this hour's flows are applied.
pub fn observe_flows(
    log: &mut AlertLog,
    flows: &EnergyFlows,
    soc_before: f64,
    config: &SimulationConfig,
    at: NaiveDateTime,
) {
    if flows.to_battery_mw > 0.0 && soc_before > config.charging_info_soc {
        log.push(
            AlertLevel::Info,
            format!("Battery charging at {:.0}% SOC", soc_before * 100.0),
            at,
        );
    }
    if flows.from_grid_mw > 0.0 {
        log.push(
            AlertLevel::Warning,
            format!("Grid import: {:.1} MW", flows.from_grid_mw),
            at,
        );
    }
}

/// Reports the post-update SOC against the low/high alert thresholds.
pub fn observe_battery(log: &mut AlertLog, soc: f64, config: &SimulationConfig, at: NaiveDateTime) {
    if soc < config.battery_low_alert_soc {
        log.push(
            AlertLevel::Critical,
            format!("Battery low: {:.0}% SOC", soc * 100.0),
            at,
        );
    } else if soc > config.battery_high_alert_soc {
        log.push(
            AlertLevel::Warning,
            format!("Battery high: {:.0}% SOC", soc * 100.0),
            at,
        );
    }
}
