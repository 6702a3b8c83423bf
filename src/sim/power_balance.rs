//! Hourly net balance and status classification.

use super::types::BalanceStatus;

/// Half-width of the band around zero treated as balanced (MW).
pub const BALANCED_BAND_MW: f64 = 2.0;

/// Net balance of one hour: positive = surplus, negative = deficit.
pub fn net_balance_mw(supply_mw: f64, demand_mw: f64) -> f64 {
    supply_mw - demand_mw
}

/// Classifies an hour by its net balance.
///
/// `Balanced` covers the closed band `[-2, 2]` MW.
pub fn classify(net_balance_mw: f64) -> BalanceStatus {
    if net_balance_mw > BALANCED_BAND_MW {
        BalanceStatus::Surplus
    } else if net_balance_mw < -BALANCED_BAND_MW {
        BalanceStatus::Deficit
    } else {
        BalanceStatus::Balanced
    }
}
