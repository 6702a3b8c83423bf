//! Wind farm output: a regression-model estimate corrected by a physical
//! power curve, with a curve-only fallback.

use tracing::warn;

use crate::devices::types::{Device, HourContext};
use crate::predictor::{PredictorError, SupplyPredictor, checked_prediction};

/// Nameplate capacity of one turbine (MW).
pub const TURBINE_RATED_MW: f64 = 3.0;

/// Number of turbines the supply model was trained on.
pub const MODEL_REFERENCE_TURBINES: f64 = 3.0;

/// Empirical ratio reconciling model output with physical turbine capacity
/// (9 MW rated for three turbines against a ~2.7 MW model peak).
pub const MODEL_TO_PHYSICAL_RATIO: f64 = 3.33;

/// Wind speed below which turbines do not turn (m/s).
pub const CUT_IN_MPS: f64 = 3.5;

/// Wind speed above which turbines are feathered for safety (m/s).
pub const CUT_OUT_MPS: f64 = 25.0;

/// Power curve breakpoints `(wind speed m/s, fraction of rated)`; linear
/// between points, rated from the last point up to cut-out.
const POWER_CURVE: [(f64, f64); 5] = [
    (CUT_IN_MPS, 0.1),
    (6.0, 0.475),
    (8.0, 0.85),
    (10.0, 1.0),
    (12.0, 1.0),
];

/// Fraction of rated output produced at `wind_speed_mps`.
///
/// Zero below cut-in and above cut-out, monotonic non-decreasing in between
/// and equal to 1.0 from 10 m/s.
///
/// # Examples
///
/// ```
/// use windfarm_sim::devices::wind_farm::wind_power_curve;
///
/// assert_eq!(wind_power_curve(3.0), 0.0);
/// assert_eq!(wind_power_curve(12.0), 1.0);
/// assert_eq!(wind_power_curve(26.0), 0.0);
/// ```
pub fn wind_power_curve(wind_speed_mps: f64) -> f64 {
    if !(CUT_IN_MPS..=CUT_OUT_MPS).contains(&wind_speed_mps) {
        return 0.0;
    }

    for pair in POWER_CURVE.windows(2) {
        let (v0, p0) = pair[0];
        let (v1, p1) = pair[1];
        if wind_speed_mps < v1 {
            return p0 + (wind_speed_mps - v0) * (p1 - p0) / (v1 - v0);
        }
    }
    1.0
}

/// Installed capacity of `turbine_count` turbines (MW).
pub fn farm_capacity_mw(turbine_count: u32) -> f64 {
    f64::from(turbine_count) * TURBINE_RATED_MW
}

/// Scales a raw supply-model prediction to farm output.
///
/// kW → MW, model-to-physical correction, per-turbine share of the model's
/// reference farm, times the actual turbine count, the power curve and the
/// availability, clamped to `[0, installed capacity]`.
pub fn estimate_supply(
    raw_model_output_kw: f64,
    turbine_count: u32,
    turbine_availability: f64,
    wind_speed_mps: f64,
) -> f64 {
    let model_mw = raw_model_output_kw / 1000.0 * MODEL_TO_PHYSICAL_RATIO;
    let per_turbine_mw = model_mw / MODEL_REFERENCE_TURBINES;
    let farm_mw = per_turbine_mw
        * f64::from(turbine_count)
        * wind_power_curve(wind_speed_mps)
        * turbine_availability;
    farm_mw.clamp(0.0, farm_capacity_mw(turbine_count))
}

/// Curve-only farm output, used when no model prediction is available.
pub fn physical_supply_mw(turbine_count: u32, turbine_availability: f64, wind_speed_mps: f64) -> f64 {
    let capacity = farm_capacity_mw(turbine_count);
    (capacity * wind_power_curve(wind_speed_mps) * turbine_availability).clamp(0.0, capacity)
}

/// Where a supply figure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupplySource {
    Model,
    PhysicalFallback,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SupplyEstimate {
    pub mw: f64,
    pub source: SupplySource,
}

/// A wind farm of identical turbines backed by a supply predictor.
#[derive(Debug, Clone)]
pub struct WindFarm<S: SupplyPredictor> {
    /// Number of installed turbines.
    pub turbine_count: u32,
    /// Fraction of turbines available (0.0 to 1.0).
    pub turbine_availability: f64,
    predictor: S,
}

impl<S: SupplyPredictor> WindFarm<S> {
    pub fn new(turbine_count: u32, turbine_availability: f64, predictor: S) -> Self {
        Self {
            turbine_count,
            turbine_availability,
            predictor,
        }
    }

    /// Installed capacity (MW).
    pub fn capacity_mw(&self) -> f64 {
        farm_capacity_mw(self.turbine_count)
    }

    /// Estimates farm output for the given wind.
    ///
    /// A failed or malformed prediction falls back to the physical curve;
    /// this never fails.
    pub fn supply(&self, wind_speed_mps: f64, wind_direction_deg: f64) -> SupplyEstimate {
        match self.predict_raw_kw(wind_speed_mps, wind_direction_deg) {
            Ok(raw_kw) => SupplyEstimate {
                mw: estimate_supply(
                    raw_kw,
                    self.turbine_count,
                    self.turbine_availability,
                    wind_speed_mps,
                ),
                source: SupplySource::Model,
            },
            Err(err) => {
                warn!(%err, wind_speed_mps, "supply model failed, using physical power curve");
                SupplyEstimate {
                    mw: physical_supply_mw(
                        self.turbine_count,
                        self.turbine_availability,
                        wind_speed_mps,
                    ),
                    source: SupplySource::PhysicalFallback,
                }
            }
        }
    }

    fn predict_raw_kw(&self, wind_speed_mps: f64, wind_direction_deg: f64) -> Result<f64, PredictorError> {
        let radians = wind_direction_deg.to_radians();
        let raw = self
            .predictor
            .predict(wind_speed_mps, radians.sin(), radians.cos())?;
        checked_prediction(raw)
    }
}

impl<S: SupplyPredictor> Device for WindFarm<S> {
    fn power_mw(&mut self, context: &HourContext) -> f64 {
        self.supply(context.wind_speed_mps, context.wind_direction_deg)
            .mw
    }
}
