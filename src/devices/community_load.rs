//! Community demand: a fixed time-of-day profile with a smooth daily swing
//! and injected noise, optionally blended with a demand model.

use tracing::{debug, warn};

use crate::devices::types::{Device, HourContext, NoiseSource};
use crate::predictor::{DemandPredictor, checked_prediction};

/// Amplitude of the smooth daily variation term (MW).
pub const DAILY_SWING_MW: f64 = 8.25;

/// Demand variation of the city-scale model the predictor was trained on (MW).
/// Predictor output is rescaled from this to the community base load.
pub const MODEL_CITY_SWING_MW: f64 = 17.8;

/// Time-of-day demand multiplier.
///
/// | hours   | factor |
/// |---------|--------|
/// | 0 to 4  | 0.65   |
/// | 5 to 6  | 0.75   |
/// | 7 to 8  | 1.30   |
/// | 9 to 16 | 1.00   |
/// | 17, 18  | 1.40   |
/// | 19 to 21| 1.10   |
/// | 22, 23  | 0.80   |
pub fn time_factor(hour: u32) -> f64 {
    match hour % 24 {
        0..=4 => 0.65,
        5..=6 => 0.75,
        7..=8 => 1.3,
        9..=16 => 1.0,
        17..=18 => 1.4,
        19..=21 => 1.1,
        _ => 0.8,
    }
}

/// Smooth daily variation, `sin(hour / 12 · π) · 8.25` MW.
pub fn daily_variation_mw(hour: u32) -> f64 {
    (f64::from(hour) / 12.0 * std::f64::consts::PI).sin() * DAILY_SWING_MW
}

/// Deterministic part of the demand profile before scaling (MW).
pub fn profile_demand_mw(hour: u32, base_load_mw: f64) -> f64 {
    base_load_mw * time_factor(hour) + daily_variation_mw(hour)
}

/// Applies the demand fraction, then clamps into `[min_mw, max_mw]`.
///
/// The clamp comes last, so a tiny fraction pins demand to `min_mw`.
pub fn scale_demand(unscaled_mw: f64, demand_percent: f64, min_mw: f64, max_mw: f64) -> f64 {
    (unscaled_mw * demand_percent).clamp(min_mw, max_mw)
}

/// The community load served by the farm.
pub struct CommunityLoad<N: NoiseSource> {
    /// Base load before the time-of-day factor (MW).
    pub base_load_mw: f64,
    /// Multiplier on the whole profile (1.0 = 100 %).
    pub demand_percent: f64,
    /// Lower edge of the demand band (MW).
    pub min_mw: f64,
    /// Upper edge of the demand band (MW).
    pub max_mw: f64,
    /// Standard deviation of the noise term (MW).
    pub noise_std_mw: f64,
    noise: N,
    predictor: Option<Box<dyn DemandPredictor>>,
    blend: f64,
}

impl<N: NoiseSource> CommunityLoad<N> {
    pub fn new(
        base_load_mw: f64,
        demand_percent: f64,
        min_mw: f64,
        max_mw: f64,
        noise_std_mw: f64,
        noise: N,
    ) -> Self {
        Self {
            base_load_mw,
            demand_percent,
            min_mw,
            max_mw,
            noise_std_mw,
            noise,
            predictor: None,
            blend: 0.0,
        }
    }

    /// Attaches a demand model whose output is mixed in with weight `blend`
    /// (clamped to `[0, 1]`).
    pub fn with_predictor(mut self, predictor: Box<dyn DemandPredictor>, blend: f64) -> Self {
        self.predictor = Some(predictor);
        self.blend = blend.clamp(0.0, 1.0);
        self
    }

    /// Weight currently given to the demand model.
    pub fn blend(&self) -> f64 {
        if self.predictor.is_some() { self.blend } else { 0.0 }
    }

    /// Estimates demand for one hour (MW).
    ///
    /// Draws exactly one noise sample per call, so a seeded noise source
    /// gives the same sequence for the same calls.
    pub fn estimate_demand(&mut self, hour: u32, weekday: u32, month: u32, day_of_year: u32) -> f64 {
        let profile = profile_demand_mw(hour, self.base_load_mw);
        let noise = self.noise.sample(self.noise_std_mw);
        let fixed = profile + noise;

        let unscaled = match self.model_demand_mw(hour, weekday, month, day_of_year) {
            Some(model_mw) => (1.0 - self.blend) * fixed + self.blend * model_mw,
            None => fixed,
        };
        let demand = scale_demand(unscaled, self.demand_percent, self.min_mw, self.max_mw);

        debug!(
            hour,
            factor = time_factor(hour),
            profile_mw = profile,
            noise_mw = noise,
            unscaled_mw = unscaled,
            demand_mw = demand,
            "demand estimate"
        );
        demand
    }

    fn model_demand_mw(&self, hour: u32, weekday: u32, month: u32, day_of_year: u32) -> Option<f64> {
        let predictor = self.predictor.as_ref().filter(|_| self.blend > 0.0)?;
        let raw = predictor
            .predict(hour, weekday, month, day_of_year)
            .and_then(checked_prediction);
        match raw {
            Ok(raw_kw) => Some(raw_kw / 1000.0 * (self.base_load_mw / MODEL_CITY_SWING_MW)),
            Err(err) => {
                warn!(hour, %err, "demand model failed, using fixed profile only");
                None
            }
        }
    }
}

impl<N: NoiseSource> Device for CommunityLoad<N> {
    fn power_mw(&mut self, context: &HourContext) -> f64 {
        self.estimate_demand(
            context.hour,
            context.weekday(),
            context.month(),
            context.day_of_year(),
        )
    }
}
