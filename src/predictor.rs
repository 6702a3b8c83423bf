//! Regression-model collaborators for supply and demand.
//!
//! Trained models live outside this crate. The simulator only sees them
//! through [`SupplyPredictor`] and [`DemandPredictor`], whose calls return
//! an explicit `Result` so that an unavailable model is an ordinary branch
//! for the caller.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictorError {
    #[error("model unavailable: {0}")]
    Unavailable(String),
    #[error("malformed prediction: {0}")]
    Malformed(f64),
}

/// Raw wind-farm output model.
///
/// Implementations predict the output of the model's reference farm in kW.
pub trait SupplyPredictor {
    /// # Errors
    ///
    /// Returns [`PredictorError`] when the model cannot produce a value.
    fn predict(
        &self,
        wind_speed_mps: f64,
        wind_dir_sin: f64,
        wind_dir_cos: f64,
    ) -> Result<f64, PredictorError>;
}

/// Raw city-scale demand model, in kW.
pub trait DemandPredictor {
    /// `weekday` counts from Monday = 0, `month` from 1, `day_of_year` from 1.
    ///
    /// # Errors
    ///
    /// Returns [`PredictorError`] when the model cannot produce a value.
    fn predict(
        &self,
        hour: u32,
        weekday: u32,
        month: u32,
        day_of_year: u32,
    ) -> Result<f64, PredictorError>;
}

impl<P: SupplyPredictor + ?Sized> SupplyPredictor for Box<P> {
    fn predict(&self, speed: f64, sin: f64, cos: f64) -> Result<f64, PredictorError> {
        (**self).predict(speed, sin, cos)
    }
}

impl<P: DemandPredictor + ?Sized> DemandPredictor for Box<P> {
    fn predict(&self, hour: u32, weekday: u32, month: u32, doy: u32) -> Result<f64, PredictorError> {
        (**self).predict(hour, weekday, month, doy)
    }
}

/// Stand-in for the trained three-turbine supply model.
///
/// Ramps linearly from 0 kW at 3.5 m/s to 3000 kW at 12 m/s and holds
/// there; wind direction is ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceSupplyModel;

impl SupplyPredictor for ReferenceSupplyModel {
    fn predict(&self, wind_speed_mps: f64, _sin: f64, _cos: f64) -> Result<f64, PredictorError> {
        const CUT_IN_MPS: f64 = 3.5;
        const RATED_MPS: f64 = 12.0;
        const RATED_KW: f64 = 3000.0;

        let kw = if wind_speed_mps < CUT_IN_MPS {
            0.0
        } else if wind_speed_mps < RATED_MPS {
            (wind_speed_mps - CUT_IN_MPS) / (RATED_MPS - CUT_IN_MPS) * RATED_KW
        } else {
            RATED_KW
        };
        Ok(kw.max(0.0))
    }
}

/// Stand-in for the trained demand model: 10 MW with a ±2 MW daily swing
/// peaking at noon.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceDemandModel;

impl DemandPredictor for ReferenceDemandModel {
    fn predict(&self, hour: u32, _weekday: u32, _month: u32, _doy: u32) -> Result<f64, PredictorError> {
        let swing = ((f64::from(hour) - 6.0) * std::f64::consts::PI / 12.0).sin() * 2000.0;
        Ok(10_000.0 + swing)
    }
}

/// A model slot with nothing loaded; every call fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableModel;

impl SupplyPredictor for UnavailableModel {
    fn predict(&self, _speed: f64, _sin: f64, _cos: f64) -> Result<f64, PredictorError> {
        Err(PredictorError::Unavailable("no supply model loaded".to_string()))
    }
}

impl DemandPredictor for UnavailableModel {
    fn predict(&self, _hour: u32, _weekday: u32, _month: u32, _doy: u32) -> Result<f64, PredictorError> {
        Err(PredictorError::Unavailable("no demand model loaded".to_string()))
    }
}

/// Rejects non-finite or negative raw predictions.
///
/// # Errors
///
/// Returns [`PredictorError::Malformed`] carrying the offending value.
pub fn checked_prediction(raw: f64) -> Result<f64, PredictorError> {
    if raw.is_finite() && raw >= 0.0 {
        Ok(raw)
    } else {
        Err(PredictorError::Malformed(raw))
    }
}
