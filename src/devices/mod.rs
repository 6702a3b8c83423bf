//! Physical models of the wind farm, the community load and the battery.

/// Battery state updater.
pub mod battery;
/// Community demand estimator.
pub mod community_load;
pub mod types;
/// Wind farm power curve estimator.
pub mod wind_farm;

// Re-export the main types for convenience
pub use battery::Battery;
pub use community_load::CommunityLoad;
pub use types::{Device, HourContext, NoNoise, NoiseSource, SeededNoise};
pub use wind_farm::WindFarm;
