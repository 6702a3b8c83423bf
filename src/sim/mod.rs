/// Run-scoped alert log and the alert observers.
pub mod alert;
pub mod allocator;
pub mod engine;
/// Maintenance window ranking.
pub mod maintenance;
pub mod power_balance;
pub mod summary;
pub mod types;

pub use alert::{Alert, AlertLevel};
pub use engine::Engine;
pub use maintenance::{MaintenanceWindow, find_maintenance_windows};
pub use summary::RunSummary;
pub use types::{BalanceStatus, EnergyFlows, HourlyInput, HourlyResult, SimulationConfig};
