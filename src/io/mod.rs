/// CSV telemetry export.
pub mod export;
pub mod report;
