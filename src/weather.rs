//! Hourly weather sources feeding the simulation.
//!
//! A [`WeatherSource`] yields the ordered 24-hour input sequence for a run
//! starting at a given timestamp. The engine does not care where the data
//! comes from: a seeded synthetic profile, a CSV forecast file, or a
//! constant wind for controlled experiments.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDateTime, Timelike};
use csv::ReaderBuilder;
use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::devices::types::gaussian_noise;
use crate::sim::types::{HOURS_PER_RUN, HourlyInput};

/// Timestamp layouts accepted in weather files.
const TIMESTAMP_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("cannot read weather file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed weather record: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: unrecognised timestamp '{value}'")]
    Timestamp { row: usize, value: String },
    #[error("weather data has {actual} rows, need {expected}")]
    TooFewRows { expected: usize, actual: usize },
    #[error("row {row}: timestamp {value} does not follow the previous row by one hour")]
    OutOfOrder { row: usize, value: NaiveDateTime },
}

/// Supplier of the hourly inputs for one run.
pub trait WeatherSource {
    /// Returns 24 consecutive hourly inputs beginning at `start`.
    ///
    /// # Errors
    ///
    /// Returns [`WeatherError`] when the underlying data cannot be produced.
    fn hourly_inputs(&mut self, start: NaiveDateTime) -> Result<Vec<HourlyInput>, WeatherError>;
}

/// Smooth diurnal wind profile with seeded Gaussian noise.
///
/// Speed `10 + 4·sin(π(h − 8)/16) + N(0, 1)` clipped to [2, 25] m/s,
/// direction `250 + 30·sin(πh/24) + N(0, 10)` wrapped into [0, 360).
#[derive(Debug, Clone)]
pub struct SyntheticWeather {
    rng: StdRng,
}

impl SyntheticWeather {
    pub const SPEED_STD_MPS: f64 = 1.0;
    pub const DIRECTION_STD_DEG: f64 = 10.0;

    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl WeatherSource for SyntheticWeather {
    fn hourly_inputs(&mut self, start: NaiveDateTime) -> Result<Vec<HourlyInput>, WeatherError> {
        use std::f64::consts::PI;

        let inputs = (0..HOURS_PER_RUN)
            .map(|offset| {
                let timestamp = start + Duration::hours(offset as i64);
                let h = offset as f64;
                let speed = 10.0 + 4.0 * (PI * (h - 8.0) / 16.0).sin()
                    + gaussian_noise(&mut self.rng, Self::SPEED_STD_MPS);
                let direction = 250.0
                    + 30.0 * (PI * h / 24.0).sin()
                    + gaussian_noise(&mut self.rng, Self::DIRECTION_STD_DEG);
                HourlyInput {
                    timestamp,
                    hour: timestamp.hour(),
                    wind_speed_mps: speed.clamp(2.0, 25.0),
                    wind_direction_deg: wrap_degrees(direction),
                }
            })
            .collect();
        Ok(inputs)
    }
}

/// The same wind every hour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantWeather {
    pub wind_speed_mps: f64,
    pub wind_direction_deg: f64,
}

impl WeatherSource for ConstantWeather {
    fn hourly_inputs(&mut self, start: NaiveDateTime) -> Result<Vec<HourlyInput>, WeatherError> {
        Ok((0..HOURS_PER_RUN)
            .map(|offset| {
                let timestamp = start + Duration::hours(offset as i64);
                HourlyInput {
                    timestamp,
                    hour: timestamp.hour(),
                    wind_speed_mps: self.wind_speed_mps,
                    wind_direction_deg: wrap_degrees(self.wind_direction_deg),
                }
            })
            .collect())
    }
}

/// Weather forecast file with a `timestamp,wind_speed,wind_direction` header.
///
/// The first 24 rows are used and the file's own timestamps replace the
/// requested start.
#[derive(Debug, Clone)]
pub struct CsvWeather {
    path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct WeatherRecord {
    timestamp: String,
    wind_speed: f64,
    wind_direction: f64,
}

impl CsvWeather {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl WeatherSource for CsvWeather {
    fn hourly_inputs(&mut self, _start: NaiveDateTime) -> Result<Vec<HourlyInput>, WeatherError> {
        let file = File::open(&self.path).map_err(|source| WeatherError::Io {
            path: self.path.clone(),
            source,
        })?;
        read_weather_csv(file)
    }
}

/// Parses weather rows from any reader.
///
/// # Errors
///
/// Returns [`WeatherError`] on malformed rows, unparseable timestamps,
/// rows that are not consecutive hours or fewer than 24 rows.
pub fn read_weather_csv(reader: impl Read) -> Result<Vec<HourlyInput>, WeatherError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut inputs: Vec<HourlyInput> = Vec::with_capacity(HOURS_PER_RUN);
    for (row, record) in rdr.deserialize::<WeatherRecord>().enumerate() {
        if inputs.len() == HOURS_PER_RUN {
            break;
        }
        let record = record?;
        let timestamp = parse_timestamp(&record.timestamp).ok_or_else(|| WeatherError::Timestamp {
            row: row + 1,
            value: record.timestamp.clone(),
        })?;
        if let Some(prev) = inputs.last().map(|i| i.timestamp) {
            if timestamp != prev + Duration::hours(1) {
                return Err(WeatherError::OutOfOrder {
                    row: row + 1,
                    value: timestamp,
                });
            }
        }
        inputs.push(HourlyInput {
            timestamp,
            hour: timestamp.hour(),
            wind_speed_mps: record.wind_speed,
            wind_direction_deg: wrap_degrees(record.wind_direction),
        });
    }

    if inputs.len() < HOURS_PER_RUN {
        return Err(WeatherError::TooFewRows {
            expected: HOURS_PER_RUN,
            actual: inputs.len(),
        });
    }
    Ok(inputs)
}

fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

/// Wraps a direction into [0, 360) degrees.
pub fn wrap_degrees(deg: f64) -> f64 {
    let wrapped = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Forecast overview shown next to the simulation results.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WeatherSummary {
    pub avg_wind_speed_mps: f64,
    pub min_wind_speed_mps: f64,
    pub max_wind_speed_mps: f64,
    /// Hours with 6 to 12 m/s.
    pub optimal_hours: usize,
    /// Hours below 4 m/s.
    pub low_wind_hours: usize,
    /// Hours above 20 m/s.
    pub high_wind_hours: usize,
}

impl WeatherSummary {
    pub fn from_inputs(inputs: &[HourlyInput]) -> Self {
        if inputs.is_empty() {
            return Self::default();
        }
        let speeds = || inputs.iter().map(|i| i.wind_speed_mps);
        let count = |pred: fn(f64) -> bool| speeds().filter(|&v| pred(v)).count();

        Self {
            avg_wind_speed_mps: speeds().sum::<f64>() / inputs.len() as f64,
            min_wind_speed_mps: speeds().fold(f64::INFINITY, f64::min),
            max_wind_speed_mps: speeds().fold(f64::NEG_INFINITY, f64::max),
            optimal_hours: count(|v| (6.0..=12.0).contains(&v)),
            low_wind_hours: count(|v| v < 4.0),
            high_wind_hours: count(|v| v > 20.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .and_then(|d| d.and_hms_opt(6, 0, 0))
            .expect("valid timestamp")
    }

    fn csv_text(rows: usize) -> String {
        let mut text = String::from("timestamp,wind_speed,wind_direction\n");
        for h in 0..rows {
            text.push_str(&format!("2024-06-01 {:02}:00:00,{}.5,{}\n", h, h % 15, 370 - h));
        }
        text
    }

    #[test]
    fn synthetic_is_seeded_and_bounded() {
        let a = SyntheticWeather::new(42).hourly_inputs(start()).expect("synthetic");
        let b = SyntheticWeather::new(42).hourly_inputs(start()).expect("synthetic");
        assert_eq!(a, b);
        assert_eq!(a.len(), 24);
        for input in &a {
            assert!((2.0..=25.0).contains(&input.wind_speed_mps));
            assert!((0.0..360.0).contains(&input.wind_direction_deg));
        }
        // hours follow the wall clock of the start timestamp
        assert_eq!(a[0].hour, 6);
        assert_eq!(a[18].hour, 0);
    }

    #[test]
    fn different_seeds_differ() {
        let a = SyntheticWeather::new(1).hourly_inputs(start()).expect("synthetic");
        let b = SyntheticWeather::new(2).hourly_inputs(start()).expect("synthetic");
        assert_ne!(a, b);
    }

    #[test]
    fn constant_weather_repeats() {
        let mut source = ConstantWeather {
            wind_speed_mps: 9.0,
            wind_direction_deg: -90.0,
        };
        let inputs = source.hourly_inputs(start()).expect("constant");
        assert!(inputs.iter().all(|i| i.wind_speed_mps == 9.0));
        assert!(inputs.iter().all(|i| i.wind_direction_deg == 270.0));
    }

    #[test]
    fn csv_parses_and_wraps_direction() {
        let inputs = read_weather_csv(csv_text(30).as_bytes()).expect("csv");
        assert_eq!(inputs.len(), 24);
        assert_eq!(inputs[0].hour, 0);
        assert_eq!(inputs[0].wind_speed_mps, 0.5);
        assert_eq!(inputs[0].wind_direction_deg, 10.0);
        assert_eq!(inputs[23].hour, 23);
    }

    #[test]
    fn csv_with_too_few_rows_is_rejected() {
        let err = read_weather_csv(csv_text(10).as_bytes());
        assert!(matches!(
            err,
            Err(WeatherError::TooFewRows {
                expected: 24,
                actual: 10
            })
        ));
    }

    #[test]
    fn csv_bad_timestamp_is_reported() {
        let text = "timestamp,wind_speed,wind_direction\nyesterday,5.0,10.0\n";
        let err = read_weather_csv(text.as_bytes());
        assert!(matches!(err, Err(WeatherError::Timestamp { row: 1, .. })));
    }

    #[test]
    fn csv_reversed_rows_are_rejected() {
        let mut text = String::from("timestamp,wind_speed,wind_direction\n");
        for h in (0..24).rev() {
            text.push_str(&format!("2024-06-01 {h:02}:00:00,8.0,250.0\n"));
        }
        let err = read_weather_csv(text.as_bytes());
        assert!(matches!(err, Err(WeatherError::OutOfOrder { row: 2, .. })));
    }

    #[test]
    fn csv_gap_between_hours_is_rejected() {
        let text = "timestamp,wind_speed,wind_direction\n\
                    2024-06-01 00:00:00,8.0,250.0\n\
                    2024-06-01 02:00:00,8.0,250.0\n";
        let err = read_weather_csv(text.as_bytes());
        assert!(matches!(err, Err(WeatherError::OutOfOrder { row: 2, .. })));
    }

    #[test]
    fn csv_file_source_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(csv_text(24).as_bytes()).expect("write");
        let mut source = CsvWeather::new(file.path());
        let inputs = source.hourly_inputs(start()).expect("csv file");
        assert_eq!(inputs.len(), 24);
    }

    #[test]
    fn missing_csv_file_is_io_error() {
        let mut source = CsvWeather::new("/nonexistent/weather.csv");
        assert!(matches!(
            source.hourly_inputs(start()),
            Err(WeatherError::Io { .. })
        ));
    }

    #[test]
    fn summary_buckets() {
        let mut source = ConstantWeather {
            wind_speed_mps: 8.0,
            wind_direction_deg: 0.0,
        };
        let mut inputs = source.hourly_inputs(start()).expect("constant");
        inputs[0].wind_speed_mps = 3.0;
        inputs[1].wind_speed_mps = 22.0;
        let summary = WeatherSummary::from_inputs(&inputs);
        assert_eq!(summary.optimal_hours, 22);
        assert_eq!(summary.low_wind_hours, 1);
        assert_eq!(summary.high_wind_hours, 1);
        assert_eq!(summary.min_wind_speed_mps, 3.0);
        assert_eq!(summary.max_wind_speed_mps, 22.0);
        assert!((summary.avg_wind_speed_mps - (22.0 * 8.0 + 25.0) / 24.0).abs() < 1e-9);
    }
}
