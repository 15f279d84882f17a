//! Core types for the temperature log decoder library
//!
//! This module defines the values the reader produces when processing log
//! files. The reader is stateless: it only emits parsed series, it does not
//! aggregate across files or render anything.

use crate::timestamp::DecodedTimestamp;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Result type for decoder operations
pub type Result<T> = std::result::Result<T, LogError>;

/// Errors that can occur while reading log files
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("Malformed header: {0}")]
    MalformedHeader(String),

    #[error("Log file not found: {0:?}")]
    FileNotFound(PathBuf),

    #[error("No records in log file: {0:?}")]
    EmptyFile(PathBuf),

    #[error("Invalid heater state 0x{value:02X} in record {record}")]
    InvalidHeaterState { record: usize, value: u8 },

    #[error("Invalid file pattern: {0}")]
    InvalidPattern(String),

    #[error("Invalid reader configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Time of a single record
///
/// Packed timestamps are decoded into calendar fields; raw timestamps are
/// kept as the counter value written by the logger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SampleTime {
    /// Calendar time unpacked from a 32-bit bit-field value
    Calendar(DecodedTimestamp),
    /// Unstructured little-endian counter (seconds)
    Raw(u32),
}

impl SampleTime {
    /// Absolute date-time, if this is a valid calendar value
    pub fn to_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            SampleTime::Calendar(ts) => ts.to_datetime(),
            SampleTime::Raw(_) => None,
        }
    }
}

impl fmt::Display for SampleTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleTime::Calendar(ts) => write!(f, "{}", ts),
            SampleTime::Raw(v) => write!(f, "{}s", v),
        }
    }
}

/// Header of a single log file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogHeader {
    /// Number of temperature samples per record
    pub sensor_count: u8,
    /// Start of logging (only present in tagged files)
    pub start: Option<SampleTime>,
}

/// One sampled measurement covering all sensors
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub temperatures: Vec<f64>,
    pub heater_on: bool,
    pub time: SampleTime,
}

/// Parsed contents of one or more log files
///
/// Timestamps, temperature tuples and heater states are kept as parallel
/// sequences. They always have the same length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogSeries {
    times: Vec<SampleTime>,
    temperatures: Vec<Vec<f64>>,
    heater: Vec<bool>,
}

impl LogSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one complete record to all three sequences
    pub fn push(&mut self, record: LogRecord) {
        self.times.push(record.time);
        self.temperatures.push(record.temperatures);
        self.heater.push(record.heater_on);
    }

    /// Concatenate another series after this one
    pub fn append(&mut self, other: LogSeries) {
        self.times.extend(other.times);
        self.temperatures.extend(other.temperatures);
        self.heater.extend(other.heater);
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn times(&self) -> &[SampleTime] {
        &self.times
    }

    pub fn temperatures(&self) -> &[Vec<f64>] {
        &self.temperatures
    }

    pub fn heater(&self) -> &[bool] {
        &self.heater
    }

    pub fn first_time(&self) -> Option<SampleTime> {
        self.times.first().copied()
    }

    pub fn last_time(&self) -> Option<SampleTime> {
        self.times.last().copied()
    }

    /// Widest temperature tuple in the series
    ///
    /// Merged files may disagree on sensor count; missing sensors are
    /// simply absent from the shorter tuples.
    pub fn sensor_count(&self) -> usize {
        self.temperatures.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Values of one sensor, paired with the record index they came from
    pub fn sensor_values(&self, sensor: usize) -> Vec<(usize, f64)> {
        self.temperatures
            .iter()
            .enumerate()
            .filter_map(|(i, temps)| temps.get(sensor).map(|t| (i, *t)))
            .collect()
    }

    /// Minimum and maximum of the finite values of one sensor
    pub fn temperature_range(&self, sensor: usize) -> Option<(f64, f64)> {
        self.sensor_values(sensor)
            .into_iter()
            .map(|(_, t)| t)
            .filter(|t| t.is_finite())
            .fold(None, |acc, t| match acc {
                None => Some((t, t)),
                Some((lo, hi)) => Some((lo.min(t), hi.max(t))),
            })
    }

    /// Fraction of records with the heater switched on
    pub fn heater_duty_cycle(&self) -> Option<f64> {
        if self.heater.is_empty() {
            return None;
        }
        let on = self.heater.iter().filter(|h| **h).count();
        Some(on as f64 / self.heater.len() as f64)
    }

    /// Absolute time of every record, if all of them are valid calendar values
    pub fn datetimes(&self) -> Option<Vec<NaiveDateTime>> {
        if self.times.is_empty() {
            return None;
        }
        self.times.iter().map(SampleTime::to_datetime).collect()
    }

    /// Seconds elapsed since the first record
    ///
    /// Raw counters are taken as seconds. Calendar values go through chrono.
    /// If any record has no usable time, the record index is used instead.
    pub fn elapsed_seconds(&self) -> Vec<f64> {
        if let Some(datetimes) = self.datetimes() {
            let base = datetimes[0];
            return datetimes
                .iter()
                .map(|dt| (*dt - base).num_seconds() as f64)
                .collect();
        }

        let raw: Option<Vec<u32>> = self
            .times
            .iter()
            .map(|t| match t {
                SampleTime::Raw(v) => Some(*v),
                SampleTime::Calendar(_) => None,
            })
            .collect();

        match raw {
            Some(values) if !values.is_empty() => {
                let base = i64::from(values[0]);
                values
                    .iter()
                    .map(|v| (i64::from(*v) - base) as f64)
                    .collect()
            }
            _ => (0..self.times.len()).map(|i| i as f64).collect(),
        }
    }
}

/// Result of parsing a single log file
#[derive(Debug, Clone)]
pub struct LogFile {
    pub header: LogHeader,
    pub series: LogSeries,
    /// Bytes of an incomplete trailing record that were discarded
    pub truncated_bytes: usize,
}

impl LogFile {
    /// Diagnostic summary of this file
    pub fn summary(&self) -> ReadSummary {
        ReadSummary {
            records: self.series.len(),
            sensor_count: self.header.sensor_count,
            header_timestamp: self.header.start,
            first: self.series.first_time(),
            last: self.series.last_time(),
            truncated_bytes: self.truncated_bytes,
        }
    }
}

/// Informational side channel of a successful read
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadSummary {
    pub records: usize,
    pub sensor_count: u8,
    pub header_timestamp: Option<SampleTime>,
    pub first: Option<SampleTime>,
    pub last: Option<SampleTime>,
    pub truncated_bytes: usize,
}

impl fmt::Display for ReadSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} records, {} sensors", self.records, self.sensor_count)?;
        if let (Some(first), Some(last)) = (self.first, self.last) {
            write!(f, ", {} .. {}", first, last)?;
        }
        if self.truncated_bytes > 0 {
            write!(f, " ({} trailing bytes discarded)", self.truncated_bytes)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(temps: &[f64], heater_on: bool, secs: u32) -> LogRecord {
        LogRecord {
            temperatures: temps.to_vec(),
            heater_on,
            time: SampleTime::Raw(secs),
        }
    }

    #[test]
    fn test_push_keeps_sequences_aligned() {
        let mut series = LogSeries::new();
        series.push(record(&[20.0, 21.0], false, 100));
        series.push(record(&[20.5, 21.5], true, 101));

        assert_eq!(series.len(), 2);
        assert_eq!(series.times().len(), 2);
        assert_eq!(series.temperatures().len(), 2);
        assert_eq!(series.heater(), &[false, true]);
        assert_eq!(series.sensor_count(), 2);
    }

    #[test]
    fn test_append_concatenates_in_order() {
        let mut a = LogSeries::new();
        a.push(record(&[1.0], false, 1));
        let mut b = LogSeries::new();
        b.push(record(&[2.0], true, 2));
        b.push(record(&[3.0], true, 3));

        a.append(b);
        assert_eq!(a.len(), 3);
        assert_eq!(a.sensor_values(0), vec![(0, 1.0), (1, 2.0), (2, 3.0)]);
        assert_eq!(a.last_time(), Some(SampleTime::Raw(3)));
    }

    #[test]
    fn test_elapsed_seconds_raw() {
        let mut series = LogSeries::new();
        series.push(record(&[1.0], false, 1000));
        series.push(record(&[1.0], false, 1010));
        series.push(record(&[1.0], false, 1025));

        assert_eq!(series.elapsed_seconds(), vec![0.0, 10.0, 25.0]);
        assert!(series.datetimes().is_none());
    }

    #[test]
    fn test_elapsed_seconds_calendar() {
        let mut series = LogSeries::new();
        for second in [0u8, 30, 59] {
            series.push(LogRecord {
                temperatures: vec![22.0],
                heater_on: false,
                time: SampleTime::Calendar(DecodedTimestamp::new(2024, 3, 14, 12, 0, second)),
            });
        }
        assert_eq!(series.elapsed_seconds(), vec![0.0, 30.0, 59.0]);
        assert_eq!(series.datetimes().map(|d| d.len()), Some(3));
    }

    #[test]
    fn test_elapsed_seconds_falls_back_to_index() {
        let mut series = LogSeries::new();
        series.push(LogRecord {
            temperatures: vec![22.0],
            heater_on: false,
            time: SampleTime::Calendar(DecodedTimestamp::new(2024, 0, 0, 0, 0, 0)),
        });
        series.push(record(&[22.0], false, 5));
        assert_eq!(series.elapsed_seconds(), vec![0.0, 1.0]);
    }

    #[test]
    fn test_statistics() {
        let mut series = LogSeries::new();
        series.push(record(&[20.0, f64::NAN], true, 0));
        series.push(record(&[25.0, 30.0], false, 1));
        series.push(record(&[18.0, 31.0], true, 2));
        series.push(record(&[19.0, 29.0], true, 3));

        assert_eq!(series.temperature_range(0), Some((18.0, 25.0)));
        assert_eq!(series.temperature_range(1), Some((29.0, 31.0)));
        assert_eq!(series.temperature_range(2), None);
        assert_eq!(series.heater_duty_cycle(), Some(0.75));
        assert_eq!(LogSeries::new().heater_duty_cycle(), None);
    }

    #[test]
    fn test_error_display() {
        let err = LogError::InvalidHeaterState { record: 3, value: 0x7F };
        assert_eq!(err.to_string(), "Invalid heater state 0x7F in record 3");
    }
}
