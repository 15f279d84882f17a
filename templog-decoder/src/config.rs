//! Reader configuration types
//!
//! A log file does not describe its own layout. The caller picks a named
//! [`Profile`], which resolves to a [`RecordLayout`] consumed by the single
//! parametrised reader.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Literal tag that opens a tagged log file
pub const HEADER_TAG: &[u8] = b"HEADER\n";

/// Width of one temperature sample on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleWidth {
    /// 4-byte little-endian float
    F32,
    /// 8-byte little-endian double
    F64,
}

impl SampleWidth {
    pub fn bytes(self) -> usize {
        match self {
            SampleWidth::F32 => 4,
            SampleWidth::F64 => 8,
        }
    }
}

/// How a record's 32-bit timestamp is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampEncoding {
    /// Calendar bit fields, see [`crate::timestamp`]
    Packed,
    /// Plain counter
    Raw,
}

/// Where the timestamp sits inside a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampPlacement {
    /// Before the temperatures
    Leading,
    /// After the heater byte
    Trailing,
}

/// Fully resolved binary layout of a log file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordLayout {
    /// Literal bytes expected at offset 0, if any
    pub tag: Option<&'static [u8]>,
    /// Whether a start timestamp follows the sensor count
    pub header_timestamp: bool,
    pub sample_width: SampleWidth,
    pub timestamp_encoding: TimestampEncoding,
    pub timestamp_placement: TimestampPlacement,
}

impl RecordLayout {
    /// Size of one full record for the given sensor count
    pub fn record_size(&self, sensor_count: usize) -> usize {
        sensor_count * self.sample_width.bytes() + 1 + 4
    }
}

/// Named binary layouts written by the logger firmware
///
/// The two profiles are not wire-compatible and are never auto-detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// `"HEADER\n"` tag, sensor count, packed start timestamp; records are
    /// f32 temperatures, heater byte, packed timestamp
    #[default]
    Tagged,
    /// Sensor count only; records are raw u32 timestamp, f64 temperatures,
    /// heater byte
    Legacy,
}

impl Profile {
    pub fn layout(self) -> RecordLayout {
        match self {
            Profile::Tagged => RecordLayout {
                tag: Some(HEADER_TAG),
                header_timestamp: true,
                sample_width: SampleWidth::F32,
                timestamp_encoding: TimestampEncoding::Packed,
                timestamp_placement: TimestampPlacement::Trailing,
            },
            Profile::Legacy => RecordLayout {
                tag: None,
                header_timestamp: false,
                sample_width: SampleWidth::F64,
                timestamp_encoding: TimestampEncoding::Raw,
                timestamp_placement: TimestampPlacement::Leading,
            },
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Profile::Tagged => write!(f, "tagged"),
            Profile::Legacy => write!(f, "legacy"),
        }
    }
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tagged" | "b" => Ok(Profile::Tagged),
            "legacy" | "a" => Ok(Profile::Legacy),
            other => Err(format!("unknown profile '{}' (expected 'tagged' or 'legacy')", other)),
        }
    }
}

/// Where the reader takes the number of sensors from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorCount {
    /// Use the count byte in the file header
    #[default]
    FromHeader,
    /// Ignore the header byte and use a fixed count
    Fixed(u8),
}

/// Configuration for the log reader
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaderConfig {
    #[serde(default)]
    pub profile: Profile,

    #[serde(default)]
    pub sensor_count: SensorCount,

    /// Reject heater bytes other than 0x00 and 0x01
    #[serde(default = "default_true")]
    pub strict_heater: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            profile: Profile::default(),
            sensor_count: SensorCount::default(),
            strict_heater: true,
        }
    }
}

impl ReaderConfig {
    /// Create a new reader configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: select the binary profile
    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = profile;
        self
    }

    /// Builder method: override the sensor count from the header
    pub fn with_fixed_sensor_count(mut self, count: u8) -> Self {
        self.sensor_count = SensorCount::Fixed(count);
        self
    }

    /// Builder method: enable or disable strict heater byte validation
    pub fn with_strict_heater(mut self, strict: bool) -> Self {
        self.strict_heater = strict;
        self
    }

    pub fn layout(&self) -> RecordLayout {
        self.profile.layout()
    }

    /// Sensor count to use for a file whose header declares `from_header`
    pub fn effective_sensor_count(&self, from_header: u8) -> u8 {
        match self.sensor_count {
            SensorCount::FromHeader => from_header,
            SensorCount::Fixed(n) => n,
        }
    }
}
