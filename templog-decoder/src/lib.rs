//! Temperature Log Decoder Library
//!
//! A stateless, reusable library for decoding the binary temperature logs
//! written by the heater controller firmware.
//!
//! # Architecture
//!
//! This library is intentionally minimal and focused on decoding:
//! - Validates the file header and decodes fixed-size records
//! - Supports the `tagged` and `legacy` binary profiles
//! - Unpacks 32-bit bit-field timestamps into calendar fields
//! - Discovers rolled-over log files and merges them in sequence order
//!
//! The library does NOT:
//! - Auto-detect the profile of a file
//! - Render charts
//! - Initialise logging
//!
//! All higher-level functionality is in the application layer (templog-cli).
//!
//! # Example Usage
//!
//! ```no_run
//! use templog_decoder::{discover_files, merge_files, Profile, ReaderConfig};
//!
//! let config = ReaderConfig::new().with_profile(Profile::Tagged);
//! let files = discover_files("logs/TempLog_*_*.bin").unwrap();
//! let report = merge_files(&files, &config);
//!
//! for skipped in &report.skipped {
//!     eprintln!("Skipped {:?}: {}", skipped.path, skipped.reason);
//! }
//! println!("{} records", report.series.len());
//! ```

// Public modules
pub mod config;
pub mod merge;
pub mod reader;
pub mod timestamp;
pub mod types;
pub mod writer;

// Re-export main types for convenience
pub use config::{Profile, ReaderConfig, RecordLayout, SampleWidth, SensorCount, TimestampEncoding};
pub use merge::{discover_files, merge_files, sequence_number, MergeReport, SkippedFile};
pub use reader::LogReader;
pub use timestamp::DecodedTimestamp;
pub use types::{LogError, LogFile, LogHeader, LogRecord, LogSeries, ReadSummary, Result, SampleTime};
pub use writer::LogWriter;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
