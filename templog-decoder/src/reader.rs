//! Binary temperature log reader
//!
//! Reads one log file into a [`LogSeries`] using the layout selected by a
//! [`ReaderConfig`]. Both profiles go through the same code path:
//!
//! 1. Optional literal tag (tagged profile only)
//! 2. Sensor count byte
//! 3. Optional start timestamp
//! 4. Fixed-size records until end of file
//!
//! A record cut short by the end of the file is discarded, not reported as
//! an error. The file handle is scoped to [`LogReader::read_file`] and closed
//! on every exit path.

use crate::config::{
    ReaderConfig, RecordLayout, SampleWidth, SensorCount, TimestampEncoding, TimestampPlacement,
};
use crate::timestamp;
use crate::types::{LogError, LogFile, LogHeader, LogRecord, LogSeries, Result, SampleTime};
use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use std::fs::File;
use std::io::{self, BufReader, ErrorKind, Read};
use std::path::Path;

/// Temperature log reader
pub struct LogReader;

impl LogReader {
    /// Read and decode a log file from disk
    ///
    /// # Returns
    /// * `Ok(LogFile)` with at least one record
    /// * `Err(LogError::EmptyFile)` if the header is valid but no full record follows
    ///
    /// # Example
    /// ```no_run
    /// use templog_decoder::{LogReader, Profile, ReaderConfig};
    /// use std::path::Path;
    ///
    /// let config = ReaderConfig::new().with_profile(Profile::Tagged);
    /// let log = LogReader::read_file(Path::new("TempLog_01.bin"), &config).unwrap();
    /// println!("{}", log.summary());
    /// ```
    pub fn read_file(path: &Path, config: &ReaderConfig) -> Result<LogFile> {
        log::info!("Reading log file: {:?} ({} profile)", path, config.profile);

        if !path.exists() {
            return Err(LogError::FileNotFound(path.to_path_buf()));
        }

        let file = File::open(path)?;
        Self::read_from(BufReader::new(file), config, path)
    }

    /// Decode a log from any byte source
    ///
    /// `origin` is only used for diagnostics.
    pub fn read_from<R: Read>(mut reader: R, config: &ReaderConfig, origin: &Path) -> Result<LogFile> {
        let layout = config.layout();
        let header = read_header(&mut reader, config, &layout)?;

        let sensor_count = usize::from(header.sensor_count);
        let record_size = layout.record_size(sensor_count);
        log::debug!(
            "{:?}: {} sensors, {}-byte records, start {:?}",
            origin,
            sensor_count,
            record_size,
            header.start
        );

        let mut series = LogSeries::new();
        let mut truncated_bytes = 0;
        let mut buf = vec![0u8; record_size];

        loop {
            let n = read_chunk(&mut reader, &mut buf)?;
            if n == 0 {
                break;
            }
            if n < record_size {
                log::warn!(
                    "{:?}: discarding incomplete trailing record ({} of {} bytes)",
                    origin,
                    n,
                    record_size
                );
                truncated_bytes = n;
                break;
            }

            let record = decode_record(&buf, sensor_count, &layout, config.strict_heater, series.len())?;
            log::trace!("record {}: {:?}", series.len(), record);
            series.push(record);
        }

        if series.is_empty() {
            return Err(LogError::EmptyFile(origin.to_path_buf()));
        }

        let log_file = LogFile {
            header,
            series,
            truncated_bytes,
        };
        log::info!("{:?}: {}", origin, log_file.summary());
        Ok(log_file)
    }
}

fn read_header<R: Read>(reader: &mut R, config: &ReaderConfig, layout: &RecordLayout) -> Result<LogHeader> {
    if let Some(tag) = layout.tag {
        let mut found = vec![0u8; tag.len()];
        let n = read_chunk(reader, &mut found)?;
        found.truncate(n);
        if found != tag {
            return Err(LogError::MalformedHeader(format!(
                "expected tag {:?}, found {:?}",
                String::from_utf8_lossy(tag),
                String::from_utf8_lossy(&found)
            )));
        }
    }

    if config.sensor_count == SensorCount::Fixed(0) {
        return Err(LogError::Config("fixed sensor count must be at least 1".to_string()));
    }

    let declared = reader.read_u8().map_err(header_eof("sensor count"))?;
    let sensor_count = config.effective_sensor_count(declared);
    if sensor_count != declared {
        log::warn!(
            "Header declares {} sensors, using configured count {}",
            declared,
            sensor_count
        );
    }

    let start = if layout.header_timestamp {
        let raw = reader
            .read_u32::<LittleEndian>()
            .map_err(header_eof("start timestamp"))?;
        Some(decode_time(raw, layout.timestamp_encoding))
    } else {
        None
    };

    Ok(LogHeader { sensor_count, start })
}

/// Map an early end of file inside the header to `MalformedHeader`
fn header_eof(field: &'static str) -> impl Fn(io::Error) -> LogError {
    move |e| {
        if e.kind() == ErrorKind::UnexpectedEof {
            LogError::MalformedHeader(format!("file ends before {}", field))
        } else {
            LogError::IoError(e)
        }
    }
}

/// Fill `buf` as far as the source allows, returning the number of bytes read
///
/// Unlike `read_exact`, a short read at end of file is not an error.
fn read_chunk<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

fn decode_record(
    buf: &[u8],
    sensor_count: usize,
    layout: &RecordLayout,
    strict_heater: bool,
    index: usize,
) -> Result<LogRecord> {
    let width = layout.sample_width.bytes();
    let temps_len = sensor_count * width;

    let (temps_at, heater_at, time_at) = match layout.timestamp_placement {
        TimestampPlacement::Leading => (4, 4 + temps_len, 0),
        TimestampPlacement::Trailing => (0, temps_len, temps_len + 1),
    };

    let temperatures = buf[temps_at..temps_at + temps_len]
        .chunks_exact(width)
        .map(|chunk| match layout.sample_width {
            SampleWidth::F32 => f64::from(LittleEndian::read_f32(chunk)),
            SampleWidth::F64 => LittleEndian::read_f64(chunk),
        })
        .collect();

    let heater_byte = buf[heater_at];
    let heater_on = match heater_byte {
        0x00 => false,
        0x01 => true,
        value if strict_heater => {
            return Err(LogError::InvalidHeaterState { record: index, value });
        }
        _ => true,
    };

    let raw_time = LittleEndian::read_u32(&buf[time_at..time_at + 4]);

    Ok(LogRecord {
        temperatures,
        heater_on,
        time: decode_time(raw_time, layout.timestamp_encoding),
    })
}

fn decode_time(raw: u32, encoding: TimestampEncoding) -> SampleTime {
    match encoding {
        TimestampEncoding::Packed => SampleTime::Calendar(timestamp::unpack(raw)),
        TimestampEncoding::Raw => SampleTime::Raw(raw),
    }
}
