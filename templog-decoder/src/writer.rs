//! Log writer
//!
//! Produces files in the same layouts the logger firmware writes, so that
//! sessions can be replayed and fixtures generated without hardware.

use crate::config::{Profile, RecordLayout, SampleWidth, TimestampEncoding, TimestampPlacement};
use crate::timestamp;
use crate::types::{LogError, Result, SampleTime};
use byteorder::{LittleEndian, WriteBytesExt};
use std::io::{BufWriter, Write};

/// Buffered writer for one log file
pub struct LogWriter<W: Write> {
    out: BufWriter<W>,
    layout: RecordLayout,
    sensor_count: Option<usize>,
    records: usize,
}

impl<W: Write> LogWriter<W> {
    pub fn new(inner: W, profile: Profile) -> Self {
        Self {
            out: BufWriter::new(inner),
            layout: profile.layout(),
            sensor_count: None,
            records: 0,
        }
    }

    /// Write the file header
    ///
    /// `start` is ignored by profiles without a header timestamp.
    pub fn write_header(&mut self, sensor_count: u8, start: SampleTime) -> Result<()> {
        if self.sensor_count.is_some() {
            return Err(LogError::Config("header already written".to_string()));
        }
        if let Some(tag) = self.layout.tag {
            self.out.write_all(tag)?;
        }
        self.out.write_u8(sensor_count)?;
        if self.layout.header_timestamp {
            let raw = encode_time(start, self.layout.timestamp_encoding)?;
            self.out.write_u32::<LittleEndian>(raw)?;
        }
        self.sensor_count = Some(usize::from(sensor_count));
        Ok(())
    }

    /// Append one record
    pub fn write_record(&mut self, temperatures: &[f64], heater_on: bool, time: SampleTime) -> Result<()> {
        let expected = self
            .sensor_count
            .ok_or_else(|| LogError::Config("record written before header".to_string()))?;
        if temperatures.len() != expected {
            return Err(LogError::Config(format!(
                "record has {} temperatures, header declares {}",
                temperatures.len(),
                expected
            )));
        }

        let raw_time = encode_time(time, self.layout.timestamp_encoding)?;

        if self.layout.timestamp_placement == TimestampPlacement::Leading {
            self.out.write_u32::<LittleEndian>(raw_time)?;
        }
        for t in temperatures {
            match self.layout.sample_width {
                SampleWidth::F32 => self.out.write_f32::<LittleEndian>(*t as f32)?,
                SampleWidth::F64 => self.out.write_f64::<LittleEndian>(*t)?,
            }
        }
        self.out.write_u8(u8::from(heater_on))?;
        if self.layout.timestamp_placement == TimestampPlacement::Trailing {
            self.out.write_u32::<LittleEndian>(raw_time)?;
        }

        self.records += 1;
        Ok(())
    }

    pub fn records_written(&self) -> usize {
        self.records
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    /// Flush and return the underlying writer
    pub fn finish(self) -> Result<W> {
        self.out
            .into_inner()
            .map_err(|e| LogError::IoError(e.into_error()))
    }
}

fn encode_time(time: SampleTime, encoding: TimestampEncoding) -> Result<u32> {
    match (time, encoding) {
        (SampleTime::Calendar(ts), TimestampEncoding::Packed) => Ok(timestamp::pack(&ts)),
        (SampleTime::Raw(v), TimestampEncoding::Raw) => Ok(v),
        (time, encoding) => Err(LogError::Config(format!(
            "cannot write {:?} as a {:?} timestamp",
            time, encoding
        ))),
    }
}
