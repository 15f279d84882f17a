//! Session summary report
//!
//! Generates a TXT or JSON summary of a merge.

use serde::Serialize;
use std::fmt::Write as _;
use std::path::PathBuf;
use templog_decoder::MergeReport;

#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub files_read: Vec<PathBuf>,
    pub skipped: Vec<SkippedEntry>,
    pub records: usize,
    pub sensors: Vec<SensorSummary>,
    pub first: Option<String>,
    pub last: Option<String>,
    pub heater_duty_cycle: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedEntry {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SensorSummary {
    pub name: String,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl SessionSummary {
    pub fn from_report(report: &MergeReport) -> Self {
        let series = &report.series;
        let sensors = (0..series.sensor_count())
            .map(|i| {
                let range = series.temperature_range(i);
                SensorSummary {
                    name: format!("Temp{}", i + 1),
                    min: range.map(|r| r.0),
                    max: range.map(|r| r.1),
                }
            })
            .collect();

        Self {
            files_read: report.files_read.clone(),
            skipped: report
                .skipped
                .iter()
                .map(|s| SkippedEntry {
                    path: s.path.clone(),
                    reason: s.reason.to_string(),
                })
                .collect(),
            records: series.len(),
            sensors,
            first: series.first_time().map(|t| t.to_string()),
            last: series.last_time().map(|t| t.to_string()),
            heater_duty_cycle: series.heater_duty_cycle(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Files read: {}", self.files_read.len());
        for path in &self.files_read {
            let _ = writeln!(out, "  ✓ {}", path.display());
        }
        if !self.skipped.is_empty() {
            let _ = writeln!(out, "Files skipped: {}", self.skipped.len());
            for entry in &self.skipped {
                let _ = writeln!(out, "  ✗ {}: {}", entry.path.display(), entry.reason);
            }
        }

        if self.records == 0 {
            let _ = writeln!(out, "No data");
            return out;
        }

        let _ = writeln!(out, "Records: {}", self.records);
        if let (Some(first), Some(last)) = (&self.first, &self.last) {
            let _ = writeln!(out, "Span: {} .. {}", first, last);
        }
        if let Some(duty) = self.heater_duty_cycle {
            let _ = writeln!(out, "Heater on: {:.1}%", duty * 100.0);
        }
        for sensor in &self.sensors {
            match (sensor.min, sensor.max) {
                (Some(min), Some(max)) => {
                    let _ = writeln!(out, "  {}: {:.2} .. {:.2} °C", sensor.name, min, max);
                }
                _ => {
                    let _ = writeln!(out, "  {}: no valid readings", sensor.name);
                }
            }
        }
        out
    }
}
