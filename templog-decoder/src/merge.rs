//! Multi-file discovery and merge
//!
//! The logger rolls over to a new file when one grows too large, so a single
//! session is spread over `TempLog_*_NN.bin` files. These are found with a
//! glob pattern, ordered by the `NN` suffix and concatenated.

use crate::config::ReaderConfig;
use crate::reader::LogReader;
use crate::types::{LogError, LogSeries, Result};
use std::path::{Path, PathBuf};

/// A file that did not contribute to a merge
#[derive(Debug)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: LogError,
}

/// Outcome of merging several log files
#[derive(Debug, Default)]
pub struct MergeReport {
    /// Records of all successfully read files, in input order
    pub series: LogSeries,
    /// Files that were read in full
    pub files_read: Vec<PathBuf>,
    pub skipped: Vec<SkippedFile>,
}

impl MergeReport {
    pub fn has_data(&self) -> bool {
        !self.series.is_empty()
    }
}

/// Numeric suffix preceding the extension, e.g. `7` for `TempLog_a_07.bin`
pub fn sequence_number(path: &Path) -> Option<u32> {
    let stem = path.file_stem()?.to_str()?;
    let digits = stem.rsplit('_').next()?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Sort paths by sequence number; unnumbered files go last, by name
pub fn sort_by_sequence(paths: &mut [PathBuf]) {
    paths.sort_by(|a, b| match (sequence_number(a), sequence_number(b)) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.cmp(b),
    });
}

/// Find log files matching a glob pattern, in sequence order
pub fn discover_files(pattern: &str) -> Result<Vec<PathBuf>> {
    let entries = glob::glob(pattern).map_err(|e| LogError::InvalidPattern(format!("{}: {}", pattern, e)))?;

    let mut paths = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => paths.push(path),
            Ok(_) => {}
            Err(e) => log::warn!("Skipping unreadable path: {}", e),
        }
    }

    sort_by_sequence(&mut paths);
    log::debug!("Pattern {:?} matched {} files", pattern, paths.len());
    Ok(paths)
}

/// Read each file in order and concatenate the results
///
/// A file that fails to parse is logged and skipped; it never aborts the
/// batch. Nothing from a file is merged unless the whole file was read.
pub fn merge_files<P: AsRef<Path>>(paths: &[P], config: &ReaderConfig) -> MergeReport {
    let mut report = MergeReport::default();

    for path in paths {
        let path = path.as_ref();
        match LogReader::read_file(path, config) {
            Ok(log_file) => {
                report.series.append(log_file.series);
                report.files_read.push(path.to_path_buf());
            }
            Err(e) => {
                match &e {
                    LogError::EmptyFile(_) => log::info!("{:?} contains no records", path),
                    _ => log::warn!("Skipping {:?}: {}", path, e),
                }
                report.skipped.push(SkippedFile {
                    path: path.to_path_buf(),
                    reason: e,
                });
            }
        }
    }

    if report.has_data() {
        log::info!(
            "Merged {} records from {} files ({} skipped)",
            report.series.len(),
            report.files_read.len(),
            report.skipped.len()
        );
    } else {
        log::info!("No data in {} input files", paths.len());
    }

    report
}
