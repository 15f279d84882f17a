// End-to-end reading of on-disk log files
use std::fs;
use std::path::{Path, PathBuf};

use templog_decoder::{
    discover_files, merge_files, DecodedTimestamp, LogError, LogReader, LogWriter, Profile,
    ReaderConfig, SampleTime,
};

fn at(minute: u8, second: u8) -> SampleTime {
    SampleTime::Calendar(DecodedTimestamp::new(2024, 6, 30, 21, minute, second))
}

/// Write a tagged log with `count` records starting at `first_temp`
fn write_tagged(path: &Path, minute: u8, first_temp: f64, count: usize) {
    let file = fs::File::create(path).unwrap();
    let mut writer = LogWriter::new(file, Profile::Tagged);
    writer.write_header(2, at(minute, 0)).unwrap();
    for i in 0..count {
        let t = first_temp + i as f64;
        writer
            .write_record(&[t, t + 0.5], i % 3 == 0, at(minute, i as u8 + 1))
            .unwrap();
    }
    writer.finish().unwrap();
}

#[test]
fn literal_fixture_yields_injected_values() {
    let start = templog_decoder::timestamp::pack(&DecodedTimestamp::new(2025, 1, 15, 7, 30, 0));
    let first = templog_decoder::timestamp::pack(&DecodedTimestamp::new(2025, 1, 15, 7, 30, 5));
    let second = templog_decoder::timestamp::pack(&DecodedTimestamp::new(2025, 1, 15, 7, 30, 10));

    let mut bytes = b"HEADER\n".to_vec();
    bytes.push(2);
    bytes.extend_from_slice(&start.to_le_bytes());
    for (temps, heater, ts) in [([18.25f32, 64.5], 0u8, first), ([18.5, 66.0], 1, second)] {
        for t in temps {
            bytes.extend_from_slice(&t.to_le_bytes());
        }
        bytes.push(heater);
        bytes.extend_from_slice(&ts.to_le_bytes());
    }

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("TempLog_fixture_01.bin");
    fs::write(&path, &bytes).unwrap();

    let log = LogReader::read_file(&path, &ReaderConfig::default()).unwrap();
    assert_eq!(log.header.sensor_count, 2);
    assert_eq!(log.series.len(), 2);
    assert_eq!(log.series.temperatures(), &[vec![18.25, 64.5], vec![18.5, 66.0]]);
    assert_eq!(log.series.heater(), &[false, true]);
    assert_eq!(log.series.elapsed_seconds(), vec![0.0, 5.0]);

    let summary = log.summary();
    assert_eq!(summary.records, 2);
    assert_eq!(
        summary.header_timestamp,
        Some(SampleTime::Calendar(DecodedTimestamp::new(2025, 1, 15, 7, 30, 0)))
    );
    assert_eq!(summary.last.map(|t| t.to_string()), Some("2025-01-15 07:30:10".to_string()));
}

#[test]
fn n_records_in_n_records_out() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("TempLog_run_01.bin");
    write_tagged(&path, 0, 20.0, 40);

    let log = LogReader::read_file(&path, &ReaderConfig::default()).unwrap();
    assert_eq!(log.series.len(), 40);

    let elapsed = log.series.elapsed_seconds();
    assert!(elapsed.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn truncated_last_record_is_not_counted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("TempLog_cut_01.bin");
    write_tagged(&path, 0, 20.0, 5);

    let mut bytes = fs::read(&path).unwrap();
    bytes.truncate(bytes.len() - 3);
    fs::write(&path, &bytes).unwrap();

    let log = LogReader::read_file(&path, &ReaderConfig::default()).unwrap();
    assert_eq!(log.series.len(), 4);
    assert_eq!(log.truncated_bytes, 2 * 4 + 1 + 4 - 3);
}

#[test]
fn corrupted_tag_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("TempLog_bad_01.bin");
    write_tagged(&path, 0, 20.0, 3);

    let mut bytes = fs::read(&path).unwrap();
    bytes[6] = b'\r';
    fs::write(&path, &bytes).unwrap();

    let err = LogReader::read_file(&path, &ReaderConfig::default()).unwrap_err();
    assert!(matches!(err, LogError::MalformedHeader(_)), "got {:?}", err);
}

#[test]
fn merge_skips_corrupt_file_and_keeps_numeric_order() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("TempLog_s_02.bin");
    let corrupt = dir.path().join("TempLog_s_05.bin");
    let last = dir.path().join("TempLog_s_10.bin");

    write_tagged(&first, 1, 10.0, 3);
    write_tagged(&last, 2, 30.0, 2);
    fs::write(&corrupt, b"garbage that is not a log").unwrap();

    let pattern = dir.path().join("TempLog_*_*.bin");
    let files = discover_files(pattern.to_str().unwrap()).unwrap();
    let names: Vec<PathBuf> = files.iter().map(|p| PathBuf::from(p.file_name().unwrap())).collect();
    assert_eq!(
        names,
        vec![
            PathBuf::from("TempLog_s_02.bin"),
            PathBuf::from("TempLog_s_05.bin"),
            PathBuf::from("TempLog_s_10.bin"),
        ]
    );

    let report = merge_files(&files, &ReaderConfig::default());
    assert!(report.has_data());
    assert_eq!(report.files_read, vec![first, last]);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].path, corrupt);
    assert!(matches!(report.skipped[0].reason, LogError::MalformedHeader(_)));

    let firsts: Vec<f64> = report.series.sensor_values(0).into_iter().map(|(_, t)| t).collect();
    assert_eq!(firsts, vec![10.0, 11.0, 12.0, 30.0, 31.0]);
    assert_eq!(report.series.heater().len(), 5);
    assert_eq!(report.series.elapsed_seconds(), vec![0.0, 1.0, 2.0, 60.0, 61.0]);
}

#[test]
fn file_failing_after_good_records_contributes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("TempLog_h_01.bin");
    let bad = dir.path().join("TempLog_h_02.bin");
    write_tagged(&good, 0, 20.0, 3);
    write_tagged(&bad, 1, 40.0, 2);

    // 12-byte header, 13-byte records: heater byte of the second record
    let mut bytes = fs::read(&bad).unwrap();
    bytes[12 + 13 + 2 * 4] = 0x07;
    fs::write(&bad, &bytes).unwrap();

    let report = merge_files(&[good.clone(), bad.clone()], &ReaderConfig::default());
    assert_eq!(report.series.len(), 3);
    assert_eq!(report.files_read, vec![good]);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].path, bad);
    assert!(
        matches!(report.skipped[0].reason, LogError::InvalidHeaterState { record: 1, value: 0x07 }),
        "got {:?}",
        report.skipped[0].reason
    );
}

#[test]
fn merge_with_no_usable_files_reports_no_data() {
    let dir = tempfile::tempdir().unwrap();
    let empty = dir.path().join("TempLog_e_01.bin");
    let mut writer = LogWriter::new(fs::File::create(&empty).unwrap(), Profile::Tagged);
    writer.write_header(1, at(0, 0)).unwrap();
    writer.finish().unwrap();

    let report = merge_files(&[empty], &ReaderConfig::default());
    assert!(!report.has_data());
    assert!(matches!(report.skipped[0].reason, LogError::EmptyFile(_)));
}
