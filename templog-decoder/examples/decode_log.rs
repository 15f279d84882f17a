//! Standalone temperature log dump tool
//!
//! Prints every record of a log file.
//!
//! Usage:
//!   decode_log <log_file.bin> [--legacy] [--limit <count>]
//!
//! Example:
//!   decode_log TempLog_2024_01.bin --limit 20

use std::env;
use std::path::PathBuf;
use templog_decoder::{LogReader, Profile, ReaderConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!(
            "Usage: {} <log_file.bin> [--legacy] [--limit <count>]",
            args.first().map_or("decode_log", String::as_str)
        );
        std::process::exit(1);
    }

    let log_file = PathBuf::from(&args[1]);
    let mut profile = Profile::Tagged;
    let mut limit: Option<usize> = None;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--legacy" => profile = Profile::Legacy,
            "--limit" => {
                i += 1;
                if i < args.len() {
                    limit = Some(args[i].parse()?);
                }
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
            }
        }
        i += 1;
    }

    let config = ReaderConfig::new().with_profile(profile);
    let log = LogReader::read_file(&log_file, &config)?;

    println!("=== {:?} ===", log_file);
    println!("{}", log.summary());
    println!();

    let series = &log.series;
    for (idx, ((time, temps), heater)) in series
        .times()
        .iter()
        .zip(series.temperatures())
        .zip(series.heater())
        .enumerate()
    {
        if let Some(max) = limit {
            if idx >= max {
                println!("... (limit of {} records reached)", max);
                break;
            }
        }
        let temps: Vec<String> = temps.iter().map(|t| format!("{:7.2}", t)).collect();
        println!(
            "{:>6}  {}  [{}]  heater {}",
            idx,
            time,
            temps.join(", "),
            if *heater { "ON" } else { "off" }
        );
    }

    Ok(())
}
