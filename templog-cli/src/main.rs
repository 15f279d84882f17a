//! Temperature Log CLI Application
//!
//! This is the command-line interface for the temperature log reader.
//! It uses the templog-decoder library and adds:
//! - Configuration file loading (TOML)
//! - Session summary (TXT/JSON)
//! - Chart rendering (SVG)

use anyhow::{Context, Result};
use clap::Parser;
use std::collections::HashSet;
use std::path::PathBuf;
use templog_decoder::{discover_files, merge_files, Profile, SensorCount};

mod chart;
mod config;
mod report;

use chart::{ChartOptions, RenderOutcome};
use config::AppConfig;
use report::SessionSummary;

/// Temperature Log Reader - Decode and plot heater controller logs
#[derive(Parser, Debug)]
#[command(name = "templog-cli")]
#[command(about = "Decode and plot binary temperature logs", long_about = None)]
#[command(version)]
struct Args {
    /// Log files to read, merged in the order given
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Glob pattern for rolled-over logs, ordered by their _NN suffix
    #[arg(short, long, value_name = "PATTERN")]
    pattern: Option<String>,

    /// Binary layout of the files (tagged, legacy)
    #[arg(long, value_name = "PROFILE")]
    profile: Option<Profile>,

    /// Use this many sensors instead of the count in the header
    #[arg(long, value_name = "COUNT")]
    sensors: Option<u8>,

    /// Accept any non-zero heater byte as "on"
    #[arg(long)]
    lenient_heater: bool,

    /// Path to configuration file (templog.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output SVG file for the chart
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Print the summary only, do not render a chart
    #[arg(long)]
    summary_only: bool,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("TempLog CLI v{}", env!("CARGO_PKG_VERSION"));
    log::debug!("Using decoder library v{}", templog_decoder::VERSION);

    let config = resolve_config(&args)?;

    let mut found = Vec::new();
    if let Some(pattern) = &config.input.pattern {
        found = discover_files(pattern)?;
        if found.is_empty() {
            log::warn!("Pattern {:?} matched no files", pattern);
        }
    }
    let files = collect_inputs(&config.input.files, found);

    if files.is_empty() {
        println!("TempLog Reader - No input specified");
        println!("\nQuick Start:");
        println!("  templog-cli TempLog_2024_01.bin");
        println!("  templog-cli --pattern 'logs/TempLog_*_*.bin' --output session.svg");
        println!("  templog-cli --profile legacy temp_log_0.bin");
        println!("\nUse --help for more options");
        return Ok(());
    }

    let merged = merge_files(&files, &config.input.reader);
    let summary = SessionSummary::from_report(&merged);

    if args.json {
        println!("{}", summary.to_json()?);
    } else if !args.quiet {
        print!("{}", summary.to_text());
    }

    if args.summary_only {
        return Ok(());
    }

    let options = ChartOptions::from(&config.chart);
    match chart::render_chart(&merged.series, &options)? {
        RenderOutcome::Rendered(path) => {
            if !args.quiet && !args.json {
                println!("\nChart written to {}", path.display());
            }
        }
        RenderOutcome::NothingToPlot => {
            if !args.quiet && !args.json {
                println!("\nNothing to plot");
            }
        }
    }

    Ok(())
}

/// Load the configuration file, if any, and apply command line overrides
fn resolve_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => AppConfig::default(),
    };

    if !args.files.is_empty() {
        config.input.files = args.files.clone();
    }
    if let Some(pattern) = &args.pattern {
        config.input.pattern = Some(pattern.clone());
    }
    if let Some(profile) = args.profile {
        config.input.reader.profile = profile;
    }
    if let Some(count) = args.sensors {
        config.input.reader.sensor_count = SensorCount::Fixed(count);
    }
    if args.lenient_heater {
        config.input.reader.strict_heater = false;
    }
    if let Some(output) = &args.output {
        config.chart.output = output.clone();
    }

    config.validate().context("Invalid configuration")?;
    log::debug!("Effective configuration: {:?}", config);
    Ok(config)
}

/// Explicit files first, then pattern matches; a repeated path keeps its first position
fn collect_inputs(explicit: &[PathBuf], found: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    explicit
        .iter()
        .cloned()
        .chain(found)
        .filter(|path| {
            let fresh = seen.insert(path.clone());
            if !fresh {
                log::debug!("Ignoring repeated input {:?}", path);
            }
            fresh
        })
        .collect()
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line_overrides() {
        let args = Args::parse_from([
            "templog-cli",
            "--profile",
            "legacy",
            "--sensors",
            "3",
            "--lenient-heater",
            "-o",
            "out.svg",
            "a_01.bin",
            "a_02.bin",
        ]);

        let config = resolve_config(&args).unwrap();
        assert_eq!(config.input.files.len(), 2);
        assert_eq!(config.input.reader.profile, Profile::Legacy);
        assert_eq!(config.input.reader.sensor_count, SensorCount::Fixed(3));
        assert!(!config.input.reader.strict_heater);
        assert_eq!(config.chart.output, PathBuf::from("out.svg"));
    }

    #[test]
    fn test_zero_sensors_fails_up_front() {
        let args = Args::parse_from(["templog-cli", "--sensors", "0", "a_01.bin"]);
        assert!(resolve_config(&args).is_err());
    }

    #[test]
    fn test_inputs_are_deduplicated_in_order() {
        let explicit = vec![PathBuf::from("b_02.bin"), PathBuf::from("a_01.bin")];
        let found = vec![
            PathBuf::from("a_01.bin"),
            PathBuf::from("b_02.bin"),
            PathBuf::from("c_03.bin"),
            PathBuf::from("c_03.bin"),
        ];

        assert_eq!(
            collect_inputs(&explicit, found),
            vec![
                PathBuf::from("b_02.bin"),
                PathBuf::from("a_01.bin"),
                PathBuf::from("c_03.bin"),
            ]
        );
        assert!(collect_inputs(&[], Vec::new()).is_empty());
    }

    #[test]
    fn test_unknown_profile_is_rejected() {
        let result = Args::try_parse_from(["templog-cli", "--profile", "csv"]);
        assert!(result.is_err());
    }
}
