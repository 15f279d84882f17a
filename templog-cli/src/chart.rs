//! Chart rendering
//!
//! Draws a merged series as an SVG with two stacked panels: temperatures
//! per sensor on top, heater state as a step curve below.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use plotters::prelude::*;
use std::path::PathBuf;
use templog_decoder::LogSeries;

use crate::config::ChartConfig;

/// Heater panel y-range, a little wider than 0..1 so the levels stay visible
const HEATER_RANGE: std::ops::Range<f64> = -0.1..1.1;

#[derive(Debug, Clone)]
pub struct ChartOptions {
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl From<&ChartConfig> for ChartOptions {
    fn from(config: &ChartConfig) -> Self {
        Self {
            output: config.output.clone(),
            width: config.width,
            height: config.height,
            title: config
                .title
                .clone()
                .unwrap_or_else(|| "Temperature over Time".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    Rendered(PathBuf),
    NothingToPlot,
}

/// Points of a step curve: each change is drawn as a vertical edge
pub fn step_points(xs: &[f64], states: &[bool]) -> Vec<(f64, f64)> {
    let mut points = Vec::with_capacity(xs.len() * 2);
    let mut prev: Option<f64> = None;
    for (x, on) in xs.iter().zip(states) {
        let y = if *on { 1.0 } else { 0.0 };
        if let Some(p) = prev {
            if p != y {
                points.push((*x, p));
            }
        }
        points.push((*x, y));
        prev = Some(y);
    }
    points
}

fn axis_range(xs: &[f64]) -> (f64, f64) {
    let lo = xs.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    if hi > lo {
        (lo, hi)
    } else {
        (lo, lo + 1.0)
    }
}

fn temperature_bounds(series: &LogSeries) -> (f64, f64) {
    let bounds = (0..series.sensor_count())
        .filter_map(|i| series.temperature_range(i))
        .fold(None, |acc: Option<(f64, f64)>, (lo, hi)| match acc {
            None => Some((lo, hi)),
            Some((a, b)) => Some((a.min(lo), b.max(hi))),
        });
    match bounds {
        Some((lo, hi)) => (lo - 1.0, hi + 1.0),
        None => (0.0, 1.0),
    }
}

fn format_tick(x: f64, base: Option<NaiveDateTime>) -> String {
    match base {
        Some(base) => (base + chrono::Duration::seconds(x.round() as i64))
            .format("%m-%d %H:%M:%S")
            .to_string(),
        None => format!("{:.0}", x),
    }
}

/// Render a series to the configured output file
pub fn render_chart(series: &LogSeries, options: &ChartOptions) -> Result<RenderOutcome> {
    if series.is_empty() {
        log::info!("Nothing to plot");
        return Ok(RenderOutcome::NothingToPlot);
    }

    let xs = series.elapsed_seconds();
    let base = series.datetimes().and_then(|d| d.first().copied());
    let (x_lo, x_hi) = axis_range(&xs);
    let (t_lo, t_hi) = temperature_bounds(series);
    let x_desc = if base.is_some() { "Time" } else { "Time (s)" };
    let tick = |x: &f64| format_tick(*x, base);

    log::debug!(
        "Rendering {} records, {} sensors to {:?}",
        series.len(),
        series.sensor_count(),
        options.output
    );

    let root = SVGBackend::new(&options.output, (options.width, options.height)).into_drawing_area();
    root.fill(&WHITE)?;
    let (upper, lower) = root.split_vertically(options.height * 2 / 3);

    let mut temp_chart = ChartBuilder::on(&upper)
        .caption(&options.title, ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(55)
        .build_cartesian_2d(x_lo..x_hi, t_lo..t_hi)?;

    temp_chart
        .configure_mesh()
        .x_desc(x_desc)
        .y_desc("Temperature (°C)")
        .x_label_formatter(&tick)
        .draw()?;

    for sensor in 0..series.sensor_count() {
        let color = Palette99::pick(sensor).to_rgba();
        let points: Vec<(f64, f64)> = series
            .sensor_values(sensor)
            .into_iter()
            .filter(|(_, t)| t.is_finite())
            .map(|(i, t)| (xs[i], t))
            .collect();

        temp_chart
            .draw_series(LineSeries::new(points, &color))?
            .label(format!("Temp{} (°C)", sensor + 1))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    temp_chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    let mut heater_chart = ChartBuilder::on(&lower)
        .caption("Heating Status over Time", ("sans-serif", 18))
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(55)
        .build_cartesian_2d(x_lo..x_hi, HEATER_RANGE)?;

    heater_chart
        .configure_mesh()
        .x_desc(x_desc)
        .y_desc("Heater (0=Off, 1=On)")
        .x_label_formatter(&tick)
        .draw()?;

    heater_chart
        .draw_series(LineSeries::new(step_points(&xs, series.heater()), &GREEN))?
        .label("Heating Status")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], GREEN));

    heater_chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()
        .with_context(|| format!("Failed to write chart: {:?}", options.output))?;

    log::info!("Chart written to {:?}", options.output);
    Ok(RenderOutcome::Rendered(options.output.clone()))
}
