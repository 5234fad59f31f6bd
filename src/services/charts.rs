use plotters::coord::Shift;
use plotters::prelude::*;

use super::dataset::{Column, Table};
use super::profiler::stats;
use super::registry::ChartRegistry;
use crate::error::AppError;
use crate::models::ChartInfo;

const CHART_WIDTH: u32 = 640;
const CHART_HEIGHT: u32 = 480;
const MAX_HISTOGRAMS: usize = 5;
const BAR_CATEGORIES: usize = 10;
const DENSITY_POINTS: usize = 120;

type DrawResult = Result<(), Box<dyn std::error::Error>>;

/// Render the fixed chart set for a cleaned table and register each PNG.
/// Rendering is best-effort: a chart that fails is logged and skipped, the
/// rest of the set (and the analysis) continues.
pub fn render_all(table: &Table, registry: &ChartRegistry) -> Vec<ChartInfo> {
    let mut charts = Vec::new();
    let numeric = table.numeric_columns();
    let categorical = table.categorical_columns();

    for column in numeric.iter().take(MAX_HISTOGRAMS) {
        let title = format!("Distribution: {}", column.name);
        match render_histogram(column) {
            Ok(png) => charts.push(ChartInfo {
                id: registry.register(png),
                title,
            }),
            Err(e) => tracing::warn!(column = %column.name, "skipping histogram: {}", e),
        }
    }

    if numeric.len() >= 2 {
        let values: Vec<Vec<f64>> = numeric.iter().map(|c| c.numeric_values()).collect();
        let matrix = stats::correlation_matrix(&values);
        match render_heatmap(&matrix) {
            Ok(png) => charts.push(ChartInfo {
                id: registry.register(png),
                title: "Correlation Heatmap".to_string(),
            }),
            Err(e) => tracing::warn!("skipping correlation heatmap: {}", e),
        }
    }

    if let Some(column) = categorical.first() {
        let title = format!("Top categories: {}", column.name);
        match render_bar_chart(column) {
            Ok(png) => charts.push(ChartInfo {
                id: registry.register(png),
                title,
            }),
            Err(e) => tracing::warn!(column = %column.name, "skipping bar chart: {}", e),
        }
    }

    charts
}

fn render_histogram(column: &Column) -> Result<Vec<u8>, AppError> {
    let values = column.numeric_values();
    render_png(|root| draw_histogram(root, &values))
}

fn render_heatmap(matrix: &[Vec<f64>]) -> Result<Vec<u8>, AppError> {
    render_png(|root| draw_heatmap(root, matrix))
}

fn render_bar_chart(column: &Column) -> Result<Vec<u8>, AppError> {
    let counts: Vec<(String, usize)> = column
        .value_counts()
        .into_iter()
        .take(BAR_CATEGORIES)
        .collect();
    render_png(|root| draw_bar_chart(root, &counts))
}

/// Draw into an off-screen RGB buffer and encode it as PNG. No text is
/// rendered, so the backend never needs a font subsystem.
fn render_png<F>(draw: F) -> Result<Vec<u8>, AppError>
where
    F: FnOnce(&DrawingArea<BitMapBackend, Shift>) -> DrawResult,
{
    let mut buffer = vec![0u8; (CHART_WIDTH * CHART_HEIGHT * 3) as usize];
    {
        let root =
            BitMapBackend::with_buffer(&mut buffer, (CHART_WIDTH, CHART_HEIGHT)).into_drawing_area();
        draw(&root).map_err(|e| AppError::ChartRender(e.to_string()))?;
        root.present().map_err(|e| AppError::ChartRender(e.to_string()))?;
    }
    encode_png(buffer)
}

fn encode_png(buffer: Vec<u8>) -> Result<Vec<u8>, AppError> {
    let img = image::RgbImage::from_raw(CHART_WIDTH, CHART_HEIGHT, buffer)
        .ok_or_else(|| AppError::ChartRender("pixel buffer size mismatch".to_string()))?;
    let mut png = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(
            &mut std::io::Cursor::new(&mut png),
            image::ImageOutputFormat::Png,
        )
        .map_err(|e| AppError::ChartRender(e.to_string()))?;
    Ok(png)
}

/// Histogram of the non-null values with a gaussian density overlay scaled
/// to the count axis.
fn draw_histogram(root: &DrawingArea<BitMapBackend, Shift>, values: &[f64]) -> DrawResult {
    root.fill(&WHITE)?;
    if values.is_empty() {
        return Ok(());
    }

    let mut min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mut max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max <= min {
        min -= 0.5;
        max += 0.5;
    }

    let bins = ((values.len() as f64).sqrt().ceil() as usize).clamp(1, 30);
    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for &v in values {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    let y_max = counts.iter().copied().max().unwrap_or(1).max(1) as f64 * 1.1;

    let mut chart = ChartBuilder::on(root)
        .margin(12)
        .build_cartesian_2d(min..max, 0.0..y_max)?;

    chart.draw_series(counts.iter().enumerate().map(|(i, &count)| {
        let x0 = min + i as f64 * width;
        Rectangle::new([(x0, 0.0), (x0 + width, count as f64)], BLUE.mix(0.6).filled())
    }))?;

    if values.len() > 1 {
        if let Some(std) = stats::sample_std(values).filter(|s| *s > 0.0) {
            let bandwidth = 1.06 * std * (values.len() as f64).powf(-0.2);
            let scale = values.len() as f64 * width;
            let density: Vec<(f64, f64)> = (0..=DENSITY_POINTS)
                .map(|i| {
                    let x = min + (max - min) * i as f64 / DENSITY_POINTS as f64;
                    (x, gaussian_kde(values, x, bandwidth) * scale)
                })
                .collect();
            chart.draw_series(LineSeries::new(density, &RED))?;
        }
    }

    Ok(())
}

fn gaussian_kde(values: &[f64], x: f64, bandwidth: f64) -> f64 {
    let norm = (2.0 * std::f64::consts::PI).sqrt();
    let sum: f64 = values
        .iter()
        .map(|v| {
            let t = (x - v) / bandwidth;
            (-0.5 * t * t).exp() / norm
        })
        .sum();
    sum / (values.len() as f64 * bandwidth)
}

fn draw_heatmap(root: &DrawingArea<BitMapBackend, Shift>, matrix: &[Vec<f64>]) -> DrawResult {
    root.fill(&WHITE)?;
    let n = matrix.len();
    if n == 0 {
        return Ok(());
    }

    let mut chart = ChartBuilder::on(root)
        .margin(12)
        .build_cartesian_2d(0..n as i32, 0..n as i32)?;

    let mut cells = Vec::with_capacity(n * n);
    for (i, row) in matrix.iter().enumerate() {
        for (j, &r) in row.iter().enumerate() {
            cells.push(Rectangle::new(
                [(i as i32, j as i32), (i as i32 + 1, j as i32 + 1)],
                heat_color(r).filled(),
            ));
        }
    }
    chart.draw_series(cells)?;
    Ok(())
}

/// Coolwarm-style ramp: blue for -1, near-white for 0, red for +1.
fn heat_color(r: f64) -> RGBColor {
    let r = r.clamp(-1.0, 1.0);
    let lerp = |a: u8, b: u8, t: f64| (a as f64 + (b as f64 - a as f64) * t) as u8;
    const COLD: (u8, u8, u8) = (59, 76, 192);
    const MID: (u8, u8, u8) = (221, 221, 221);
    const WARM: (u8, u8, u8) = (180, 4, 38);
    if r < 0.0 {
        let t = r + 1.0;
        RGBColor(
            lerp(COLD.0, MID.0, t),
            lerp(COLD.1, MID.1, t),
            lerp(COLD.2, MID.2, t),
        )
    } else {
        RGBColor(
            lerp(MID.0, WARM.0, r),
            lerp(MID.1, WARM.1, r),
            lerp(MID.2, WARM.2, r),
        )
    }
}

/// Horizontal bars for the most frequent category values, largest first.
fn draw_bar_chart(root: &DrawingArea<BitMapBackend, Shift>, counts: &[(String, usize)]) -> DrawResult {
    root.fill(&WHITE)?;
    if counts.is_empty() {
        return Ok(());
    }

    let max_count = counts.iter().map(|(_, c)| *c).max().unwrap_or(1) as f64;
    let mut chart = ChartBuilder::on(root)
        .margin(12)
        .build_cartesian_2d(0.0..max_count * 1.1, 0..counts.len() as i32)?;

    chart.draw_series(counts.iter().enumerate().map(|(i, (_, count))| {
        let row = (counts.len() - 1 - i) as i32;
        Rectangle::new([(0.0, row), (*count as f64, row + 1)], BLUE.mix(0.7).filled())
    }))?;
    Ok(())
}
