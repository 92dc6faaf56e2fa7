//! Figures for the analysis commands, drawn with plotters.
//!
//! Every figure is sized in inches and scaled by the requested resolution, then written through
//! the SVG or bitmap backend depending on [`ImageType`].

use crate::error::{CliError, Result};
use clap::ValueEnum;
use nalgebra::DMatrix;
use plotters::coord::Shift;
use plotters::prelude::*;
use serde::Deserialize;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use tracing::info;

/// Largest edge of a raster figure, in pixels.
pub const MAX_EDGE_PX: u32 = 8_000;
/// Bar and line charts are 10 x 2.5 in, heatmaps 6 x 6 in.
pub const CHART_SIZE_IN: (f64, f64) = (10.0, 2.5);
pub const HEATMAP_SIZE_IN: (f64, f64) = (6.0, 6.0);

/// SVG coordinates are in points, so vector figures use a fixed 96 dpi.
const SVG_DPI: f64 = 96.0;

#[derive(ValueEnum, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ImageType {
    Svg,
    #[default]
    Png,
}

impl ImageType {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
        }
    }
}

#[derive(ValueEnum, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FigureType {
    #[default]
    Bar,
    Line,
}

/// Resolved figure options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotSettings {
    pub image_type: ImageType,
    pub figure_type: FigureType,
    pub dpi: f64,
}

impl PlotSettings {
    /// `path` with the extension of the configured image type.
    pub fn image_path(&self, path: &Path) -> PathBuf {
        path.with_extension(self.image_type.extension())
    }

    /// Pixel size of a figure of `inches`, with the longer edge capped at [`MAX_EDGE_PX`].
    pub fn pixels(&self, inches: (f64, f64)) -> (u32, u32) {
        let dpi = match self.image_type {
            ImageType::Svg => SVG_DPI,
            ImageType::Png => self.dpi,
        };
        let (w, h) = (inches.0 * dpi, inches.1 * dpi);
        let scale = (MAX_EDGE_PX as f64 / w.max(h)).min(1.0);
        (
            ((w * scale).round() as u32).max(1),
            ((h * scale).round() as u32).max(1),
        )
    }
}

/// One labelled series of `(residue, value)` points.
pub struct Series<'a> {
    pub title: String,
    pub points: &'a [(f64, f64)],
}

fn plot_error<E: Display>(path: &Path) -> impl FnOnce(E) -> CliError + '_ {
    move |e| CliError::Plot {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

macro_rules! render {
    ($settings:expr, $path:expr, $inches:expr, |$root:ident| $draw:expr) => {{
        let size = $settings.pixels($inches);
        match $settings.image_type {
            ImageType::Svg => {
                let $root = SVGBackend::new($path, size).into_drawing_area();
                $draw.map_err(plot_error($path))
            }
            ImageType::Png => {
                let $root = BitMapBackend::new($path, size).into_drawing_area();
                $draw.map_err(plot_error($path))
            }
        }
    }};
}

/// Side-by-side panels, one per series, with a shared caption.
pub fn fluctuation_panels(
    path: &Path,
    caption: &str,
    y_label: &str,
    series: &[Series<'_>],
    tick_spacing: usize,
    settings: &PlotSettings,
) -> Result<()> {
    info!("Saving image to {}", path.display());
    render!(settings, path, CHART_SIZE_IN, |root| draw_panels(
        &root,
        caption,
        y_label,
        series,
        tick_spacing,
        settings.figure_type
    ))
}

/// Heatmap of a square matrix, `value` increasing from light to dark.
pub fn heatmap(
    path: &Path,
    caption: &str,
    matrix: &DMatrix<f64>,
    tick_spacing: usize,
    settings: &PlotSettings,
) -> Result<()> {
    info!("Saving image to {}", path.display());
    render!(settings, path, HEATMAP_SIZE_IN, |root| draw_heatmap(
        &root,
        caption,
        matrix,
        tick_spacing
    ))
}

fn label_count(n_points: usize, spacing: usize) -> usize {
    (n_points / spacing.max(1)).clamp(2, 50)
}

fn draw_panels<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    caption: &str,
    y_label: &str,
    series: &[Series<'_>],
    tick_spacing: usize,
    figure_type: FigureType,
) -> std::result::Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;
    let root = root.titled(caption, ("sans-serif", 18))?;
    let panels = root.split_evenly((1, series.len().max(1)));

    for (panel, data) in panels.iter().zip(series) {
        let (x_min, x_max) = data
            .points
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (x, _)| {
                (lo.min(*x), hi.max(*x))
            });
        let y_max = data.points.iter().map(|(_, y)| *y).fold(0.0, f64::max);
        let (x_min, x_max) = if x_min.is_finite() {
            (x_min - 1.0, x_max + 1.0)
        } else {
            (0.0, 1.0)
        };

        let mut chart = ChartBuilder::on(panel)
            .caption(&data.title, ("sans-serif", 14))
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(50)
            .build_cartesian_2d(x_min..x_max, 0.0..(y_max * 1.1).max(1e-3))?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(label_count(data.points.len(), tick_spacing))
            .x_label_formatter(&|x| format!("{:.0}", x))
            .x_desc("Residue #")
            .y_desc(y_label)
            .draw()?;

        match figure_type {
            FigureType::Bar => {
                chart.draw_series(data.points.iter().map(|&(x, y)| {
                    Rectangle::new([(x - 0.4, 0.0), (x + 0.4, y)], BLUE.filled())
                }))?;
            }
            FigureType::Line => {
                chart.draw_series(LineSeries::new(data.points.iter().copied(), &BLUE))?;
            }
        }
    }

    root.present()?;
    Ok(())
}

/// Linear ramp from pale yellow through green-grey to dark blue.
fn heat_color(value: f64, max: f64) -> RGBColor {
    let t = if max > 0.0 {
        (value / max).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let stops = [(255.0, 234.0, 70.0), (124.0, 123.0, 120.0), (0.0, 32.0, 77.0)];
    let (segment, local) = if t < 0.5 { (0, t * 2.0) } else { (1, (t - 0.5) * 2.0) };
    let (a, b) = (stops[segment], stops[segment + 1]);
    let lerp = |p: f64, q: f64| (p + (q - p) * local).round() as u8;
    RGBColor(lerp(a.0, b.0), lerp(a.1, b.1), lerp(a.2, b.2))
}

fn draw_heatmap<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    caption: &str,
    matrix: &DMatrix<f64>,
    tick_spacing: usize,
) -> std::result::Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;
    let n = matrix.nrows().max(1);
    let max = matrix.max();

    let mut chart = ChartBuilder::on(root)
        .caption(caption, ("sans-serif", 16))
        .margin(15)
        .x_label_area_size(35)
        .y_label_area_size(45)
        .build_cartesian_2d(0..n, 0..n)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(label_count(n, tick_spacing))
        .y_labels(label_count(n, tick_spacing))
        .x_desc("Frame")
        .y_desc("Frame")
        .draw()?;

    chart.draw_series(matrix.row_iter().enumerate().flat_map(|(i, row)| {
        row.iter()
            .enumerate()
            .map(|(j, &value)| {
                Rectangle::new([(j, i), (j + 1, i + 1)], heat_color(value, max).filled())
            })
            .collect::<Vec<_>>()
    }))?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(image_type: ImageType, dpi: f64) -> PlotSettings {
        PlotSettings {
            image_type,
            figure_type: FigureType::Bar,
            dpi,
        }
    }

    #[test]
    fn raster_size_scales_with_dpi_and_is_capped() {
        assert_eq!(settings(ImageType::Png, 100.0).pixels(CHART_SIZE_IN), (1000, 250));
        assert_eq!(settings(ImageType::Png, 600.0).pixels(HEATMAP_SIZE_IN), (3600, 3600));
        let (w, h) = settings(ImageType::Png, 1200.0).pixels(CHART_SIZE_IN);
        assert_eq!(w, MAX_EDGE_PX);
        assert_eq!(h, MAX_EDGE_PX / 4);
    }

    #[test]
    fn vector_size_ignores_dpi() {
        assert_eq!(settings(ImageType::Svg, 600.0).pixels(HEATMAP_SIZE_IN), (576, 576));
    }

    #[test]
    fn image_path_takes_the_image_extension() {
        let s = settings(ImageType::Svg, 600.0);
        assert_eq!(s.image_path(Path::new("out/rms2d.csv")), PathBuf::from("out/rms2d.svg"));
    }

    #[test]
    fn heat_colors_run_from_light_to_dark() {
        assert_eq!(heat_color(0.0, 2.0), RGBColor(255, 234, 70));
        assert_eq!(heat_color(2.0, 2.0), RGBColor(0, 32, 77));
        assert_eq!(heat_color(5.0, 0.0), RGBColor(255, 234, 70));
    }

    #[test]
    fn label_count_is_bounded() {
        assert_eq!(label_count(200, 10), 20);
        assert_eq!(label_count(3, 10), 2);
        assert_eq!(label_count(10_000, 1), 50);
    }
}
