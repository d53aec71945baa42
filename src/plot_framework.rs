// src/plot_framework.rs

use plotters::backend::BitMapBackend;
use plotters::chart::ChartBuilder;
use plotters::coord::ranged1d::{DefaultFormatting, KeyPointHint, Ranged};
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::drawing::{DrawingArea, IntoDrawingArea};
use plotters::element::{Rectangle, Text};
use plotters::prelude::Cartesian2d;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{Color, FontTransform, IntoFont, RGBColor};

use image::imageops::{self, FilterType};
use image::{ImageFormat, Rgb, RgbImage};
use log::debug;
use ndarray::Array1;

use std::error::Error;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::colormaps::Colormap;
use crate::constants::{
    CHART_MARGIN_PX, COLORBAR_STEPS, COLORBAR_TARGET_TICKS, COLORBAR_WIDTH_PX,
    COLOR_UNAVAILABLE_TEXT, HEIGHT_AXIS_MAX_M, HEIGHT_AXIS_MIN_M, HEIGHT_AXIS_TICK_STEP_M,
    TIGHT_BBOX_PAD_IN, X_LABEL_AREA_PX, Y_LABEL_AREA_PX,
};
use crate::data_input::DataArray;
use crate::error::{RenderError, Result};
use crate::font_config::FONT_FAMILY;
use crate::style::StyleConfig;
use crate::time_axis::TimeAxis;

/// Coordinate system of every time-height chart: seconds from the window
/// start on x, height in meters on y, both with explicit tick positions.
pub type MeshCoord = Cartesian2d<TickedAxis, TickedAxis>;

/// Linear f64 axis with bold ticks at fixed positions and no light lines.
///
/// Keeps default value formatting, so the mesh can be configured with
/// label formatters like a plain numeric axis.
#[derive(Clone)]
pub struct TickedAxis {
    coord: RangedCoordf64,
    ticks: Vec<f64>,
}

impl TickedAxis {
    pub fn new(range: Range<f64>, ticks: Vec<f64>) -> Self {
        Self {
            coord: range.into(),
            ticks,
        }
    }
}

impl Ranged for TickedAxis {
    type FormatOption = DefaultFormatting;
    type ValueType = f64;

    fn map(&self, value: &f64, limit: (i32, i32)) -> i32 {
        self.coord.map(value, limit)
    }

    fn key_points<Hint: KeyPointHint>(&self, hint: Hint) -> Vec<f64> {
        if hint.weight().allow_light_points() {
            Vec::new()
        } else {
            self.ticks.clone()
        }
    }

    fn range(&self) -> Range<f64> {
        self.coord.range()
    }
}

/// Pixel constants are given for this DPI and scaled to the figure's.
const REFERENCE_DPI: u32 = 100;

const HEIGHT_AXIS_DESC: &str = "range [m]";

fn scaled(px: u32, dpi: u32) -> i32 {
    (u64::from(px) * u64::from(dpi) / u64::from(REFERENCE_DPI)) as i32
}

/// An in-memory RGB canvas, rasterized at a fixed DPI.
///
/// Saving and showing read from the same buffer, so a figure can be drawn
/// once and then exported, displayed, or simply dropped.
pub struct Figure {
    label: String,
    width_px: u32,
    height_px: u32,
    dpi: u32,
    background: RGBColor,
    buffer: Vec<u8>,
}

impl Figure {
    pub fn new(label: &str, size_in: (f64, f64), dpi: u32, background: RGBColor) -> Self {
        let width_px = ((size_in.0 * f64::from(dpi)).round() as u32).max(1);
        let height_px = ((size_in.1 * f64::from(dpi)).round() as u32).max(1);
        debug!("opening figure '{label}' ({width_px}x{height_px} px @ {dpi} dpi)");
        Self {
            label: label.to_string(),
            width_px,
            height_px,
            dpi,
            background,
            buffer: vec![0; width_px as usize * height_px as usize * 3],
        }
    }

    pub fn size_px(&self) -> (u32, u32) {
        (self.width_px, self.height_px)
    }

    /// Clears the canvas to the background and runs `paint` on the root area.
    pub fn draw<T, F>(&mut self, paint: F) -> Result<T>
    where
        F: FnOnce(&DrawingArea<BitMapBackend, Shift>) -> std::result::Result<T, Box<dyn Error>>,
    {
        let size = (self.width_px, self.height_px);
        let background = self.background;
        let root = BitMapBackend::with_buffer(&mut self.buffer, size).into_drawing_area();
        root.fill(&background).map_err(drawing_error)?;
        let painted = paint(&root).map_err(|e| RenderError::Drawing(e.to_string()))?;
        root.present().map_err(drawing_error)?;
        Ok(painted)
    }

    fn to_image(&self) -> Result<RgbImage> {
        RgbImage::from_raw(self.width_px, self.height_px, self.buffer.clone())
            .ok_or_else(|| RenderError::Drawing("canvas size does not match its buffer".into()))
    }

    /// Writes the figure as PNG, cropped to its content plus a small pad.
    pub fn save_png(&self, path: &Path) -> Result<()> {
        let image = self.to_image()?;
        let pad_px = (TIGHT_BBOX_PAD_IN * f64::from(self.dpi)).round() as u32;
        let cropped = crop_to_content(&image, self.background, pad_px);
        cropped.save_with_format(path, ImageFormat::Png)?;
        debug!(
            "figure '{}' written as {}x{} px",
            self.label,
            cropped.width(),
            cropped.height()
        );
        Ok(())
    }

    /// Opens a preview at `screen_dpi` in the platform image viewer.
    pub fn show(&self, screen_dpi: u32) -> Result<PathBuf> {
        if cfg!(target_os = "linux")
            && std::env::var_os("DISPLAY").is_none()
            && std::env::var_os("WAYLAND_DISPLAY").is_none()
        {
            return Err(RenderError::Display(
                "neither DISPLAY nor WAYLAND_DISPLAY is set".to_string(),
            ));
        }

        let image = self.to_image()?;
        let factor = f64::from(screen_dpi) / f64::from(self.dpi);
        let width = ((f64::from(self.width_px) * factor).round() as u32).max(1);
        let height = ((f64::from(self.height_px) * factor).round() as u32).max(1);
        let preview = imageops::resize(&image, width, height, FilterType::Triangle);
        let path = std::env::temp_dir().join(format!("{}_preview.png", self.label));
        preview.save_with_format(&path, ImageFormat::Png)?;

        let mut viewer = if cfg!(target_os = "macos") {
            Command::new("open")
        } else if cfg!(target_os = "windows") {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", "start", ""]);
            cmd
        } else {
            Command::new("xdg-open")
        };
        viewer
            .arg(&path)
            .spawn()
            .map_err(|e| RenderError::Display(e.to_string()))?;
        Ok(path)
    }
}

impl Drop for Figure {
    fn drop(&mut self) {
        debug!("closing figure '{}'", self.label);
    }
}

fn drawing_error<E: Error>(e: E) -> RenderError {
    RenderError::Drawing(e.to_string())
}

/// Crops away uniform background borders, keeping `pad_px` around the content.
/// A blank image is returned unchanged.
pub fn crop_to_content(image: &RgbImage, background: RGBColor, pad_px: u32) -> RgbImage {
    let bg = Rgb([background.0, background.1, background.2]);
    let (mut x0, mut y0, mut x1, mut y1) = (u32::MAX, u32::MAX, 0u32, 0u32);
    for (x, y, pixel) in image.enumerate_pixels() {
        if *pixel != bg {
            x0 = x0.min(x);
            y0 = y0.min(y);
            x1 = x1.max(x);
            y1 = y1.max(y);
        }
    }
    if x0 == u32::MAX {
        return image.clone();
    }
    let left = x0.saturating_sub(pad_px);
    let top = y0.saturating_sub(pad_px);
    let right = (x1 + pad_px).min(image.width() - 1);
    let bottom = (y1 + pad_px).min(image.height() - 1);
    imageops::crop_imm(image, left, top, right - left + 1, bottom - top + 1).to_image()
}

/// Color mapping and colorbar description of one figure.
#[derive(Debug, Clone)]
pub struct ColorScale {
    pub cmap: Colormap,
    pub vmin: f64,
    pub vmax: f64,
    pub ticks: Vec<f64>,
    pub label: String,
}

impl ColorScale {
    /// Scale with automatically placed colorbar ticks.
    pub fn new(cmap: Colormap, vmin: f64, vmax: f64, label: String) -> Self {
        let (lo, hi) = ordered(vmin, vmax);
        Self {
            cmap,
            vmin,
            vmax,
            ticks: nice_ticks(lo, hi, COLORBAR_TARGET_TICKS),
            label,
        }
    }

    pub fn with_ticks(mut self, ticks: Vec<f64>) -> Self {
        self.ticks = ticks;
        self
    }
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Round tick values (steps of 1, 2, 2.5 or 5 times a power of ten)
/// covering `[lo, hi]` with roughly `target` ticks.
pub fn nice_ticks(lo: f64, hi: f64, target: usize) -> Vec<f64> {
    let span = hi - lo;
    if !span.is_finite() || span <= 0.0 {
        return vec![lo];
    }
    let step = nice_step(span / (target.max(2) - 1) as f64);
    let first = (lo / step).ceil();
    let last = (hi / step + 1e-9).floor();
    (first as i64..=last as i64)
        .map(|k| {
            let v = k as f64 * step;
            // Avoid "-0" labels
            if v == 0.0 {
                0.0
            } else {
                v
            }
        })
        .collect()
}

fn nice_step(raw: f64) -> f64 {
    let magnitude = 10f64.powf(raw.log10().floor());
    let normalized = raw / magnitude;
    let factor = [1.0, 2.0, 2.5, 5.0]
        .into_iter()
        .find(|&f| f >= normalized - 1e-12)
        .unwrap_or(10.0);
    factor * magnitude
}

/// Formats a colorbar tick with just enough decimals for its spacing.
pub fn format_tick_value(value: f64, ticks: &[f64]) -> String {
    let step = ticks
        .windows(2)
        .map(|w| (w[1] - w[0]).abs())
        .fold(f64::INFINITY, f64::min);
    let decimals = if step.is_finite() && step > 0.0 {
        (0..6)
            .find(|&d| {
                let scaled = step * 10f64.powi(d);
                (scaled - scaled.round()).abs() < 1e-6
            })
            .unwrap_or(6) as usize
    } else {
        0
    };
    format!("{value:.decimals$}")
}

/// Cell boundaries for a mesh whose cell centers are `centers`.
///
/// Inner edges sit halfway between neighbours; the outer ones are
/// extrapolated by half a step. A single center gets a unit-wide cell.
pub fn cell_edges(centers: &[f64]) -> Vec<f64> {
    match centers.len() {
        0 => Vec::new(),
        1 => vec![centers[0] - 0.5, centers[0] + 0.5],
        n => {
            let mut edges = Vec::with_capacity(n + 1);
            edges.push(centers[0] - (centers[1] - centers[0]) / 2.0);
            edges.extend(centers.windows(2).map(|w| (w[0] + w[1]) / 2.0));
            edges.push(centers[n - 1] + (centers[n - 1] - centers[n - 2]) / 2.0);
            edges
        }
    }
}

fn clamp_span(a: f64, b: f64, range: &Range<f64>) -> Option<(f64, f64)> {
    let (lo, hi) = ordered(a, b);
    let lo = lo.max(range.start);
    let hi = hi.min(range.end);
    (hi > lo).then_some((lo, hi))
}

/// One row of a time-height figure.
pub struct MeshPanel<'p> {
    pub title: String,
    /// `None` leaves the row as bare axes
    pub data: Option<&'p DataArray>,
}

/// Draws a time-height mesh with its colorbar into `area`.
///
/// The x axis spans the time window, the y axis is fixed to the height
/// limits. NaN cells stay transparent. Panels with data but no time steps
/// get a placeholder message instead of cells; panels without data get
/// bare axes and no colorbar. Returns the y range of the drawn chart.
pub fn draw_time_height_panel(
    area: &DrawingArea<BitMapBackend, Shift>,
    panel: &MeshPanel,
    time_axis: &TimeAxis,
    scale: &ColorScale,
    style: &StyleConfig,
    text_enabled: bool,
) -> std::result::Result<Range<f64>, Box<dyn Error>> {
    let dpi = style.savefig_dpi;
    let (area_width, _) = area.dim_in_pixel();
    let area_width = area_width as i32;
    let bar_width = scaled(COLORBAR_WIDTH_PX, dpi).min(area_width / 2);
    let (plot_area, bar_area) = area.split_horizontally(area_width - bar_width);

    let x_range = 0.0..time_axis.window.duration_secs().max(1.0);
    let y_range = HEIGHT_AXIS_MIN_M..HEIGHT_AXIS_MAX_M;
    let y_ticks = Array1::linspace(
        HEIGHT_AXIS_MIN_M,
        HEIGHT_AXIS_MAX_M,
        ((HEIGHT_AXIS_MAX_M - HEIGHT_AXIS_MIN_M) / HEIGHT_AXIS_TICK_STEP_M) as usize + 1,
    )
    .to_vec();

    let mut builder = ChartBuilder::on(&plot_area);
    builder.margin(scaled(CHART_MARGIN_PX, dpi));
    if text_enabled {
        if !panel.title.is_empty() {
            builder.caption(&panel.title, style.title_font());
        }
        builder
            .x_label_area_size(scaled(X_LABEL_AREA_PX, dpi))
            .y_label_area_size(scaled(Y_LABEL_AREA_PX, dpi));
    }
    let mut chart = builder.build_cartesian_2d(
        TickedAxis::new(x_range.clone(), time_axis.tick_offsets()),
        TickedAxis::new(y_range.clone(), y_ticks),
    )?;
    let drawn_y_range = chart.y_range();

    if let Some(data) = panel.data {
        if data.is_empty() {
            style.plot_setup(&mut chart, time_axis, HEIGHT_AXIS_DESC, text_enabled)?;
            draw_unavailable_message(
                &chart.plotting_area().strip_coord_spec(),
                &panel.title,
                "No data in time window",
                text_enabled,
            )?;
        } else {
            let x: Vec<f64> = data
                .coords
                .time
                .iter()
                .map(|&t| time_axis.window.offset_secs(t))
                .collect();
            let x_edges = cell_edges(&x);
            let y_edges = cell_edges(&data.coords.range);
            chart.draw_series(data.values.indexed_iter().filter_map(|((i, j), &value)| {
                let color = scale.cmap.map_value(value, scale.vmin, scale.vmax)?;
                let (x0, x1) = clamp_span(x_edges[i], x_edges[i + 1], &x_range)?;
                let (y0, y1) = clamp_span(y_edges[j], y_edges[j + 1], &y_range)?;
                Some(Rectangle::new([(x0, y0), (x1, y1)], color.filled()))
            }))?;
            style.plot_setup(&mut chart, time_axis, HEIGHT_AXIS_DESC, text_enabled)?;
        }
    } else {
        style.plot_setup(&mut chart, time_axis, HEIGHT_AXIS_DESC, text_enabled)?;
        return Ok(drawn_y_range);
    }

    // Colorbar spans exactly the plotting area's height
    let (_, plot_rows) = chart.plotting_area().get_pixel_range();
    let (_, bar_rows) = bar_area.get_pixel_range();
    let top = (plot_rows.start - bar_rows.start).max(0);
    let bottom = (bar_rows.end - plot_rows.end).max(0);
    draw_colorbar(&bar_area, scale, style, top, bottom, text_enabled)?;
    Ok(drawn_y_range)
}

/// Vertical colorbar: `COLORBAR_STEPS` bands from vmin to vmax, ticks on the
/// right and the label rotated alongside.
pub fn draw_colorbar(
    area: &DrawingArea<BitMapBackend, Shift>,
    scale: &ColorScale,
    style: &StyleConfig,
    margin_top: i32,
    margin_bottom: i32,
    text_enabled: bool,
) -> std::result::Result<(), Box<dyn Error>> {
    let dpi = style.savefig_dpi;
    let (lo, hi) = ordered(scale.vmin, scale.vmax);
    let hi = if hi > lo { hi } else { lo + 1e-12 };
    let (width, _) = area.dim_in_pixel();
    let label_column = scaled(30, dpi);

    let mut builder = ChartBuilder::on(area);
    builder
        .margin_top(margin_top)
        .margin_bottom(margin_bottom)
        .margin_left(scaled(15, dpi))
        .margin_right(label_column);
    if text_enabled {
        builder.right_y_label_area_size(scaled(85, dpi));
    }
    let ticks: Vec<f64> = scale
        .ticks
        .iter()
        .copied()
        .filter(|t| (lo..=hi).contains(t))
        .collect();
    let mut chart = builder.build_cartesian_2d(
        TickedAxis::new(0.0..1.0, Vec::new()),
        TickedAxis::new(lo..hi, ticks),
    )?;

    let n = COLORBAR_STEPS;
    chart.draw_series((0..n).map(|k| {
        let v0 = lo + (hi - lo) * k as f64 / n as f64;
        let v1 = lo + (hi - lo) * (k + 1) as f64 / n as f64;
        let t = (k as f64 + 0.5) / n as f64;
        Rectangle::new([(0.0, v0), (1.0, v1)], scale.cmap.eval(t).filled())
    }))?;

    let tick_formatter = |v: &f64| format_tick_value(*v, &scale.ticks);
    chart
        .configure_mesh()
        .disable_mesh()
        .disable_x_axis()
        .y_label_formatter(&tick_formatter)
        .y_label_style(style.ytick_font())
        .axis_style(style.foreground().stroke_width(1))
        .draw()?;

    if text_enabled && !scale.label.is_empty() {
        let (_, rows) = area.get_pixel_range();
        let (_, plot_rows) = chart.plotting_area().get_pixel_range();
        let center_y = (plot_rows.start + plot_rows.end) / 2 - rows.start;
        let label_style = style
            .label_font()
            .transform(FontTransform::Rotate270)
            .pos(Pos::new(HPos::Center, VPos::Center));
        area.draw(&Text::new(
            scale.label.clone(),
            (width as i32 - label_column / 2, center_y),
            label_style,
        ))?;
    }
    Ok(())
}

/// Draw a "Data Unavailable" message on a plot area.
pub fn draw_unavailable_message(
    area: &DrawingArea<BitMapBackend, Shift>,
    title: &str,
    reason: &str,
    text_enabled: bool,
) -> std::result::Result<(), Box<dyn Error>> {
    if !text_enabled {
        return Ok(());
    }
    // Constants for text rendering
    const CHAR_WIDTH_RATIO: f32 = 0.6; // Approximate character width relative to font size
    const MESSAGE_FONT_PX: i32 = 24;
    const LINE_HEIGHT_SPACING: i32 = 4;

    let (width, height) = area.dim_in_pixel();
    let message = format!("{title}\nData Unavailable: {reason}");

    let estimated_char_width = (MESSAGE_FONT_PX as f32 * CHAR_WIDTH_RATIO) as i32;
    let estimated_line_height = MESSAGE_FONT_PX + LINE_HEIGHT_SPACING;

    // Center each line on its own estimated width
    let lines: Vec<&str> = message.split('\n').collect();
    let block_height = lines.len() as i32 * estimated_line_height;
    let text_style = (FONT_FAMILY, MESSAGE_FONT_PX)
        .into_font()
        .color(&COLOR_UNAVAILABLE_TEXT);
    for (i, line) in lines.iter().enumerate() {
        let line_width = line.chars().count() as i32 * estimated_char_width;
        let x = width as i32 / 2 - line_width / 2;
        let y = height as i32 / 2 - block_height / 2 + i as i32 * estimated_line_height;
        area.draw(&Text::new(line.to_string(), (x, y), text_style.clone()))?;
    }
    Ok(())
}


// src/plot_framework.rs
