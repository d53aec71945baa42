// src/style.rs

use std::error::Error;
use std::fs;
use std::path::Path;

use log::debug;
use plotters::backend::BitMapBackend;
use plotters::chart::ChartContext;
use plotters::style::{Color, FontDesc, FontTransform, IntoFont, RGBColor, TextStyle, BLACK, WHITE};
use serde::{Deserialize, Serialize};

use crate::constants::{COLOR_GRID_DARK, COLOR_GRID_LIGHT};
use crate::error::Result;
use crate::font_config::{points_to_px, FONT_FAMILY};
use crate::plot_framework::MeshCoord;
use crate::time_axis::TimeAxis;

/// Base color scheme of a figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlotStyle {
    /// Black canvas, white text and axes
    DarkBackground,
    /// White canvas, black text and axes
    #[serde(rename = "default")]
    Light,
}

impl PlotStyle {
    pub fn background(self) -> RGBColor {
        match self {
            PlotStyle::DarkBackground => BLACK,
            PlotStyle::Light => WHITE,
        }
    }

    pub fn foreground(self) -> RGBColor {
        match self {
            PlotStyle::DarkBackground => WHITE,
            PlotStyle::Light => BLACK,
        }
    }

    pub fn grid_color(self) -> RGBColor {
        match self {
            PlotStyle::DarkBackground => COLOR_GRID_DARK,
            PlotStyle::Light => COLOR_GRID_LIGHT,
        }
    }
}

/// Plot appearance shared by every render call.
///
/// An immutable value: renders receive it explicitly, nothing is kept in
/// process-wide state. Font sizes are in points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub style: PlotStyle,
    pub figure_size_in: (f64, f64),
    pub figure_dpi: u32,
    pub savefig_dpi: u32,
    pub font_size: f64,
    pub legend_font_size: f64,
    pub figure_title_size: f64,
    pub xtick_label_size: f64,
    pub ytick_label_size: f64,
    pub axes_title_size: f64,
    pub axes_label_size: f64,
    pub legend_fancybox: bool,
    pub legend_frame_alpha: f64,
    pub legend_face_color: String,
    pub legend_frame_on: bool,
    pub line_width: f64,
    /// Degrees; only quarter turns are supported by the rasterizer
    pub x_tick_rotation: u32,
    pub grid: bool,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self::update_settings()
    }
}

impl StyleConfig {
    /// The canonical plot settings.
    pub fn update_settings() -> Self {
        Self {
            style: PlotStyle::DarkBackground,
            figure_size_in: (6.0, 6.0),
            figure_dpi: 80,
            savefig_dpi: 100,
            font_size: 16.0,
            legend_font_size: 16.0,
            figure_title_size: 16.0,
            xtick_label_size: 16.0,
            ytick_label_size: 16.0,
            axes_title_size: 16.0,
            axes_label_size: 16.0,
            legend_fancybox: true,
            legend_frame_alpha: 0.7,
            legend_face_color: "silver".to_string(),
            legend_frame_on: true,
            line_width: 5.0,
            x_tick_rotation: 0,
            grid: true,
        }
    }

    /// Loads a style from JSON; missing keys keep their canonical values.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let style: StyleConfig = serde_json::from_str(&text)?;
        debug!("loaded style from '{}'", path.display());
        Ok(style)
    }

    pub fn with_style(mut self, style: PlotStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_save_dpi(mut self, dpi: u32) -> Self {
        self.savefig_dpi = dpi.max(1);
        self
    }

    pub fn with_figure_dpi(mut self, dpi: u32) -> Self {
        self.figure_dpi = dpi.max(1);
        self
    }

    /// Sets every font size at once.
    pub fn with_font_size(mut self, points: f64) -> Self {
        self.font_size = points;
        self.legend_font_size = points;
        self.figure_title_size = points;
        self.xtick_label_size = points;
        self.ytick_label_size = points;
        self.axes_title_size = points;
        self.axes_label_size = points;
        self
    }

    pub fn with_grid(mut self, grid: bool) -> Self {
        self.grid = grid;
        self
    }

    pub fn background(&self) -> RGBColor {
        self.style.background()
    }

    pub fn foreground(&self) -> RGBColor {
        self.style.foreground()
    }

    fn font(&self, points: f64) -> FontDesc<'static> {
        (FONT_FAMILY, points_to_px(points, self.savefig_dpi)).into_font()
    }

    pub fn title_font(&self) -> TextStyle<'static> {
        self.font(self.axes_title_size).color(&self.foreground())
    }

    pub fn label_font(&self) -> TextStyle<'static> {
        self.font(self.axes_label_size).color(&self.foreground())
    }

    pub fn xtick_font(&self) -> TextStyle<'static> {
        let transform = match self.x_tick_rotation % 360 {
            90 => FontTransform::Rotate90,
            180 => FontTransform::Rotate180,
            270 => FontTransform::Rotate270,
            _ => FontTransform::None,
        };
        self.font(self.xtick_label_size)
            .color(&self.foreground())
            .transform(transform)
    }

    pub fn ytick_font(&self) -> TextStyle<'static> {
        self.font(self.ytick_label_size).color(&self.foreground())
    }

    /// Per-axes cosmetic pass: concise date ticks on x, tick rotation, grid.
    ///
    /// Axis descriptions are only drawn when `text_enabled`; tick labels are
    /// drawn wherever the chart has label areas.
    pub fn plot_setup<'c, 'a, 'b>(
        &self,
        chart: &'c mut ChartContext<'a, BitMapBackend<'b>, MeshCoord>,
        time_axis: &TimeAxis,
        y_desc: &str,
        text_enabled: bool,
    ) -> std::result::Result<&'c mut ChartContext<'a, BitMapBackend<'b>, MeshCoord>, Box<dyn Error>>
    {
        let x_formatter = |x: &f64| time_axis.format_tick(*x);
        let y_formatter = |y: &f64| format!("{y:.0}");
        let x_desc = format!("time ({})", time_axis.offset_label());

        {
            let mut mesh = chart.configure_mesh();
            mesh.x_label_formatter(&x_formatter)
                .y_label_formatter(&y_formatter)
                .x_label_style(self.xtick_font())
                .y_label_style(self.ytick_font())
                .axis_desc_style(self.label_font())
                .axis_style(self.foreground().stroke_width(1))
                .bold_line_style(self.style.grid_color().stroke_width(1))
                .light_line_style(self.background().mix(0.0));
            if text_enabled {
                mesh.x_desc(x_desc).y_desc(y_desc);
            }
            if !self.grid {
                mesh.disable_mesh();
            }
            mesh.draw()?;
        }
        Ok(chart)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_canonical_settings() {
        let s = StyleConfig::update_settings();
        assert_eq!(s.style, PlotStyle::DarkBackground);
        assert_eq!(s.figure_size_in, (6.0, 6.0));
        assert_eq!(s.figure_dpi, 80);
        assert_eq!(s.savefig_dpi, 100);
        for size in [
            s.font_size,
            s.legend_font_size,
            s.figure_title_size,
            s.xtick_label_size,
            s.ytick_label_size,
            s.axes_title_size,
            s.axes_label_size,
        ] {
            assert_eq!(size, 16.0);
        }
        assert!(s.legend_fancybox);
        assert_eq!(s.legend_frame_alpha, 0.7);
        assert_eq!(s.legend_face_color, "silver");
        assert!(s.legend_frame_on);
        assert_eq!(s.line_width, 5.0);
        assert_eq!(s.x_tick_rotation, 0);
        assert!(s.grid);
        assert_eq!(s, StyleConfig::default());
    }

    #[test]
    fn test_builders_return_new_values() {
        let base = StyleConfig::update_settings();
        let light = base.clone().with_style(PlotStyle::Light).with_font_size(10.0);
        assert_eq!(base.style, PlotStyle::DarkBackground);
        assert_eq!(light.background(), WHITE);
        assert_eq!(light.axes_label_size, 10.0);
        assert_eq!(base.with_save_dpi(0).savefig_dpi, 1);
    }

    #[test]
    fn test_dark_background_colors() {
        let s = StyleConfig::update_settings();
        assert_eq!(s.background(), BLACK);
        assert_eq!(s.foreground(), WHITE);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"style": "default", "savefig_dpi": 150}}"#).unwrap();
        let s = StyleConfig::from_json_file(file.path()).unwrap();
        assert_eq!(s.style, PlotStyle::Light);
        assert_eq!(s.savefig_dpi, 150);
        assert_eq!(s.figure_dpi, 80);
        assert!(s.grid);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            StyleConfig::from_json_file(file.path()),
            Err(crate::error::RenderError::Json(_))
        ));
    }
}
