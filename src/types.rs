// src/types.rs
// Option and result types shared by every render path

use std::ops::Range;
use std::path::PathBuf;

use chrono::NaiveDateTime;

use crate::constants::{
    DEFAULT_AZM_LABEL, DEFAULT_COLORMAP, DEFAULT_ELV_LABEL, DEFAULT_VMAX, DEFAULT_VMIN,
    PLOT_ID_AZIMUTH_PANEL, PLOT_ID_WIND_DIRECTION,
};
use crate::error::{RenderError, Result};
use crate::time_axis::TimeWindow;

/// Which render path a plot takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotKind {
    /// One time-height panel of the vertical observation slice
    SinglePanel,
    /// One row per scan azimuth, drawn from the unfiltered variable
    AzimuthPanel,
    /// Single panel with a compass colorbar (0 to 360 degrees)
    WindDirection,
}

impl PlotKind {
    pub fn from_plot_id(plot_id: &str) -> Self {
        match plot_id {
            PLOT_ID_AZIMUTH_PANEL => PlotKind::AzimuthPanel,
            PLOT_ID_WIND_DIRECTION => PlotKind::WindDirection,
            _ => PlotKind::SinglePanel,
        }
    }
}

/// Per-call plot parameters.
#[derive(Debug, Clone)]
pub struct PlotOptions {
    pub cmap: String,
    pub vmin: f64,
    pub vmax: f64,
    /// Elevation shown in the title; display only
    pub elv: String,
    /// Azimuth shown in the title; display only
    pub azm: String,
    pub save: bool,
    /// Output file suffix; also selects the plot kind unless `kind` is set
    pub plot_id: Option<String>,
    pub kind: Option<PlotKind>,
    pub fig_path: Option<PathBuf>,
    pub name_prefix: Option<String>,
    pub show: bool,
    pub min_time: Option<NaiveDateTime>,
    pub max_time: Option<NaiveDateTime>,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            cmap: DEFAULT_COLORMAP.to_string(),
            vmin: DEFAULT_VMIN,
            vmax: DEFAULT_VMAX,
            elv: DEFAULT_ELV_LABEL.to_string(),
            azm: DEFAULT_AZM_LABEL.to_string(),
            save: false,
            plot_id: None,
            kind: None,
            fig_path: None,
            name_prefix: None,
            show: false,
            min_time: None,
            max_time: None,
        }
    }
}

impl PlotOptions {
    pub fn with_plot_id(mut self, plot_id: &str) -> Self {
        self.plot_id = Some(plot_id.to_string());
        self
    }

    pub fn with_range(mut self, vmin: f64, vmax: f64) -> Self {
        self.vmin = vmin;
        self.vmax = vmax;
        self
    }

    /// Enables saving into `dir`.
    pub fn saving_to(mut self, dir: impl Into<PathBuf>) -> Self {
        self.save = true;
        self.fig_path = Some(dir.into());
        self
    }

    pub fn with_time_bounds(
        mut self,
        min_time: Option<NaiveDateTime>,
        max_time: Option<NaiveDateTime>,
    ) -> Self {
        self.min_time = min_time;
        self.max_time = max_time;
        self
    }

    /// Explicit kind if given, otherwise derived from the plot id.
    pub fn resolved_kind(&self) -> PlotKind {
        self.kind.unwrap_or_else(|| {
            self.plot_id
                .as_deref()
                .map(PlotKind::from_plot_id)
                .unwrap_or(PlotKind::SinglePanel)
        })
    }

    /// `<fig_path>/<YYYYMMDD>_<plot_id>.png` when saving, dated by `first_time`.
    ///
    /// Checked before anything is drawn; the directory is never created.
    pub fn output_path(&self, first_time: NaiveDateTime) -> Result<Option<PathBuf>> {
        if !self.save {
            return Ok(None);
        }
        let dir = self.fig_path.as_ref().ok_or(RenderError::MissingOutputDir)?;
        let plot_id = self.plot_id.as_deref().ok_or(RenderError::MissingPlotId)?;
        if !dir.is_dir() {
            return Err(RenderError::OutputDirNotFound(dir.clone()));
        }
        Ok(Some(dir.join(format!(
            "{}_{}.png",
            first_time.format("%Y%m%d"),
            plot_id
        ))))
    }
}

/// What a render call produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderReport {
    pub window: TimeWindow,
    /// Canvas size before the tight crop
    pub size_px: (u32, u32),
    /// Height axis limits of the drawn panels
    pub y_range: Range<f64>,
    /// Panel rows that carry data
    pub panels: usize,
    pub colorbar_ticks: Vec<f64>,
    pub output_path: Option<PathBuf>,
    pub shown: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_axis::parse_time;

    #[test]
    fn test_kind_from_plot_id() {
        assert_eq!(
            PlotKind::from_plot_id("rad_wind_speed_panel"),
            PlotKind::AzimuthPanel
        );
        assert_eq!(
            PlotKind::from_plot_id("hor_wind_dir"),
            PlotKind::WindDirection
        );
        assert_eq!(PlotKind::from_plot_id("refl"), PlotKind::SinglePanel);
    }

    #[test]
    fn test_explicit_kind_wins() {
        let mut opts = PlotOptions::default().with_plot_id("hor_wind_dir");
        assert_eq!(opts.resolved_kind(), PlotKind::WindDirection);
        opts.kind = Some(PlotKind::SinglePanel);
        assert_eq!(opts.resolved_kind(), PlotKind::SinglePanel);
        assert_eq!(PlotOptions::default().resolved_kind(), PlotKind::SinglePanel);
    }

    #[test]
    fn test_defaults() {
        let opts = PlotOptions::default();
        assert_eq!(opts.cmap, "Spectral");
        assert_eq!((opts.vmin, opts.vmax), (-1.0, 1.0));
        assert_eq!(opts.elv, "90");
        assert_eq!(opts.azm, "-");
        assert!(!opts.save && !opts.show);
    }

    #[test]
    fn test_output_path_naming_and_checks() {
        let first = parse_time("2021-01-01 00:10:00").unwrap();
        assert_eq!(PlotOptions::default().output_path(first).unwrap(), None);

        let dir = tempfile::tempdir().unwrap();
        let opts = PlotOptions::default()
            .with_plot_id("refl")
            .saving_to(dir.path());
        assert_eq!(
            opts.output_path(first).unwrap(),
            Some(dir.path().join("20210101_refl.png"))
        );

        let mut no_dir = opts.clone();
        no_dir.fig_path = None;
        assert!(matches!(
            no_dir.output_path(first),
            Err(RenderError::MissingOutputDir)
        ));

        let mut no_id = opts.clone();
        no_id.plot_id = None;
        assert!(matches!(
            no_id.output_path(first),
            Err(RenderError::MissingPlotId)
        ));

        let missing = opts.saving_to(dir.path().join("nope"));
        assert!(matches!(
            missing.output_path(first),
            Err(RenderError::OutputDirNotFound(_))
        ));
    }
}
