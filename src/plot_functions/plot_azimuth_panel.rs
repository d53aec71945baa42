// src/plot_functions/plot_azimuth_panel.rs

use log::{debug, info, warn};

use crate::colormaps::Colormap;
use crate::constants::{
    AZIMUTH_PANEL_ROW_HEIGHT_IN, AZIMUTH_PANEL_WIDTH_IN, DEFAULT_MAX_AZIMUTH_ROWS,
};
use crate::data_input::DataArray;
use crate::error::{RenderError, Result};
use crate::font_config::ensure_fonts_registered;
use crate::plot_framework::{draw_time_height_panel, ColorScale, Figure, MeshPanel};
use crate::plot_functions::{colorbar_label, export_figure};
use crate::style::StyleConfig;
use crate::time_axis::{TimeAxis, TimeWindow};
use crate::types::{PlotOptions, RenderReport};

/// How many rows an azimuth panel figure has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelRows {
    /// One row per distinct azimuth, up to `PanelLayout::max_rows`
    Fit,
    /// Always this many rows; rows without an azimuth stay as bare axes
    Fixed(usize),
}

/// What happens when there are more azimuths than rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overflow {
    Error,
    /// Keep the lowest azimuths and warn about the rest
    Truncate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelLayout {
    pub rows: PanelRows,
    pub max_rows: usize,
    pub overflow: Overflow,
}

impl Default for PanelLayout {
    fn default() -> Self {
        Self {
            rows: PanelRows::Fit,
            max_rows: DEFAULT_MAX_AZIMUTH_ROWS,
            overflow: Overflow::Error,
        }
    }
}

/// Rows in the figure and how many of them carry an azimuth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelPlan {
    pub rows: usize,
    pub drawn: usize,
}

impl PanelLayout {
    /// Five fixed rows, extra azimuths silently cut (with a warning).
    pub fn legacy() -> Self {
        Self {
            rows: PanelRows::Fixed(DEFAULT_MAX_AZIMUTH_ROWS),
            max_rows: DEFAULT_MAX_AZIMUTH_ROWS,
            overflow: Overflow::Truncate,
        }
    }

    /// Row capacity: `max_rows` when fitting, the fixed count otherwise.
    pub fn capacity(&self) -> usize {
        match self.rows {
            PanelRows::Fit => self.max_rows,
            PanelRows::Fixed(n) => n,
        }
    }

    pub fn plan(&self, n_azimuths: usize) -> Result<PanelPlan> {
        let capacity = self.capacity();
        if n_azimuths > capacity {
            match self.overflow {
                Overflow::Error => {
                    return Err(RenderError::TooManyAzimuths {
                        found: n_azimuths,
                        max_rows: capacity,
                    })
                }
                Overflow::Truncate => warn!(
                    "{n_azimuths} azimuths but only {capacity} rows, dropping the last {}",
                    n_azimuths - capacity
                ),
            }
        }
        let drawn = n_azimuths.min(capacity);
        let rows = match self.rows {
            PanelRows::Fit => drawn,
            PanelRows::Fixed(n) => n,
        };
        Ok(PanelPlan { rows, drawn })
    }
}

/// Renders one time-height row per distinct azimuth of `data` (ascending).
///
/// Every row shares the time window, color scale and fixed height axis and
/// is titled with the first elevation of the scan and its azimuth.
pub fn plot_azimuth_panel(
    data: &DataArray,
    opts: &PlotOptions,
    layout: &PanelLayout,
    style: &StyleConfig,
) -> Result<RenderReport> {
    data.validate()?;
    let first_time = data.first_time()?;
    let output_path = opts.output_path(first_time)?;
    let window = TimeWindow::resolve(first_time, opts.min_time, opts.max_time)?;
    let cmap = Colormap::from_name(&opts.cmap)?;

    let azimuths = data.distinct_azimuths()?;
    let elevation = data.first_elevation()?;
    let plan = layout.plan(azimuths.len())?;
    if plan.rows == 0 {
        return Err(RenderError::EmptyData(data.name.clone()));
    }
    debug!(
        "'{}': azimuths {:?}, {} rows ({} drawn)",
        data.name, azimuths, plan.rows, plan.drawn
    );

    let rows_data: Vec<(f64, DataArray)> = azimuths[..plan.drawn]
        .iter()
        .map(|&azm| -> Result<(f64, DataArray)> {
            Ok((azm, data.sel_azimuth(azm)?.sel_time(&window)))
        })
        .collect::<Result<_>>()?;
    let panels: Vec<MeshPanel> = rows_data
        .iter()
        .map(|(azm, row)| MeshPanel {
            title: format!("elv: {elevation:?}, azm: {azm:?}"),
            data: Some(row),
        })
        .collect();

    let scale = ColorScale::new(cmap, opts.vmin, opts.vmax, colorbar_label(data));
    let time_axis = TimeAxis::new(window);
    let text_enabled = ensure_fonts_registered();

    let label = opts.plot_id.as_deref().unwrap_or(&data.name);
    let mut figure = Figure::new(
        label,
        (
            AZIMUTH_PANEL_WIDTH_IN,
            AZIMUTH_PANEL_ROW_HEIGHT_IN * plan.rows as f64,
        ),
        style.savefig_dpi,
        style.background(),
    );
    let bare = MeshPanel {
        title: String::new(),
        data: None,
    };
    let y_range = figure.draw(|root| {
        let areas = root.split_evenly((plan.rows, 1));
        let mut y_range = None;
        for (i, area) in areas.iter().enumerate() {
            let panel = panels.get(i).unwrap_or(&bare);
            let drawn = draw_time_height_panel(area, panel, &time_axis, &scale, style, text_enabled)?;
            y_range.get_or_insert(drawn);
        }
        y_range.ok_or_else(|| "figure has no panel rows".into())
    })?;
    let shown = export_figure(&figure, output_path.as_deref(), opts.show, style)?;
    info!(
        "rendered '{}' as {} azimuth rows ({})",
        data.name, plan.drawn, label
    );

    Ok(RenderReport {
        window,
        size_px: figure.size_px(),
        y_range,
        panels: plan.drawn,
        colorbar_ticks: scale.ticks,
        output_path,
        shown,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_layout_follows_azimuth_count() {
        let layout = PanelLayout::default();
        assert_eq!(layout.plan(3).unwrap(), PanelPlan { rows: 3, drawn: 3 });
        assert_eq!(layout.plan(5).unwrap(), PanelPlan { rows: 5, drawn: 5 });
        assert!(matches!(
            layout.plan(6),
            Err(RenderError::TooManyAzimuths {
                found: 6,
                max_rows: 5
            })
        ));
    }

    #[test]
    fn test_legacy_layout_truncates_and_keeps_five_rows() {
        let layout = PanelLayout::legacy();
        assert_eq!(layout.plan(2).unwrap(), PanelPlan { rows: 5, drawn: 2 });
        assert_eq!(layout.plan(7).unwrap(), PanelPlan { rows: 5, drawn: 5 });
    }

    #[test]
    fn test_fit_with_truncate() {
        let layout = PanelLayout {
            rows: PanelRows::Fit,
            max_rows: 2,
            overflow: Overflow::Truncate,
        };
        assert_eq!(layout.plan(4).unwrap(), PanelPlan { rows: 2, drawn: 2 });
        assert_eq!(layout.plan(0).unwrap(), PanelPlan { rows: 0, drawn: 0 });
    }
}

// src/plot_functions/plot_azimuth_panel.rs
