// src/plot_functions/plot_single_panel.rs

use log::{debug, info};
use ndarray::Array1;

use crate::colormaps::Colormap;
use crate::constants::{
    SINGLE_PANEL_FIGSIZE_IN, WIND_DIRECTION_TICK_COUNT, WIND_DIRECTION_TICK_MAX,
    WIND_DIRECTION_TICK_MIN,
};
use crate::data_input::{DataArray, STANDARD_NAME};
use crate::error::Result;
use crate::font_config::ensure_fonts_registered;
use crate::plot_framework::{draw_time_height_panel, ColorScale, Figure, MeshPanel};
use crate::plot_functions::{colorbar_label, export_figure};
use crate::style::StyleConfig;
use crate::time_axis::{TimeAxis, TimeWindow};
use crate::types::{PlotKind, PlotOptions, RenderReport};

/// Renders one time-height panel of `data`.
///
/// The time window defaults to the calendar day of the first timestamp;
/// `display_name`, when given, replaces the `standard_name` shown on the
/// colorbar. Output naming and directory checks happen before drawing.
pub fn plot_single_panel(
    data: &DataArray,
    opts: &PlotOptions,
    display_name: Option<&str>,
    style: &StyleConfig,
) -> Result<RenderReport> {
    data.validate()?;
    let first_time = data.first_time()?;
    let output_path = opts.output_path(first_time)?;
    let window = TimeWindow::resolve(first_time, opts.min_time, opts.max_time)?;
    let cmap = Colormap::from_name(&opts.cmap)?;

    let mut sliced = data.sel_time(&window);
    if let Some(name) = display_name {
        sliced.set_attr(STANDARD_NAME, name);
    }
    debug!(
        "'{}': {} of {} time steps in {} .. {}",
        data.name,
        sliced.n_times(),
        data.n_times(),
        window.start,
        window.end
    );

    let mut scale = ColorScale::new(cmap, opts.vmin, opts.vmax, colorbar_label(&sliced));
    if opts.resolved_kind() == PlotKind::WindDirection {
        scale = scale.with_ticks(
            Array1::linspace(
                WIND_DIRECTION_TICK_MIN,
                WIND_DIRECTION_TICK_MAX,
                WIND_DIRECTION_TICK_COUNT,
            )
            .to_vec(),
        );
    }

    let time_axis = TimeAxis::new(window);
    let text_enabled = ensure_fonts_registered();
    let panel = MeshPanel {
        title: format!("elv: {}, azm: {}", opts.elv, opts.azm),
        data: Some(&sliced),
    };

    let label = opts.plot_id.as_deref().unwrap_or(&data.name);
    let mut figure = Figure::new(
        label,
        SINGLE_PANEL_FIGSIZE_IN,
        style.savefig_dpi,
        style.background(),
    );
    let y_range = figure.draw(|root| {
        draw_time_height_panel(root, &panel, &time_axis, &scale, style, text_enabled)
    })?;
    let shown = export_figure(&figure, output_path.as_deref(), opts.show, style)?;
    info!("rendered '{}' ({})", data.name, label);

    Ok(RenderReport {
        window,
        size_px: figure.size_px(),
        y_range,
        panels: 1,
        colorbar_ticks: scale.ticks,
        output_path,
        shown,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_input::Coords;
    use crate::error::RenderError;
    use crate::time_axis::parse_time;
    use ndarray::Array2;
    use std::collections::BTreeMap;

    fn sample(times: &[&str]) -> DataArray {
        let mut attrs = BTreeMap::new();
        attrs.insert(STANDARD_NAME.to_string(), "wind_from_direction".to_string());
        DataArray {
            name: "hor_wind_dir".to_string(),
            coords: Coords {
                time: times.iter().map(|t| parse_time(t).unwrap()).collect(),
                range: vec![100.0, 200.0, 300.0],
                elv: None,
                azm: None,
            },
            values: Array2::from_elem((times.len(), 3), 180.0),
            attrs,
        }
    }

    #[test]
    fn test_wind_direction_ticks() {
        let data = sample(&["2021-01-01 00:00:00", "2021-01-01 00:10:00"]);
        let opts = PlotOptions::default()
            .with_plot_id("hor_wind_dir")
            .with_range(0.0, 360.0);
        let style = StyleConfig::update_settings().with_save_dpi(20);
        let report = plot_single_panel(&data, &opts, None, &style).unwrap();
        assert_eq!(
            report.colorbar_ticks,
            vec![0.0, 45.0, 90.0, 135.0, 180.0, 225.0, 270.0, 315.0, 360.0]
        );
        assert_eq!(report.panels, 1);
        assert_eq!(report.size_px, (360, 160));
        assert!(report.output_path.is_none());
    }

    #[test]
    fn test_window_outside_data_still_renders() {
        let data = sample(&["2021-01-01 00:00:00"]);
        let opts = PlotOptions::default().with_time_bounds(
            Some(parse_time("2021-01-01 12:00:00").unwrap()),
            Some(parse_time("2021-01-01 13:00:00").unwrap()),
        );
        let style = StyleConfig::update_settings().with_save_dpi(20);
        let report = plot_single_panel(&data, &opts, Some("x"), &style).unwrap();
        assert_eq!(report.window.start, parse_time("2021-01-01 12:00:00").unwrap());
    }

    #[test]
    fn test_unknown_colormap_fails_before_drawing() {
        let data = sample(&["2021-01-01 00:00:00"]);
        let mut opts = PlotOptions::default();
        opts.cmap = "nope".to_string();
        let result = plot_single_panel(&data, &opts, None, &StyleConfig::default());
        assert!(matches!(result, Err(RenderError::UnknownColormap(_))));
    }

    #[test]
    fn test_values_shorter_than_time_axis_are_rejected() {
        let mut data = sample(&[
            "2021-01-01 00:00:00",
            "2021-01-01 00:10:00",
            "2021-01-01 00:20:00",
        ]);
        data.values = Array2::zeros((2, 2));
        let result = plot_single_panel(&data, &PlotOptions::default(), None, &StyleConfig::default());
        assert!(matches!(result, Err(RenderError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_empty_data_is_an_error() {
        let data = sample(&[]);
        let result = plot_single_panel(&data, &PlotOptions::default(), None, &StyleConfig::default());
        assert!(matches!(result, Err(RenderError::EmptyData(_))));
    }
}

// src/plot_functions/plot_single_panel.rs
