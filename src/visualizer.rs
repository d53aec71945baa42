// src/visualizer.rs

use log::debug;

use crate::data_input::{DataArray, ScanDataset};
use crate::error::Result;
use crate::filtering::{VerticalFilter, VerticalObsFilter};
use crate::plot_functions::{plot_azimuth_panel, plot_single_panel, PanelLayout};
use crate::style::StyleConfig;
use crate::types::{PlotKind, PlotOptions, RenderReport};

/// Renders variables of one scan dataset as time-height figures.
///
/// The dataset is borrowed for the renderer's lifetime and never modified.
/// Each call builds, exports and closes its own figure.
pub struct Visualizer<'a, F: VerticalObsFilter = VerticalFilter> {
    dataset: &'a ScanDataset,
    style: StyleConfig,
    filter: F,
    layout: PanelLayout,
}

impl<'a> Visualizer<'a, VerticalFilter> {
    pub fn new(dataset: &'a ScanDataset) -> Self {
        Self {
            dataset,
            style: StyleConfig::update_settings(),
            filter: VerticalFilter::default(),
            layout: PanelLayout::default(),
        }
    }
}

impl<'a, F: VerticalObsFilter> Visualizer<'a, F> {
    pub fn with_style(mut self, style: StyleConfig) -> Self {
        self.style = style;
        self
    }

    pub fn with_panel_layout(mut self, layout: PanelLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_filter<G: VerticalObsFilter>(self, filter: G) -> Visualizer<'a, G> {
        Visualizer {
            dataset: self.dataset,
            style: self.style,
            filter,
            layout: self.layout,
        }
    }

    pub fn dataset(&self) -> &ScanDataset {
        self.dataset
    }

    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    /// Plots a measured variable.
    ///
    /// Azimuth panels use the variable as stored; every other kind plots
    /// its vertical observation slice, labelled by its `standard_name`.
    pub fn render_original_variable(&self, name: &str, opts: &PlotOptions) -> Result<RenderReport> {
        if opts.resolved_kind() == PlotKind::AzimuthPanel {
            let raw = self.dataset.variable(name)?;
            return self.render_azimuth_panel(&raw, opts);
        }
        let vertical = self.filter.get_vertical_obs_comp(self.dataset, name)?;
        let display_name = display_name(&vertical, opts.name_prefix.as_deref())?;
        debug!("original variable '{name}' shown as '{display_name}'");
        self.render_single_panel(&vertical, opts, Some(&display_name))
    }

    /// Plots a retrieved variable straight from the dataset.
    ///
    /// `name_prefix` is applied here as well, so retrieved and measured
    /// variables are labeled alike. Older lidar tooling ignored the prefix
    /// for retrieved variables; pass no prefix to get its labels.
    pub fn render_derived_variable(&self, name: &str, opts: &PlotOptions) -> Result<RenderReport> {
        let data = self.dataset.variable(name)?;
        let display_name = display_name(&data, opts.name_prefix.as_deref())?;
        debug!("derived variable '{name}' shown as '{display_name}'");
        self.render_single_panel(&data, opts, Some(&display_name))
    }

    pub fn render_single_panel(
        &self,
        data: &DataArray,
        opts: &PlotOptions,
        display_name: Option<&str>,
    ) -> Result<RenderReport> {
        plot_single_panel(data, opts, display_name, &self.style)
    }

    pub fn render_azimuth_panel(&self, data: &DataArray, opts: &PlotOptions) -> Result<RenderReport> {
        plot_azimuth_panel(data, opts, &self.layout, &self.style)
    }
}

/// `standard_name`, or `{prefix}_{standard_name}` with a prefix.
fn display_name(data: &DataArray, prefix: Option<&str>) -> Result<String> {
    let standard_name = data.standard_name()?;
    Ok(match prefix {
        Some(prefix) => format!("{prefix}_{standard_name}"),
        None => standard_name.to_string(),
    })
}


// src/visualizer.rs
