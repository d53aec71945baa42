// src/lib.rs - Library interface for the scan renderer

pub mod colormaps;
pub mod constants;
pub mod data_input;
pub mod error;
pub mod filtering;
pub mod font_config;
pub mod plot_framework;
pub mod plot_functions;
pub mod style;
pub mod time_axis;
pub mod types;
pub mod visualizer;

pub use data_input::{parse_scan_file, DataArray, ScanDataset};
pub use error::{RenderError, Result};
pub use filtering::{VerticalFilter, VerticalObsFilter};
pub use plot_functions::{Overflow, PanelLayout, PanelRows};
pub use style::{PlotStyle, StyleConfig};
pub use types::{PlotKind, PlotOptions, RenderReport};
pub use visualizer::Visualizer;

pub fn crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
