// src/constants.rs

use plotters::style::RGBColor;

// Figure sizes in inches (width, height).
pub const SINGLE_PANEL_FIGSIZE_IN: (f64, f64) = (18.0, 8.0);
pub const AZIMUTH_PANEL_WIDTH_IN: f64 = 18.0;
pub const AZIMUTH_PANEL_ROW_HEIGHT_IN: f64 = 5.0; // 5 rows -> 25 in

// Height axis is always fixed, whatever the data extent.
pub const HEIGHT_AXIS_MIN_M: f64 = 0.0;
pub const HEIGHT_AXIS_MAX_M: f64 = 12_000.0;
pub const HEIGHT_AXIS_TICK_STEP_M: f64 = 2_000.0;

// Plot identifiers that select a dedicated render path.
pub const PLOT_ID_AZIMUTH_PANEL: &str = "rad_wind_speed_panel";
pub const PLOT_ID_WIND_DIRECTION: &str = "hor_wind_dir";

// Wind direction colorbar: 9 evenly spaced ticks over 0..360 degrees.
pub const WIND_DIRECTION_TICK_MIN: f64 = 0.0;
pub const WIND_DIRECTION_TICK_MAX: f64 = 360.0;
pub const WIND_DIRECTION_TICK_COUNT: usize = 9;

// Render defaults.
pub const DEFAULT_COLORMAP: &str = "Spectral";
pub const DEFAULT_VMIN: f64 = -1.0;
pub const DEFAULT_VMAX: f64 = 1.0;
pub const DEFAULT_ELV_LABEL: &str = "90";
pub const DEFAULT_AZM_LABEL: &str = "-";
pub const DEFAULT_MAX_AZIMUTH_ROWS: usize = 5;

// Vertical observation filter.
pub const VERTICAL_ELEVATION_DEG: f64 = 90.0;
pub const ELEVATION_TOLERANCE_DEG: f64 = 0.5;
pub const DEFAULT_STATUS_VARIABLE: &str = "radial_wind_speed_status";
pub const DEFAULT_CNR_VARIABLE: &str = "cnr";

// Tick layout.
pub const MAX_TIME_TICKS: usize = 9;
pub const COLORBAR_TARGET_TICKS: usize = 7;
pub const COLORBAR_STEPS: usize = 256;
pub const COLORBAR_WIDTH_PX: u32 = 170;

// Export.
pub const TIGHT_BBOX_PAD_IN: f64 = 0.1;
pub const POINTS_PER_INCH: f64 = 72.0;

// Mesh area layout, in pixels at 100 dpi (scaled with the figure).
pub const CHART_MARGIN_PX: u32 = 10;
pub const X_LABEL_AREA_PX: u32 = 70;
pub const Y_LABEL_AREA_PX: u32 = 110;

// --- Style colors ---
pub const COLOR_GRID_DARK: RGBColor = RGBColor(80, 80, 80);
pub const COLOR_GRID_LIGHT: RGBColor = RGBColor(176, 176, 176);
pub const COLOR_UNAVAILABLE_TEXT: RGBColor = RGBColor(220, 50, 47);

// src/constants.rs
