// src/main.rs

use std::error::Error;
use std::path::PathBuf;

use chrono::NaiveDateTime;
use clap::{Parser, ValueEnum};
use env_logger::{Builder, Target};
use log::info;

use scan_render::constants::{
    DEFAULT_AZM_LABEL, DEFAULT_COLORMAP, DEFAULT_ELV_LABEL, DEFAULT_MAX_AZIMUTH_ROWS,
    DEFAULT_VMAX, DEFAULT_VMIN,
};
use scan_render::data_input::parse_scan_file;
use scan_render::plot_functions::{Overflow, PanelLayout, PanelRows};
use scan_render::style::StyleConfig;
use scan_render::time_axis::parse_time;
use scan_render::types::PlotOptions;
use scan_render::visualizer::Visualizer;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Source {
    /// Measured variable, vertical slice through the default filter
    Original,
    /// Retrieved variable, plotted as stored
    Derived,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OverflowArg {
    Error,
    Truncate,
}

#[derive(Parser, Debug)]
#[command(name = "scan-render")]
#[command(version = scan_render::crate_version())]
#[command(about = "Time-height plots of radar/lidar scan variables")]
struct Args {
    /// Scan CSV file
    #[arg(short, long)]
    input: PathBuf,

    /// Variable to plot
    #[arg(short, long)]
    variable: String,

    #[arg(long, value_enum, default_value = "original")]
    source: Source,

    /// Output file suffix; `rad_wind_speed_panel` and `hor_wind_dir` select dedicated plots
    #[arg(long)]
    plot_id: Option<String>,

    #[arg(long, default_value = DEFAULT_COLORMAP)]
    cmap: String,

    #[arg(long, default_value_t = DEFAULT_VMIN, allow_negative_numbers = true)]
    vmin: f64,

    #[arg(long, default_value_t = DEFAULT_VMAX, allow_negative_numbers = true)]
    vmax: f64,

    /// Elevation shown in the title
    #[arg(long, default_value = DEFAULT_ELV_LABEL)]
    elv: String,

    /// Azimuth shown in the title
    #[arg(long, default_value = DEFAULT_AZM_LABEL)]
    azm: String,

    #[arg(long)]
    save: bool,

    /// Existing output directory
    #[arg(long)]
    fig_path: Option<PathBuf>,

    #[arg(long)]
    name_prefix: Option<String>,

    #[arg(long)]
    show: bool,

    #[arg(long, value_parser = parse_time_arg)]
    min_time: Option<NaiveDateTime>,

    #[arg(long, value_parser = parse_time_arg)]
    max_time: Option<NaiveDateTime>,

    /// JSON style file
    #[arg(long)]
    style: Option<PathBuf>,

    /// Azimuth panel rows: `fit` or a fixed count
    #[arg(long, default_value = "fit", value_parser = parse_panel_rows)]
    panel_rows: PanelRows,

    #[arg(long, default_value_t = DEFAULT_MAX_AZIMUTH_ROWS)]
    max_rows: usize,

    #[arg(long, value_enum, default_value = "error")]
    overflow: OverflowArg,
}

fn parse_time_arg(text: &str) -> Result<NaiveDateTime, String> {
    parse_time(text).map_err(|e| e.to_string())
}

fn parse_panel_rows(text: &str) -> Result<PanelRows, String> {
    if text.eq_ignore_ascii_case("fit") {
        return Ok(PanelRows::Fit);
    }
    match text.parse::<usize>() {
        Ok(n) if n > 0 => Ok(PanelRows::Fixed(n)),
        _ => Err(format!("expected 'fit' or a positive row count, got '{text}'")),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let mut builder = Builder::from_default_env();
    builder
        .target(Target::Stdout)
        .format_timestamp_secs()
        .format_module_path(false)
        .init();

    let args = Args::parse();
    info!("scan-render {}", scan_render::crate_version());

    let style = match &args.style {
        Some(path) => StyleConfig::from_json_file(path)?,
        None => StyleConfig::update_settings(),
    };
    let layout = PanelLayout {
        rows: args.panel_rows,
        max_rows: args.max_rows,
        overflow: match args.overflow {
            OverflowArg::Error => Overflow::Error,
            OverflowArg::Truncate => Overflow::Truncate,
        },
    };
    let opts = PlotOptions {
        cmap: args.cmap,
        vmin: args.vmin,
        vmax: args.vmax,
        elv: args.elv,
        azm: args.azm,
        save: args.save,
        plot_id: args.plot_id,
        kind: None,
        fig_path: args.fig_path,
        name_prefix: args.name_prefix,
        show: args.show,
        min_time: args.min_time,
        max_time: args.max_time,
    };

    let dataset = parse_scan_file(&args.input)?;
    let visualizer = Visualizer::new(&dataset)
        .with_style(style)
        .with_panel_layout(layout);

    let report = match args.source {
        Source::Original => visualizer.render_original_variable(&args.variable, &opts)?,
        Source::Derived => visualizer.render_derived_variable(&args.variable, &opts)?,
    };
    println!(
        "Rendered '{}' ({} panel(s), {} .. {}).",
        args.variable, report.panels, report.window.start, report.window.end
    );
    if report.output_path.is_none() && !report.shown {
        println!("  Nothing saved or shown; pass --save and/or --show.");
    }
    Ok(())
}

// src/main.rs
