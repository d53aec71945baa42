// src/error.rs

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading scan data or rendering a figure.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("image encoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("style file error: {0}")]
    Json(#[from] serde_json::Error),

    /// Requested variable is not a field of the dataset
    #[error("variable '{0}' not found in dataset")]
    MissingVariable(String),

    /// Attribute metadata the renderer depends on is absent
    #[error("variable '{variable}' has no '{attribute}' attribute")]
    MissingAttribute { variable: String, attribute: String },

    /// Coordinate (azm, elv, ...) absent from the data
    #[error("variable '{variable}' has no '{coordinate}' coordinate")]
    MissingCoordinate {
        variable: String,
        coordinate: String,
    },

    /// Values and coordinates describe different grids
    #[error("variable '{variable}' does not match its coordinates: {detail}")]
    ShapeMismatch { variable: String, detail: String },

    #[error("variable '{0}' contains no time steps")]
    EmptyData(String),

    #[error("cannot parse time '{0}'")]
    InvalidTime(String),

    #[error("time window start {start} is after end {end}")]
    InvalidTimeWindow { start: String, end: String },

    #[error("unknown colormap '{0}'")]
    UnknownColormap(String),

    /// Azimuth panel would need more rows than the layout allows
    #[error("{found} distinct azimuths exceed the panel limit of {max_rows} rows")]
    TooManyAzimuths { found: usize, max_rows: usize },

    #[error("save requested without an output directory")]
    MissingOutputDir,

    #[error("save requested without a plot id")]
    MissingPlotId,

    #[error("output directory '{0}' does not exist")]
    OutputDirNotFound(PathBuf),

    #[error("drawing failed: {0}")]
    Drawing(String),

    #[error("cannot display figure: {0}")]
    Display(String),

    #[error("parse error: {0}")]
    Parse(String),
}

/// Type alias for Results using RenderError
pub type Result<T> = std::result::Result<T, RenderError>;
