// src/plot_functions/mod.rs

pub mod plot_azimuth_panel;
pub mod plot_single_panel;

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::data_input::{DataArray, STANDARD_NAME};
use crate::error::Result;
use crate::plot_framework::Figure;
use crate::style::StyleConfig;

pub use plot_azimuth_panel::{plot_azimuth_panel, Overflow, PanelLayout, PanelRows};
pub use plot_single_panel::plot_single_panel;

/// Colorbar label: `standard_name [units]`, the variable name when unnamed.
pub(crate) fn colorbar_label(data: &DataArray) -> String {
    let name = data.attr(STANDARD_NAME).unwrap_or(&data.name);
    match data.units() {
        Some(units) if !units.is_empty() => format!("{name} [{units}]"),
        _ => name.to_string(),
    }
}

/// Saves and/or shows a drawn figure. Returns whether it was shown.
pub(crate) fn export_figure(
    figure: &Figure,
    output_path: Option<&Path>,
    show: bool,
    style: &StyleConfig,
) -> Result<bool> {
    if let Some(path) = output_path {
        figure.save_png(path)?;
        println!("{}", resolved_path(path).display());
    }
    if show {
        let preview = figure.show(style.figure_dpi)?;
        info!("preview opened from '{}'", preview.display());
    }
    Ok(show)
}

/// Absolute form of a written file, the path itself when it cannot be resolved.
pub(crate) fn resolved_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolved_path_is_absolute() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("20210101_refl.png");
        fs::write(&file, b"png").unwrap();
        let resolved = resolved_path(&file);
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("20210101_refl.png"));

        let missing = Path::new("not/there.png");
        assert_eq!(resolved_path(missing), missing.to_path_buf());
    }
}

// src/plot_functions/mod.rs
