// src/filtering.rs

use log::debug;
use ndarray::Zip;

use crate::constants::{
    DEFAULT_CNR_VARIABLE, DEFAULT_STATUS_VARIABLE, ELEVATION_TOLERANCE_DEG,
    VERTICAL_ELEVATION_DEG,
};
use crate::data_input::{DataArray, ScanDataset};
use crate::error::Result;

/// Extracts the vertically-pointing component of a scan variable.
///
/// The renderer only depends on this seam, so callers can plug in their own
/// quality control.
pub trait VerticalObsFilter {
    fn get_vertical_obs_comp(&self, data: &ScanDataset, variable: &str) -> Result<DataArray>;
}

impl<T: VerticalObsFilter + ?Sized> VerticalObsFilter for &T {
    fn get_vertical_obs_comp(&self, data: &ScanDataset, variable: &str) -> Result<DataArray> {
        (**self).get_vertical_obs_comp(data, variable)
    }
}

/// Default vertical observation filter.
///
/// Keeps the rows whose elevation is 90 degrees, then masks cells flagged as
/// invalid by the status variable and, if a threshold is set, cells whose
/// carrier-to-noise ratio is too low.
#[derive(Debug, Clone)]
pub struct VerticalFilter {
    pub elevation_deg: f64,
    pub tolerance_deg: f64,
    /// Status variable (1 = valid); skipped when the dataset lacks it
    pub status_variable: Option<String>,
    pub cnr_variable: String,
    /// Minimum CNR in dB, `None` disables the check
    pub cnr_threshold: Option<f64>,
}

impl Default for VerticalFilter {
    fn default() -> Self {
        Self {
            elevation_deg: VERTICAL_ELEVATION_DEG,
            tolerance_deg: ELEVATION_TOLERANCE_DEG,
            status_variable: Some(DEFAULT_STATUS_VARIABLE.to_string()),
            cnr_variable: DEFAULT_CNR_VARIABLE.to_string(),
            cnr_threshold: None,
        }
    }
}

impl VerticalFilter {
    pub fn with_cnr_threshold(mut self, threshold_db: f64) -> Self {
        self.cnr_threshold = Some(threshold_db);
        self
    }

    pub fn without_status(mut self) -> Self {
        self.status_variable = None;
        self
    }
}

impl VerticalObsFilter for VerticalFilter {
    fn get_vertical_obs_comp(&self, data: &ScanDataset, variable: &str) -> Result<DataArray> {
        let mut full = data.variable(variable)?;

        if let Some(status_name) = &self.status_variable {
            match data.values(status_name) {
                Some(status) => {
                    Zip::from(&mut full.values).and(status).for_each(|v, &s| {
                        if s != 1.0 {
                            *v = f64::NAN;
                        }
                    });
                }
                None => debug!("no '{status_name}' variable, status mask skipped"),
            }
        }

        if let Some(threshold) = self.cnr_threshold {
            match data.values(&self.cnr_variable) {
                Some(cnr) => {
                    // NaN CNR fails the comparison and is masked too
                    Zip::from(&mut full.values).and(cnr).for_each(|v, &c| {
                        if !(c >= threshold) {
                            *v = f64::NAN;
                        }
                    });
                }
                None => debug!("no '{}' variable, CNR mask skipped", self.cnr_variable),
            }
        }

        let rows: Vec<usize> = full
            .elevations()?
            .iter()
            .enumerate()
            .filter(|(_, &e)| (e - self.elevation_deg).abs() <= self.tolerance_deg)
            .map(|(i, _)| i)
            .collect();
        debug!(
            "'{variable}': {} of {} rows are vertical",
            rows.len(),
            full.n_times()
        );
        Ok(full.select_rows(&rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_input::{Coords, STANDARD_NAME};
    use crate::error::RenderError;
    use crate::time_axis::parse_time;
    use ndarray::array;
    use std::collections::BTreeMap;

    fn dataset(with_geometry: bool) -> ScanDataset {
        let coords = Coords {
            time: vec![
                parse_time("2021-01-01 00:00:00").unwrap(),
                parse_time("2021-01-01 00:00:10").unwrap(),
                parse_time("2021-01-01 00:00:20").unwrap(),
            ],
            range: vec![100.0, 200.0],
            elv: with_geometry.then(|| vec![90.0, 75.0, 90.0]),
            azm: with_geometry.then(|| vec![0.0, 90.0, 0.0]),
        };
        let mut ds = ScanDataset::new(coords);
        let mut attrs = BTreeMap::new();
        attrs.insert(STANDARD_NAME.to_string(), "radial_wind_speed".to_string());
        ds.add_variable(
            "radial_wind_speed",
            array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]],
            attrs,
        )
        .unwrap();
        ds.add_variable(
            DEFAULT_STATUS_VARIABLE,
            array![[1.0, 0.0], [1.0, 1.0], [1.0, 1.0]],
            BTreeMap::new(),
        )
        .unwrap();
        ds.add_variable(
            "cnr",
            array![[-10.0, -10.0], [-10.0, -10.0], [-30.0, -10.0]],
            BTreeMap::new(),
        )
        .unwrap();
        ds
    }

    #[test]
    fn test_keeps_vertical_rows_and_masks_status() {
        let vertical = VerticalFilter::default()
            .get_vertical_obs_comp(&dataset(true), "radial_wind_speed")
            .unwrap();
        assert_eq!(vertical.n_times(), 2);
        assert_eq!(vertical.values[[0, 0]], 1.0);
        assert!(vertical.values[[0, 1]].is_nan());
        assert_eq!(vertical.values[[1, 0]], 5.0);
        assert_eq!(vertical.standard_name().unwrap(), "radial_wind_speed");
    }

    #[test]
    fn test_cnr_threshold_masks_weak_signal() {
        let vertical = VerticalFilter::default()
            .without_status()
            .with_cnr_threshold(-25.0)
            .get_vertical_obs_comp(&dataset(true), "radial_wind_speed")
            .unwrap();
        assert_eq!(vertical.values[[0, 1]], 2.0);
        assert!(vertical.values[[1, 0]].is_nan());
        assert_eq!(vertical.values[[1, 1]], 6.0);
    }

    #[test]
    fn test_requires_elevation() {
        let result =
            VerticalFilter::default().get_vertical_obs_comp(&dataset(false), "radial_wind_speed");
        assert!(matches!(
            result,
            Err(RenderError::MissingCoordinate { ref coordinate, .. }) if coordinate == "elv"
        ));
    }
}
