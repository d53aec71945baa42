// src/data_input/scan_dataset.rs

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use ndarray::{Array2, Axis};

use crate::error::{RenderError, Result};
use crate::time_axis::TimeWindow;

/// Attribute holding the human-readable variable name used for labels.
pub const STANDARD_NAME: &str = "standard_name";
pub const UNITS: &str = "units";

/// Two azimuths closer than this are the same beam direction.
const AZIMUTH_EPSILON_DEG: f64 = 1e-6;

/// Coordinates shared by every variable of a scan grid.
///
/// `elv` and `azm` are beam geometry per time row: a scanning lidar points
/// one beam at a time, so each timestamp carries its own direction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Coords {
    pub time: Vec<NaiveDateTime>,
    pub range: Vec<f64>,
    pub elv: Option<Vec<f64>>,
    pub azm: Option<Vec<f64>>,
}

impl Coords {
    fn select_rows(&self, rows: &[usize]) -> Coords {
        let pick = |v: &Vec<f64>| rows.iter().map(|&i| v[i]).collect::<Vec<f64>>();
        Coords {
            time: rows.iter().map(|&i| self.time[i]).collect(),
            range: self.range.clone(),
            elv: self.elv.as_ref().map(pick),
            azm: self.azm.as_ref().map(pick),
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.time.len(), self.range.len())
    }
}

/// Values and attributes of one variable, stored on the dataset grid.
#[derive(Debug, Clone)]
pub struct Variable {
    pub values: Array2<f64>,
    pub attrs: BTreeMap<String, String>,
}

/// A labeled scan dataset: one `(time, range)` grid and the variables measured on it.
#[derive(Debug, Clone, Default)]
pub struct ScanDataset {
    pub attrs: BTreeMap<String, String>,
    coords: Coords,
    variables: BTreeMap<String, Variable>,
}

impl ScanDataset {
    pub fn new(coords: Coords) -> Self {
        Self {
            attrs: BTreeMap::new(),
            coords,
            variables: BTreeMap::new(),
        }
    }

    /// Adds a variable; its shape must match the `(time, range)` grid.
    pub fn add_variable(
        &mut self,
        name: &str,
        values: Array2<f64>,
        attrs: BTreeMap<String, String>,
    ) -> Result<()> {
        if values.dim() != self.coords.shape() {
            return Err(RenderError::Parse(format!(
                "variable '{name}' has shape {:?}, grid is {:?}",
                values.dim(),
                self.coords.shape()
            )));
        }
        self.variables
            .insert(name.to_string(), Variable { values, attrs });
        Ok(())
    }

    pub fn coords(&self) -> &Coords {
        &self.coords
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(String::as_str)
    }

    /// Raw grid values of a variable, without copying.
    pub fn values(&self, name: &str) -> Option<&Array2<f64>> {
        self.variables.get(name).map(|v| &v.values)
    }

    /// Extracts a variable as a standalone [`DataArray`].
    pub fn variable(&self, name: &str) -> Result<DataArray> {
        let var = self
            .variables
            .get(name)
            .ok_or_else(|| RenderError::MissingVariable(name.to_string()))?;
        Ok(DataArray {
            name: name.to_string(),
            coords: self.coords.clone(),
            values: var.values.clone(),
            attrs: var.attrs.clone(),
        })
    }
}

/// One variable with its own coordinates, the unit every renderer works on.
#[derive(Debug, Clone)]
pub struct DataArray {
    pub name: String,
    pub coords: Coords,
    pub values: Array2<f64>,
    pub attrs: BTreeMap<String, String>,
}

impl DataArray {
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    pub fn set_attr(&mut self, key: &str, value: &str) {
        self.attrs.insert(key.to_string(), value.to_string());
    }

    fn require_attr(&self, key: &str) -> Result<&str> {
        self.attr(key).ok_or_else(|| RenderError::MissingAttribute {
            variable: self.name.clone(),
            attribute: key.to_string(),
        })
    }

    /// The `standard_name` attribute; its absence is a schema error.
    pub fn standard_name(&self) -> Result<&str> {
        self.require_attr(STANDARD_NAME)
    }

    pub fn units(&self) -> Option<&str> {
        self.attr(UNITS)
    }

    /// Checks that values and beam geometry match the `(time, range)` coordinates.
    pub fn validate(&self) -> Result<()> {
        let mismatch = |detail: String| RenderError::ShapeMismatch {
            variable: self.name.clone(),
            detail,
        };
        if self.values.dim() != self.coords.shape() {
            return Err(mismatch(format!(
                "values are {:?}, coordinates are {:?}",
                self.values.dim(),
                self.coords.shape()
            )));
        }
        for (coord, label) in [(&self.coords.elv, "elv"), (&self.coords.azm, "azm")] {
            if let Some(values) = coord {
                if values.len() != self.coords.time.len() {
                    return Err(mismatch(format!(
                        "{label} has {} entries for {} time steps",
                        values.len(),
                        self.coords.time.len()
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn n_times(&self) -> usize {
        self.coords.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.time.is_empty() || self.coords.range.is_empty()
    }

    pub fn first_time(&self) -> Result<NaiveDateTime> {
        self.coords
            .time
            .first()
            .copied()
            .ok_or_else(|| RenderError::EmptyData(self.name.clone()))
    }

    /// Keeps the given time rows, in order.
    pub fn select_rows(&self, rows: &[usize]) -> DataArray {
        DataArray {
            name: self.name.clone(),
            coords: self.coords.select_rows(rows),
            values: self.values.select(Axis(0), rows),
            attrs: self.attrs.clone(),
        }
    }

    /// Restricts the data to an inclusive time window.
    pub fn sel_time(&self, window: &TimeWindow) -> DataArray {
        let rows: Vec<usize> = self
            .coords
            .time
            .iter()
            .enumerate()
            .filter(|(_, &t)| window.contains(t))
            .map(|(i, _)| i)
            .collect();
        self.select_rows(&rows)
    }

    fn require_coord<'a>(&'a self, coord: &'a Option<Vec<f64>>, name: &str) -> Result<&'a [f64]> {
        coord
            .as_deref()
            .ok_or_else(|| RenderError::MissingCoordinate {
                variable: self.name.clone(),
                coordinate: name.to_string(),
            })
    }

    pub fn elevations(&self) -> Result<&[f64]> {
        self.require_coord(&self.coords.elv, "elv")
    }

    pub fn azimuths(&self) -> Result<&[f64]> {
        self.require_coord(&self.coords.azm, "azm")
    }

    pub fn first_elevation(&self) -> Result<f64> {
        self.elevations()?
            .first()
            .copied()
            .ok_or_else(|| RenderError::EmptyData(self.name.clone()))
    }

    /// Distinct finite azimuths, ascending.
    pub fn distinct_azimuths(&self) -> Result<Vec<f64>> {
        let mut distinct: Vec<f64> = self
            .azimuths()?
            .iter()
            .copied()
            .filter(|a| a.is_finite())
            .collect();
        distinct.sort_by(|a, b| a.total_cmp(b));
        distinct.dedup_by(|a, b| (*a - *b).abs() < AZIMUTH_EPSILON_DEG);
        Ok(distinct)
    }

    /// Rows pointing at azimuth `azm`.
    pub fn sel_azimuth(&self, azm: f64) -> Result<DataArray> {
        let rows: Vec<usize> = self
            .azimuths()?
            .iter()
            .enumerate()
            .filter(|(_, &a)| (a - azm).abs() < AZIMUTH_EPSILON_DEG)
            .map(|(i, _)| i)
            .collect();
        Ok(self.select_rows(&rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_axis::parse_time;
    use ndarray::array;

    fn sample() -> DataArray {
        let mut attrs = BTreeMap::new();
        attrs.insert(STANDARD_NAME.to_string(), "radial_wind_speed".to_string());
        DataArray {
            name: "radial_wind_speed".to_string(),
            coords: Coords {
                time: vec![
                    parse_time("2021-01-01 00:00:00").unwrap(),
                    parse_time("2021-01-01 00:00:10").unwrap(),
                    parse_time("2021-01-01 00:00:20").unwrap(),
                    parse_time("2021-01-02 00:00:00").unwrap(),
                ],
                range: vec![100.0, 200.0],
                elv: Some(vec![75.0, 75.0, 90.0, 75.0]),
                azm: Some(vec![90.0, 0.0, 0.0, 90.0]),
            },
            values: array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0], [7.0, 8.0]],
            attrs,
        }
    }

    #[test]
    fn test_sel_time_is_inclusive() {
        let da = sample();
        let window = TimeWindow::full_day(da.first_time().unwrap());
        let sliced = da.sel_time(&window);
        assert_eq!(sliced.n_times(), 3);
        assert_eq!(sliced.values, array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]]);
        assert_eq!(sliced.coords.azm, Some(vec![90.0, 0.0, 0.0]));
    }

    #[test]
    fn test_distinct_azimuths_sorted() {
        assert_eq!(sample().distinct_azimuths().unwrap(), vec![0.0, 90.0]);
    }

    #[test]
    fn test_sel_azimuth_keeps_matching_rows() {
        let east = sample().sel_azimuth(90.0).unwrap();
        assert_eq!(east.values, array![[1.0, 2.0], [7.0, 8.0]]);
        assert_eq!(east.first_elevation().unwrap(), 75.0);
    }

    #[test]
    fn test_missing_metadata_is_reported() {
        let mut da = sample();
        da.attrs.clear();
        da.coords.azm = None;
        assert!(matches!(
            da.standard_name(),
            Err(RenderError::MissingAttribute { ref attribute, .. }) if attribute == STANDARD_NAME
        ));
        assert!(matches!(
            da.distinct_azimuths(),
            Err(RenderError::MissingCoordinate { ref coordinate, .. }) if coordinate == "azm"
        ));
    }

    #[test]
    fn test_dataset_rejects_mismatched_shape() {
        let coords = sample().coords;
        let mut ds = ScanDataset::new(coords);
        let bad = Array2::<f64>::zeros((2, 2));
        assert!(ds.add_variable("cnr", bad, BTreeMap::new()).is_err());
        let good = Array2::<f64>::zeros((4, 2));
        ds.add_variable("cnr", good, BTreeMap::new()).unwrap();
        assert!(ds.has_variable("cnr"));
        assert!(matches!(
            ds.variable("missing"),
            Err(RenderError::MissingVariable(_))
        ));
    }

    #[test]
    fn test_validate_catches_grid_mismatch() {
        assert!(sample().validate().is_ok());

        let mut short_values = sample();
        short_values.values = Array2::zeros((2, 2));
        assert!(matches!(
            short_values.validate(),
            Err(RenderError::ShapeMismatch { .. })
        ));

        let mut short_azm = sample();
        short_azm.coords.azm = Some(vec![0.0]);
        assert!(matches!(
            short_azm.validate(),
            Err(RenderError::ShapeMismatch { ref detail, .. }) if detail.starts_with("azm")
        ));
    }
}
