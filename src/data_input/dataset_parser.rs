// src/data_input/dataset_parser.rs

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use chrono::NaiveDateTime;
use csv::ReaderBuilder;
use log::{debug, info, warn};
use ndarray::Array2;

use crate::data_input::scan_dataset::{Coords, ScanDataset};
use crate::error::{RenderError, Result};
use crate::time_axis::parse_time;

const TIME_HEADER: &str = "time";
const RANGE_HEADER: &str = "range";
const ELV_HEADER: &str = "elv";
const AZM_HEADER: &str = "azm";

/// Parses a long-format scan CSV file into a [`ScanDataset`].
///
/// Layout:
/// 1. Optional `key,value` metadata lines before the header. `<variable>.<attr>`
///    keys become variable attributes, anything else a dataset attribute.
///    Lines starting with `#` are comments.
/// 2. A header row whose first field is `time`. Columns `time` and `range` are
///    required, `elv` and `azm` optional; every other column is a variable.
/// 3. One row per `(time, range)` sample.
pub fn parse_scan_file(input_file_path: &Path) -> Result<ScanDataset> {
    info!("Reading scan file '{}'", input_file_path.display());
    let file = File::open(input_file_path)?;
    parse_scan_reader(BufReader::new(file))
}

/// Same as [`parse_scan_file`] for any buffered reader.
pub fn parse_scan_reader<R: Read>(reader: BufReader<R>) -> Result<ScanDataset> {
    // --- Metadata Extraction ---
    let mut metadata: Vec<(String, String)> = Vec::new();
    let mut csv_lines: Vec<String> = Vec::new();
    let mut found_csv_headers = false;

    for line_result in reader.lines() {
        let line = line_result?;
        let trimmed_line = line.trim();
        if trimmed_line.is_empty() || trimmed_line.starts_with('#') {
            continue;
        }

        if found_csv_headers {
            csv_lines.push(line);
            continue;
        }

        let first_field = trimmed_line.split(',').next().unwrap_or("").trim();
        if first_field.trim_matches('"') == TIME_HEADER {
            found_csv_headers = true;
            csv_lines.push(line);
            continue;
        }

        // Metadata line (key-value pair), quoted values may contain commas
        let mut rdr = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(trimmed_line.as_bytes());
        if let Some(Ok(record)) = rdr.records().next() {
            if record.len() >= 2 {
                let key = record.get(0).unwrap_or("").trim().to_string();
                let value = record.get(1).unwrap_or("").trim().to_string();
                if !key.is_empty() {
                    metadata.push((key, value));
                }
            }
        }
    }

    if !found_csv_headers {
        return Err(RenderError::Parse(
            "could not find a header row starting with 'time'".to_string(),
        ));
    }
    debug!("Extracted {} metadata entries", metadata.len());

    let csv_content = csv_lines.join("\n");
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(csv_content.as_bytes());
    let header_record = reader.headers()?.clone();

    let position = |name: &str| header_record.iter().position(|h| h == name);
    let time_idx = position(TIME_HEADER)
        .ok_or_else(|| RenderError::Parse("missing 'time' column".to_string()))?;
    let range_idx = position(RANGE_HEADER)
        .ok_or_else(|| RenderError::Parse("missing 'range' column".to_string()))?;
    let elv_idx = position(ELV_HEADER);
    let azm_idx = position(AZM_HEADER);

    let variable_columns: Vec<(usize, String)> = header_record
        .iter()
        .enumerate()
        .filter(|(_, h)| ![TIME_HEADER, RANGE_HEADER, ELV_HEADER, AZM_HEADER].contains(h))
        .map(|(i, h)| (i, h.to_string()))
        .collect();
    if variable_columns.is_empty() {
        warn!("Scan file has no variable columns");
    }

    // --- Data Reading ---
    // Samples are gathered first, the grid is only known once every row is read.
    struct Sample {
        time: NaiveDateTime,
        range: f64,
        values: Vec<f64>,
    }
    let mut samples: Vec<Sample> = Vec::new();
    let mut beams: BTreeMap<NaiveDateTime, (f64, f64)> = BTreeMap::new();

    for (row_index, result) in reader.records().enumerate() {
        let record = result?;
        let parse_f64 = |idx: usize| -> f64 { parse_value(record.get(idx).unwrap_or("")) };

        let time_text = record.get(time_idx).unwrap_or("");
        let time = parse_time(time_text).map_err(|_| {
            RenderError::InvalidTime(format!("{time_text} (data row {})", row_index + 1))
        })?;
        let range = parse_f64(range_idx);
        if !range.is_finite() {
            warn!("Skipping data row {}: invalid range", row_index + 1);
            continue;
        }

        let elv = elv_idx.map(parse_f64).unwrap_or(f64::NAN);
        let azm = azm_idx.map(parse_f64).unwrap_or(f64::NAN);
        beams.entry(time).or_insert((elv, azm));

        samples.push(Sample {
            time,
            range,
            values: variable_columns.iter().map(|(i, _)| parse_f64(*i)).collect(),
        });
    }

    // --- Grid Assembly ---
    let times: Vec<NaiveDateTime> = beams.keys().copied().collect();
    let time_lookup: HashMap<NaiveDateTime, usize> =
        times.iter().enumerate().map(|(i, &t)| (t, i)).collect();

    let mut ranges: Vec<f64> = samples.iter().map(|s| s.range).collect();
    ranges.sort_by(|a, b| a.total_cmp(b));
    ranges.dedup();

    let coords = Coords {
        elv: elv_idx.map(|_| beams.values().map(|b| b.0).collect()),
        azm: azm_idx.map(|_| beams.values().map(|b| b.1).collect()),
        time: times,
        range: ranges,
    };
    let shape = coords.shape();

    let mut grids: Vec<Array2<f64>> = variable_columns
        .iter()
        .map(|_| Array2::from_elem(shape, f64::NAN))
        .collect();
    for sample in &samples {
        let row = time_lookup[&sample.time];
        let col = match coords.range.binary_search_by(|r| r.total_cmp(&sample.range)) {
            Ok(col) => col,
            Err(_) => continue,
        };
        for (grid, &value) in grids.iter_mut().zip(sample.values.iter()) {
            grid[[row, col]] = value;
        }
    }

    let mut dataset = ScanDataset::new(coords);
    for ((_, name), grid) in variable_columns.iter().zip(grids) {
        dataset.add_variable(name, grid, variable_attrs(&metadata, name))?;
    }
    for (key, value) in &metadata {
        if !key.contains('.') {
            dataset.attrs.insert(key.clone(), value.clone());
        }
    }

    info!(
        "Loaded {} variables on a {} x {} (time x range) grid",
        dataset.variable_names().count(),
        shape.0,
        shape.1
    );
    Ok(dataset)
}

/// Empty cells, `nan` and anything unparseable become NaN.
fn parse_value(text: &str) -> f64 {
    text.trim().parse::<f64>().unwrap_or(f64::NAN)
}

fn variable_attrs(metadata: &[(String, String)], variable: &str) -> BTreeMap<String, String> {
    metadata
        .iter()
        .filter_map(|(key, value)| {
            let (var, attr) = key.split_once('.')?;
            (var == variable).then(|| (attr.to_string(), value.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
site,Lindenberg
radial_wind_speed.standard_name,radial_wind_speed
radial_wind_speed.units,m s-1
# comment line
time,range,elv,azm,radial_wind_speed,cnr
2021-01-01T00:00:10,200,75,90,1.5,-20
2021-01-01T00:00:00,100,90,0,0.5,-18
2021-01-01T00:00:00,200,90,0,,-19
2021-01-01T00:00:10,100,75,90,1.0,nan
";

    fn parse(text: &str) -> Result<ScanDataset> {
        parse_scan_reader(BufReader::new(text.as_bytes()))
    }

    #[test]
    fn test_grid_is_sorted_and_filled() {
        let ds = parse(SAMPLE).unwrap();
        let coords = ds.coords();
        assert_eq!(coords.range, vec![100.0, 200.0]);
        assert_eq!(coords.time.len(), 2);
        assert!(coords.time[0] < coords.time[1]);
        assert_eq!(coords.elv, Some(vec![90.0, 75.0]));
        assert_eq!(coords.azm, Some(vec![0.0, 90.0]));

        let rws = ds.values("radial_wind_speed").unwrap();
        assert_eq!(rws[[0, 0]], 0.5);
        assert!(rws[[0, 1]].is_nan());
        assert_eq!(rws[[1, 0]], 1.0);
        assert_eq!(rws[[1, 1]], 1.5);
        assert!(ds.values("cnr").unwrap()[[1, 0]].is_nan());
    }

    #[test]
    fn test_metadata_goes_to_variables_and_dataset() {
        let ds = parse(SAMPLE).unwrap();
        let rws = ds.variable("radial_wind_speed").unwrap();
        assert_eq!(rws.standard_name().unwrap(), "radial_wind_speed");
        assert_eq!(rws.units(), Some("m s-1"));
        assert!(ds.variable("cnr").unwrap().standard_name().is_err());
        assert_eq!(ds.attrs.get("site").map(String::as_str), Some("Lindenberg"));
    }

    #[test]
    fn test_missing_header_is_an_error() {
        assert!(matches!(
            parse("a,b\n1,2\n"),
            Err(RenderError::Parse(_))
        ));
    }

    #[test]
    fn test_bad_timestamp_names_the_row() {
        let text = "time,range,wspd\n2021-01-01T00:00:00,100,1\nnot-a-time,100,2\n";
        match parse(text) {
            Err(RenderError::InvalidTime(msg)) => assert!(msg.contains("data row 2")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_geometry_columns_are_optional() {
        let text = "time,range,hor_wind_speed\n2021-01-01 00:00:00,100,3\n";
        let ds = parse(text).unwrap();
        assert!(ds.coords().elv.is_none());
        assert!(ds.coords().azm.is_none());
        assert_eq!(ds.values("hor_wind_speed").unwrap()[[0, 0]], 3.0);
    }
}
