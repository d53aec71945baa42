// src/data_input/mod.rs

pub mod dataset_parser;
pub mod scan_dataset;

pub use dataset_parser::{parse_scan_file, parse_scan_reader};
pub use scan_dataset::{Coords, DataArray, ScanDataset, STANDARD_NAME, UNITS};
