use super::metric::{Metric, Polarity};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use thiserror::Error;

/// Names of the resolution strata, in cut-point order. The first ten bins
/// are deciles of the reference population's resolution distribution; the
/// trailing "All" bin aggregates the whole population and serves queries
/// with unknown resolution.
pub const RESOLUTION_BIN_NAMES: [&str; 11] = [
    "<10", "10-20", "20-30", "30-40", "40-50", "50-60", "60-70", "70-80", "80-90", ">90", "All",
];

/// Represents errors that can occur while loading percentile reference data.
#[derive(Debug, Error)]
pub enum PercentileLoadError {
    /// The reference file could not be read from disk.
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    /// The file content is not valid CSV.
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    /// A data row could not be interpreted.
    #[error("Malformed row {row} in '{path}': {reason}")]
    MalformedRow {
        path: String,
        row: usize,
        reason: String,
    },
    /// A data row names a resolution bin outside [`RESOLUTION_BIN_NAMES`].
    #[error("Unknown resolution bin '{name}' in '{path}'")]
    UnknownResolutionBin { path: String, name: String },
    /// The table lacks a column for a metric the engine computes.
    #[error("No percentile data for metric '{name}'")]
    MissingMetric { name: &'static str },
    /// The cut-point table does not match the declared bin names.
    #[error("Expected {expected} resolution cut-points, found {found}")]
    InconsistentResolutionBins { expected: usize, found: usize },
}

/// Resolution-stratified percentile tables for every [`Metric`].
///
/// Loaded once per process and read-only thereafter. Lookups are pure:
/// a raw metric value is ranked against the ascending percentile→threshold
/// table of the resolution bin the queried model falls into.
#[derive(Debug, Clone, Default)]
pub struct PercentileIndex {
    /// metric → resolution bin name → ascending percentile → threshold.
    tables: HashMap<Metric, HashMap<String, BTreeMap<u8, f64>>>,
    /// Resolution thresholds at each percentile cut-point, ascending.
    resolution_cutpoints: Vec<(u8, f64)>,
}

impl PercentileIndex {
    /// Loads the percentile tables and the resolution cut-point table.
    ///
    /// # Arguments
    ///
    /// * `percentiles_path` - CSV with header `bin,percentile,<metric>...`
    ///   and rows `binName,percentile,value...`.
    /// * `resolution_bins_path` - CSV with header `percentile,resolution`
    ///   and one row per decile cut-point.
    ///
    /// # Errors
    ///
    /// Fails with path context when a file cannot be read or parsed, when a
    /// row is malformed, when a metric column is missing, or when the
    /// cut-point count disagrees with [`RESOLUTION_BIN_NAMES`].
    pub fn load(
        percentiles_path: &Path,
        resolution_bins_path: &Path,
    ) -> Result<Self, PercentileLoadError> {
        let tables = Self::load_percentile_tables(percentiles_path)?;
        let resolution_cutpoints = Self::load_resolution_cutpoints(resolution_bins_path)?;
        Ok(Self {
            tables,
            resolution_cutpoints,
        })
    }

    fn load_percentile_tables(
        path: &Path,
    ) -> Result<HashMap<Metric, HashMap<String, BTreeMap<u8, f64>>>, PercentileLoadError> {
        let path_string = path.to_string_lossy().to_string();
        let csv_error = |e| PercentileLoadError::Csv {
            path: path_string.clone(),
            source: e,
        };
        let mut reader = csv::Reader::from_path(path).map_err(csv_error)?;

        let headers = reader.headers().map_err(csv_error)?.clone();
        let columns: Vec<Option<Metric>> = headers
            .iter()
            .skip(2)
            .map(|name| {
                let metric = Metric::from_table_name(name);
                if metric.is_none() {
                    tracing::warn!("Ignoring unrecognised percentile column '{}'", name);
                }
                metric
            })
            .collect();

        let mut tables: HashMap<Metric, HashMap<String, BTreeMap<u8, f64>>> = HashMap::new();
        for (row_index, result) in reader.records().enumerate() {
            let record = result.map_err(csv_error)?;
            let malformed = |reason: String| PercentileLoadError::MalformedRow {
                path: path_string.clone(),
                row: row_index + 1,
                reason,
            };

            let bin_name = record.get(0).unwrap_or("").trim().to_string();
            if !RESOLUTION_BIN_NAMES.contains(&bin_name.as_str()) {
                return Err(PercentileLoadError::UnknownResolutionBin {
                    path: path_string.clone(),
                    name: bin_name,
                });
            }
            let percentile: u8 = record
                .get(1)
                .unwrap_or("")
                .trim()
                .parse()
                .map_err(|_| malformed("percentile is not an integer".to_string()))?;
            if !(1..=99).contains(&percentile) {
                return Err(malformed(format!("percentile {percentile} outside 1..=99")));
            }

            for (metric, field) in columns.iter().zip(record.iter().skip(2)) {
                let Some(metric) = metric else { continue };
                let value: f64 = field.trim().parse().map_err(|_| {
                    malformed(format!(
                        "value '{}' for metric '{}' is not a number",
                        field,
                        metric.table_name()
                    ))
                })?;
                tables
                    .entry(*metric)
                    .or_default()
                    .entry(bin_name.clone())
                    .or_default()
                    .insert(percentile, value);
            }
        }

        for metric in Metric::ALL {
            if !tables.contains_key(&metric) {
                return Err(PercentileLoadError::MissingMetric {
                    name: metric.table_name(),
                });
            }
        }
        Ok(tables)
    }

    fn load_resolution_cutpoints(path: &Path) -> Result<Vec<(u8, f64)>, PercentileLoadError> {
        let path_string = path.to_string_lossy().to_string();
        let csv_error = |e| PercentileLoadError::Csv {
            path: path_string.clone(),
            source: e,
        };
        let mut reader = csv::Reader::from_path(path).map_err(csv_error)?;

        let mut cutpoints = Vec::new();
        for (row_index, result) in reader.records().enumerate() {
            let record = result.map_err(csv_error)?;
            let malformed = |reason: &str| PercentileLoadError::MalformedRow {
                path: path_string.clone(),
                row: row_index + 1,
                reason: reason.to_string(),
            };
            let percentile: u8 = record
                .get(0)
                .unwrap_or("")
                .trim()
                .parse()
                .map_err(|_| malformed("cut-point is not an integer"))?;
            let threshold: f64 = record
                .get(1)
                .unwrap_or("")
                .trim()
                .parse()
                .map_err(|_| malformed("resolution threshold is not a number"))?;
            cutpoints.push((percentile, threshold));
        }
        cutpoints.sort_by_key(|&(percentile, _)| percentile);

        let expected = RESOLUTION_BIN_NAMES.len() - 2;
        if cutpoints.len() != expected {
            return Err(PercentileLoadError::InconsistentResolutionBins {
                expected,
                found: cutpoints.len(),
            });
        }
        Ok(cutpoints)
    }

    /// Name of the resolution bin serving a query at `resolution`.
    ///
    /// The first cut-point whose threshold exceeds the resolution selects
    /// its bin; resolutions beyond every cut-point land in the last decile
    /// bin, and an unknown resolution uses the "All" aggregate.
    fn bin_name(&self, resolution: Option<f64>) -> &'static str {
        let Some(resolution) = resolution else {
            return RESOLUTION_BIN_NAMES[RESOLUTION_BIN_NAMES.len() - 1];
        };
        let mut bin_index = self.resolution_cutpoints.len();
        for (index, &(_, threshold)) in self.resolution_cutpoints.iter().enumerate() {
            if resolution < threshold {
                bin_index = index;
                break;
            }
        }
        RESOLUTION_BIN_NAMES[bin_index]
    }

    /// Population percentile of `value` for `metric`, in `1..=100`.
    ///
    /// Scans the selected bin's ascending percentile table and returns the
    /// first percentile whose threshold strictly exceeds the value; a value
    /// beyond every threshold ranks 100. With `normalize_polarity`, metrics
    /// whose smaller values are better return `101 - percentile`, so a
    /// higher result always means a better residue.
    ///
    /// Returns `None` when the selected bin has no table for the metric.
    pub fn percentile(
        &self,
        metric: Metric,
        value: f64,
        resolution: Option<f64>,
        normalize_polarity: bool,
    ) -> Option<u8> {
        let bin_name = self.bin_name(resolution);
        let table = self.tables.get(&metric)?.get(bin_name)?;

        let mut determined = 100u8;
        for (&percentile, &threshold) in table {
            if value < threshold {
                determined = percentile;
                break;
            }
        }
        if normalize_polarity && metric.polarity() == Polarity::SmallerBetter {
            Some(101 - determined)
        } else {
            Some(determined)
        }
    }
}
