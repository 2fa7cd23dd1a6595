use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Type alias for the raw rotamer reference data loaded from TOML files.
///
/// Maps residue codes to the five per-dimension collections describing that
/// code's classification grid. Used internally during loading, before the
/// packed grids are expanded into their runtime form.
type RawRotamerFile = HashMap<String, RawRotamerEntry>;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRotamerEntry {
    /// Phase offset of the first bin center, one per dimension.
    offsets: Vec<f64>,
    /// Half-open angular range `[lo, hi)`, one pair per dimension.
    ranges: Vec<[f64; 2]>,
    /// Bin width in degrees, one per dimension.
    widths: Vec<f64>,
    /// Bin count, one per dimension.
    bins: Vec<usize>,
    /// Row-major classification grid, 2-bit-packed, four cells per byte.
    packed: Vec<u8>,
}

/// Empirical quality tier of a side-chain conformation.
///
/// These are the grid cell ordinals as stored in the reference file:
/// `Unclassified` marks bin combinations the reference population never
/// visited. Report-facing code collapses `Unclassified` into `Outlier`;
/// the distinction only exists at this layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotamerClass {
    Unclassified = 0,
    Outlier = 1,
    Allowed = 2,
    Favored = 3,
}

impl RotamerClass {
    fn from_ordinal(ordinal: u8) -> Self {
        match ordinal & 0b11 {
            0 => RotamerClass::Unclassified,
            1 => RotamerClass::Outlier,
            2 => RotamerClass::Allowed,
            _ => RotamerClass::Favored,
        }
    }
}

#[derive(Debug, Clone)]
struct RotamerTable {
    offsets: Vec<f64>,
    ranges: Vec<(f64, f64)>,
    widths: Vec<f64>,
    bins: Vec<usize>,
    grid: Vec<u8>, // One ordinal per bin combination, unpacked at load time
}

#[derive(Debug, Clone)]
struct NamedRotamer {
    means: Vec<f64>, // Circular mean per chi, degrees
    sdevs: Vec<f64>, // Standard deviation per chi, degrees
}

/// Represents errors that can occur while loading rotamer reference data.
#[derive(Debug, Error)]
pub enum RotamerLoadError {
    /// The reference file could not be read from disk.
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    /// The grid reference file content is not valid TOML.
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    /// The central-values file content is not valid CSV.
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    /// A per-code entry is internally inconsistent.
    #[error("Malformed rotamer entry for residue code '{code}': {reason}")]
    MalformedEntry { code: String, reason: String },
}

/// Empirical rotamer reference data: per-code classification grids with
/// periodic bin addressing, plus the central-value tables used for the
/// continuous rotamer score.
///
/// Loaded once per process and read-only thereafter; classification is a
/// pure lookup.
#[derive(Debug, Clone, Default)]
pub struct RotamerLibrary {
    tables: HashMap<String, RotamerTable>,
    central_values: HashMap<String, Vec<NamedRotamer>>,
}

impl RotamerLibrary {
    /// Loads the classification grids and central-value tables.
    ///
    /// # Arguments
    ///
    /// * `grid_path` - TOML file with one `[CODE]` entry per residue code
    ///   (`offsets`, `ranges`, `widths`, `bins`, `packed`).
    /// * `central_values_path` - CSV file with rows
    ///   `code,rotamer,chi_mean_1..4,chi_sd_1..4`; trailing chi columns are
    ///   empty for codes with fewer side-chain torsions.
    ///
    /// # Errors
    ///
    /// Returns [`RotamerLoadError::Io`]/[`Toml`](RotamerLoadError::Toml)/
    /// [`Csv`](RotamerLoadError::Csv) with path context when a file cannot
    /// be read or parsed, and [`RotamerLoadError::MalformedEntry`] when an
    /// entry's dimension collections disagree or its packed grid is too
    /// short for the declared bin counts.
    pub fn load(grid_path: &Path, central_values_path: &Path) -> Result<Self, RotamerLoadError> {
        let content = std::fs::read_to_string(grid_path).map_err(|e| RotamerLoadError::Io {
            path: grid_path.to_string_lossy().to_string(),
            source: e,
        })?;
        let raw: RawRotamerFile = toml::from_str(&content).map_err(|e| RotamerLoadError::Toml {
            path: grid_path.to_string_lossy().to_string(),
            source: e,
        })?;

        let mut tables = HashMap::with_capacity(raw.len());
        for (code, entry) in raw {
            let table = Self::process_raw_entry(&code, entry)?;
            tables.insert(code, table);
        }

        let central_values = Self::load_central_values(central_values_path)?;
        Ok(Self {
            tables,
            central_values,
        })
    }

    fn process_raw_entry(
        code: &str,
        entry: RawRotamerEntry,
    ) -> Result<RotamerTable, RotamerLoadError> {
        let malformed = |reason: &str| RotamerLoadError::MalformedEntry {
            code: code.to_string(),
            reason: reason.to_string(),
        };

        let dims = entry.offsets.len();
        if dims == 0 {
            return Err(malformed("no dimensions declared"));
        }
        if entry.ranges.len() != dims || entry.widths.len() != dims || entry.bins.len() != dims {
            return Err(malformed(
                "offsets, ranges, widths and bins must have equal lengths",
            ));
        }
        if entry.widths.iter().any(|&w| w <= 0.0) {
            return Err(malformed("bin widths must be positive"));
        }
        if entry.ranges.iter().any(|r| r[1] <= r[0]) {
            return Err(malformed("angular ranges must be non-empty"));
        }
        if entry.bins.iter().any(|&b| b == 0) {
            return Err(malformed("bin counts must be positive"));
        }

        let cells: usize = entry.bins.iter().product();
        let grid = unpack_packed_grid(&entry.packed);
        if grid.len() < cells {
            return Err(malformed("packed grid is shorter than the declared bins"));
        }

        Ok(RotamerTable {
            offsets: entry.offsets,
            ranges: entry.ranges.iter().map(|r| (r[0], r[1])).collect(),
            widths: entry.widths,
            bins: entry.bins,
            grid,
        })
    }

    fn load_central_values(
        path: &Path,
    ) -> Result<HashMap<String, Vec<NamedRotamer>>, RotamerLoadError> {
        let mut reader = csv::Reader::from_path(path).map_err(|e| RotamerLoadError::Csv {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;

        let mut central_values: HashMap<String, Vec<NamedRotamer>> = HashMap::new();
        for result in reader.deserialize::<CentralValuesRow>() {
            let row = result.map_err(|e| RotamerLoadError::Csv {
                path: path.to_string_lossy().to_string(),
                source: e,
            })?;
            let means: Vec<f64> = [row.chi_mean_1, row.chi_mean_2, row.chi_mean_3, row.chi_mean_4]
                .into_iter()
                .flatten()
                .collect();
            let sdevs: Vec<f64> = [row.chi_sd_1, row.chi_sd_2, row.chi_sd_3, row.chi_sd_4]
                .into_iter()
                .flatten()
                .collect();
            if means.len() != sdevs.len() {
                return Err(RotamerLoadError::MalformedEntry {
                    code: row.code.clone(),
                    reason: format!(
                        "rotamer '{}' declares {} chi means but {} deviations",
                        row.rotamer,
                        means.len(),
                        sdevs.len()
                    ),
                });
            }
            if sdevs.iter().any(|&sd| sd <= 0.0) {
                return Err(RotamerLoadError::MalformedEntry {
                    code: row.code.clone(),
                    reason: format!("rotamer '{}' has a non-positive deviation", row.rotamer),
                });
            }
            central_values
                .entry(row.code)
                .or_default()
                .push(NamedRotamer { means, sdevs });
        }
        Ok(central_values)
    }

    /// Classifies a set of chi angles against the code's reference grid.
    ///
    /// Each angle is wrapped into its dimension's half-open range (torsions
    /// are periodic at 360 degrees), snapped to the nearest bin center, and
    /// addressed modulo the bin count so that the two ends of the periodic
    /// range fall into the same bin. Codes with fewer flexible dihedrals
    /// than `chis` supplies ignore the extra angles.
    ///
    /// Returns `None` for unknown codes and for incomplete side chains
    /// (fewer angles than the code's dimension count); never panics.
    pub fn classify(&self, code: &str, chis: &[f64]) -> Option<RotamerClass> {
        let table = self.tables.get(code.trim())?;
        let dims = table.offsets.len();
        if chis.len() < dims {
            return None;
        }

        let mut index = 0usize;
        for (d, &chi) in chis[..dims].iter().enumerate() {
            let (lo, hi) = table.ranges[d];
            let span = hi - lo;
            let mut angle = chi;
            if angle <= lo {
                angle += span;
            }
            if angle >= hi {
                angle -= span;
            }
            let multiple = ((angle - table.offsets[d]) / table.widths[d]).round() as i64;
            let bin = multiple.rem_euclid(table.bins[d] as i64) as usize;
            let stride: usize = table.bins[d + 1..].iter().product();
            index += bin * stride;
        }
        table.grid.get(index).copied().map(RotamerClass::from_ordinal)
    }

    /// Continuous rotamer quality score: the smallest RMS z-score of the
    /// supplied chi angles over the code's named rotamer central values.
    /// Deltas take the short way around the 360-degree circle.
    ///
    /// Returns `None` for codes without central-value data.
    pub fn central_value_score(&self, code: &str, chis: &[f64]) -> Option<f64> {
        let rotamers = self.central_values.get(code.trim())?;
        let mut best: Option<f64> = None;
        for rotamer in rotamers {
            let count = rotamer.means.len().min(chis.len());
            if count == 0 {
                continue;
            }
            let mut sum_sq = 0.0;
            for i in 0..count {
                let mut delta = chis[i] - rotamer.means[i];
                if delta > 180.0 {
                    delta -= 360.0;
                } else if delta < -180.0 {
                    delta += 360.0;
                }
                let z_score = delta / rotamer.sdevs[i];
                sum_sq += z_score * z_score;
            }
            let score = (sum_sq / count as f64).sqrt();
            best = Some(best.map_or(score, |b: f64| b.min(score)));
        }
        best
    }
}

#[derive(Debug, Deserialize)]
struct CentralValuesRow {
    code: String,
    rotamer: String,
    chi_mean_1: Option<f64>,
    chi_mean_2: Option<f64>,
    chi_mean_3: Option<f64>,
    chi_mean_4: Option<f64>,
    chi_sd_1: Option<f64>,
    chi_sd_2: Option<f64>,
    chi_sd_3: Option<f64>,
    chi_sd_4: Option<f64>,
}

// Unpack each byte as four 2-bit ordinals, most significant bits first.
fn unpack_packed_grid(packed: &[u8]) -> Vec<u8> {
    let mut unpacked = Vec::with_capacity(packed.len() * 4);
    for &byte in packed {
        unpacked.push((byte >> 6) & 0b11);
        unpacked.push((byte >> 4) & 0b11);
        unpacked.push((byte >> 2) & 0b11);
        unpacked.push(byte & 0b11);
    }
    unpacked
}
