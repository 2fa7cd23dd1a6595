//! # Reference Data Module
//!
//! Precomputed empirical reference data the engine classifies and
//! normalizes against: per-code rotamer classification grids with periodic
//! bin addressing, rotamer central-value tables, and resolution-stratified
//! percentile tables.
//!
//! All reference data is loaded eagerly into [`ReferenceData`], an immutable
//! value object constructed once per process and passed by reference into
//! the engine. It has no interior mutability, so sharing it across threads
//! (for example from a `std::sync::OnceLock`) is safe; repeated loads are
//! idempotent and merely wasteful.

pub mod metric;
pub mod percentile;
pub mod rotamer;

use percentile::{PercentileIndex, PercentileLoadError};
use rotamer::{RotamerLibrary, RotamerLoadError};
use std::path::PathBuf;
use thiserror::Error;

/// Locations of the four read-only reference files.
#[derive(Debug, Clone)]
pub struct ReferenceDataPaths {
    /// TOML file with per-code classification grids.
    pub rotamer_grid: PathBuf,
    /// CSV file with per-code named rotamer central values.
    pub rotamer_central_values: PathBuf,
    /// CSV file with resolution-stratified percentile tables.
    pub percentiles: PathBuf,
    /// CSV file with resolution-bin cut-points.
    pub resolution_bins: PathBuf,
}

/// Represents errors from loading any of the reference files.
///
/// All variants are fatal: without reference data no classification or
/// normalization is meaningful.
#[derive(Debug, Error)]
pub enum ReferenceLoadError {
    #[error(transparent)]
    Rotamer(#[from] RotamerLoadError),
    #[error(transparent)]
    Percentile(#[from] PercentileLoadError),
}

/// The engine's complete read-only reference data set.
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    pub rotamers: RotamerLibrary,
    pub percentiles: PercentileIndex,
}

impl ReferenceData {
    /// Loads all reference tables from disk.
    ///
    /// # Errors
    ///
    /// Returns the first load failure with file-path context; see
    /// [`RotamerLoadError`] and [`PercentileLoadError`] for the modes.
    pub fn load(paths: &ReferenceDataPaths) -> Result<Self, ReferenceLoadError> {
        let rotamers = RotamerLibrary::load(&paths.rotamer_grid, &paths.rotamer_central_values)?;
        let percentiles = PercentileIndex::load(&paths.percentiles, &paths.resolution_bins)?;
        Ok(Self {
            rotamers,
            percentiles,
        })
    }
}
