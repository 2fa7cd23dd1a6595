//! # Core Module
//!
//! Foundation layer of the engine: stateless model representations,
//! immutable reference data, and pure geometric/identifier utilities.
//!
//! - **Model representation** ([`models`]) - chains, residues, derived
//!   torsions and metric bags for one version of a structural model
//! - **Reference data** ([`reference`]) - rotamer grids, central values and
//!   percentile tables loaded once per process
//! - **Utilities** ([`utils`]) - torsion geometry and residue-code tables

pub mod models;
pub mod reference;
pub mod utils;
