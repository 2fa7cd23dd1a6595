//! # Core Models Module
//!
//! Data structures representing one version of a structural model as the
//! engine sees it: chains of residues with derived torsions, quality metric
//! bags, and external classification flags.
//!
//! ## Key Components
//!
//! - [`atom`] - Raw atom records as supplied by the structure service
//! - [`residue`] - Per-residue state: torsions, metric bag, override flags
//! - [`chain`] - Ordered residue lists keyed by chain identifier
//! - [`system`] - A complete model version with slot-map residue storage
//! - [`builder`] - Derivation of per-residue values from raw atom records
//! - [`ids`] - Stable identifier types for chains and residues

pub mod atom;
pub mod builder;
pub mod chain;
pub mod ids;
pub mod residue;
pub mod system;
