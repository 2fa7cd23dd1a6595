//! # RESQ Core Library
//!
//! A per-residue quality engine for comparing successive iterations of a
//! refined macromolecular model. Given up to two versions of a model, it
//! reconciles their chain sets, globally aligns their residue sequences so
//! that corresponding residues share an output position, classifies
//! dihedral-angle geometry against empirical reference distributions, and
//! normalizes every metric against resolution-stratified population
//! percentiles.
//!
//! ## Architectural Philosophy
//!
//! The library is designed with a strict three-layer architecture to keep
//! the algorithmic core pure and testable:
//!
//! - **[`core`]: The Foundation.** Stateless model representations
//!   (`StructureModel`, residues with derived torsions), immutable
//!   reference data (rotamer grids, percentile tables), and pure
//!   geometric/identifier utilities.
//!
//! - **[`engine`]: The Logic Core.** The algorithms: chain reconciliation,
//!   Needleman-Wunsch sequence alignment with a fixed traceback tie-break,
//!   rotamer classification over 2-bit-packed grids with periodic bin
//!   addressing, percentile normalization, and chart-table assembly.
//!
//! - **[`workflows`]: The Public API.** The single entry point
//!   ([`workflows::report::chart_data`]) that runs the complete procedure
//!   for one report-generation call.
//!
//! Reference data is loaded once into [`core::reference::ReferenceData`]
//! and passed by reference; everything else is owned by a single call.
//! Chart rendering, density computation, and structure-file parsing are
//! deliberately outside this crate.

pub mod core;
pub mod engine;
pub mod workflows;
