//! # Engine Module
//!
//! The algorithmic core: chain reconciliation across model versions, global
//! residue-sequence alignment, metric extraction against the reference
//! data, and assembly of the final chart table.
//!
//! Everything here is synchronous and pure over in-memory data; the only
//! I/O in the crate happens when reference data is loaded.
//!
//! - [`reconcile`] - chain matching and amino-acid filtering
//! - [`sequence`] - Needleman-Wunsch global alignment
//! - [`alignment`] - aligned residue columns per chain
//! - [`metrics`] - per-residue metric vectors and classifications
//! - [`assemble`] - the chain x position x version output table
//! - [`error`] - fatal engine conditions

pub mod alignment;
pub mod assemble;
pub mod error;
pub mod metrics;
pub mod reconcile;
pub mod sequence;
