use super::ids::ChainId;
use crate::core::utils::identifiers::{self, ResidueCategory};

/// Continuous per-residue quality values supplied by the structure/density
/// service or derived by the model builder. Absent values stay `None` and
/// degrade only the affected output cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResidueMetrics {
    pub ramachandran_probability: Option<f64>,
    pub avg_b_factor: Option<f64>,
    pub max_b_factor: Option<f64>,
    pub std_b_factor: Option<f64>,
    pub mainchain_b_factor: Option<f64>,
    pub sidechain_b_factor: Option<f64>,
    pub residue_fit: Option<f64>,
    pub mainchain_fit: Option<f64>,
    pub sidechain_fit: Option<f64>,
}

/// Classification flags from an external validation service, overriding the
/// locally computed rotamer level when present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExternalFlags {
    pub clash: bool,
    pub rotamer_outlier: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Residue {
    pub sequence_number: i32,        // Sequence number from the source file; gaps allowed
    pub code: String,                // Three-letter residue code (e.g., "ALA")
    pub one_letter: char,            // Derived one-letter code, 'X' when unrecognised
    pub chain_id: ChainId,           // ID of the parent chain
    pub backbone_complete: bool,     // N, CA and C all present
    pub backbone_geometry_ok: bool,  // Backbone bond lengths within tolerance
    pub phi: Option<f64>,            // Backbone torsion in degrees
    pub psi: Option<f64>,            // Backbone torsion in degrees
    pub chis: [Option<f64>; 5],      // Side-chain torsions in degrees, chi1..chi5
    pub sidechain_complete: bool,    // Every chi of this code was computable
    pub metrics: ResidueMetrics,
    pub external_flags: Option<ExternalFlags>,
}

impl Residue {
    pub fn new(sequence_number: i32, code: &str, chain_id: ChainId) -> Self {
        let code = code.trim().to_string();
        let one_letter = identifiers::three_to_one(&code);
        Self {
            sequence_number,
            code,
            one_letter,
            chain_id,
            backbone_complete: false,
            backbone_geometry_ok: false,
            phi: None,
            psi: None,
            chis: [None; 5],
            sidechain_complete: false,
            metrics: ResidueMetrics::default(),
            external_flags: None,
        }
    }

    /// Whether this residue survives the amino-acid filter: a standard or
    /// modified amino acid with a complete, geometrically valid backbone.
    pub fn is_valid_amino_acid(&self) -> bool {
        matches!(
            identifiers::residue_category(&self.code),
            Some(ResidueCategory::Standard) | Some(ResidueCategory::Modified)
        ) && self.backbone_complete
            && self.backbone_geometry_ok
    }

    /// Chi values in order, with absent entries skipped. Codes with no
    /// rotatable side chain yield an empty vector.
    pub fn present_chis(&self) -> Vec<f64> {
        self.chis.iter().flatten().copied().collect()
    }
}
