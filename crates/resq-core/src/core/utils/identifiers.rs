use phf::{Map, Set, phf_map, phf_set};

static STANDARD_CODES: Set<&'static str> = phf_set! {
    "ALA", "ARG", "ASN", "ASP", "CYS", "GLN", "GLU", "GLY", "HIS", "ILE",
    "LEU", "LYS", "MET", "PHE", "PRO", "SER", "THR", "TRP", "TYR", "VAL",
};

static MODIFIED_CODES: Set<&'static str> = phf_set! { "MSE", "SEC" };

static THREE_TO_ONE: Map<&'static str, char> = phf_map! {
    "ALA" => 'A', "CYS" => 'C', "ASP" => 'D', "GLU" => 'E', "PHE" => 'F',
    "GLY" => 'G', "HIS" => 'H', "ILE" => 'I', "LYS" => 'K', "LEU" => 'L',
    "MET" => 'M', "ASN" => 'N', "PRO" => 'P', "GLN" => 'Q', "ARG" => 'R',
    "SER" => 'S', "THR" => 'T', "SEC" => 'U', "VAL" => 'V', "TRP" => 'W',
    "TYR" => 'Y', "MSE" => 'M', "UNK" => 'X',
};

/// Classification of a three-letter residue code by how the engine treats it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResidueCategory {
    /// One of the twenty standard amino acids.
    Standard,
    /// A modified amino acid the engine still scores (MSE, SEC).
    Modified,
    /// An explicitly unknown amino acid (UNK).
    Unknown,
}

pub fn residue_category(code: &str) -> Option<ResidueCategory> {
    let code = code.trim();
    if STANDARD_CODES.contains(code) {
        Some(ResidueCategory::Standard)
    } else if MODIFIED_CODES.contains(code) {
        Some(ResidueCategory::Modified)
    } else if code == "UNK" {
        Some(ResidueCategory::Unknown)
    } else {
        None
    }
}

/// One-letter code for a three-letter residue code, `'X'` when unrecognised.
pub fn three_to_one(code: &str) -> char {
    THREE_TO_ONE.get(code.trim()).copied().unwrap_or('X')
}

/// The four atom names spanning chi angle `index` (0-based) for `code`.
///
/// Returns `None` for codes without that chi, including all codes for
/// indices past their last rotatable side-chain bond.
pub fn chi_atom_names(code: &str, index: usize) -> Option<[&'static str; 4]> {
    let code = code.trim();
    match index {
        0 => match code {
            "ARG" | "ASN" | "ASP" | "GLN" | "GLU" | "HIS" | "LEU" | "LYS" | "MET" | "PHE"
            | "PRO" | "TRP" | "TYR" | "MSE" => Some(["N", "CA", "CB", "CG"]),
            "ILE" | "VAL" => Some(["N", "CA", "CB", "CG1"]),
            "CYS" => Some(["N", "CA", "CB", "SG"]),
            "SEC" => Some(["N", "CA", "CB", "SE"]),
            "SER" => Some(["N", "CA", "CB", "OG"]),
            "THR" => Some(["N", "CA", "CB", "OG1"]),
            _ => None,
        },
        1 => match code {
            "ARG" | "GLN" | "GLU" | "LYS" | "PRO" => Some(["CA", "CB", "CG", "CD"]),
            "LEU" | "PHE" | "TRP" | "TYR" => Some(["CA", "CB", "CG", "CD1"]),
            "ASN" | "ASP" => Some(["CA", "CB", "CG", "OD1"]),
            "HIS" => Some(["CA", "CB", "CG", "ND1"]),
            "ILE" => Some(["CA", "CB", "CG1", "CD1"]),
            "MET" => Some(["CA", "CB", "CG", "SD"]),
            "MSE" => Some(["CA", "CB", "CG", "SE"]),
            _ => None,
        },
        2 => match code {
            "GLN" | "GLU" => Some(["CB", "CG", "CD", "OE1"]),
            "ARG" => Some(["CB", "CG", "CD", "NE"]),
            "LYS" => Some(["CB", "CG", "CD", "CE"]),
            "MET" => Some(["CB", "CG", "SD", "CE"]),
            "MSE" => Some(["CB", "CG", "SE", "CE"]),
            _ => None,
        },
        3 => match code {
            "ARG" => Some(["CG", "CD", "NE", "CZ"]),
            "LYS" => Some(["CG", "CD", "CE", "NZ"]),
            _ => None,
        },
        4 => match code {
            "ARG" => Some(["CD", "NE", "CZ", "NH1"]),
            _ => None,
        },
        _ => None,
    }
}
