use super::reconcile::ChainSet;
use super::sequence::{self, GAP};
use crate::core::models::ids::ResidueId;
use crate::core::models::system::StructureModel;

/// One position in the aligned coordinate space of a chain: for each model
/// version, the residue occupying this position or `None` for a gap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentColumn {
    pub residues: Vec<Option<ResidueId>>,
}

/// A chain's residues laid out on the common aligned coordinate space.
/// Every column holds one slot per model version.
#[derive(Debug, Clone)]
pub struct AlignedChain {
    pub chain_id: String,
    pub columns: Vec<AlignmentColumn>,
}

/// Aligns the residue sequences of a chain set onto a common coordinate
/// space.
///
/// With a single model version this is the identity layout; with two, the
/// versions' one-letter sequences are globally aligned and each aligned
/// position becomes a column. Gap positions carry `None` for that version,
/// so corresponding residues share a column despite insertions/deletions.
pub fn align_residues(chain_set: &ChainSet, models: &[&StructureModel]) -> AlignedChain {
    let sequences: Vec<String> = chain_set
        .versions
        .iter()
        .zip(models)
        .map(|(residues, model)| sequence_of(residues, model))
        .collect();

    let aligned: Vec<String> = match sequences.as_slice() {
        [only] => vec![only.clone()],
        [previous, latest] => {
            let (aligned_previous, aligned_latest) = sequence::align(previous, latest);
            vec![aligned_previous, aligned_latest]
        }
        _ => unreachable!("chain sets hold one or two versions"),
    };

    let column_count = aligned.first().map_or(0, |s| s.chars().count());
    let mut columns = vec![
        AlignmentColumn {
            residues: vec![None; aligned.len()],
        };
        column_count
    ];
    for (version, aligned_sequence) in aligned.iter().enumerate() {
        let mut residue_cursor = chain_set.versions[version].iter();
        for (position, character) in aligned_sequence.chars().enumerate() {
            if character == GAP {
                continue;
            }
            columns[position].residues[version] = residue_cursor.next().copied();
        }
    }

    AlignedChain {
        chain_id: chain_set.chain_id.clone(),
        columns,
    }
}

fn sequence_of(residues: &[ResidueId], model: &StructureModel) -> String {
    residues
        .iter()
        .filter_map(|&residue_id| model.residue(residue_id))
        .map(|residue| residue.one_letter)
        .collect()
}
