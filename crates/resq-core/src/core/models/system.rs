use super::chain::Chain;
use super::ids::{ChainId, ResidueId};
use super::residue::{ExternalFlags, Residue};
use slotmap::SlotMap;
use std::collections::HashMap;

/// One version of a structural model: an ordered collection of chains plus
/// an optional experimental resolution used for percentile binning.
///
/// Residues and chains live in slot maps so that alignment structures can
/// refer to them by stable ID without borrowing the model. A model is built
/// once per report-generation call and never mutated by the engine; chain
/// filtering produces new ID lists rather than editing the model in place.
#[derive(Debug, Clone, Default)]
pub struct StructureModel {
    /// Primary storage for residues using a slot map for stable IDs.
    residues: SlotMap<ResidueId, Residue>,
    /// Primary storage for chains using a slot map for stable IDs.
    chains: SlotMap<ChainId, Chain>,
    /// Chain IDs in source-file order.
    chain_order: Vec<ChainId>,
    /// Lookup map for finding chains by their identifier.
    chain_id_map: HashMap<String, ChainId>,
    /// Experimental resolution in Angstroms, if known.
    pub resolution: Option<f64>,
}

impl StructureModel {
    pub fn new(resolution: Option<f64>) -> Self {
        Self {
            resolution,
            ..Self::default()
        }
    }

    /// Adds a new chain and returns its ID. Re-using an existing identifier
    /// returns the already-registered chain's ID.
    pub fn add_chain(&mut self, id: &str) -> ChainId {
        let id = id.trim();
        if let Some(&chain_id) = self.chain_id_map.get(id) {
            return chain_id;
        }
        let chain_id = self.chains.insert(Chain::new(id));
        self.chain_order.push(chain_id);
        self.chain_id_map.insert(id.to_string(), chain_id);
        chain_id
    }

    /// Appends a residue to a chain, preserving insertion order.
    ///
    /// Returns `None` if the chain ID is not part of this model.
    pub fn add_residue(&mut self, chain_id: ChainId, mut residue: Residue) -> Option<ResidueId> {
        self.chains.get(chain_id)?;
        residue.chain_id = chain_id;
        let residue_id = self.residues.insert(residue);
        self.chains[chain_id].residues.push(residue_id);
        Some(residue_id)
    }

    pub fn residue(&self, id: ResidueId) -> Option<&Residue> {
        self.residues.get(id)
    }

    pub fn chain(&self, id: ChainId) -> Option<&Chain> {
        self.chains.get(id)
    }

    pub fn chain_by_identifier(&self, id: &str) -> Option<&Chain> {
        self.chain_id_map.get(id.trim()).map(|&cid| &self.chains[cid])
    }

    /// Chains in source-file order.
    pub fn chains_iter(&self) -> impl Iterator<Item = &Chain> {
        self.chain_order.iter().map(|&cid| &self.chains[cid])
    }

    pub fn chain_count(&self) -> usize {
        self.chain_order.len()
    }

    /// Attaches external classification flags to residues keyed by
    /// `(chain identifier, sequence number)`. Keys that match no residue are
    /// ignored; every residue of the model receives a flag bundle so that
    /// downstream consumers can distinguish "service ran, no flag" from
    /// "service absent".
    pub fn apply_external_flags(
        &mut self,
        clashes: &[(String, i32)],
        rotamer_outliers: &[(String, i32)],
    ) {
        for &chain_id in &self.chain_order {
            let identifier = self.chains[chain_id].id.clone();
            let residue_ids: Vec<ResidueId> = self.chains[chain_id].residues.clone();
            for residue_id in residue_ids {
                let residue = &mut self.residues[residue_id];
                let seqnum = residue.sequence_number;
                let is_match = |k: &(String, i32)| k.0 == identifier && k.1 == seqnum;
                residue.external_flags = Some(ExternalFlags {
                    clash: clashes.iter().any(is_match),
                    rotamer_outlier: rotamer_outliers.iter().any(is_match),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model_with_two_chains() -> StructureModel {
        let mut model = StructureModel::new(Some(2.1));
        let chain_a = model.add_chain("A");
        let chain_b = model.add_chain("B");
        model.add_residue(chain_a, Residue::new(1, "ALA", chain_a));
        model.add_residue(chain_a, Residue::new(2, "GLY", chain_a));
        model.add_residue(chain_b, Residue::new(1, "SER", chain_b));
        model
    }

    #[test]
    fn add_chain_registers_chain_once() {
        let mut model = StructureModel::new(None);
        let first = model.add_chain("A");
        let second = model.add_chain("A");
        assert_eq!(first, second);
        assert_eq!(model.chain_count(), 1);
    }

    #[test]
    fn add_residue_preserves_insertion_order() {
        let model = model_with_two_chains();
        let chain = model.chain_by_identifier("A").unwrap();
        let numbers: Vec<i32> = chain
            .residues()
            .iter()
            .map(|&rid| model.residue(rid).unwrap().sequence_number)
            .collect();
        assert_eq!(numbers, vec![1, 2]);
    }

    #[test]
    fn add_residue_rejects_foreign_chain_id() {
        let mut model = model_with_two_chains();
        let mut other = StructureModel::new(None);
        let foreign = other.add_chain("Z");
        assert!(model.add_residue(foreign, Residue::new(1, "ALA", foreign)).is_none());
    }

    #[test]
    fn chains_iter_follows_source_order() {
        let model = model_with_two_chains();
        let ids: Vec<&str> = model.chains_iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B"]);
    }

    #[test]
    fn apply_external_flags_marks_matching_residues() {
        let mut model = model_with_two_chains();
        model.apply_external_flags(&[("A".to_string(), 2)], &[("B".to_string(), 1)]);

        let chain_a = model.chain_by_identifier("A").unwrap();
        let flagged = model.residue(chain_a.residues()[1]).unwrap();
        assert_eq!(
            flagged.external_flags,
            Some(ExternalFlags {
                clash: true,
                rotamer_outlier: false
            })
        );

        let unflagged = model.residue(chain_a.residues()[0]).unwrap();
        assert_eq!(
            unflagged.external_flags,
            Some(ExternalFlags {
                clash: false,
                rotamer_outlier: false
            })
        );

        let chain_b = model.chain_by_identifier("B").unwrap();
        let outlier = model.residue(chain_b.residues()[0]).unwrap();
        assert_eq!(
            outlier.external_flags,
            Some(ExternalFlags {
                clash: false,
                rotamer_outlier: true
            })
        );
    }
}
