use super::atom::AtomRecord;
use super::ids::ChainId;
use super::residue::{Residue, ResidueMetrics};
use super::system::StructureModel;
use crate::core::utils::geometry;
use crate::core::utils::identifiers;

// Backbone bond lengths above this are treated as broken geometry.
const MAX_BACKBONE_BOND_LENGTH: f64 = 1.8;

/// Per-residue input as handed over by the structure/density service.
///
/// Torsion angles and B-factor statistics are derived by the builder from
/// the atom records; density-fit scores and the Ramachandran probability
/// depend on data this crate does not see (maps, probability tables) and
/// are taken as given.
#[derive(Debug, Clone, Default)]
pub struct ResidueRecord {
    pub sequence_number: i32,
    pub code: String,
    pub atoms: Vec<AtomRecord>,
    pub residue_fit: Option<f64>,
    pub mainchain_fit: Option<f64>,
    pub sidechain_fit: Option<f64>,
    pub ramachandran_probability: Option<f64>,
}

/// Builds a [`StructureModel`] from raw residue records, deriving the
/// per-residue values the engine consumes: backbone completeness and
/// geometry validity, phi/psi and chi torsions, and B-factor statistics.
pub struct ModelBuilder {
    resolution: Option<f64>,
    chains: Vec<(String, Vec<ResidueRecord>)>,
}

impl ModelBuilder {
    pub fn new(resolution: Option<f64>) -> Self {
        Self {
            resolution,
            chains: Vec::new(),
        }
    }

    /// Starts a new chain; subsequent [`add_residue`](Self::add_residue)
    /// calls append to it.
    pub fn start_chain(&mut self, id: &str) -> &mut Self {
        self.chains.push((id.trim().to_string(), Vec::new()));
        self
    }

    /// Appends a residue record to the current chain.
    ///
    /// # Panics
    ///
    /// Panics if no chain has been started.
    pub fn add_residue(&mut self, record: ResidueRecord) -> &mut Self {
        self.chains
            .last_mut()
            .expect("Must start a chain before adding a residue")
            .1
            .push(record);
        self
    }

    /// Consumes the builder and derives all per-residue values.
    ///
    /// Torsions needing a neighbour (phi wants the previous C, psi the next
    /// N) are `None` at chain termini and wherever the required atoms are
    /// absent; nothing here fails on incomplete input.
    pub fn build(self) -> StructureModel {
        let mut model = StructureModel::new(self.resolution);
        for (identifier, records) in &self.chains {
            let chain_id = model.add_chain(identifier);
            for (index, record) in records.iter().enumerate() {
                let previous = if index > 0 {
                    records.get(index - 1)
                } else {
                    None
                };
                let next = records.get(index + 1);
                let residue = derive_residue(record, previous, next, chain_id);
                model.add_residue(chain_id, residue);
            }
        }
        model
    }
}

fn find_atom<'a>(record: &'a ResidueRecord, name: &str) -> Option<&'a AtomRecord> {
    let alternate = format!("{name}:A");
    record
        .atoms
        .iter()
        .find(|atom| atom.name == name || atom.name == alternate)
}

fn derive_residue(
    record: &ResidueRecord,
    previous: Option<&ResidueRecord>,
    next: Option<&ResidueRecord>,
    chain_id: ChainId,
) -> Residue {
    let mut residue = Residue::new(record.sequence_number, &record.code, chain_id);

    let n = find_atom(record, "N");
    let ca = find_atom(record, "CA");
    let c = find_atom(record, "C");
    residue.backbone_complete = n.is_some() && ca.is_some() && c.is_some();
    residue.backbone_geometry_ok = match (n, ca, c) {
        (Some(n), Some(ca), Some(c)) => {
            geometry::distance(&n.position, &ca.position) < MAX_BACKBONE_BOND_LENGTH
                && geometry::distance(&ca.position, &c.position) < MAX_BACKBONE_BOND_LENGTH
        }
        _ => false,
    };

    residue.phi = previous.and_then(|prev| {
        let prev_c = find_atom(prev, "C")?;
        Some(geometry::torsion(
            &prev_c.position,
            &n?.position,
            &ca?.position,
            &c?.position,
        ))
    });
    residue.psi = next.and_then(|next| {
        let next_n = find_atom(next, "N")?;
        Some(geometry::torsion(
            &n?.position,
            &ca?.position,
            &c?.position,
            &next_n.position,
        ))
    });
    residue.phi = residue.phi.filter(|angle| angle.is_finite());
    residue.psi = residue.psi.filter(|angle| angle.is_finite());

    (residue.chis, residue.sidechain_complete) = derive_chis(record);
    residue.metrics = derive_metrics(record, &residue);
    residue
}

fn derive_chis(record: &ResidueRecord) -> ([Option<f64>; 5], bool) {
    let mut chis = [None; 5];
    let mut complete = true;
    for (index, slot) in chis.iter_mut().enumerate() {
        let Some(names) = identifiers::chi_atom_names(&record.code, index) else {
            continue;
        };
        let atoms: Vec<_> = names
            .iter()
            .filter_map(|name| find_atom(record, name))
            .collect();
        if atoms.len() < 4 {
            complete = false;
            continue;
        }
        let angle = geometry::torsion(
            &atoms[0].position,
            &atoms[1].position,
            &atoms[2].position,
            &atoms[3].position,
        );
        *slot = Some(angle).filter(|a| a.is_finite());
    }
    (chis, complete)
}

fn derive_metrics(record: &ResidueRecord, residue: &Residue) -> ResidueMetrics {
    let mut metrics = ResidueMetrics {
        residue_fit: record.residue_fit,
        mainchain_fit: record.mainchain_fit,
        sidechain_fit: record.sidechain_fit,
        ramachandran_probability: record.ramachandran_probability,
        ..ResidueMetrics::default()
    };

    if record.atoms.is_empty() {
        return metrics;
    }
    let b_factors: Vec<f64> = record.atoms.iter().map(|atom| atom.b_factor).collect();
    let count = b_factors.len() as f64;
    let avg = b_factors.iter().sum::<f64>() / count;
    let variance = b_factors.iter().map(|b| (b - avg).powi(2)).sum::<f64>() / count;
    metrics.avg_b_factor = Some(avg);
    metrics.max_b_factor = b_factors.iter().copied().reduce(f64::max);
    metrics.std_b_factor = Some(variance.sqrt());

    // Mainchain/sidechain split only makes sense for amino acids with an
    // identified backbone.
    if residue.is_valid_amino_acid() {
        let backbone_names: Vec<&str> = ["N", "CA", "C"]
            .iter()
            .filter_map(|name| find_atom(record, name).map(|atom| atom.name.as_str()))
            .collect();
        let (mainchain, sidechain): (Vec<&AtomRecord>, Vec<&AtomRecord>) = record
            .atoms
            .iter()
            .partition(|atom| backbone_names.contains(&atom.name.as_str()));
        metrics.mainchain_b_factor = average_b(&mainchain);
        metrics.sidechain_b_factor = average_b(&sidechain);
    }
    metrics
}

fn average_b(atoms: &[&AtomRecord]) -> Option<f64> {
    if atoms.is_empty() {
        return None;
    }
    Some(atoms.iter().map(|atom| atom.b_factor).sum::<f64>() / atoms.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn backbone_residue(seqnum: i32, code: &str, offset: f64) -> ResidueRecord {
        ResidueRecord {
            sequence_number: seqnum,
            code: code.to_string(),
            atoms: vec![
                AtomRecord::new("N", Point3::new(offset, 0.0, 0.0), 10.0),
                AtomRecord::new("CA", Point3::new(offset + 1.0, 0.0, 0.0), 20.0),
                AtomRecord::new("C", Point3::new(offset + 1.0, 1.0, 0.0), 30.0),
            ],
            ..ResidueRecord::default()
        }
    }

    fn three_residue_model() -> StructureModel {
        let mut builder = ModelBuilder::new(Some(1.8));
        builder.start_chain("A");
        for i in 0..3 {
            builder.add_residue(backbone_residue(i + 1, "GLY", 3.0 * i as f64));
        }
        builder.build()
    }

    #[test]
    fn build_preserves_chain_and_residue_order() {
        let model = three_residue_model();
        assert_eq!(model.chain_count(), 1);
        let chain = model.chain_by_identifier("A").unwrap();
        assert_eq!(chain.residues().len(), 3);
        assert_eq!(model.resolution, Some(1.8));
    }

    #[test]
    fn backbone_flags_are_derived_from_atoms() {
        let model = three_residue_model();
        let chain = model.chain_by_identifier("A").unwrap();
        let residue = model.residue(chain.residues()[0]).unwrap();
        assert!(residue.backbone_complete);
        assert!(residue.backbone_geometry_ok);
    }

    #[test]
    fn stretched_backbone_bond_fails_geometry_check() {
        let mut builder = ModelBuilder::new(None);
        builder.start_chain("A");
        builder.add_residue(ResidueRecord {
            sequence_number: 1,
            code: "ALA".to_string(),
            atoms: vec![
                AtomRecord::new("N", Point3::new(0.0, 0.0, 0.0), 10.0),
                AtomRecord::new("CA", Point3::new(2.5, 0.0, 0.0), 10.0),
                AtomRecord::new("C", Point3::new(3.5, 0.0, 0.0), 10.0),
            ],
            ..ResidueRecord::default()
        });
        let model = builder.build();
        let chain = model.chain_by_identifier("A").unwrap();
        let residue = model.residue(chain.residues()[0]).unwrap();
        assert!(residue.backbone_complete);
        assert!(!residue.backbone_geometry_ok);
        assert!(!residue.is_valid_amino_acid());
    }

    #[test]
    fn phi_psi_need_a_neighbour() {
        let model = three_residue_model();
        let chain = model.chain_by_identifier("A").unwrap();
        let first = model.residue(chain.residues()[0]).unwrap();
        let middle = model.residue(chain.residues()[1]).unwrap();
        let last = model.residue(chain.residues()[2]).unwrap();

        assert!(first.phi.is_none());
        assert!(first.psi.is_some());
        assert!(middle.phi.is_some());
        assert!(middle.psi.is_some());
        assert!(last.phi.is_some());
        assert!(last.psi.is_none());
    }

    #[test]
    fn phi_psi_match_hand_computed_torsions() {
        let model = three_residue_model();
        let chain = model.chain_by_identifier("A").unwrap();
        let middle = model.residue(chain.residues()[1]).unwrap();
        // With this synthetic geometry the phi torsion is planar-cis and the
        // psi torsion planar-trans.
        assert!(middle.phi.unwrap().abs() < 1e-9);
        assert!((middle.psi.unwrap().abs() - 180.0).abs() < 1e-9);
    }

    #[test]
    fn chi_angles_are_derived_for_complete_side_chains() {
        let mut builder = ModelBuilder::new(None);
        builder.start_chain("A");
        builder.add_residue(ResidueRecord {
            sequence_number: 1,
            code: "SER".to_string(),
            atoms: vec![
                AtomRecord::new("N", Point3::new(1.0, 1.0, 0.0), 10.0),
                AtomRecord::new("CA", Point3::new(1.0, 0.0, 0.0), 10.0),
                AtomRecord::new("C", Point3::new(0.5, -0.9, 0.0), 10.0),
                AtomRecord::new("CB", Point3::new(2.0, 0.0, 0.0), 10.0),
                AtomRecord::new("OG", Point3::new(2.0, 1.0, 0.0), 10.0),
            ],
            ..ResidueRecord::default()
        });
        let model = builder.build();
        let chain = model.chain_by_identifier("A").unwrap();
        let residue = model.residue(chain.residues()[0]).unwrap();
        assert!(residue.sidechain_complete);
        // N-CA-CB-OG is the planar-cis arrangement.
        assert!(residue.chis[0].unwrap().abs() < 1e-9);
        assert!(residue.chis[1].is_none());
    }

    #[test]
    fn missing_side_chain_atom_marks_side_chain_incomplete() {
        let mut builder = ModelBuilder::new(None);
        builder.start_chain("A");
        let mut record = backbone_residue(1, "SER", 0.0);
        record
            .atoms
            .push(AtomRecord::new("CB", Point3::new(1.0, -1.0, 0.0), 10.0));
        // OG missing: chi1 cannot be computed.
        builder.add_residue(record);
        let model = builder.build();
        let chain = model.chain_by_identifier("A").unwrap();
        let residue = model.residue(chain.residues()[0]).unwrap();
        assert!(!residue.sidechain_complete);
        assert!(residue.chis[0].is_none());
    }

    #[test]
    fn codes_without_rotatable_side_chains_stay_complete() {
        let model = three_residue_model();
        let chain = model.chain_by_identifier("A").unwrap();
        let residue = model.residue(chain.residues()[0]).unwrap();
        assert!(residue.sidechain_complete);
        assert_eq!(residue.present_chis(), Vec::<f64>::new());
    }

    #[test]
    fn b_factor_statistics_cover_all_atoms() {
        let model = three_residue_model();
        let chain = model.chain_by_identifier("A").unwrap();
        let residue = model.residue(chain.residues()[0]).unwrap();
        let metrics = &residue.metrics;
        assert_eq!(metrics.avg_b_factor, Some(20.0));
        assert_eq!(metrics.max_b_factor, Some(30.0));
        let expected_std = (200.0f64 / 3.0).sqrt();
        assert!((metrics.std_b_factor.unwrap() - expected_std).abs() < 1e-9);
        assert_eq!(metrics.mainchain_b_factor, Some(20.0));
        assert_eq!(metrics.sidechain_b_factor, None);
    }

    #[test]
    fn supplied_scores_pass_through_untouched() {
        let mut builder = ModelBuilder::new(None);
        builder.start_chain("A");
        let mut record = backbone_residue(1, "GLY", 0.0);
        record.residue_fit = Some(0.82);
        record.mainchain_fit = Some(0.91);
        record.ramachandran_probability = Some(0.4);
        builder.add_residue(record);
        let model = builder.build();
        let chain = model.chain_by_identifier("A").unwrap();
        let metrics = &model.residue(chain.residues()[0]).unwrap().metrics;
        assert_eq!(metrics.residue_fit, Some(0.82));
        assert_eq!(metrics.mainchain_fit, Some(0.91));
        assert_eq!(metrics.sidechain_fit, None);
        assert_eq!(metrics.ramachandran_probability, Some(0.4));
    }
}
