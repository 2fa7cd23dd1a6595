use super::alignment::AlignedChain;
use super::metrics::{self, MetricRecord};
use crate::core::models::system::StructureModel;
use crate::core::reference::ReferenceData;

/// Per-chain slice of the final chart table: aligned position, then model
/// version, then the record for that residue or `None` at a gap.
#[derive(Debug, Clone)]
pub struct ChainChartData {
    pub chain_id: String,
    pub positions: Vec<Vec<Option<MetricRecord>>>,
}

/// The engine's sole output: a uniform three-dimensional table of
/// per-residue records indexed as chain, aligned position, model version
/// (oldest first, latest last). Chain order and aligned-position order are
/// exactly as produced by reconciliation and alignment.
#[derive(Debug, Clone)]
pub struct ChartData {
    pub version_count: usize,
    pub chains: Vec<ChainChartData>,
}

/// Merges aligned chains and per-residue metrics into the final table.
///
/// A record exists at `[chain][position][version]` iff that version has a
/// non-gap residue at that column; each record's percentile lookups use its
/// own version's resolution.
pub fn assemble(
    aligned_chains: &[AlignedChain],
    models: &[&StructureModel],
    reference: &ReferenceData,
) -> ChartData {
    let chains = aligned_chains
        .iter()
        .map(|aligned| ChainChartData {
            chain_id: aligned.chain_id.clone(),
            positions: aligned
                .columns
                .iter()
                .map(|column| {
                    column
                        .residues
                        .iter()
                        .zip(models)
                        .map(|(slot, model)| {
                            slot.and_then(|residue_id| model.residue(residue_id))
                                .map(|residue| {
                                    metrics::extract(residue, model.resolution, reference)
                                })
                        })
                        .collect()
                })
                .collect(),
        })
        .collect();

    ChartData {
        version_count: models.len(),
        chains,
    }
}
