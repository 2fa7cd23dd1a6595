use super::error::EngineError;
use crate::core::models::ids::ResidueId;
use crate::core::models::system::StructureModel;
use std::collections::HashSet;

/// The reconciled chain groupings to be aligned: one entry per retained
/// chain, in latest-model chain order, holding the filtered residue list of
/// every model version (oldest first, latest last).
#[derive(Debug, Clone)]
pub struct ChainSet {
    pub chain_id: String,
    pub versions: Vec<Vec<ResidueId>>,
}

// Filtered view of one model: retained residue IDs per chain, in chain
// order. Built fresh rather than mutating the model.
struct FilteredModel {
    chains: Vec<(String, Vec<ResidueId>)>,
}

impl FilteredModel {
    fn chain(&self, chain_id: &str) -> Option<&Vec<ResidueId>> {
        self.chains
            .iter()
            .find(|(id, _)| id == chain_id)
            .map(|(_, residues)| residues)
    }
}

/// Matches chains between model versions and filters residues down to
/// canonical amino acids with intact backbones.
///
/// `models` is ordered oldest first, latest last (one or two versions).
///
/// # Errors
///
/// Returns [`EngineError::UnsupportedTopology`] when the latest model has a
/// chain identifier the previous model lacks, and [`EngineError::EmptyModel`]
/// when filtering leaves any version without chains. Chains present only in
/// the previous model, and chains emptied by filtering, are dropped with a
/// warning.
pub fn reconcile(models: &[&StructureModel]) -> Result<Vec<ChainSet>, EngineError> {
    let mut filtered: Vec<FilteredModel> = models.iter().map(|model| filter_model(model)).collect();

    // A chain emptied by filtering in any version disappears from all of
    // them, so alignment never sees a zero-length sequence.
    let mut empty_chain_ids: HashSet<String> = HashSet::new();
    for model in &filtered {
        for (chain_id, residues) in &model.chains {
            if residues.is_empty() {
                empty_chain_ids.insert(chain_id.clone());
            }
        }
    }
    if !empty_chain_ids.is_empty() {
        let mut sorted: Vec<&str> = empty_chain_ids.iter().map(String::as_str).collect();
        sorted.sort_unstable();
        tracing::warn!(
            "Ignoring chains with no amino-acid residues: {}",
            sorted.join(", ")
        );
        for model in &mut filtered {
            model
                .chains
                .retain(|(chain_id, _)| !empty_chain_ids.contains(chain_id));
        }
    }

    for (version, model) in filtered.iter().enumerate() {
        if model.chains.is_empty() {
            return Err(EngineError::EmptyModel { version });
        }
    }

    let latest = filtered.last().expect("at least one model version");
    let previous = if filtered.len() > 1 {
        Some(&filtered[filtered.len() - 2])
    } else {
        None
    };

    if let Some(previous) = previous {
        let mut extra_chain_ids: Vec<String> = latest
            .chains
            .iter()
            .filter(|(chain_id, _)| previous.chain(chain_id).is_none())
            .map(|(chain_id, _)| chain_id.clone())
            .collect();
        if !extra_chain_ids.is_empty() {
            extra_chain_ids.sort_unstable();
            return Err(EngineError::UnsupportedTopology {
                chain_ids: extra_chain_ids,
            });
        }

        let lost_chain_ids: Vec<&str> = previous
            .chains
            .iter()
            .filter(|(chain_id, _)| latest.chain(chain_id).is_none())
            .map(|(chain_id, _)| chain_id.as_str())
            .collect();
        if !lost_chain_ids.is_empty() {
            tracing::warn!(
                "Chains {} from the previous model are absent from the latest model and will not \
                 be represented in the report",
                lost_chain_ids.join(", ")
            );
        }
    }

    let chain_sets = latest
        .chains
        .iter()
        .map(|(chain_id, latest_residues)| {
            let mut versions = Vec::with_capacity(filtered.len());
            if let Some(previous) = previous {
                // Guaranteed present: an absent chain is an unsupported
                // topology handled above.
                if let Some(previous_residues) = previous.chain(chain_id) {
                    versions.push(previous_residues.clone());
                }
            }
            versions.push(latest_residues.clone());
            ChainSet {
                chain_id: chain_id.clone(),
                versions,
            }
        })
        .collect();
    Ok(chain_sets)
}

fn filter_model(model: &StructureModel) -> FilteredModel {
    let mut chains = Vec::with_capacity(model.chain_count());
    for chain in model.chains_iter() {
        let retained: Vec<ResidueId> = chain
            .residues()
            .iter()
            .copied()
            .filter(|&residue_id| {
                model
                    .residue(residue_id)
                    .is_some_and(|residue| residue.is_valid_amino_acid())
            })
            .collect();
        let removed = chain.residues().len() - retained.len();
        if removed > 0 {
            tracing::warn!(
                "Filtered {} residue(s) of chain {} that are not amino acids with intact backbones",
                removed,
                chain.id
            );
        }
        chains.push((chain.id.clone(), retained));
    }
    FilteredModel { chains }
}
