use crate::core::models::system::StructureModel;
use crate::core::reference::ReferenceData;
use crate::engine::alignment::{self, AlignedChain};
use crate::engine::assemble::{self, ChartData};
use crate::engine::error::EngineError;
use crate::engine::reconcile;
use tracing::{info, instrument};

/// Produces the chart table for up to two versions of a model.
///
/// This is the engine's public entry point. It reconciles the chain sets,
/// aligns residue sequences so corresponding residues share a column,
/// extracts and normalizes every metric, and lays the result out as
/// chain x aligned position x version. Model versions in the output are
/// ordered oldest first, latest last; each version's percentile lookups use
/// that version's own resolution.
///
/// All model data is owned by this single call; only `reference` outlives
/// it.
///
/// # Errors
///
/// Returns [`EngineError::UnsupportedTopology`] when the latest model has
/// chains the previous model lacks, and [`EngineError::EmptyModel`] when a
/// version retains no usable chains after amino-acid filtering. Missing
/// per-residue data never fails; it surfaces as `None` entries in the
/// affected cells.
#[instrument(skip_all, name = "chart_data_workflow")]
pub fn chart_data(
    latest: &StructureModel,
    previous: Option<&StructureModel>,
    reference: &ReferenceData,
) -> Result<ChartData, EngineError> {
    let models: Vec<&StructureModel> = match previous {
        Some(previous) => vec![previous, latest],
        None => {
            tracing::warn!("Previous model not supplied; the report will not support comparison");
            vec![latest]
        }
    };

    // === Phase 1: Reconcile chain sets across versions ===
    let chain_sets = reconcile::reconcile(&models)?;
    info!(
        "Reconciled {} chain(s) across {} model version(s)",
        chain_sets.len(),
        models.len()
    );

    // === Phase 2: Align residue sequences per chain ===
    let aligned: Vec<AlignedChain> = chain_sets
        .iter()
        .map(|chain_set| alignment::align_residues(chain_set, &models))
        .collect();

    // === Phase 3: Extract metrics and assemble the chart table ===
    let chart = assemble::assemble(&aligned, &models, reference);
    info!(
        "Assembled chart data for {} chain(s), {} aligned position(s) in total",
        chart.chains.len(),
        chart
            .chains
            .iter()
            .map(|chain| chain.positions.len())
            .sum::<usize>()
    );
    Ok(chart)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::ids::ChainId;
    use crate::core::models::residue::Residue;
    use crate::core::reference::ReferenceDataPaths;
    use crate::engine::metrics::DiscreteLevel;
    use std::fmt::Write as _;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    struct TestSetup {
        reference: ReferenceData,
        // Keeps the reference files alive for the duration of a test.
        _temp_dir: TempDir,
    }

    fn setup() -> TestSetup {
        let temp_dir = TempDir::new().unwrap();
        let write = |name: &str, content: &str| {
            let path = temp_dir.path().join(name);
            let mut file = File::create(&path).unwrap();
            write!(file, "{}", content).unwrap();
            path
        };

        // Serine-only grid over chi1: the bin centered on 60 degrees is
        // favored, the bin centered on 150 allowed, everything else
        // unclassified.
        let rotamer_grid = write(
            "rotamers.toml",
            r#"
[SER]
offsets = [0.0]
ranges = [[0.0, 360.0]]
widths = [10.0]
bins = [36]
packed = [0, 12, 0, 2, 0, 0, 0, 0, 0]
"#,
        );
        let central_values = write(
            "central_values.csv",
            "code,rotamer,chi_mean_1,chi_mean_2,chi_mean_3,chi_mean_4,chi_sd_1,chi_sd_2,chi_sd_3,chi_sd_4\n\
             SER,p,60.0,,,,10.0,,,\n",
        );

        let metric_names: Vec<&str> = crate::core::reference::metric::Metric::ALL
            .iter()
            .map(|m| m.table_name())
            .collect();
        let mut percentiles_csv = format!("bin,percentile,{}\n", metric_names.join(","));
        for percentile in 1..=99 {
            let values = vec![percentile.to_string(); metric_names.len()];
            writeln!(percentiles_csv, "All,{},{}", percentile, values.join(",")).unwrap();
            writeln!(percentiles_csv, "<10,{},{}", percentile, values.join(",")).unwrap();
        }
        let percentiles = write("percentiles.csv", &percentiles_csv);

        let mut bins_csv = "percentile,resolution\n".to_string();
        for (index, cutpoint) in (10..=90).step_by(10).enumerate() {
            writeln!(bins_csv, "{},{}", cutpoint, 1.5 + 0.5 * index as f64).unwrap();
        }
        let resolution_bins = write("resolution_bins.csv", &bins_csv);

        let reference = ReferenceData::load(&ReferenceDataPaths {
            rotamer_grid,
            rotamer_central_values: central_values,
            percentiles,
            resolution_bins,
        })
        .unwrap();
        TestSetup {
            reference,
            _temp_dir: temp_dir,
        }
    }

    fn scored_residue(seqnum: i32, code: &str, chain_id: ChainId) -> Residue {
        let mut residue = Residue::new(seqnum, code, chain_id);
        residue.backbone_complete = true;
        residue.backbone_geometry_ok = true;
        residue.phi = Some(-60.0);
        residue.psi = Some(-45.0);
        residue.sidechain_complete = true;
        residue.metrics.ramachandran_probability = Some(0.5);
        residue.metrics.avg_b_factor = Some(25.5);
        residue.metrics.max_b_factor = Some(40.0);
        if code == "SER" {
            residue.chis = [Some(64.0), None, None, None, None];
        }
        residue
    }

    fn model_of(codes: &[&str], resolution: Option<f64>) -> StructureModel {
        let mut model = StructureModel::new(resolution);
        let cid = model.add_chain("A");
        for (index, &code) in codes.iter().enumerate() {
            model.add_residue(cid, scored_residue(index as i32 + 1, code, cid));
        }
        model
    }

    #[test]
    fn two_version_report_pads_insertions_with_gaps() {
        let setup = setup();
        let previous = model_of(&["GLY", "SER"], Some(1.2));
        let latest = model_of(&["GLY", "ALA", "SER"], Some(1.0));

        let chart = chart_data(&latest, Some(&previous), &setup.reference).unwrap();
        assert_eq!(chart.version_count, 2);
        assert_eq!(chart.chains.len(), 1);
        let chain = &chart.chains[0];
        assert_eq!(chain.positions.len(), 3);
        assert!(chain.positions[1][0].is_none());
        assert_eq!(chain.positions[1][1].as_ref().unwrap().code, "ALA");
    }

    #[test]
    fn serine_rotamer_is_classified_and_normalized() {
        let setup = setup();
        let latest = model_of(&["GLY", "SER"], Some(1.0));

        let chart = chart_data(&latest, None, &setup.reference).unwrap();
        let record = chart.chains[0].positions[1][0].as_ref().unwrap();

        // chi1 64 snaps to the favored bin at 60 and sits 0.4 sigma from
        // the central value.
        assert_eq!(record.discrete[1], Some(DiscreteLevel::Favored));
        let rotamer_score = record.continuous[1].unwrap();
        assert!((rotamer_score - 0.4).abs() < 1e-12);
        // Raw percentile of 0.4 in the identity table is 1; rotamer score
        // is smaller-is-better, so normalization flips it to 100.
        assert_eq!(record.percentiles[1], Some(100));
        // Ramachandran is larger-is-better: probability 0.5 ranks raw 1 and
        // stays 1.
        assert_eq!(record.discrete[0], Some(DiscreteLevel::Favored));
        assert_eq!(record.percentiles[0], Some(1));
    }

    #[test]
    fn single_version_report_has_one_slot_per_position() {
        let setup = setup();
        let latest = model_of(&["GLY", "ALA"], None);
        let chart = chart_data(&latest, None, &setup.reference).unwrap();
        assert_eq!(chart.version_count, 1);
        for position in &chart.chains[0].positions {
            assert_eq!(position.len(), 1);
        }
    }

    #[test]
    fn new_chain_in_the_latest_model_aborts_the_report() {
        let setup = setup();
        let previous = model_of(&["GLY", "SER"], None);
        let mut latest = model_of(&["GLY", "SER"], None);
        let extra = latest.add_chain("B");
        latest.add_residue(extra, scored_residue(1, "ALA", extra));

        let result = chart_data(&latest, Some(&previous), &setup.reference);
        assert!(matches!(
            result,
            Err(EngineError::UnsupportedTopology { chain_ids }) if chain_ids == vec!["B"]
        ));
    }

    #[test]
    fn models_without_amino_acids_abort_the_report() {
        let setup = setup();
        let mut latest = StructureModel::new(None);
        let cid = latest.add_chain("A");
        latest.add_residue(cid, Residue::new(1, "HOH", cid));

        let result = chart_data(&latest, None, &setup.reference);
        assert!(matches!(result, Err(EngineError::EmptyModel { version: 0 })));
    }

    #[test]
    fn missing_per_residue_data_degrades_to_null_cells() {
        let setup = setup();
        let mut latest = StructureModel::new(None);
        let cid = latest.add_chain("A");
        let mut bare = Residue::new(1, "GLY", cid);
        bare.backbone_complete = true;
        bare.backbone_geometry_ok = true;
        latest.add_residue(cid, bare);

        let chart = chart_data(&latest, None, &setup.reference).unwrap();
        let record = chart.chains[0].positions[0][0].as_ref().unwrap();
        assert_eq!(record.continuous, [None; 6]);
        assert_eq!(record.discrete, [None; 6]);
        assert_eq!(record.percentiles, [None; 6]);
        assert_eq!(record.marker, None);
    }

    #[test]
    fn external_flags_override_the_grid_classification() {
        let setup = setup();
        let mut latest = model_of(&["GLY", "SER"], None);
        latest.apply_external_flags(&[("A".to_string(), 2)], &[("A".to_string(), 2)]);

        let chart = chart_data(&latest, None, &setup.reference).unwrap();
        let serine = chart.chains[0].positions[1][0].as_ref().unwrap();
        assert_eq!(serine.discrete[1], Some(DiscreteLevel::Outlier));
        assert_eq!(serine.marker, Some(true));

        let glycine = chart.chains[0].positions[0][0].as_ref().unwrap();
        assert_eq!(glycine.marker, Some(false));
    }
}
