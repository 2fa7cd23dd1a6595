use crate::core::models::residue::Residue;
use crate::core::reference::ReferenceData;
use crate::core::reference::metric::{Metric, REPORT_METRIC_COUNT};
use crate::core::reference::rotamer::RotamerClass;

// Ramachandran probability tiers, concordant with Coot.
const RAMA_FAVORED_THRESHOLD: f64 = 0.02;
const RAMA_ALLOWED_THRESHOLD: f64 = 0.002;

/// Report-facing classification tier of a discrete metric.
///
/// The engine's uniform ordinal convention: 0 means outlier, 1 allowed,
/// 2 favored. Reference-grid cells the population never visited collapse
/// into `Outlier` at this level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DiscreteLevel {
    Outlier = 0,
    Allowed = 1,
    Favored = 2,
}

impl DiscreteLevel {
    pub fn ordinal(&self) -> u8 {
        *self as u8
    }
}

/// The assembled per-residue, per-version output unit.
///
/// All three vectors are indexed by [`Metric::REPORT`] order. An entry is
/// `None` wherever the underlying datum is unavailable; absence never
/// aborts report generation.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRecord {
    pub continuous: [Option<f64>; REPORT_METRIC_COUNT],
    pub discrete: [Option<DiscreteLevel>; REPORT_METRIC_COUNT],
    pub percentiles: [Option<u8>; REPORT_METRIC_COUNT],
    pub marker: Option<bool>,
    pub code: String,
    pub sequence_number: i32,
}

/// Builds the metric vectors for one residue of one model version.
///
/// `resolution` is the resolution of the residue's own model version; the
/// percentile vector is one polarity-normalized lookup per continuous
/// entry, so a higher percentile always reads as better.
pub fn extract(residue: &Residue, resolution: Option<f64>, reference: &ReferenceData) -> MetricRecord {
    let chis = residue.present_chis();

    // The Ramachandran probability is only meaningful when both backbone
    // torsions exist; a terminal or broken residue stays unscored even if
    // the upstream service supplied a number.
    let rama_probability = if residue.phi.is_some() && residue.psi.is_some() {
        residue.metrics.ramachandran_probability
    } else {
        None
    };
    let rotamer_score = if residue.sidechain_complete {
        reference.rotamers.central_value_score(&residue.code, &chis)
    } else {
        None
    };

    let mut continuous = [None; REPORT_METRIC_COUNT];
    for (slot, metric) in continuous.iter_mut().zip(Metric::REPORT) {
        *slot = match metric {
            Metric::Ramachandran => rama_probability,
            Metric::Rotamer => rotamer_score,
            Metric::AvgBFactor => residue.metrics.avg_b_factor,
            Metric::MaxBFactor => residue.metrics.max_b_factor,
            Metric::StdBFactor => residue.metrics.std_b_factor,
            Metric::ResidueFit => residue.metrics.residue_fit,
            Metric::MainchainFit => residue.metrics.mainchain_fit,
            Metric::SidechainFit => residue.metrics.sidechain_fit,
        };
    }

    let rama_level = rama_probability.map(|probability| {
        if probability >= RAMA_FAVORED_THRESHOLD {
            DiscreteLevel::Favored
        } else if probability >= RAMA_ALLOWED_THRESHOLD {
            DiscreteLevel::Allowed
        } else {
            DiscreteLevel::Outlier
        }
    });

    let local_rotamer = if residue.sidechain_complete {
        reference.rotamers.classify(&residue.code, &chis)
    } else {
        None
    };
    let mut rotamer_level = local_rotamer.map(|class| match class {
        RotamerClass::Unclassified | RotamerClass::Outlier => DiscreteLevel::Outlier,
        RotamerClass::Allowed => DiscreteLevel::Allowed,
        RotamerClass::Favored => DiscreteLevel::Favored,
    });

    let mut marker = None;
    if let Some(flags) = residue.external_flags {
        // The external service's verdict wins over the local grid lookup,
        // but cannot invent a classification where none was computable.
        rotamer_level = rotamer_level.map(|_| {
            if flags.rotamer_outlier {
                DiscreteLevel::Outlier
            } else {
                DiscreteLevel::Favored
            }
        });
        marker = Some(flags.clash);
    }

    let mut discrete = [None; REPORT_METRIC_COUNT];
    for (slot, metric) in discrete.iter_mut().zip(Metric::REPORT) {
        *slot = match metric {
            Metric::Ramachandran => rama_level,
            Metric::Rotamer => rotamer_level,
            _ => None,
        };
    }

    let mut percentiles = [None; REPORT_METRIC_COUNT];
    for ((slot, metric), value) in percentiles.iter_mut().zip(Metric::REPORT).zip(continuous) {
        *slot = value.and_then(|v| reference.percentiles.percentile(metric, v, resolution, true));
    }

    MetricRecord {
        continuous,
        discrete,
        percentiles,
        marker,
        code: residue.code.clone(),
        sequence_number: residue.sequence_number,
    }
}
