/// Which direction of a metric's raw value means "better".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    LargerBetter,
    SmallerBetter,
}

/// How the rendering layer presents a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// Shown as a classification band (outlier/allowed/favored).
    Discrete,
    /// Shown as a continuous magnitude.
    Continuous,
}

/// The stable enumeration of per-residue quality metrics.
///
/// Downstream consumers rely on metric vectors having fixed cardinality and
/// fixed order; this enum (not string keys) is the single source of that
/// order. All eight metrics appear in the percentile reference tables;
/// [`Metric::REPORT`] is the subset and order that the assembled chart data
/// carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Ramachandran,
    Rotamer,
    AvgBFactor,
    MaxBFactor,
    StdBFactor,
    ResidueFit,
    MainchainFit,
    SidechainFit,
}

/// Number of metrics in each output vector of a metric record.
pub const REPORT_METRIC_COUNT: usize = 6;

impl Metric {
    pub const ALL: [Metric; 8] = [
        Metric::Ramachandran,
        Metric::Rotamer,
        Metric::AvgBFactor,
        Metric::MaxBFactor,
        Metric::StdBFactor,
        Metric::ResidueFit,
        Metric::MainchainFit,
        Metric::SidechainFit,
    ];

    /// The metrics carried in chart-data vectors, in vector order.
    pub const REPORT: [Metric; REPORT_METRIC_COUNT] = [
        Metric::Ramachandran,
        Metric::Rotamer,
        Metric::AvgBFactor,
        Metric::MaxBFactor,
        Metric::MainchainFit,
        Metric::SidechainFit,
    ];

    /// Column name in the percentile reference table.
    pub fn table_name(&self) -> &'static str {
        match self {
            Metric::Ramachandran => "Ramachandran Score",
            Metric::Rotamer => "Rotamer Score",
            Metric::AvgBFactor => "Avg B-factor",
            Metric::MaxBFactor => "Max B-factor",
            Metric::StdBFactor => "Std B-factor",
            Metric::ResidueFit => "Residue Fit",
            Metric::MainchainFit => "Mainchain Fit",
            Metric::SidechainFit => "Sidechain Fit",
        }
    }

    /// Compact label for chart axes.
    pub fn short_name(&self) -> &'static str {
        match self {
            Metric::Ramachandran => "Rama",
            Metric::Rotamer => "Rota",
            Metric::AvgBFactor => "Avg B",
            Metric::MaxBFactor => "Max B",
            Metric::StdBFactor => "Std B",
            Metric::ResidueFit => "Res. Fit",
            Metric::MainchainFit => "MC Fit",
            Metric::SidechainFit => "SC Fit",
        }
    }

    pub fn polarity(&self) -> Polarity {
        match self {
            Metric::Ramachandran => Polarity::LargerBetter,
            _ => Polarity::SmallerBetter,
        }
    }

    pub fn kind(&self) -> MetricKind {
        match self {
            Metric::Ramachandran | Metric::Rotamer => MetricKind::Discrete,
            _ => MetricKind::Continuous,
        }
    }

    pub fn from_table_name(name: &str) -> Option<Metric> {
        Metric::ALL
            .into_iter()
            .find(|metric| metric.table_name() == name.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_names_round_trip() {
        for metric in Metric::ALL {
            assert_eq!(Metric::from_table_name(metric.table_name()), Some(metric));
        }
        assert_eq!(Metric::from_table_name("No Such Metric"), None);
    }

    #[test]
    fn report_vector_order_is_stable() {
        assert_eq!(
            Metric::REPORT,
            [
                Metric::Ramachandran,
                Metric::Rotamer,
                Metric::AvgBFactor,
                Metric::MaxBFactor,
                Metric::MainchainFit,
                Metric::SidechainFit,
            ]
        );
    }

    #[test]
    fn only_ramachandran_is_larger_better() {
        for metric in Metric::ALL {
            let expected = if metric == Metric::Ramachandran {
                Polarity::LargerBetter
            } else {
                Polarity::SmallerBetter
            };
            assert_eq!(metric.polarity(), expected);
        }
    }

    #[test]
    fn discrete_metrics_are_the_two_classified_scores() {
        assert_eq!(Metric::Ramachandran.kind(), MetricKind::Discrete);
        assert_eq!(Metric::Rotamer.kind(), MetricKind::Discrete);
        assert_eq!(Metric::AvgBFactor.kind(), MetricKind::Continuous);
    }
}
