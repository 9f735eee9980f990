//! This module measures how well a quality selector separates genuine tracks
//! from fake ones: ROC curve, and true/false positive rates as a function of
//! track kinematics.
//!
//! Genuine tracks are the positives. A track is predicted positive when its
//! score is strictly above the working point threshold.

use crate::numeric::Float;

/// Working point used for the binned rates
pub const DEFAULT_THRESHOLD: Float = 0.5;

/// Binning of the rates vs. pseudorapidity
pub const ETA_RANGE: (Float, Float) = (-3.5, 3.5);
/// Number of pseudorapidity bins
pub const ETA_BINS: usize = 30;

/// Binning of the rates vs. transverse momentum (GeV)
pub const PT_RANGE: (Float, Float) = (2., 100.);
/// Number of transverse momentum bins
pub const PT_BINS: usize = 10;

/// Score of a track whose truth is known
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LabelledScore {
    /// Quality score given by the selector
    pub score: Float,

    /// Whether the track was matched to a real particle
    pub genuine: bool,

    /// Pseudorapidity of the track
    pub eta: Float,

    /// Transverse momentum of the track (GeV)
    pub pt: Float,
}

/// This struct accumulates the confusion counts of a classifier at one
/// working point
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RateCounter {
    /// Number of genuine tracks
    positives: usize,

    /// Number of fake tracks
    negatives: usize,

    /// Number of genuine tracks scored above threshold
    true_positives: usize,

    /// Number of fake tracks scored above threshold
    false_positives: usize,
}
//
impl RateCounter {
    /// Integrate one labelled score, given the working point threshold
    pub fn integrate(&mut self, sample: &LabelledScore, threshold: Float) {
        let selected = sample.score > threshold;
        if sample.genuine {
            self.positives += 1;
            self.true_positives += selected as usize;
        } else {
            self.negatives += 1;
            self.false_positives += selected as usize;
        }
    }

    /// Integrate counts from another RateCounter
    pub fn merge(&mut self, other: Self) {
        self.positives += other.positives;
        self.negatives += other.negatives;
        self.true_positives += other.true_positives;
        self.false_positives += other.false_positives;
    }

    /// Number of genuine tracks
    pub fn positives(&self) -> usize {
        self.positives
    }

    /// Number of fake tracks
    pub fn negatives(&self) -> usize {
        self.negatives
    }

    /// Fraction of genuine tracks which are selected, if there are any
    pub fn tpr(&self) -> Option<Float> {
        (self.positives > 0).then(|| self.true_positives as Float / self.positives as Float)
    }

    /// Fraction of fake tracks which are selected, if there are any
    pub fn fpr(&self) -> Option<Float> {
        (self.negatives > 0).then(|| self.false_positives as Float / self.negatives as Float)
    }
}

/// Point of a ROC curve
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RocPoint {
    /// Score threshold of this working point
    pub threshold: Float,

    /// False positive rate
    pub fpr: Float,

    /// True positive rate
    pub tpr: Float,
}

/// Compute a ROC curve with working points at thresholds i/n, i = 0..n
///
/// The curve is empty when genuine or fake tracks are missing, since one of
/// the rates would then be undefined.
///
pub fn roc_curve(samples: &[LabelledScore], num_points: usize) -> Vec<RocPoint> {
    (0..num_points)
        .map(|i| i as Float / num_points as Float)
        .map_while(|threshold| {
            let mut counter = RateCounter::default();
            for sample in samples {
                counter.integrate(sample, threshold);
            }
            Some(RocPoint {
                threshold,
                fpr: counter.fpr()?,
                tpr: counter.tpr()?,
            })
        })
        .collect()
}

/// A rate measured in one bin of a kinematic variable
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RatePoint {
    /// Lower edge of the bin
    pub low_edge: Float,

    /// Rate measured in the bin
    pub rate: Float,
}

/// True and false positive rates as a function of some track quantity
///
/// Bins without genuine (resp. fake) tracks have no TPR (resp. FPR) point.
///
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BinnedRates {
    /// True positive rate in each bin with genuine tracks
    pub tpr: Vec<RatePoint>,

    /// False positive rate in each bin with fake tracks
    pub fpr: Vec<RatePoint>,
}

/// Compute true and false positive rates in `num_bins` bins of `quantity`
/// spanning `range`. Bins are open on the low side and closed on the high
/// side, so tracks sitting exactly at the lower bound are not counted.
pub fn rates_vs(
    samples: &[LabelledScore],
    quantity: impl Fn(&LabelledScore) -> Float,
    range: (Float, Float),
    num_bins: usize,
    threshold: Float,
) -> BinnedRates {
    let (low, high) = range;
    let bin_width = (high - low) / num_bins as Float;

    // Edges are computed from the bin index, never accumulated
    let mut rates = BinnedRates::default();
    for bin in 0..num_bins {
        let low_edge = low + bin as Float * bin_width;
        let high_edge = low + (bin + 1) as Float * bin_width;
        let mut counter = RateCounter::default();
        for sample in samples {
            let x = quantity(sample);
            if x > low_edge && x <= high_edge {
                counter.integrate(sample, threshold);
            }
        }
        if let Some(rate) = counter.tpr() {
            rates.tpr.push(RatePoint { low_edge, rate });
        }
        if let Some(rate) = counter.fpr() {
            rates.fpr.push(RatePoint { low_edge, rate });
        }
    }
    rates
}

/// Rates as a function of pseudorapidity, at the default working point
pub fn rates_vs_eta(samples: &[LabelledScore]) -> BinnedRates {
    rates_vs(samples, |s| s.eta, ETA_RANGE, ETA_BINS, DEFAULT_THRESHOLD)
}

/// Rates as a function of transverse momentum, at the default working point
pub fn rates_vs_pt(samples: &[LabelledScore]) -> BinnedRates {
    rates_vs(samples, |s| s.pt, PT_RANGE, PT_BINS, DEFAULT_THRESHOLD)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(score: Float, genuine: bool, eta: Float, pt: Float) -> LabelledScore {
        LabelledScore {
            score,
            genuine,
            eta,
            pt,
        }
    }

    #[test]
    fn counter_rates() {
        let mut counter = RateCounter::default();
        assert_eq!(counter.tpr(), None);
        assert_eq!(counter.fpr(), None);
        counter.integrate(&sample(0.9, true, 0., 5.), 0.5);
        counter.integrate(&sample(0.2, true, 0., 5.), 0.5);
        counter.integrate(&sample(0.6, false, 0., 5.), 0.5);
        // Scores equal to the threshold are not selected
        counter.integrate(&sample(0.5, false, 0., 5.), 0.5);
        assert_eq!(counter.tpr(), Some(0.5));
        assert_eq!(counter.fpr(), Some(0.5));

        let mut other = RateCounter::default();
        other.integrate(&sample(0.7, true, 0., 5.), 0.5);
        counter.merge(other);
        assert_eq!(counter.positives(), 3);
        assert_eq!(counter.negatives(), 2);
        assert_eq!(counter.tpr(), Some(2. / 3.));
    }

    #[test]
    fn roc_of_a_perfect_classifier() {
        let samples = [
            sample(0.99, true, 0., 5.),
            sample(0.95, true, 0., 5.),
            sample(0., false, 0., 5.),
        ];
        let roc = roc_curve(&samples, 10);
        assert_eq!(roc.len(), 10);
        assert_eq!(roc[0].threshold, 0.);
        for point in &roc {
            assert_eq!(point.tpr, 1.);
            assert_eq!(point.fpr, 0.);
        }
    }

    #[test]
    fn roc_rates_decrease_with_threshold() {
        let samples = (0..100)
            .map(|i| sample(i as Float / 100., i % 3 != 0, 0., 5.))
            .collect::<Vec<_>>();
        let roc = roc_curve(&samples, 30);
        assert_eq!(roc.len(), 30);
        for pair in roc.windows(2) {
            assert!(pair[1].threshold > pair[0].threshold);
            assert!(pair[1].tpr <= pair[0].tpr);
            assert!(pair[1].fpr <= pair[0].fpr);
        }
    }

    #[test]
    fn roc_needs_both_classes() {
        let samples = [sample(0.9, true, 0., 5.)];
        assert!(roc_curve(&samples, 30).is_empty());
    }

    #[test]
    fn binned_rates_skip_empty_bins() {
        let samples = [
            sample(0.9, true, 0.1, 5.),
            sample(0.1, true, 0.2, 5.),
            sample(0.8, false, -3.0, 5.),
            // Exactly on the lower edge of the range, hence outside
            sample(0.8, false, -3.5, 5.),
        ];
        let rates = rates_vs_eta(&samples);
        assert_eq!(rates.tpr.len(), 1);
        assert!((rates.tpr[0].low_edge - 0.).abs() < 1e-6);
        assert_eq!(rates.tpr[0].rate, 0.5);
        assert_eq!(rates.fpr.len(), 1);
        assert!((rates.fpr[0].low_edge + 3.0333333).abs() < 1e-5);
        assert_eq!(rates.fpr[0].rate, 1.);
    }

    #[test]
    fn pt_binning() {
        let samples = [
            sample(0.9, true, 0., 11.),
            sample(0.9, false, 0., 99.),
            sample(0.9, false, 0., 150.),
        ];
        let rates = rates_vs_pt(&samples);
        assert_eq!(rates.tpr, vec![RatePoint { low_edge: 2., rate: 1. }]);
        assert_eq!(rates.fpr.len(), 1);
        assert!((rates.fpr[0].low_edge - 90.2).abs() < 1e-6);
    }
}
