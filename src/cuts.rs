//! Mechanism to apply cuts to reconstructed tracks

use crate::{numeric::Float, track::Track};
use prefix_num_ops::real::*;

/// Cuts on reconstructed tracks
///
/// All bounds are inclusive: a track sitting exactly on a threshold passes.
///
#[derive(Clone, Debug, PartialEq)]
pub struct CutParameters {
    /// Cut on maximum |z0| (cm)
    pub max_z0: Float,

    /// Cut on maximum |eta|
    pub max_eta: Float,

    /// Cut on maximum fit chi-square per degree of freedom
    pub max_chi2_per_dof: Float,

    /// Cut on maximum bend chi-square
    pub max_bend_chi2: Float,

    /// Cut on minimum transverse momentum (GeV)
    pub min_pt: Float,

    /// Cut on minimum number of stubs
    pub min_stub_count: i32,
}
//
impl CutParameters {
    /// Setup the cuts on reconstructed tracks
    ///
    /// Values are stored as given. Nonsensical thresholds (negative momenta,
    /// inverted windows...) will simply reject every track.
    ///
    pub fn new(
        max_z0: Float,
        max_eta: Float,
        max_chi2_per_dof: Float,
        max_bend_chi2: Float,
        min_pt: Float,
        min_stub_count: i32,
    ) -> Self {
        Self {
            max_z0,
            max_eta,
            max_chi2_per_dof,
            max_bend_chi2,
            min_pt,
            min_stub_count,
        }
    }

    /// Decide whether a track passes the cuts or should be rejected
    pub fn keep(&self, track: &Track) -> bool {
        abs(track.z0) <= self.max_z0
            && abs(track.eta) <= self.max_eta
            && track.chi2_per_dof() <= self.max_chi2_per_dof
            && track.bend_chi2 <= self.max_bend_chi2
            && track.pt >= self.min_pt
            && i64::from(track.stub_count) >= i64::from(self.min_stub_count)
    }
}

impl Default for CutParameters {
    /// Cuts of the tracklet emulation's quality flag
    fn default() -> Self {
        Self::new(15., 2.4, 40., 2.4, 2., 4)
    }
}
