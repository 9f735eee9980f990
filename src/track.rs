//! This module defines the properties of reconstructed L1 tracks

use crate::numeric::Float;
use std::fmt::{self, Display};

/// Number of barrel layers which a track can have stubs in
pub const NUM_LAYERS: usize = 6;

/// Number of endcap disks which a track can have stubs in
pub const NUM_DISKS: usize = 5;

/// Number of helix parameters of the track fit
pub const NUM_FIT_PARAMETERS: u32 = 4;

/// Speed of light, in the units that turn T·m into GeV
pub const SPEED_OF_LIGHT: Float = 0.299_792_458;

/// Magnetic field of the tracker solenoid (T)
pub const MAGNETIC_FIELD: Float = 3.8112;

/// Which barrel layers and endcap disks a track has stubs in
///
/// Bits 0 to 5 are the barrel layers L1..L6, bits 6 to 10 are the endcap
/// disks D1..D5. Layers and disks are numbered from 1, like the detector.
///
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HitPattern(u16);
//
impl HitPattern {
    /// Mask of all meaningful bits
    const VALID_BITS: u16 = (1 << (NUM_LAYERS + NUM_DISKS)) - 1;

    /// Build a hit pattern from its bit representation
    ///
    /// Bits beyond the last disk are dropped.
    ///
    pub fn from_bits(bits: u16) -> Self {
        Self(bits & Self::VALID_BITS)
    }

    /// Bit representation of this hit pattern
    pub fn bits(self) -> u16 {
        self.0
    }

    /// Record a stub in barrel layer `layer` (1-based)
    pub fn with_layer(self, layer: usize) -> Self {
        assert!((1..=NUM_LAYERS).contains(&layer), "No such layer: {}", layer);
        Self(self.0 | (1 << (layer - 1)))
    }

    /// Record a stub in endcap disk `disk` (1-based)
    pub fn with_disk(self, disk: usize) -> Self {
        assert!((1..=NUM_DISKS).contains(&disk), "No such disk: {}", disk);
        Self(self.0 | (1 << (NUM_LAYERS + disk - 1)))
    }

    /// Truth that the track has a stub in barrel layer `layer` (1-based)
    pub fn has_layer(self, layer: usize) -> bool {
        (1..=NUM_LAYERS).contains(&layer) && self.0 & (1 << (layer - 1)) != 0
    }

    /// Truth that the track has a stub in endcap disk `disk` (1-based)
    pub fn has_disk(self, disk: usize) -> bool {
        (1..=NUM_DISKS).contains(&disk) && self.0 & (1 << (NUM_LAYERS + disk - 1)) != 0
    }

    /// Number of barrel layers with a stub
    pub fn layer_count(self) -> u32 {
        (self.0 & ((1 << NUM_LAYERS) - 1)).count_ones()
    }

    /// Number of endcap disks with a stub
    pub fn disk_count(self) -> u32 {
        (self.0 >> NUM_LAYERS).count_ones()
    }
}

/// Reconstructed L1 track, as seen by the quality selection
///
/// Only carries the fit summary that quality selection needs. Ownership of
/// the full track (stubs, truth matching...) stays with whoever produced it.
///
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Track {
    /// Transverse momentum (GeV)
    pub pt: Float,

    /// Pseudorapidity
    pub eta: Float,

    /// Azimuthal angle at the point of closest approach (rad)
    pub phi: Float,

    /// Longitudinal impact parameter (cm)
    pub z0: Float,

    /// Electric charge sign, +1 or -1
    pub charge: i8,

    /// Chi-square of the fit in the r-phi plane
    pub chi2_rphi: Float,

    /// Chi-square of the fit in the r-z plane
    pub chi2_rz: Float,

    /// Consistency of the stub bend angles with the fitted curvature
    pub bend_chi2: Float,

    /// Number of stubs used in the fit
    pub stub_count: u32,

    /// Barrel layers and endcap disks the stubs sit in
    pub hit_pattern: HitPattern,

    /// Index of the phi sector in which the track was found
    pub phi_sector: u32,
}
//
impl Track {
    /// Total fit chi-square
    pub fn chi2(&self) -> Float {
        self.chi2_rphi + self.chi2_rz
    }

    /// Number of degrees of freedom of the fit (floored at 1)
    ///
    /// Each stub measures two coordinates, and the helix fit consumes
    /// NUM_FIT_PARAMETERS of them.
    ///
    pub fn degrees_of_freedom(&self) -> u32 {
        self.stub_count
            .saturating_mul(2)
            .saturating_sub(NUM_FIT_PARAMETERS)
            .max(1)
    }

    /// Fit chi-square per degree of freedom
    pub fn chi2_per_dof(&self) -> Float {
        self.chi2() / (self.degrees_of_freedom() as Float)
    }

    /// Tangent of the dip angle, lambda = pi/2 - theta
    pub fn tanl(&self) -> Float {
        self.eta.sinh()
    }

    /// Signed inverse radius of curvature (1/cm)
    pub fn rinv(&self) -> Float {
        let sign = if self.charge < 0 { -1. } else { 1. };
        // 0.01 converts the radius from m to cm
        sign * 0.01 * SPEED_OF_LIGHT * MAGNETIC_FIELD / self.pt
    }
}

impl Display for Track {
    /// Dump the fit summary on a single line
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            fmt,
            "pt={} eta={} phi={} z0={} q={} chi2={}/{} bendchi2={} stubs={} hits={:#013b} sector={}",
            self.pt,
            self.eta,
            self.phi,
            self.z0,
            self.charge,
            self.chi2(),
            self.degrees_of_freedom(),
            self.bend_chi2,
            self.stub_count,
            self.hit_pattern.bits(),
            self.phi_sector,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_pattern_counts_layers_and_disks_separately() {
        let hits = HitPattern::default()
            .with_layer(1)
            .with_layer(2)
            .with_layer(6)
            .with_disk(1)
            .with_disk(5);
        assert_eq!(hits.layer_count(), 3);
        assert_eq!(hits.disk_count(), 2);
        assert!(hits.has_layer(6));
        assert!(!hits.has_layer(3));
        assert!(hits.has_disk(5));
        assert!(!hits.has_disk(2));
        assert!(!hits.has_layer(0));
        assert!(!hits.has_disk(6));
    }

    #[test]
    fn hit_pattern_drops_unknown_bits() {
        let hits = HitPattern::from_bits(u16::MAX);
        assert_eq!(hits.layer_count(), NUM_LAYERS as u32);
        assert_eq!(hits.disk_count(), NUM_DISKS as u32);
        assert_eq!(hits.bits(), 0b111_1111_1111);
    }

    #[test]
    fn chi2_per_dof_uses_two_measurements_per_stub() {
        let track = Track {
            chi2_rphi: 6.,
            chi2_rz: 2.,
            stub_count: 4,
            ..Track::default()
        };
        assert_eq!(track.degrees_of_freedom(), 4);
        assert_eq!(track.chi2_per_dof(), 2.);
    }

    #[test]
    fn degrees_of_freedom_never_reach_zero() {
        let track = Track {
            chi2_rphi: 3.,
            stub_count: 2,
            ..Track::default()
        };
        assert_eq!(track.degrees_of_freedom(), 1);
        assert_eq!(track.chi2_per_dof(), 3.);
    }

    #[test]
    fn degrees_of_freedom_saturate_on_huge_stub_counts() {
        let track = Track {
            chi2_rphi: 8.,
            stub_count: 3_000_000_000,
            ..Track::default()
        };
        assert_eq!(track.degrees_of_freedom(), u32::MAX - NUM_FIT_PARAMETERS);
        assert!(track.chi2_per_dof() < 1e-8);
    }

    #[test]
    fn curvature_follows_charge() {
        let positive = Track {
            pt: 2.,
            charge: 1,
            ..Track::default()
        };
        let negative = Track {
            charge: -1,
            ..positive.clone()
        };
        assert!(positive.rinv() > 0.);
        assert_eq!(negative.rinv(), -positive.rinv());
        let expected = 0.01 * SPEED_OF_LIGHT * MAGNETIC_FIELD / 2.;
        assert!((positive.rinv() - expected).abs() < 1e-6);
    }
}
