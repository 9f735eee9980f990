//! Catalogue of the track quantities that can feed a learned model

use crate::{
    error::ConfigurationError,
    numeric::{reals, Float},
    track::{Track, NUM_DISKS, NUM_LAYERS},
};
use prefix_num_ops::real::*;
use std::{
    fmt::{self, Display},
    str::FromStr,
};

/// A named scalar quantity derived from a track
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Feature {
    /// Transverse momentum (GeV)
    Pt,
    /// Pseudorapidity
    Eta,
    /// Azimuthal angle
    Phi,
    /// Longitudinal impact parameter (cm)
    Z0,
    /// Signed inverse radius of curvature (1/cm)
    Rinv,
    /// Tangent of the dip angle
    Tanl,
    /// Total fit chi-square
    Chi2,
    /// Fit chi-square per degree of freedom
    Chi2Dof,
    /// Chi-square of the r-phi fit
    Chi2RPhi,
    /// Chi-square of the r-z fit
    Chi2Rz,
    /// Bend chi-square
    BendChi2,
    /// Logarithm of the total fit chi-square
    LogChi2,
    /// Logarithm of the bend chi-square
    LogBendChi2,
    /// Logarithm of the r-phi chi-square
    LogChi2RPhi,
    /// Logarithm of the r-z chi-square
    LogChi2Rz,
    /// Number of stubs
    NStubs,
    /// Whether barrel layer N (1-based) has a stub
    LayerHit(usize),
    /// Whether endcap disk N (1-based) has a stub
    DiskHit(usize),
    /// Number of barrel layers with a stub
    LayerTotal,
    /// Number of endcap disks with a stub
    DiskTotal,
    /// Phi sector index
    PhiSector,
}
//
impl Feature {
    /// Compute this quantity for a given track
    pub fn value(self, track: &Track) -> Float {
        let flag = |hit: bool| if hit { 1. } else { 0. };
        match self {
            Feature::Pt => track.pt,
            Feature::Eta => track.eta,
            Feature::Phi => track.phi,
            Feature::Z0 => track.z0,
            Feature::Rinv => track.rinv(),
            Feature::Tanl => track.tanl(),
            Feature::Chi2 => track.chi2(),
            Feature::Chi2Dof => track.chi2_per_dof(),
            Feature::Chi2RPhi => track.chi2_rphi,
            Feature::Chi2Rz => track.chi2_rz,
            Feature::BendChi2 => track.bend_chi2,
            Feature::LogChi2 => safe_ln(track.chi2()),
            Feature::LogBendChi2 => safe_ln(track.bend_chi2),
            Feature::LogChi2RPhi => safe_ln(track.chi2_rphi),
            Feature::LogChi2Rz => safe_ln(track.chi2_rz),
            Feature::NStubs => track.stub_count as Float,
            Feature::LayerHit(layer) => flag(track.hit_pattern.has_layer(layer)),
            Feature::DiskHit(disk) => flag(track.hit_pattern.has_disk(disk)),
            Feature::LayerTotal => track.hit_pattern.layer_count() as Float,
            Feature::DiskTotal => track.hit_pattern.disk_count() as Float,
            Feature::PhiSector => track.phi_sector as Float,
        }
    }
}

/// Logarithm which stays finite for perfect (zero chi-square) fits
fn safe_ln(x: Float) -> Float {
    ln(x.max(reals::MIN_POSITIVE))
}

/// Parse an indexed feature name such as "lay3_hits"
fn parse_indexed(name: &str, prefix: &str, max: usize) -> Option<usize> {
    let index = name.strip_prefix(prefix)?.strip_suffix("_hits")?;
    let index = index.parse::<usize>().ok()?;
    (1..=max).contains(&index).then_some(index)
}

impl FromStr for Feature {
    type Err = ConfigurationError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let feature = match name {
            "pt" => Feature::Pt,
            "eta" => Feature::Eta,
            "phi" => Feature::Phi,
            "z0" => Feature::Z0,
            "rinv" => Feature::Rinv,
            "tanl" => Feature::Tanl,
            "chi2" => Feature::Chi2,
            "chi2dof" => Feature::Chi2Dof,
            "chi2rphi" => Feature::Chi2RPhi,
            "chi2rz" => Feature::Chi2Rz,
            "bendchi2" => Feature::BendChi2,
            "log_chi2" => Feature::LogChi2,
            "log_bendchi2" => Feature::LogBendChi2,
            "log_chi2rphi" => Feature::LogChi2RPhi,
            "log_chi2rz" => Feature::LogChi2Rz,
            "nstubs" => Feature::NStubs,
            "ltot" => Feature::LayerTotal,
            "dtot" => Feature::DiskTotal,
            "phi_sector" => Feature::PhiSector,
            _ => {
                if let Some(layer) = parse_indexed(name, "lay", NUM_LAYERS) {
                    Feature::LayerHit(layer)
                } else if let Some(disk) = parse_indexed(name, "disk", NUM_DISKS) {
                    Feature::DiskHit(disk)
                } else {
                    return Err(ConfigurationError::UnknownFeature(name.to_owned()));
                }
            }
        };
        Ok(feature)
    }
}

impl Display for Feature {
    /// Print the configuration name of the feature
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feature::Pt => write!(fmt, "pt"),
            Feature::Eta => write!(fmt, "eta"),
            Feature::Phi => write!(fmt, "phi"),
            Feature::Z0 => write!(fmt, "z0"),
            Feature::Rinv => write!(fmt, "rinv"),
            Feature::Tanl => write!(fmt, "tanl"),
            Feature::Chi2 => write!(fmt, "chi2"),
            Feature::Chi2Dof => write!(fmt, "chi2dof"),
            Feature::Chi2RPhi => write!(fmt, "chi2rphi"),
            Feature::Chi2Rz => write!(fmt, "chi2rz"),
            Feature::BendChi2 => write!(fmt, "bendchi2"),
            Feature::LogChi2 => write!(fmt, "log_chi2"),
            Feature::LogBendChi2 => write!(fmt, "log_bendchi2"),
            Feature::LogChi2RPhi => write!(fmt, "log_chi2rphi"),
            Feature::LogChi2Rz => write!(fmt, "log_chi2rz"),
            Feature::NStubs => write!(fmt, "nstubs"),
            Feature::LayerHit(layer) => write!(fmt, "lay{}_hits", layer),
            Feature::DiskHit(disk) => write!(fmt, "disk{}_hits", disk),
            Feature::LayerTotal => write!(fmt, "ltot"),
            Feature::DiskTotal => write!(fmt, "dtot"),
            Feature::PhiSector => write!(fmt, "phi_sector"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::HitPattern;

    /// Feature list used by the fake-track neural network of the tracklet
    /// emulation
    const NN_FEATURES: [&str; 21] = [
        "log_chi2",
        "log_bendchi2",
        "log_chi2rphi",
        "log_chi2rz",
        "nstubs",
        "lay1_hits",
        "lay2_hits",
        "lay3_hits",
        "lay4_hits",
        "lay5_hits",
        "lay6_hits",
        "disk1_hits",
        "disk2_hits",
        "disk3_hits",
        "disk4_hits",
        "disk5_hits",
        "rinv",
        "tanl",
        "z0",
        "dtot",
        "ltot",
    ];

    #[test]
    fn names_round_trip_through_display() {
        for name in NN_FEATURES {
            let feature = name.parse::<Feature>().unwrap();
            assert_eq!(feature.to_string(), name);
        }
    }

    #[test]
    fn out_of_range_indices_are_unknown() {
        for name in ["lay0_hits", "lay7_hits", "disk6_hits", "layx_hits", "lay1"] {
            assert_eq!(
                name.parse::<Feature>(),
                Err(ConfigurationError::UnknownFeature(name.to_owned()))
            );
        }
    }

    #[test]
    fn hit_flags_and_totals() {
        let track = Track {
            hit_pattern: HitPattern::default()
                .with_layer(2)
                .with_layer(4)
                .with_disk(3),
            ..Track::default()
        };
        assert_eq!(Feature::LayerHit(2).value(&track), 1.);
        assert_eq!(Feature::LayerHit(1).value(&track), 0.);
        assert_eq!(Feature::DiskHit(3).value(&track), 1.);
        assert_eq!(Feature::LayerTotal.value(&track), 2.);
        assert_eq!(Feature::DiskTotal.value(&track), 1.);
    }

    #[test]
    fn log_features_stay_finite() {
        let track = Track::default();
        assert!(Feature::LogChi2.value(&track).is_finite());
        assert!(Feature::LogBendChi2.value(&track).is_finite());
        let track = Track {
            bend_chi2: 1.,
            ..Track::default()
        };
        assert_eq!(Feature::LogBendChi2.value(&track), 0.);
    }
}
