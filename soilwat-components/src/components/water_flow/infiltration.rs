//! Saturated infiltration and unsaturated percolation
//!
//! Both routines move water down the profile layer by layer and then push
//! any water in excess of saturation back up, ending as ponded water on the
//! surface when the top layer is saturated too.

use soilwat_core::soil::SoilProfile;

/// Relative conductivity of a frozen layer.
const FROZEN_CONDUCTIVITY: f64 = 0.01;

/// Depth scale of slow drainage below field capacity (cm).
const SLOW_DRAIN_DEPTH: f64 = 15.0;

fn conductivity(frozen: bool) -> f64 {
    if frozen {
        FROZEN_CONDUCTIVITY
    } else {
        1.0
    }
}

/// Move water above saturation back up the profile.
///
/// `drain[i]` is the flux out of layer `i` into the layer below; water
/// pushed from layer `i` to `i - 1` reduces `drain[i - 1]`. Water pushed
/// out of the top layer is added to `standing_water`.
fn push_up(
    profile: &SoilProfile,
    swc: &mut [f64],
    drain: &mut [f64],
    standing_water: &mut f64,
) {
    let layers = profile.layers();
    for j in (0..swc.len()).rev() {
        let excess = swc[j] - layers[j].swc_saturated;
        if excess > 0.0 {
            swc[j] -= excess;
            if j > 0 {
                drain[j - 1] -= excess;
                swc[j - 1] += excess;
            } else {
                *standing_water += excess;
            }
        }
    }
}

/// Infiltrate water into the profile and drain layers above field capacity.
///
/// # Arguments
///
/// * `profile` - Soil profile
/// * `swc` - Soil water content per layer (cm); updated in place
/// * `drain` - Drainage out of each layer (cm/day); increased in place
/// * `water_in` - Water arriving at the soil surface (cm)
/// * `standing_water` - Ponded water (cm); added to the top layer first and
///   receives water that cannot infiltrate
/// * `frozen` - Frozen flag per layer
///
/// # Returns
///
/// Drainage below the deepest layer (cm)
pub fn infiltrate_high(
    profile: &SoilProfile,
    swc: &mut [f64],
    drain: &mut [f64],
    water_in: f64,
    standing_water: &mut f64,
    frozen: &[bool],
) -> f64 {
    let layers = profile.layers();
    let n = swc.len();
    if n == 0 {
        return 0.0;
    }

    swc[0] += water_in + *standing_water;
    *standing_water = 0.0;

    let mut drainout = 0.0;
    for i in 0..n {
        let layer = &layers[i];
        let d = (conductivity(frozen[i])
            * (1.0 - layer.impermeability)
            * (swc[i] - layer.swc_fieldcap))
            .max(0.0);
        drain[i] += d;
        swc[i] -= d;
        if i + 1 < n {
            swc[i + 1] += d;
        } else {
            drainout = d;
        }
    }

    push_up(profile, swc, drain, standing_water);
    drainout
}

/// Slow drainage of unsaturated layers.
///
/// Below field capacity the drainage potential declines exponentially with
/// relative water content, scaled by the layer's field capacity per width.
///
/// # Arguments
///
/// * `profile` - Soil profile
/// * `swc` - Soil water content per layer (cm); updated in place
/// * `drain` - Drainage out of each layer (cm/day); increased in place
/// * `standing_water` - Ponded water (cm); receives water pushed up
/// * `slow_drain_coeff` - Maximum drainage rate below field capacity (cm/day)
/// * `frozen` - Frozen flag per layer
///
/// # Returns
///
/// Drainage below the deepest layer (cm)
pub fn percolate_unsaturated(
    profile: &SoilProfile,
    swc: &mut [f64],
    drain: &mut [f64],
    standing_water: &mut f64,
    slow_drain_coeff: f64,
    frozen: &[bool],
) -> f64 {
    let layers = profile.layers();
    let n = swc.len();
    let mut drainout = 0.0;

    for i in 0..n {
        let layer = &layers[i];
        let available = (swc[i] - layer.swc_min).max(0.0);
        let d = if available > 0.0 {
            let mut drainpot = slow_drain_coeff;
            if swc[i] < layer.swc_fieldcap {
                let swcrel =
                    (available / (layer.swc_fieldcap - layer.swc_min)).clamp(0.0, 1.0);
                let tmp1 = SLOW_DRAIN_DEPTH * layer.swc_fieldcap / layer.width;
                let tmp2 = (-tmp1).exp();
                drainpot = if tmp2 < 1.0 {
                    drainpot * ((tmp1 * (swcrel - 1.0)).exp() - tmp2) / (1.0 - tmp2)
                } else {
                    0.0
                };
            }
            conductivity(frozen[i])
                * (1.0 - layer.impermeability)
                * available.min(drainpot.max(0.0))
        } else {
            0.0
        };

        drain[i] += d;
        swc[i] -= d;
        if i + 1 < n {
            swc[i + 1] += d;
        } else {
            drainout = d;
        }
    }

    push_up(profile, swc, drain, standing_water);
    drainout
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use soilwat_core::site::SiteConfiguration;

    fn profile() -> SoilProfile {
        SiteConfiguration::default().build_profile().unwrap()
    }

    #[test]
    fn test_infiltration_conserves_water() {
        let profile = profile();
        let mut swc = profile.initial_swc();
        let before: f64 = swc.iter().sum();
        let mut drain = vec![0.0; swc.len()];
        let mut standing = 0.0;
        let frozen = vec![false; swc.len()];

        let out = infiltrate_high(&profile, &mut swc, &mut drain, 3.0, &mut standing, &frozen);
        let after: f64 = swc.iter().sum();
        assert_relative_eq!(before + 3.0, after + out + standing, epsilon = 1e-12);
        for (l, s) in profile.layers().iter().zip(&swc) {
            assert!(*s <= l.swc_saturated + 1e-12);
        }
    }

    #[test]
    fn test_excess_ponds() {
        let profile = profile();
        let mut swc: Vec<f64> = profile.layers().iter().map(|l| l.swc_saturated).collect();
        let mut drain = vec![0.0; swc.len()];
        let mut standing = 0.0;
        let frozen = vec![true; swc.len()];

        let out = infiltrate_high(&profile, &mut swc, &mut drain, 2.0, &mut standing, &frozen);
        assert!(standing > 0.0);
        assert!(out >= 0.0);
        let over: f64 = profile
            .layers()
            .iter()
            .zip(&swc)
            .map(|(l, s)| s - l.swc_saturated)
            .fold(f64::MIN, f64::max);
        assert!(over <= 1e-12);
    }

    #[test]
    fn test_impermeable_layer_holds_water() {
        let mut config = SiteConfiguration::default();
        config.layers[0].impermeability = 1.0;
        let profile = config.build_profile().unwrap();
        let mut swc = profile.initial_swc();
        let below = swc[1];
        let mut drain = vec![0.0; swc.len()];
        let mut standing = 0.0;
        let frozen = vec![false; swc.len()];

        infiltrate_high(&profile, &mut swc, &mut drain, 1.0, &mut standing, &frozen);
        assert_relative_eq!(drain[0], 0.0);
        assert_relative_eq!(swc[1], below);
    }

    #[test]
    fn test_slow_drainage_below_field_capacity() {
        let profile = profile();
        let mut swc: Vec<f64> = profile
            .layers()
            .iter()
            .map(|l| 0.5 * (l.swc_fieldcap + l.swc_wiltpt))
            .collect();
        let before: f64 = swc.iter().sum();
        let mut drain = vec![0.0; swc.len()];
        let mut standing = 0.0;
        let frozen = vec![false; swc.len()];

        let out =
            percolate_unsaturated(&profile, &mut swc, &mut drain, &mut standing, 0.02, &frozen);
        assert!(drain[0] > 0.0 && drain[0] < 0.02);
        let after: f64 = swc.iter().sum();
        assert_relative_eq!(before, after + out + standing, epsilon = 1e-12);
    }

    #[test]
    fn test_no_drainage_at_minimum() {
        let profile = profile();
        let mut swc: Vec<f64> = profile.layers().iter().map(|l| l.swc_min).collect();
        let mut drain = vec![0.0; swc.len()];
        let mut standing = 0.0;
        let frozen = vec![false; swc.len()];

        let out =
            percolate_unsaturated(&profile, &mut swc, &mut drain, &mut standing, 0.02, &frozen);
        assert_relative_eq!(out, 0.0);
        assert!(drain.iter().all(|&d| d == 0.0));
    }
}
