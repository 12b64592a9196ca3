//! Potential and actual evaporation and transpiration (Parton 1978)
//!
//! # What This Module Does
//!
//! 1. Splits each canopy's share of PET into bare-soil evaporation and
//!    transpiration by live LAI
//! 2. Limits the potentials by soil water potential, litter and biomass
//!    cover, and shading by dead biomass
//! 3. Evaporates intercepted and ponded water
//! 4. Removes evaporation and transpiration from the soil layers in
//!    proportion to their coefficient divided by their water potential
//!
//! # Physics Overview
//!
//! The bare-soil share of a canopy is
//!
//! $$f_{bse} = \min(e^{-k \, LAI_{live}}, 0.995)$$
//!
//! and the transpiration share is $f_{bst} = 1 - f_{bse}$.

use soilwat_core::errors::SoilwatResult;
use soilwat_core::site::WaterRateParameters;
use soilwat_core::soil::{SoilLayer, SoilProfile};
use soilwat_core::swrc::SWP_FIELD_CAPACITY;
use soilwat_core::tolerance::{ge, gt, le, zro};
use soilwat_core::vegetation::{DailyVegetation, ShadeParameters};

/// Largest share of bare-soil evaporation under a canopy.
const MAX_BARE_SOIL_FRACTION: f64 = 0.995;

/// Split potential water loss into bare-soil evaporation and transpiration.
///
/// # Returns
///
/// `(fbse, fbst)`: fractions of bare-soil evaporation and transpiration
pub fn partition_es_t(lai_live: f64, es_param: f64) -> (f64, f64) {
    let fbse = (-es_param * lai_live).exp().min(MAX_BARE_SOIL_FRACTION);
    (fbse, 1.0 - fbse)
}

/// Soil water potential (bar) of the evaporation layers, weighted by layer
/// width and evaporation coefficient.
///
/// Zero when no layer evaporates.
pub fn evaporation_weighted_swp(profile: &SoilProfile, swc: &[f64]) -> SoilwatResult<f64> {
    let mut sum_weights = 0.0;
    let mut swp = 0.0;
    for layer in profile.layers().iter().take(profile.n_evap_layers()) {
        if zro(layer.evap_coeff) {
            break;
        }
        let weight = layer.width * layer.evap_coeff;
        sum_weights += weight;
        swp += weight * profile.swp(layer.index, swc[layer.index])?;
    }
    Ok(if zro(sum_weights) {
        swp
    } else {
        swp / sum_weights
    })
}

/// Soil water potential (bar) of the root zone of vegetation type `veg`.
///
/// Within each transpiration region the potential is averaged with the
/// transpiration coefficients as weights; the smallest regional average
/// (the wettest region) is returned.
pub fn transpiration_weighted_swp(
    profile: &SoilProfile,
    swc: &[f64],
    veg: usize,
) -> SoilwatResult<f64> {
    let n_layers = profile.n_transp_layers(veg);
    let mut result: Option<f64> = None;
    for region in 0..profile.n_transp_regions() {
        let mut swp = 0.0;
        let mut sum_coeff = 0.0;
        for layer in profile.layers().iter().take(n_layers) {
            if layer.transp_region[veg] == Some(region) {
                swp += layer.transp_coeff[veg] * profile.swp(layer.index, swc[layer.index])?;
                sum_coeff += layer.transp_coeff[veg];
            }
        }
        if gt(sum_coeff, 0.0) {
            swp /= sum_coeff;
        }
        result = Some(result.map_or(swp, |r: f64| r.min(swp)));
    }
    Ok(result.unwrap_or(0.0))
}

/// Potential evaporation (cm/day) of the bare-ground fraction.
///
/// # Arguments
///
/// * `avg_swp` - Weighted soil water potential of the evaporation layers (bar)
/// * `pet` - Potential evapotranspiration (cm/day)
/// * `rate` - Soil water limitation of evaporation
pub fn potential_bare_ground_evaporation(
    avg_swp: f64,
    pet: f64,
    rate: &WaterRateParameters,
) -> f64 {
    pet * rate.watrate(avg_swp, pet)
}

/// Potential bare-soil evaporation (cm/day) under a canopy.
///
/// Litter and standing biomass reduce evaporation linearly until it stops at
/// `es_limit`.
pub fn potential_soil_evaporation(
    avg_swp: f64,
    total_agb: f64,
    fbse: f64,
    pet: f64,
    es_limit: f64,
    rate: &WaterRateParameters,
) -> f64 {
    if ge(total_agb, es_limit) {
        0.0
    } else {
        pet * rate.watrate(avg_swp, pet) * (1.0 - total_agb / es_limit) * fbse
    }
}

/// Potential transpiration (cm/day) of one canopy.
///
/// # Arguments
///
/// * `avg_swp` - Root-zone soil water potential (bar)
/// * `day` - Today's canopy values
/// * `fbst` - Transpiration share of PET
/// * `pet` - Potential evapotranspiration (cm/day)
/// * `rate` - Soil water limitation of transpiration
/// * `shade` - Shading by standing dead biomass
/// * `co2_wue` - CO2 effect on water-use efficiency
pub fn potential_transpiration(
    avg_swp: f64,
    day: &DailyVegetation,
    fbst: f64,
    pet: f64,
    rate: &WaterRateParameters,
    shade: &ShadeParameters,
    co2_wue: f64,
) -> f64 {
    if le(day.biolive, 0.0) {
        return 0.0;
    }
    let shade_effect = if ge(day.biodead, shade.deadmax) {
        let live = shade.response.eval(day.biolive);
        let dead = shade.response.eval(day.biodead);
        let ratio = if dead != 0.0 { live / dead } else { 1.0 };
        (ratio * (1.0 - shade.scale) + shade.scale).min(1.0)
    } else {
        1.0
    };
    rate.watrate(avg_swp, pet) * shade_effect * pet * fbst * co2_wue
}

/// Evaporate from a surface pool.
///
/// The rate is cut back to the water available in `pool`. The evaporated
/// amount is removed from the pool and added to `aet`.
pub fn evaporate_from_surface(pool: &mut f64, rate: &mut f64, aet: &mut f64) {
    if *pool > *rate {
        *pool -= *rate;
    } else {
        *rate = pool.max(0.0);
        *pool = 0.0;
    }
    *aet += *rate;
}

/// Remove water from the top `n_layers` layers.
///
/// Each layer supplies a share of `rate` proportional to its coefficient
/// divided by its soil water potential, so wetter layers supply more. Frozen
/// layers supply nothing and no layer drops below its floor.
///
/// # Arguments
///
/// * `profile` - Soil profile
/// * `swc` - Soil water content per layer (cm); reduced in place
/// * `removed` - Water removed per layer (cm); increased in place
/// * `n_layers` - Number of top layers to draw from
/// * `coeff` - Coefficient of a layer
/// * `floor` - Lowest water content of a layer
/// * `rate` - Water to remove (cm)
/// * `frozen` - Frozen flag per layer
///
/// # Returns
///
/// Water actually removed (cm)
#[allow(clippy::too_many_arguments)]
pub fn remove_from_soil<C, F>(
    profile: &SoilProfile,
    swc: &mut [f64],
    removed: &mut [f64],
    n_layers: usize,
    coeff: C,
    floor: F,
    rate: f64,
    frozen: &[bool],
) -> SoilwatResult<f64>
where
    C: Fn(&SoilLayer) -> f64,
    F: Fn(&SoilLayer) -> f64,
{
    let layers = &profile.layers()[..n_layers.min(swc.len())];
    let mut fractions = Vec::with_capacity(layers.len());
    for layer in layers {
        let swp = profile.swp(layer.index, swc[layer.index])?;
        let fraction = if gt(swp, 0.0) {
            coeff(layer) / swp
        } else {
            coeff(layer) / SWP_FIELD_CAPACITY
        };
        fractions.push(fraction);
    }
    let sum: f64 = fractions.iter().sum();
    if zro(sum) {
        return Ok(0.0);
    }

    let mut total = 0.0;
    for (layer, fraction) in layers.iter().zip(fractions) {
        let i = layer.index;
        if frozen[i] {
            continue;
        }
        let wanted = fraction / sum * rate;
        let available = (swc[i] - floor(layer)).max(0.0);
        let d = wanted.min(available);
        swc[i] -= d;
        removed[i] += d;
        total += d;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use soilwat_core::site::SiteConfiguration;
    use soilwat_core::swrc::RetentionCurve;

    fn profile() -> SoilProfile {
        SiteConfiguration::default().build_profile().unwrap()
    }

    #[test]
    fn test_partitioning() {
        let (fbse, fbst) = partition_es_t(0.0, 1.0);
        assert_relative_eq!(fbse, MAX_BARE_SOIL_FRACTION);
        assert_relative_eq!(fbst, 1.0 - MAX_BARE_SOIL_FRACTION, epsilon = 1e-12);

        let (fbse, fbst) = partition_es_t(2.0, 1.0);
        assert_relative_eq!(fbse, (-2.0_f64).exp());
        assert_relative_eq!(fbse + fbst, 1.0);
    }

    #[test]
    fn test_weighted_swp() {
        let profile = profile();
        let swc: Vec<f64> = profile.layers().iter().map(|l| l.swc_wiltpt).collect();
        let evap = evaporation_weighted_swp(&profile, &swc).unwrap();
        assert_relative_eq!(evap, 15.0, max_relative = 1e-9);

        let transp = transpiration_weighted_swp(&profile, &swc, 3).unwrap();
        assert_relative_eq!(transp, 15.0, max_relative = 1e-9);
    }

    #[test]
    fn test_wettest_region_controls_transpiration() {
        let profile = profile();
        let mut swc: Vec<f64> = profile.layers().iter().map(|l| l.swc_wiltpt).collect();
        // Layer 2 is the only layer of the second region
        swc[2] = profile.layer(2).swc_fieldcap;
        let transp = transpiration_weighted_swp(&profile, &swc, 3).unwrap();
        assert_relative_eq!(transp, SWP_FIELD_CAPACITY, max_relative = 1e-9);
    }

    #[test]
    fn test_soil_evaporation_limited_by_biomass() {
        let rate = WaterRateParameters::EVAPORATION;
        let open = potential_soil_evaporation(1.0, 0.0, 0.9, 0.5, 999.0, &rate);
        let covered = potential_soil_evaporation(1.0, 500.0, 0.9, 0.5, 999.0, &rate);
        let closed = potential_soil_evaporation(1.0, 1000.0, 0.9, 0.5, 999.0, &rate);
        assert!(open > covered);
        assert!(covered > 0.0);
        assert_relative_eq!(closed, 0.0);
    }

    #[test]
    fn test_saturated_van_genuchten_soil_evaporates() {
        let mut config = SiteConfiguration::default();
        for layer in config.layers.iter_mut() {
            layer.swrc = Some(RetentionCurve::VanGenuchten1980 {
                theta_r: 0.1,
                theta_s: 0.45,
                alpha: 0.01,
                n: 1.3,
                ksat: 8.0,
            });
        }
        let profile = config.build_profile().unwrap();
        let rate = WaterRateParameters::EVAPORATION;

        let saturated: Vec<f64> = profile.layers().iter().map(|l| l.swc_saturated).collect();
        let swp_sat = evaporation_weighted_swp(&profile, &saturated).unwrap();
        assert_relative_eq!(swp_sat, 0.0, epsilon = 1e-12);

        let fieldcap: Vec<f64> = profile.layers().iter().map(|l| l.swc_fieldcap).collect();
        let swp_fc = evaporation_weighted_swp(&profile, &fieldcap).unwrap();

        let wet = potential_bare_ground_evaporation(swp_sat, 0.5, &rate);
        let moist = potential_bare_ground_evaporation(swp_fc, 0.5, &rate);
        assert!(wet > 0.0);
        assert!(wet >= moist);

        let under_canopy = potential_soil_evaporation(swp_sat, 100.0, 0.9, 0.5, 999.0, &rate);
        assert!(under_canopy > 0.0);
    }

    #[test]
    fn test_transpiration_needs_live_biomass() {
        let rate = WaterRateParameters::TRANSPIRATION;
        let shade = ShadeParameters::default();
        let dead = DailyVegetation {
            biomass: 100.0,
            biodead: 100.0,
            ..DailyVegetation::default()
        };
        assert_relative_eq!(potential_transpiration(1.0, &dead, 0.5, 0.5, &rate, &shade, 1.0), 0.0);

        let live = DailyVegetation {
            biomass: 100.0,
            biolive: 100.0,
            ..DailyVegetation::default()
        };
        let t = potential_transpiration(1.0, &live, 0.5, 0.5, &rate, &shade, 1.0);
        assert_relative_eq!(t, 0.25, max_relative = 1e-9);
        let t_co2 = potential_transpiration(1.0, &live, 0.5, 0.5, &rate, &shade, 1.2);
        assert_relative_eq!(t_co2, 1.2 * t);
    }

    #[test]
    fn test_shading_reduces_transpiration() {
        let rate = WaterRateParameters::TRANSPIRATION;
        let shade = ShadeParameters::default();
        let shaded = DailyVegetation {
            biomass: 300.0,
            biolive: 50.0,
            biodead: 250.0,
            ..DailyVegetation::default()
        };
        let t = potential_transpiration(1.0, &shaded, 0.5, 0.5, &rate, &shade, 1.0);
        assert!(t < 0.25);
        assert!(t >= shade.scale * 0.25 - 1e-12);
    }

    #[test]
    fn test_evaporate_from_surface() {
        let mut aet = 0.0;
        let mut pool = 0.3;
        let mut rate = 0.1;
        evaporate_from_surface(&mut pool, &mut rate, &mut aet);
        assert_relative_eq!(pool, 0.2);
        assert_relative_eq!(rate, 0.1);

        let mut rate = 0.5;
        evaporate_from_surface(&mut pool, &mut rate, &mut aet);
        assert_relative_eq!(pool, 0.0);
        assert_relative_eq!(rate, 0.2);
        assert_relative_eq!(aet, 0.3);
    }

    #[test]
    fn test_remove_from_soil() {
        let profile = profile();
        let mut swc = profile.initial_swc();
        let before = swc.clone();
        let mut removed = vec![0.0; swc.len()];
        let frozen = vec![false; swc.len()];

        let total = remove_from_soil(
            &profile,
            &mut swc,
            &mut removed,
            profile.n_transp_layers(3),
            |l| l.transp_coeff[3],
            |l| l.swc_at_crit[3],
            0.2,
            &frozen,
        )
        .unwrap();
        assert_relative_eq!(total, 0.2, epsilon = 1e-12);
        for i in 0..swc.len() {
            assert_relative_eq!(before[i] - swc[i], removed[i], epsilon = 1e-12);
            assert!(swc[i] >= profile.layer(i).swc_at_crit[3]);
        }
    }

    #[test]
    fn test_remove_respects_floor_and_frozen() {
        let profile = profile();
        let mut swc: Vec<f64> = profile.layers().iter().map(|l| l.swc_halfwiltpt).collect();
        let mut removed = vec![0.0; swc.len()];
        let frozen = vec![false; swc.len()];
        let total = remove_from_soil(
            &profile,
            &mut swc,
            &mut removed,
            profile.n_evap_layers(),
            |l| l.evap_coeff,
            |l| l.swc_halfwiltpt,
            0.5,
            &frozen,
        )
        .unwrap();
        assert_relative_eq!(total, 0.0);

        let mut swc = profile.initial_swc();
        let mut removed = vec![0.0; swc.len()];
        let frozen = vec![true; swc.len()];
        let total = remove_from_soil(
            &profile,
            &mut swc,
            &mut removed,
            profile.n_evap_layers(),
            |l| l.evap_coeff,
            |l| l.swc_halfwiltpt,
            0.5,
            &frozen,
        )
        .unwrap();
        assert_relative_eq!(total, 0.0);
    }
}
