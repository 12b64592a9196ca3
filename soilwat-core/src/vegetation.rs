//! Vegetation composition and daily canopy values
//!
//! A site carries four vegetation types plus bare ground. Each type has a
//! fractional cover, monthly biomass trajectories and the parameters that
//! control interception, evapotranspiration partitioning and hydraulic
//! redistribution.
//!
//! # Daily values
//!
//! Monthly litter, biomass, live fraction and LAI conversion values are
//! interpolated to days (see [`crate::utils::interpolate::monthly_to_daily`])
//! and combined into [`DailyVegetation`]:
//!
//! - live biomass $B_{live} = B \cdot f_{live}$, dead biomass $B_{dead} = B - B_{live}$
//! - live LAI $= B_{live} / c_{LAI}$
//! - compound LAI $= LAI_{live} + k_{dead} \, B_{dead} / c_{LAI}$
//! - total above-ground biomass $= litter + B_{live}$ (trees) or $litter + B$

use crate::errors::{SoilwatError, SoilwatResult};
use crate::tolerance::{eq_tol, gt};
use crate::utils::functions::TanfuncParameters;
use crate::utils::interpolate::monthly_to_daily;
use serde::{Deserialize, Deserializer, Serialize};

/// Number of vegetation types.
pub const N_VEG: usize = 4;

/// Tolerance on the sum of covers.
const COVER_SUM_TOLERANCE: f64 = 1e-6;

/// Vegetation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VegetationKind {
    Tree,
    Shrub,
    Forb,
    Grass,
}

impl VegetationKind {
    /// All vegetation types, in index order.
    pub const ALL: [VegetationKind; N_VEG] = [
        VegetationKind::Tree,
        VegetationKind::Shrub,
        VegetationKind::Forb,
        VegetationKind::Grass,
    ];

    /// Position of this type in per-vegetation arrays.
    pub fn index(self) -> usize {
        match self {
            VegetationKind::Tree => 0,
            VegetationKind::Shrub => 1,
            VegetationKind::Forb => 2,
            VegetationKind::Grass => 3,
        }
    }

    /// Whether only live biomass counts as canopy (trees).
    pub fn is_woody_canopy(self) -> bool {
        matches!(self, VegetationKind::Tree)
    }
}

/// Shading of transpiration by standing dead biomass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadeParameters {
    /// Minimum shade effect (fraction of full transpiration).
    /// Default: 0.3
    pub scale: f64,
    /// Dead biomass above which shading applies (g/m2).
    /// Default: 150.0
    pub deadmax: f64,
    /// Response of shading to biomass.
    /// Default: (300, 12, 34, 0.002)
    pub response: TanfuncParameters,
}

impl Default for ShadeParameters {
    fn default() -> Self {
        Self {
            scale: 0.3,
            deadmax: 150.0,
            response: TanfuncParameters::new(300.0, 12.0, 34.0, 0.002),
        }
    }
}

/// Hydraulic redistribution through roots (Ryel et al. 2002).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HydraulicRedistributionParameters {
    /// Whether this vegetation type redistributes water.
    /// Default: true
    pub enabled: bool,
    /// Maximum radial soil-root conductance of the entire active root
    /// system for water (cm/(-bar * day)).
    /// Default: -0.2328
    pub max_condroot: f64,
    /// Soil water potential at which conductance is halved (-bar).
    /// Default: 10.0
    pub swp50: f64,
    /// Shape of the conductance decline.
    /// Default: 3.22
    pub shape_cond: f64,
}

impl Default for HydraulicRedistributionParameters {
    fn default() -> Self {
        Self {
            enabled: true,
            max_condroot: -0.2328,
            swp50: 10.0,
            shape_cond: 3.22,
        }
    }
}

/// Parameters of one vegetation type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VegetationParameters {
    /// Fractional cover (0-1).
    /// Default: 0.0
    pub cover: f64,
    /// Surface albedo.
    /// Default: 0.167 (grass)
    pub albedo: f64,
    /// Canopy height as a function of biomass (cm).
    pub canopy_height: TanfuncParameters,
    /// Constant canopy height (cm); used instead of `canopy_height` when > 0.
    /// Default: 0.0
    pub canopy_height_constant: f64,
    /// Interception storage parameter (mm).
    /// Default: 1.0 (grass)
    pub interception_ksmax: f64,
    /// Litter interception storage parameter (mm).
    /// Default: 0.113
    pub litter_ksmax: f64,
    /// Fraction of dead biomass contributing to the compound LAI.
    /// Default: 0.0
    pub k_dead: f64,
    /// Extinction parameter for partitioning bare-soil evaporation and
    /// transpiration by live LAI.
    /// Default: 1.0 (grass)
    pub es_transp_partitioning: f64,
    /// Above-ground biomass above which bare-soil evaporation stops (g/m2).
    /// Default: 999.0
    pub es_limit: f64,
    /// Critical soil water potential for transpiration (bar).
    /// Default: 30.0 (grass)
    pub swp_crit: f64,
    /// Shading by dead biomass.
    pub shade: ShadeParameters,
    /// Hydraulic redistribution.
    pub hydraulic_redistribution: HydraulicRedistributionParameters,
    /// CO2 effect on biomass (trees: on live fraction).
    /// Default: 1.0
    pub co2_biomass_multiplier: f64,
    /// CO2 effect on water-use efficiency of transpiration.
    /// Default: 1.0
    pub co2_wue_multiplier: f64,
    /// Monthly litter (g/m2).
    pub litter: [f64; 12],
    /// Monthly total biomass (g/m2).
    pub biomass: [f64; 12],
    /// Monthly live fraction of biomass (0-1).
    pub pct_live: [f64; 12],
    /// Monthly biomass needed to produce LAI = 1 (g/m2).
    pub lai_conv: [f64; 12],
}

impl Default for VegetationParameters {
    fn default() -> Self {
        Self::for_kind(VegetationKind::Grass)
    }
}

impl VegetationParameters {
    /// Typical parameters of a vegetation type, with zero cover.
    pub fn for_kind(kind: VegetationKind) -> Self {
        match kind {
            VegetationKind::Tree => Self {
                cover: 0.0,
                albedo: 0.14,
                canopy_height: TanfuncParameters::new(0.0, 0.0, 0.0, 0.0),
                canopy_height_constant: 1200.0,
                interception_ksmax: 2.0,
                litter_ksmax: 0.113,
                k_dead: 0.0,
                es_transp_partitioning: 0.41,
                es_limit: 999.0,
                swp_crit: 20.0,
                shade: ShadeParameters {
                    deadmax: 0.0,
                    ..ShadeParameters::default()
                },
                hydraulic_redistribution: HydraulicRedistributionParameters::default(),
                co2_biomass_multiplier: 1.0,
                co2_wue_multiplier: 1.0,
                litter: [
                    200.0, 200.0, 200.0, 200.0, 200.0, 200.0, 200.0, 200.0, 200.0, 200.0, 200.0,
                    200.0,
                ],
                biomass: [
                    15000.0, 15000.0, 15000.0, 15000.0, 15000.0, 15000.0, 15000.0, 15000.0,
                    15000.0, 15000.0, 15000.0, 15000.0,
                ],
                pct_live: [
                    0.0, 0.0, 0.005, 0.01, 0.015, 0.015, 0.015, 0.015, 0.01, 0.005, 0.0, 0.0,
                ],
                lai_conv: [
                    500.0, 500.0, 500.0, 500.0, 500.0, 500.0, 500.0, 500.0, 500.0, 500.0, 500.0,
                    500.0,
                ],
            },
            VegetationKind::Shrub => Self {
                cover: 0.0,
                albedo: 0.18,
                canopy_height: TanfuncParameters::new(0.0, 5.0, 4.8, 0.000_35),
                canopy_height_constant: 0.0,
                interception_ksmax: 2.0,
                litter_ksmax: 0.113,
                k_dead: 0.33,
                es_transp_partitioning: 0.41,
                es_limit: 999.0,
                swp_crit: 39.0,
                shade: ShadeParameters::default(),
                hydraulic_redistribution: HydraulicRedistributionParameters::default(),
                co2_biomass_multiplier: 1.0,
                co2_wue_multiplier: 1.0,
                litter: [
                    85.4, 88.2, 95.3, 100.5, 166.4, 186.0, 177.1, 212.0, 157.4, 124.9, 110.4,
                    104.3,
                ],
                biomass: [
                    210.0, 212.0, 228.0, 258.0, 402.0, 444.0, 449.0, 462.0, 420.0, 351.0, 285.0,
                    237.0,
                ],
                pct_live: [
                    0.06, 0.08, 0.20, 0.33, 0.57, 0.55, 0.50, 0.46, 0.32, 0.15, 0.08, 0.06,
                ],
                lai_conv: [
                    372.0, 372.0, 372.0, 372.0, 372.0, 372.0, 372.0, 372.0, 372.0, 372.0, 372.0,
                    372.0,
                ],
            },
            VegetationKind::Forb => Self {
                cover: 0.0,
                albedo: 0.16,
                canopy_height: TanfuncParameters::new(300.0, 0.0, 29.5, 0.002),
                canopy_height_constant: 0.0,
                interception_ksmax: 1.0,
                litter_ksmax: 0.113,
                k_dead: 0.0,
                es_transp_partitioning: 0.41,
                es_limit: 999.0,
                swp_crit: 20.0,
                shade: ShadeParameters::default(),
                hydraulic_redistribution: HydraulicRedistributionParameters::default(),
                co2_biomass_multiplier: 1.0,
                co2_wue_multiplier: 1.0,
                litter: [
                    75.0, 80.0, 85.0, 90.0, 50.0, 50.0, 50.0, 55.0, 60.0, 65.0, 70.0, 75.0,
                ],
                biomass: [
                    85.0, 88.0, 120.0, 170.0, 190.0, 180.0, 170.0, 160.0, 130.0, 110.0, 90.0, 85.0,
                ],
                pct_live: [
                    0.0, 0.0, 0.10, 0.20, 0.40, 0.50, 0.40, 0.30, 0.20, 0.10, 0.0, 0.0,
                ],
                lai_conv: [
                    300.0, 300.0, 300.0, 300.0, 300.0, 300.0, 300.0, 300.0, 300.0, 300.0, 300.0,
                    300.0,
                ],
            },
            VegetationKind::Grass => Self {
                cover: 0.0,
                albedo: 0.167,
                canopy_height: TanfuncParameters::new(300.0, 0.0, 29.5, 0.002),
                canopy_height_constant: 0.0,
                interception_ksmax: 1.0,
                litter_ksmax: 0.113,
                k_dead: 0.0,
                es_transp_partitioning: 1.0,
                es_limit: 999.0,
                swp_crit: 30.0,
                shade: ShadeParameters::default(),
                hydraulic_redistribution: HydraulicRedistributionParameters::default(),
                co2_biomass_multiplier: 1.0,
                co2_wue_multiplier: 1.0,
                litter: [
                    75.0, 80.0, 85.0, 90.0, 50.0, 50.0, 50.0, 55.0, 60.0, 65.0, 70.0, 75.0,
                ],
                biomass: [
                    75.0, 80.0, 85.0, 90.0, 100.0, 120.0, 130.0, 125.0, 110.0, 95.0, 80.0, 75.0,
                ],
                pct_live: [
                    0.0, 0.0, 0.10, 0.20, 0.40, 0.60, 0.40, 0.60, 0.40, 0.20, 0.10, 0.0,
                ],
                lai_conv: [
                    300.0, 300.0, 300.0, 300.0, 300.0, 300.0, 300.0, 300.0, 300.0, 300.0, 300.0,
                    300.0,
                ],
            },
        }
    }

    /// Canopy-free parameters: the type exists but has no biomass.
    pub fn without_biomass(kind: VegetationKind) -> Self {
        Self {
            litter: [0.0; 12],
            biomass: [0.0; 12],
            pct_live: [0.0; 12],
            ..Self::for_kind(kind)
        }
    }

    fn validate(&self, kind: VegetationKind) -> SoilwatResult<()> {
        let fail = |what: String| {
            Err(SoilwatError::Configuration(format!(
                "vegetation {:?}: {}",
                kind, what
            )))
        };
        if !(0.0..=1.0).contains(&self.cover) {
            return fail(format!("cover {} must be in [0, 1]", self.cover));
        }
        if self.swp_crit <= 0.0 {
            return fail(format!("swp_crit {} must be > 0", self.swp_crit));
        }
        if self.lai_conv.iter().any(|&v| v <= 0.0) {
            return fail("lai_conv must be > 0".to_string());
        }
        if self.pct_live.iter().any(|&v| !(0.0..=1.0).contains(&v)) {
            return fail("pct_live must be in [0, 1]".to_string());
        }
        if self
            .biomass
            .iter()
            .chain(self.litter.iter())
            .any(|&v| v < 0.0)
        {
            return fail("biomass and litter must be >= 0".to_string());
        }
        Ok(())
    }
}

/// Partially specified [`VegetationParameters`].
///
/// Fields left out keep the typical value of the vegetation type they are
/// applied to, rather than the grass values of [`VegetationParameters::default`].
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct VegetationPatch {
    cover: Option<f64>,
    albedo: Option<f64>,
    canopy_height: Option<TanfuncParameters>,
    canopy_height_constant: Option<f64>,
    interception_ksmax: Option<f64>,
    litter_ksmax: Option<f64>,
    k_dead: Option<f64>,
    es_transp_partitioning: Option<f64>,
    es_limit: Option<f64>,
    swp_crit: Option<f64>,
    shade: Option<ShadeParameters>,
    hydraulic_redistribution: Option<HydraulicRedistributionParameters>,
    co2_biomass_multiplier: Option<f64>,
    co2_wue_multiplier: Option<f64>,
    litter: Option<[f64; 12]>,
    biomass: Option<[f64; 12]>,
    pct_live: Option<[f64; 12]>,
    lai_conv: Option<[f64; 12]>,
}

impl VegetationPatch {
    fn apply(self, kind: VegetationKind) -> VegetationParameters {
        let base = VegetationParameters::for_kind(kind);
        VegetationParameters {
            cover: self.cover.unwrap_or(base.cover),
            albedo: self.albedo.unwrap_or(base.albedo),
            canopy_height: self.canopy_height.unwrap_or(base.canopy_height),
            canopy_height_constant: self
                .canopy_height_constant
                .unwrap_or(base.canopy_height_constant),
            interception_ksmax: self.interception_ksmax.unwrap_or(base.interception_ksmax),
            litter_ksmax: self.litter_ksmax.unwrap_or(base.litter_ksmax),
            k_dead: self.k_dead.unwrap_or(base.k_dead),
            es_transp_partitioning: self
                .es_transp_partitioning
                .unwrap_or(base.es_transp_partitioning),
            es_limit: self.es_limit.unwrap_or(base.es_limit),
            swp_crit: self.swp_crit.unwrap_or(base.swp_crit),
            shade: self.shade.unwrap_or(base.shade),
            hydraulic_redistribution: self
                .hydraulic_redistribution
                .unwrap_or(base.hydraulic_redistribution),
            co2_biomass_multiplier: self
                .co2_biomass_multiplier
                .unwrap_or(base.co2_biomass_multiplier),
            co2_wue_multiplier: self.co2_wue_multiplier.unwrap_or(base.co2_wue_multiplier),
            litter: self.litter.unwrap_or(base.litter),
            biomass: self.biomass.unwrap_or(base.biomass),
            pct_live: self.pct_live.unwrap_or(base.pct_live),
            lai_conv: self.lai_conv.unwrap_or(base.lai_conv),
        }
    }
}

fn deserialize_vegetation<'de, D>(
    deserializer: D,
    kind: VegetationKind,
) -> Result<VegetationParameters, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(VegetationPatch::deserialize(deserializer)?.apply(kind))
}

fn deserialize_tree<'de, D: Deserializer<'de>>(d: D) -> Result<VegetationParameters, D::Error> {
    deserialize_vegetation(d, VegetationKind::Tree)
}

fn deserialize_shrub<'de, D: Deserializer<'de>>(d: D) -> Result<VegetationParameters, D::Error> {
    deserialize_vegetation(d, VegetationKind::Shrub)
}

fn deserialize_forb<'de, D: Deserializer<'de>>(d: D) -> Result<VegetationParameters, D::Error> {
    deserialize_vegetation(d, VegetationKind::Forb)
}

fn deserialize_grass<'de, D: Deserializer<'de>>(d: D) -> Result<VegetationParameters, D::Error> {
    deserialize_vegetation(d, VegetationKind::Grass)
}

/// Vegetation types of a site plus bare ground.
///
/// When deserialized, a missing vegetation table or missing fields inside a
/// table take the typical values of that vegetation type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VegetationComposition {
    #[serde(deserialize_with = "deserialize_tree")]
    pub tree: VegetationParameters,
    #[serde(deserialize_with = "deserialize_shrub")]
    pub shrub: VegetationParameters,
    #[serde(deserialize_with = "deserialize_forb")]
    pub forb: VegetationParameters,
    #[serde(deserialize_with = "deserialize_grass")]
    pub grass: VegetationParameters,
    /// Fractional cover of bare ground.
    /// Default: 0.0
    pub bare_cover: f64,
    /// Bare ground albedo.
    /// Default: 0.15
    pub bare_albedo: f64,
}

impl Default for VegetationComposition {
    /// Full grass cover.
    fn default() -> Self {
        Self {
            tree: VegetationParameters::for_kind(VegetationKind::Tree),
            shrub: VegetationParameters::for_kind(VegetationKind::Shrub),
            forb: VegetationParameters::for_kind(VegetationKind::Forb),
            grass: VegetationParameters {
                cover: 1.0,
                ..VegetationParameters::for_kind(VegetationKind::Grass)
            },
            bare_cover: 0.0,
            bare_albedo: 0.15,
        }
    }
}

impl VegetationComposition {
    /// Bare ground only.
    pub fn bare() -> Self {
        Self {
            grass: VegetationParameters::for_kind(VegetationKind::Grass),
            bare_cover: 1.0,
            ..Self::default()
        }
    }

    /// Parameters of one vegetation type.
    pub fn get(&self, kind: VegetationKind) -> &VegetationParameters {
        match kind {
            VegetationKind::Tree => &self.tree,
            VegetationKind::Shrub => &self.shrub,
            VegetationKind::Forb => &self.forb,
            VegetationKind::Grass => &self.grass,
        }
    }

    /// Mutable parameters of one vegetation type.
    pub fn get_mut(&mut self, kind: VegetationKind) -> &mut VegetationParameters {
        match kind {
            VegetationKind::Tree => &mut self.tree,
            VegetationKind::Shrub => &mut self.shrub,
            VegetationKind::Forb => &mut self.forb,
            VegetationKind::Grass => &mut self.grass,
        }
    }

    /// Iterate over vegetation types and their parameters.
    pub fn iter(&self) -> impl Iterator<Item = (VegetationKind, &VegetationParameters)> {
        VegetationKind::ALL.into_iter().map(move |k| (k, self.get(k)))
    }

    /// Critical soil water potentials indexed by [`VegetationKind::index`].
    pub fn swp_crit(&self) -> [f64; N_VEG] {
        VegetationKind::ALL.map(|k| self.get(k).swp_crit)
    }

    /// Check covers and per-type parameters.
    pub fn validate(&self) -> SoilwatResult<()> {
        for (kind, veg) in self.iter() {
            veg.validate(kind)?;
        }
        if !(0.0..=1.0).contains(&self.bare_cover) {
            return Err(SoilwatError::Configuration(format!(
                "bare ground cover {} must be in [0, 1]",
                self.bare_cover
            )));
        }

        let total: f64 = self.iter().map(|(_, v)| v.cover).sum::<f64>() + self.bare_cover;
        if !eq_tol(total, 1.0, COVER_SUM_TOLERANCE) {
            return Err(SoilwatError::Configuration(format!(
                "vegetation and bare ground covers sum to {}, expected 1",
                total
            )));
        }
        Ok(())
    }

    /// Cover-weighted surface albedo, including bare ground.
    pub fn albedo(&self) -> f64 {
        self.iter().map(|(_, v)| v.cover * v.albedo).sum::<f64>()
            + self.bare_cover * self.bare_albedo
    }

    /// Daily canopy values of every vegetation type.
    pub fn daily(&self, doy: usize, year: i32) -> [DailyVegetation; N_VEG] {
        VegetationKind::ALL.map(|k| DailyVegetation::new(k, self.get(k), doy, year))
    }
}

/// Canopy values of one vegetation type on one day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyVegetation {
    /// Fractional cover.
    pub cover: f64,
    /// Canopy height (cm).
    pub height: f64,
    /// Litter (g/m2).
    pub litter: f64,
    /// Total biomass (g/m2).
    pub biomass: f64,
    /// Live biomass (g/m2).
    pub biolive: f64,
    /// Dead biomass (g/m2).
    pub biodead: f64,
    /// Live leaf area index.
    pub lai_live: f64,
    /// Leaf area index including the dead contribution.
    pub lai_total: f64,
    /// Total above-ground biomass used to limit bare-soil evaporation (g/m2).
    pub total_agb: f64,
}

impl DailyVegetation {
    /// Interpolate the monthly trajectories of `veg` to day `doy`.
    ///
    /// All values are zero when the type has no cover.
    pub fn new(kind: VegetationKind, veg: &VegetationParameters, doy: usize, year: i32) -> Self {
        if !gt(veg.cover, 0.0) {
            return Self::default();
        }

        let (biomass, pct_live) = if kind.is_woody_canopy() {
            (
                monthly_to_daily(&veg.biomass, doy, year),
                monthly_to_daily(&veg.pct_live.map(|p| p * veg.co2_biomass_multiplier), doy, year),
            )
        } else {
            (
                monthly_to_daily(&veg.biomass.map(|b| b * veg.co2_biomass_multiplier), doy, year),
                monthly_to_daily(&veg.pct_live, doy, year),
            )
        };
        let litter = monthly_to_daily(&veg.litter, doy, year);
        let lai_conv = monthly_to_daily(&veg.lai_conv, doy, year);

        let height = if gt(veg.canopy_height_constant, 0.0) {
            veg.canopy_height_constant
        } else {
            veg.canopy_height.eval(biomass)
        };

        let biolive = biomass * pct_live;
        let biodead = biomass - biolive;
        let lai_live = biolive / lai_conv;
        let lai_total = lai_live + veg.k_dead * biodead / lai_conv;
        let total_agb = if kind.is_woody_canopy() {
            litter + biolive
        } else {
            litter + biomass
        };

        Self {
            cover: veg.cover,
            height,
            litter,
            biomass,
            biolive,
            biodead,
            lai_live,
            lai_total,
            total_agb,
        }
    }

    /// Biomass relevant for surface temperature: live biomass of trees and
    /// shrubs, total biomass otherwise, weighted by cover.
    pub fn surface_biomass(&self, kind: VegetationKind) -> f64 {
        match kind {
            VegetationKind::Tree | VegetationKind::Shrub => self.biolive * self.cover,
            VegetationKind::Forb | VegetationKind::Grass => self.biomass * self.cover,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_composition_is_valid() {
        let veg = VegetationComposition::default();
        assert!(veg.validate().is_ok());
        assert_relative_eq!(veg.albedo(), 0.167);
        assert_relative_eq!(VegetationComposition::bare().albedo(), 0.15);
    }

    #[test]
    fn test_covers_must_sum_to_one() {
        let mut veg = VegetationComposition::default();
        veg.shrub.cover = 0.2;
        let err = veg.validate().unwrap_err();
        assert!(matches!(err, SoilwatError::Configuration(_)));

        veg.grass.cover = 0.5;
        veg.bare_cover = 0.3;
        assert!(veg.validate().is_ok());
    }

    #[test]
    fn test_daily_values_for_grass() {
        let veg = VegetationComposition::default();
        let daily = DailyVegetation::new(VegetationKind::Grass, &veg.grass, 196, 2001);

        assert!(daily.biomass > 0.0);
        assert_relative_eq!(daily.biolive + daily.biodead, daily.biomass, epsilon = 1e-12);
        assert_relative_eq!(daily.lai_live, daily.biolive / 300.0, epsilon = 1e-12);
        assert_relative_eq!(daily.lai_total, daily.lai_live);
        assert_relative_eq!(daily.total_agb, daily.litter + daily.biomass);
        assert_relative_eq!(daily.height, veg.grass.canopy_height.eval(daily.biomass));
    }

    #[test]
    fn test_tree_uses_constant_height_and_live_biomass() {
        let mut veg = VegetationComposition::default();
        veg.tree.cover = 0.5;
        veg.grass.cover = 0.5;
        let daily = DailyVegetation::new(VegetationKind::Tree, &veg.tree, 180, 2001);

        assert_relative_eq!(daily.height, 1200.0);
        assert_relative_eq!(daily.total_agb, daily.litter + daily.biolive);
        assert_relative_eq!(
            daily.surface_biomass(VegetationKind::Tree),
            0.5 * daily.biolive
        );
    }

    #[test]
    fn test_zero_cover_gives_zero_values() {
        let veg = VegetationComposition::default();
        let daily = veg.daily(180, 2001);
        let shrub = daily[VegetationKind::Shrub.index()];
        assert_eq!(shrub, DailyVegetation::default());
    }

    #[test]
    fn test_partial_deserialization() {
        let json = r#"{"grass": {"cover": 0.6}, "bare_cover": 0.4}"#;
        let veg: VegetationComposition = serde_json::from_str(json).unwrap();
        assert_relative_eq!(veg.grass.cover, 0.6);
        assert_relative_eq!(veg.grass.swp_crit, 30.0);
        assert!(veg.validate().is_ok());
    }

    #[test]
    fn test_partial_table_keeps_type_defaults() {
        let json = r#"{"shrub": {"cover": 1.0, "swp_crit": 45.0}, "grass": {}}"#;
        let veg: VegetationComposition = serde_json::from_str(json).unwrap();
        assert_relative_eq!(veg.shrub.swp_crit, 45.0);
        assert_relative_eq!(veg.shrub.albedo, 0.18);
        assert_relative_eq!(veg.shrub.k_dead, 0.33);
        assert_relative_eq!(veg.grass.cover, 0.0);
        assert!(veg.validate().is_ok());
    }

    #[test]
    fn test_round_trip_serialization() {
        let veg = VegetationComposition::default();
        let json = serde_json::to_string(&veg).unwrap();
        let parsed: VegetationComposition = serde_json::from_str(&json).unwrap();
        assert_eq!(veg, parsed);
    }
}
