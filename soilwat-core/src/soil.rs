//! Soil layers and the soil profile
//!
//! [`SoilLayerParameters`] hold what a user specifies per layer. At setup
//! they are turned into [`SoilLayer`]s, which add the water contents derived
//! from the retention curve:
//!
//! | Quantity | Definition |
//! |----------|------------|
//! | field capacity | SWC at 0.333 bar |
//! | wilting point | SWC at 15 bar |
//! | half-wilting point | $\max(0.5 \, SWC_{wp}, SWC(100\,bar))$, at least $SWC_{min}$ |
//! | minimum | $\max(\theta_{min}, \text{user lower limit})$ |
//! | critical | SWC at the critical potential of each vegetation type |
//!
//! The [`SoilProfile`] also assigns layers to transpiration regions and
//! counts the layers reached by bare-soil evaporation and by roots.

use crate::errors::{SoilwatError, SoilwatResult};
use crate::swrc::{
    ErrorMode, LayerGeometry, RetentionCurve, SWP_FIELD_CAPACITY, SWP_WILTING_POINT,
};
use crate::tolerance::{eq, ge, gt, le, lt};
use crate::vegetation::N_VEG;
use log::warn;
use serde::{Deserialize, Serialize};

/// Maximum number of soil layers.
pub const MAX_LAYERS: usize = 25;

/// Maximum number of transpiration regions.
pub const MAX_TRANSP_REGIONS: usize = 4;

/// Density of gravel (g/cm3).
const GRAVEL_DENSITY: f64 = 2.65;

/// Soil water potential of air-dry soil (bar).
const SWP_HYGROSCOPIC: f64 = 100.0;

/// Soil water potential at the realistic lower limit of water content (bar).
const SWP_LOWER_LIMIT: f64 = 300.0;

/// User-specified properties of one soil layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoilLayerParameters {
    /// Layer width (cm).
    /// Default: 10.0
    pub width: f64,
    /// Density of the matric soil (< 2 mm fraction) (g/cm3).
    /// Default: 1.43
    pub bulk_density_matric: f64,
    /// Volumetric gravel fraction of the whole soil (m3/m3).
    /// Default: 0.0
    pub gravel: f64,
    /// Sand weight fraction of the matric soil (g/g).
    /// Default: 0.4
    pub sand: f64,
    /// Clay weight fraction of the matric soil (g/g).
    /// Default: 0.2
    pub clay: f64,
    /// Fraction of the layer that is impermeable to percolation.
    /// Default: 0.0
    pub impermeability: f64,
    /// Share of bare-soil evaporation drawn from this layer.
    /// Default: 0.0
    pub evap_coeff: f64,
    /// Share of transpiration drawn from this layer, per vegetation type.
    /// Default: [0.0; 4]
    pub transp_coeff: [f64; N_VEG],
    /// Soil temperature at the start of the simulation (°C).
    /// Default: 4.0
    pub initial_temperature: f64,
    /// Retention curve; estimated from sand and clay (Cosby et al. 1984) if absent.
    /// Default: None
    pub swrc: Option<RetentionCurve>,
}

impl Default for SoilLayerParameters {
    fn default() -> Self {
        Self {
            // Geometry
            width: 10.0,

            // Texture
            bulk_density_matric: 1.43,
            gravel: 0.0,
            sand: 0.4,
            clay: 0.2,
            impermeability: 0.0,

            // Water uptake
            evap_coeff: 0.0,
            transp_coeff: [0.0; N_VEG],

            initial_temperature: 4.0,
            swrc: None,
        }
    }
}

impl SoilLayerParameters {
    fn validate(&self, index: usize) -> SoilwatResult<()> {
        let fail = |what: String| {
            Err(SoilwatError::Configuration(format!(
                "soil layer {}: {}",
                index, what
            )))
        };
        let fraction = |v: f64| (0.0..=1.0).contains(&v);

        if self.width <= 0.0 {
            return fail(format!("width {} must be > 0", self.width));
        }
        if self.bulk_density_matric <= 0.0 {
            return fail(format!(
                "matric density {} must be > 0",
                self.bulk_density_matric
            ));
        }
        if !(0.0..1.0).contains(&self.gravel) {
            return fail(format!("gravel {} must be in [0, 1)", self.gravel));
        }
        if !fraction(self.sand) || !fraction(self.clay) || gt(self.sand + self.clay, 1.0) {
            return fail(format!(
                "sand {} and clay {} must be fractions summing to at most 1",
                self.sand, self.clay
            ));
        }
        if !fraction(self.impermeability) {
            return fail(format!(
                "impermeability {} must be in [0, 1]",
                self.impermeability
            ));
        }
        if !fraction(self.evap_coeff) || !self.transp_coeff.iter().all(|&c| fraction(c)) {
            return fail("evaporation and transpiration coefficients must be in [0, 1]".into());
        }
        Ok(())
    }
}

/// Profile-wide soil settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoilProfileSettings {
    /// Lower depths of the transpiration regions (cm), shallow to deep.
    /// Default: [20.0, 40.0, 100.0]
    pub transpiration_region_depths: Vec<f64>,
    /// Lower limit of soil water content.
    ///
    /// Negative: realistic lower limit of the retention curve (300 bar);
    /// `>= 1`: soil water potential (bar); otherwise volumetric water content (cm/cm).
    /// Default: -1.0
    pub swc_min_value: f64,
    /// Initial soil water content.
    ///
    /// `>= 1`: soil water potential (bar); otherwise volumetric water content (cm/cm).
    /// Default: 15.0
    pub swc_init_value: f64,
    /// Reporting of retention-curve violations during the simulation.
    /// Default: Fatal
    pub error_mode: ErrorMode,
}

impl Default for SoilProfileSettings {
    fn default() -> Self {
        Self {
            transpiration_region_depths: vec![20.0, 40.0, 100.0],
            swc_min_value: -1.0,
            swc_init_value: 15.0,
            error_mode: ErrorMode::Fatal,
        }
    }
}

/// A soil layer with its derived water contents.
///
/// All water contents are bulk values (cm of water in the layer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilLayer {
    /// Zero-based position in the profile.
    pub index: usize,
    /// Layer width (cm).
    pub width: f64,
    /// Depth of the lower boundary (cm).
    pub depth: f64,
    /// Density of the matric soil (g/cm3).
    pub bulk_density_matric: f64,
    /// Density of the whole soil including gravel (g/cm3).
    pub bulk_density: f64,
    pub gravel: f64,
    pub sand: f64,
    pub clay: f64,
    pub impermeability: f64,
    /// Normalized share of bare-soil evaporation.
    pub evap_coeff: f64,
    /// Normalized share of transpiration, per vegetation type.
    pub transp_coeff: [f64; N_VEG],
    /// Zero-based transpiration region per vegetation type; `None` if roots
    /// do not reach this layer.
    pub transp_region: [Option<usize>; N_VEG],
    pub swrc: RetentionCurve,
    pub swc_saturated: f64,
    pub swc_fieldcap: f64,
    pub swc_wiltpt: f64,
    /// Lower limit for bare-soil evaporation.
    pub swc_halfwiltpt: f64,
    /// Lower limit of soil water content.
    pub swc_min: f64,
    /// Lower limit for transpiration, per vegetation type.
    pub swc_at_crit: [f64; N_VEG],
    /// Initial soil water content.
    pub swc_init: f64,
    /// Initial soil temperature (°C).
    pub initial_temperature: f64,
}

impl SoilLayer {
    /// Geometry used by retention-curve conversions.
    pub fn geometry(&self) -> LayerGeometry {
        LayerGeometry {
            index: self.index,
            width: self.width,
            gravel: self.gravel,
        }
    }

    /// Depth of the upper boundary (cm).
    pub fn top(&self) -> f64 {
        self.depth - self.width
    }

    /// Depth of the layer midpoint (cm).
    pub fn midpoint(&self) -> f64 {
        self.depth - self.width / 2.0
    }

    /// Soil water potential (bar) of water content `swc`.
    pub fn swc_to_swp(&self, swc: f64, mode: ErrorMode) -> SoilwatResult<f64> {
        self.swrc.swc_to_swp_with_mode(swc, &self.geometry(), mode)
    }

    /// Soil water content of potential `swp` (bar).
    pub fn swp_to_swc(&self, swp: f64, mode: ErrorMode) -> SoilwatResult<f64> {
        self.swrc.swp_to_swc_with_mode(swp, &self.geometry(), mode)
    }

    /// Matric volumetric water content of `swc`.
    pub fn vwc_matric(&self, swc: f64) -> f64 {
        swc / (self.width * (1.0 - self.gravel))
    }

    /// Bulk volumetric water content of `swc`.
    pub fn vwc_bulk(&self, swc: f64) -> f64 {
        swc / self.width
    }

    fn from_parameters(
        index: usize,
        top: f64,
        params: &SoilLayerParameters,
        settings: &SoilProfileSettings,
        swp_crit: &[f64; N_VEG],
    ) -> SoilwatResult<Self> {
        params.validate(index)?;

        let swrc = params
            .swrc
            .unwrap_or_else(|| RetentionCurve::campbell_from_texture(params.sand, params.clay));
        swrc.validate().map_err(|e| {
            SoilwatError::Configuration(format!("soil layer {}: {}", index, e))
        })?;

        let geometry = LayerGeometry {
            index,
            width: params.width,
            gravel: params.gravel,
        };
        let matric_width = geometry.matric_width();
        let to_swc = |swp: f64| swrc.swp_to_swc(swp, &geometry);

        let swc_saturated = swrc.swc_saturated(&geometry);
        let swc_fieldcap = to_swc(SWP_FIELD_CAPACITY)?;
        let swc_wiltpt = to_swc(SWP_WILTING_POINT)?;

        let swc_user_min = if settings.swc_min_value < 0.0 {
            to_swc(SWP_LOWER_LIMIT)?
        } else if ge(settings.swc_min_value, 1.0) {
            to_swc(settings.swc_min_value)?
        } else {
            settings.swc_min_value * matric_width
        };
        let swc_min = swrc.swc_theoretical_min(&geometry).max(swc_user_min);

        if lt(swc_wiltpt, swc_min) {
            return Err(SoilwatError::Configuration(format!(
                "soil layer {}: wilting point {} cm is below the minimum water content {} cm",
                index, swc_wiltpt, swc_min
            )));
        }

        let mut swc_halfwiltpt = (0.5 * swc_wiltpt).max(to_swc(SWP_HYGROSCOPIC)?);
        if lt(swc_halfwiltpt, swc_min) {
            warn!(
                "soil layer {}: half-wilting point {} cm is below the minimum water content {} cm; \
                 using the minimum instead",
                index, swc_halfwiltpt, swc_min
            );
            swc_halfwiltpt = swc_min;
        }

        let mut swc_at_crit = [0.0; N_VEG];
        for (k, crit) in swc_at_crit.iter_mut().enumerate() {
            let swc = to_swc(swp_crit[k])?;
            if lt(swc, swc_min) {
                warn!(
                    "soil layer {}: water content at critical potential {} bar of vegetation \
                     type {} is below the minimum; using the minimum instead",
                    index, swp_crit[k], k
                );
            }
            *crit = swc.max(swc_min);
        }

        let swc_init = if ge(settings.swc_init_value, 1.0) {
            to_swc(settings.swc_init_value)?
        } else {
            settings.swc_init_value * params.width
        };
        if lt(swc_init, swc_min) || gt(swc_init, swc_saturated) {
            return Err(SoilwatError::Configuration(format!(
                "soil layer {}: initial water content {} cm must be within [{}, {}] cm",
                index, swc_init, swc_min, swc_saturated
            )));
        }

        if !(le(swc_wiltpt, swc_fieldcap) && le(swc_fieldcap, swc_saturated)) {
            return Err(SoilwatError::Configuration(format!(
                "soil layer {}: water contents must satisfy wilting point ({}) <= field capacity \
                 ({}) <= saturation ({})",
                index, swc_wiltpt, swc_fieldcap, swc_saturated
            )));
        }

        Ok(Self {
            index,
            width: params.width,
            depth: top + params.width,
            bulk_density_matric: params.bulk_density_matric,
            bulk_density: params.bulk_density_matric * (1.0 - params.gravel)
                + params.gravel * GRAVEL_DENSITY,
            gravel: params.gravel,
            sand: params.sand,
            clay: params.clay,
            impermeability: params.impermeability,
            evap_coeff: params.evap_coeff,
            transp_coeff: params.transp_coeff,
            transp_region: [None; N_VEG],
            swrc,
            swc_saturated,
            swc_fieldcap,
            swc_wiltpt,
            swc_halfwiltpt,
            swc_min,
            swc_at_crit,
            swc_init: swc_init.clamp(swc_min, swc_saturated),
            initial_temperature: params.initial_temperature,
        })
    }
}

/// Ordered soil layers, surface first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilProfile {
    layers: Vec<SoilLayer>,
    /// Number of top layers reached by bare-soil evaporation.
    n_evap_layers: usize,
    /// Number of top layers reached by roots, per vegetation type.
    n_transp_layers: [usize; N_VEG],
    /// Exclusive layer bounds of the transpiration regions.
    transp_region_bounds: Vec<usize>,
    error_mode: ErrorMode,
}

impl SoilProfile {
    /// Derive the profile from layer parameters.
    ///
    /// # Arguments
    ///
    /// * `params` - Layer parameters, surface first
    /// * `settings` - Profile-wide settings
    /// * `swp_crit` - Critical soil water potential (bar) per vegetation type
    pub fn new(
        params: &[SoilLayerParameters],
        settings: &SoilProfileSettings,
        swp_crit: &[f64; N_VEG],
    ) -> SoilwatResult<Self> {
        if params.is_empty() || params.len() > MAX_LAYERS {
            return Err(SoilwatError::Configuration(format!(
                "number of soil layers ({}) must be in 1..={}",
                params.len(),
                MAX_LAYERS
            )));
        }

        let mut layers = Vec::with_capacity(params.len());
        let mut top = 0.0;
        for (i, p) in params.iter().enumerate() {
            let layer = SoilLayer::from_parameters(i, top, p, settings, swp_crit)?;
            top = layer.depth;
            layers.push(layer);
        }

        normalize_coefficients(&mut layers);

        let n_evap_layers = layers.iter().take_while(|l| gt(l.evap_coeff, 0.0)).count();
        let n_transp_layers = std::array::from_fn(|k| {
            layers
                .iter()
                .take_while(|l| gt(l.transp_coeff[k], 0.0))
                .count()
        });

        let transp_region_bounds =
            derive_region_bounds(&layers, &settings.transpiration_region_depths)?;
        for k in 0..N_VEG {
            for layer in layers.iter_mut().take(n_transp_layers[k]) {
                layer.transp_region[k] = transp_region_bounds
                    .iter()
                    .position(|&bound| layer.index < bound);
            }
            if n_transp_layers[k] > 0 && layers[0].transp_region[k].is_none() {
                return Err(SoilwatError::Configuration(format!(
                    "top soil layer of vegetation type {} is not in a transpiration region",
                    k
                )));
            }
        }

        Ok(Self {
            layers,
            n_evap_layers,
            n_transp_layers,
            transp_region_bounds,
            error_mode: settings.error_mode,
        })
    }

    pub fn layers(&self) -> &[SoilLayer] {
        &self.layers
    }

    pub fn layer(&self, index: usize) -> &SoilLayer {
        &self.layers[index]
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Depth of the bottom of the deepest layer (cm).
    pub fn depth(&self) -> f64 {
        self.layers.last().map_or(0.0, |l| l.depth)
    }

    pub fn n_evap_layers(&self) -> usize {
        self.n_evap_layers
    }

    /// Number of layers reached by roots of vegetation type `veg`.
    pub fn n_transp_layers(&self, veg: usize) -> usize {
        self.n_transp_layers[veg]
    }

    pub fn n_transp_regions(&self) -> usize {
        self.transp_region_bounds.len()
    }

    pub fn error_mode(&self) -> ErrorMode {
        self.error_mode
    }

    /// Soil water potential (bar) of layer `index` at water content `swc`.
    pub fn swp(&self, index: usize, swc: f64) -> SoilwatResult<f64> {
        self.layers[index].swc_to_swp(swc, self.error_mode)
    }

    /// Initial water content of every layer.
    pub fn initial_swc(&self) -> Vec<f64> {
        self.layers.iter().map(|l| l.swc_init).collect()
    }
}

/// Rescale evaporation and transpiration coefficients to sum to one.
fn normalize_coefficients(layers: &mut [SoilLayer]) {
    let evap_sum: f64 = layers.iter().map(|l| l.evap_coeff).sum();
    if gt(evap_sum, 0.0) && !eq(evap_sum, 1.0) {
        warn!(
            "evaporation coefficients sum to {}; rescaling to 1",
            evap_sum
        );
        layers.iter_mut().for_each(|l| l.evap_coeff /= evap_sum);
    }

    for k in 0..N_VEG {
        let transp_sum: f64 = layers.iter().map(|l| l.transp_coeff[k]).sum();
        if gt(transp_sum, 0.0) && !eq(transp_sum, 1.0) {
            warn!(
                "transpiration coefficients of vegetation type {} sum to {}; rescaling to 1",
                k, transp_sum
            );
            layers.iter_mut().for_each(|l| l.transp_coeff[k] /= transp_sum);
        }
    }
}

/// Exclusive layer bounds of transpiration regions.
///
/// A region ends at the last layer that lies completely above its lower
/// depth. Regions that would contain no layer are dropped.
fn derive_region_bounds(layers: &[SoilLayer], depths: &[f64]) -> SoilwatResult<Vec<usize>> {
    if depths.is_empty() || depths.len() > MAX_TRANSP_REGIONS {
        return Err(SoilwatError::Configuration(format!(
            "number of transpiration regions ({}) must be in 1..={}",
            depths.len(),
            MAX_TRANSP_REGIONS
        )));
    }
    if depths.windows(2).any(|w| w[1] <= w[0]) {
        return Err(SoilwatError::Configuration(
            "transpiration region depths must increase with depth".into(),
        ));
    }

    let has_roots = |l: &SoilLayer| l.transp_coeff.iter().any(|&c| gt(c, 0.0));

    let mut bounds: Vec<usize> = Vec::with_capacity(depths.len());
    let mut next = 0;
    for &depth in depths {
        while next < layers.len() && le(layers[next].depth, depth) && has_roots(&layers[next]) {
            next += 1;
        }
        if next > 0 && bounds.last() != Some(&next) {
            bounds.push(next);
        }
    }
    Ok(bounds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SWP_CRIT: [f64; N_VEG] = [20.0, 39.0, 20.0, 30.0];

    fn layer(width: f64, evap: f64, transp: f64) -> SoilLayerParameters {
        SoilLayerParameters {
            width,
            evap_coeff: evap,
            transp_coeff: [transp; N_VEG],
            ..SoilLayerParameters::default()
        }
    }

    fn profile(params: &[SoilLayerParameters]) -> SoilProfile {
        SoilProfile::new(params, &SoilProfileSettings::default(), &SWP_CRIT).unwrap()
    }

    #[test]
    fn test_derived_water_contents_are_ordered() {
        let p = profile(&[layer(20.0, 1.0, 1.0)]);
        let l = p.layer(0);

        assert!(l.swc_min <= l.swc_halfwiltpt);
        assert!(l.swc_halfwiltpt <= l.swc_wiltpt);
        assert!(l.swc_wiltpt < l.swc_fieldcap);
        assert!(l.swc_fieldcap < l.swc_saturated);
        for k in 0..N_VEG {
            assert!(l.swc_at_crit[k] < l.swc_wiltpt);
            assert!(l.swc_at_crit[k] >= l.swc_min);
        }
        assert_relative_eq!(l.depth, 20.0);
        assert_relative_eq!(l.bulk_density, 1.43);
    }

    #[test]
    fn test_field_capacity_potential() {
        let p = profile(&[layer(20.0, 1.0, 1.0)]);
        let l = p.layer(0);
        let swp = l.swc_to_swp(l.swc_fieldcap, ErrorMode::Fatal).unwrap();
        assert_relative_eq!(swp, SWP_FIELD_CAPACITY, max_relative = 1e-9);
    }

    #[test]
    fn test_initial_water_content() {
        let p = profile(&[layer(20.0, 1.0, 1.0)]);
        let l = p.layer(0);
        let swp = l.swc_to_swp(l.swc_init, ErrorMode::Fatal).unwrap();
        assert_relative_eq!(swp, 15.0, max_relative = 1e-9);

        let settings = SoilProfileSettings {
            swc_init_value: 0.2,
            ..SoilProfileSettings::default()
        };
        let p = SoilProfile::new(&[layer(20.0, 1.0, 1.0)], &settings, &SWP_CRIT).unwrap();
        assert_relative_eq!(p.layer(0).swc_init, 4.0);
    }

    #[test]
    fn test_bulk_density_with_gravel() {
        let params = SoilLayerParameters {
            gravel: 0.2,
            bulk_density_matric: 1.5,
            ..layer(10.0, 1.0, 1.0)
        };
        let p = profile(&[params]);
        assert_relative_eq!(p.layer(0).bulk_density, 1.5 * 0.8 + 0.2 * 2.65);
    }

    #[test]
    fn test_coefficients_are_normalized() {
        let p = profile(&[layer(10.0, 0.4, 0.2), layer(10.0, 0.4, 0.2), layer(10.0, 0.0, 0.2)]);
        assert_eq!(p.n_evap_layers(), 2);
        assert_eq!(p.n_transp_layers(0), 3);
        assert_relative_eq!(p.layer(0).evap_coeff, 0.5);
        let sum: f64 = p.layers().iter().map(|l| l.transp_coeff[3]).sum();
        assert_relative_eq!(sum, 1.0);
    }

    #[test]
    fn test_transpiration_regions() {
        let params: Vec<_> = (0..10).map(|_| layer(10.0, 0.1, 0.1)).collect();
        let p = profile(&params);

        assert_eq!(p.n_transp_regions(), 3);
        assert_eq!(p.layer(0).transp_region[0], Some(0));
        assert_eq!(p.layer(1).transp_region[0], Some(0));
        assert_eq!(p.layer(2).transp_region[0], Some(1));
        assert_eq!(p.layer(3).transp_region[0], Some(1));
        assert_eq!(p.layer(4).transp_region[0], Some(2));
        assert_eq!(p.layer(9).transp_region[0], Some(2));
        assert_relative_eq!(p.depth(), 100.0);
    }

    #[test]
    fn test_roots_stop_at_first_zero_coefficient() {
        let p = profile(&[layer(10.0, 1.0, 0.5), layer(10.0, 0.0, 0.0), layer(10.0, 0.0, 0.5)]);
        assert_eq!(p.n_transp_layers(3), 1);
        assert_eq!(p.layer(2).transp_region[3], None);
    }

    #[test]
    fn test_invalid_layers() {
        let settings = SoilProfileSettings::default();
        assert!(SoilProfile::new(&[], &settings, &SWP_CRIT).is_err());

        let too_many: Vec<_> = (0..=MAX_LAYERS).map(|_| layer(1.0, 0.0, 0.0)).collect();
        assert!(SoilProfile::new(&too_many, &settings, &SWP_CRIT).is_err());

        let bad = SoilLayerParameters {
            gravel: 1.0,
            ..layer(10.0, 1.0, 1.0)
        };
        let err = SoilProfile::new(&[bad], &settings, &SWP_CRIT).unwrap_err();
        assert!(matches!(err, SoilwatError::Configuration(_)));

        let bad = SoilLayerParameters {
            swrc: Some(RetentionCurve::Campbell1974 {
                psis: -1.0,
                theta_sat: 0.4,
                b: 5.0,
                ksat: 1.0,
            }),
            ..layer(10.0, 1.0, 1.0)
        };
        assert!(SoilProfile::new(&[bad], &settings, &SWP_CRIT).is_err());
    }

    #[test]
    fn test_deserialize_layer() {
        let json = r#"{"width": 5.0, "swrc": {"type": "VanGenuchten1980",
            "theta_r": 0.1, "theta_s": 0.45, "alpha": 0.01, "n": 1.3, "ksat": 8.0}}"#;
        let params: SoilLayerParameters = serde_json::from_str(json).unwrap();
        assert_relative_eq!(params.width, 5.0);
        assert_relative_eq!(params.sand, 0.4);
        assert!(matches!(
            params.swrc,
            Some(RetentionCurve::VanGenuchten1980 { .. })
        ));
    }
}
