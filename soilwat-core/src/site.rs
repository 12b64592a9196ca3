//! Site parameters and the complete site configuration
//!
//! [`SiteConfiguration`] bundles everything needed to set up one soil column
//! and can be read from TOML:
//!
//! ```toml
//! [site]
//! latitude = 40.8
//! elevation = 1600.0
//!
//! [[layers]]
//! width = 20.0
//! evap_coeff = 1.0
//! transp_coeff = [1.0, 1.0, 1.0, 1.0]
//!
//! [vegetation.grass]
//! cover = 1.0
//! ```
//!
//! Omitted tables and fields take their documented defaults.

use crate::errors::{SoilwatError, SoilwatResult};
use crate::markov::MarkovParameters;
use crate::soil::{SoilLayerParameters, SoilProfile, SoilProfileSettings};
use crate::utils::functions::tanfunc;
use crate::vegetation::VegetationComposition;
use crate::weather::SkyParameters;
use serde::{Deserialize, Serialize};

/// Snow accumulation and melt (SWAT2K).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnowParameters {
    /// Mean air temperature at or below which precipitation falls as snow (°C).
    /// Default: 0.0
    pub t_min_accu: f64,
    /// Snow temperature above which snow melts (°C).
    /// Default: 0.0
    pub t_max_crit: f64,
    /// Weight of today's air temperature in the lagged snow temperature.
    /// Default: 0.1
    pub lambda_snow: f64,
    /// Melt rate at the winter solstice (cm/(°C day)).
    /// Default: 0.0
    pub rmelt_min: f64,
    /// Melt rate at the summer solstice (cm/(°C day)).
    /// Default: 1.0
    pub rmelt_max: f64,
    /// Percentage of snowmelt that runs off (%).
    /// Default: 0.0
    pub percent_runoff: f64,
}

impl Default for SnowParameters {
    fn default() -> Self {
        Self {
            t_min_accu: 0.0,
            t_max_crit: 0.0,
            lambda_snow: 0.1,
            rmelt_min: 0.0,
            rmelt_max: 1.0,
            percent_runoff: 0.0,
        }
    }
}

/// Soil temperature solver settings (Parton 1978; Eitzinger et al. 2000).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoilTemperatureParameters {
    /// Whether soil temperature is simulated.
    /// Default: true
    pub enabled: bool,
    /// Biomass limit for the surface temperature regimes (g/m2).
    /// Default: 300.0
    pub bm_limiter: f64,
    /// Surface temperature parameter for sparse canopies.
    /// Default: 15.0
    pub t1_param1: f64,
    /// Surface temperature parameter for dense canopies.
    /// Default: -4.0
    pub t1_param2: f64,
    /// Surface temperature parameter for dense canopies (g/m2).
    /// Default: 600.0
    pub t1_param3: f64,
    /// Soil thermal conductivity of dry soil.
    /// Default: 0.0007
    pub cs_param1: f64,
    /// Increase of thermal conductivity with relative soil moisture.
    /// Default: 0.0003
    pub cs_param2: f64,
    /// Specific heat capacity of the soil solids.
    /// Default: 0.18
    pub sh_param: f64,
    /// Constant soil temperature at `max_depth` (°C).
    /// Default: 4.15
    pub tsoil_constant: f64,
    /// Spacing of the temperature grid (cm).
    /// Default: 15.0
    pub delta_x: f64,
    /// Depth of the lower boundary (cm).
    /// Default: 990.0
    pub max_depth: f64,
}

impl Default for SoilTemperatureParameters {
    fn default() -> Self {
        Self {
            enabled: true,

            // Surface temperature
            bm_limiter: 300.0,
            t1_param1: 15.0,
            t1_param2: -4.0,
            t1_param3: 600.0,

            // Soil thermal properties
            cs_param1: 0.0007,
            cs_param2: 0.0003,
            sh_param: 0.18,

            // Grid and lower boundary
            tsoil_constant: 4.15,
            delta_x: 15.0,
            max_depth: 990.0,
        }
    }
}

/// Parameters of the soil-water limitation of evaporation or transpiration.
///
/// The rate relative to potential is
///
/// $$\min\left(1, \max\left(0, f(shift - \psi)\right)\right)$$
///
/// where $f$ is [`tanfunc`] with an inflection point that moves with PET.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaterRateParameters {
    /// Soil water potential shift (bar).
    pub shift: f64,
    /// Slope at the inflection point.
    pub shape: f64,
    /// Y-value of the inflection point.
    pub inflec: f64,
    /// Range of the response.
    pub range: f64,
}

impl WaterRateParameters {
    /// Default limitation of bare-soil evaporation.
    pub const EVAPORATION: Self = Self {
        shift: 45.0,
        shape: 0.1,
        inflec: 0.25,
        range: 0.5,
    };

    /// Default limitation of transpiration.
    pub const TRANSPIRATION: Self = Self {
        shift: 45.0,
        shape: 0.1,
        inflec: 0.5,
        range: 1.1,
    };

    /// Relative rate at soil water potential `swp` (bar) and potential
    /// evapotranspiration `pet` (cm/day).
    pub fn watrate(&self, swp: f64, pet: f64) -> f64 {
        let par1 = if pet < 0.2 {
            3.0
        } else if pet < 0.4 {
            (0.4 - pet) * -10.0 + 5.0
        } else if pet < 0.6 {
            (0.6 - pet) * -15.0 + 8.0
        } else {
            8.0
        };
        tanfunc(self.shift - swp, par1, self.inflec, self.range, self.shape).clamp(0.0, 1.0)
    }
}

/// Site location and surface water settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteParameters {
    /// Latitude (degrees north).
    /// Default: 40.0
    pub latitude: f64,
    /// Elevation above sea level (m).
    /// Default: 1000.0
    pub elevation: f64,
    /// Slope of the surface (degrees).
    /// Default: 0.0
    pub slope: f64,
    /// Aspect of the surface (degrees; north = 0, south = 180); negative if unknown.
    /// Default: -1.0
    pub aspect: f64,
    /// Scaling factor of potential evapotranspiration.
    /// Default: 1.0
    pub pet_scale: f64,
    /// Fraction of ponded water that runs off each day.
    /// Default: 0.0
    pub percent_runoff: f64,
    /// Fraction of the upslope neighbour's ponded water that runs on each day.
    /// Default: 0.0
    pub percent_runon: f64,
    /// Maximum drainage rate below field capacity (cm/day).
    /// Default: 0.02
    pub slow_drain_coeff: f64,
    /// Soil water limitation of bare-soil evaporation.
    pub evaporation_rate: WaterRateParameters,
    /// Soil water limitation of transpiration.
    pub transpiration_rate: WaterRateParameters,
    pub snow: SnowParameters,
    pub soil_temperature: SoilTemperatureParameters,
}

impl Default for SiteParameters {
    fn default() -> Self {
        Self {
            // Location
            latitude: 40.0,
            elevation: 1000.0,
            slope: 0.0,
            aspect: -1.0,

            // Surface water
            pet_scale: 1.0,
            percent_runoff: 0.0,
            percent_runon: 0.0,
            slow_drain_coeff: 0.02,

            // Soil water limitation
            evaporation_rate: WaterRateParameters::EVAPORATION,
            transpiration_rate: WaterRateParameters::TRANSPIRATION,

            snow: SnowParameters::default(),
            soil_temperature: SoilTemperatureParameters::default(),
        }
    }
}

impl SiteParameters {
    /// Latitude in radians.
    pub fn latitude_radians(&self) -> f64 {
        self.latitude.to_radians()
    }

    /// Check ranges of the site settings.
    pub fn validate(&self) -> SoilwatResult<()> {
        let fail = |what: &str| Err(SoilwatError::Configuration(format!("site: {}", what)));
        let fraction = |v: f64| (0.0..=1.0).contains(&v);

        if !(-90.0..=90.0).contains(&self.latitude) {
            return fail("latitude must be in [-90, 90] degrees");
        }
        if !(0.0..90.0).contains(&self.slope) {
            return fail("slope must be in [0, 90) degrees");
        }
        if self.pet_scale < 0.0 {
            return fail("pet_scale must be >= 0");
        }
        if !fraction(self.percent_runoff) || !fraction(self.percent_runon) {
            return fail("runoff and runon fractions must be in [0, 1]");
        }
        if self.slow_drain_coeff < 0.0 {
            return fail("slow_drain_coeff must be >= 0");
        }
        if !fraction(self.snow.lambda_snow) || !(0.0..=100.0).contains(&self.snow.percent_runoff) {
            return fail("lambda_snow must be in [0, 1] and snowmelt runoff in [0, 100] %");
        }
        if self.snow.rmelt_min > self.snow.rmelt_max {
            return fail("rmelt_min must not exceed rmelt_max");
        }
        let st = &self.soil_temperature;
        if st.delta_x <= 0.0 || st.max_depth <= 0.0 || st.bm_limiter <= 0.0 || st.t1_param3 == 0.0
        {
            return fail("soil temperature grid and surface parameters must be > 0");
        }
        Ok(())
    }
}

/// Everything needed to set up one soil column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfiguration {
    pub site: SiteParameters,
    pub soil: SoilProfileSettings,
    pub layers: Vec<SoilLayerParameters>,
    pub vegetation: VegetationComposition,
    pub sky: SkyParameters,
    /// Weather generator parameters; required when weather is generated.
    pub markov: Option<MarkovParameters>,
}

impl Default for SiteConfiguration {
    /// A grassland on a 100 cm loam profile of five layers.
    fn default() -> Self {
        let widths = [10.0, 10.0, 20.0, 20.0, 40.0];
        let evap = [0.8, 0.2, 0.0, 0.0, 0.0];
        let transp = [0.3, 0.25, 0.25, 0.15, 0.05];
        let layers = widths
            .iter()
            .zip(evap)
            .zip(transp)
            .map(|((&width, evap_coeff), tr)| SoilLayerParameters {
                width,
                evap_coeff,
                transp_coeff: [tr; 4],
                ..SoilLayerParameters::default()
            })
            .collect();

        Self {
            site: SiteParameters::default(),
            soil: SoilProfileSettings::default(),
            layers,
            vegetation: VegetationComposition::default(),
            sky: SkyParameters::default(),
            markov: None,
        }
    }
}

impl SiteConfiguration {
    /// Parse and validate a TOML configuration.
    pub fn from_toml_str(s: &str) -> SoilwatResult<Self> {
        let config: SiteConfiguration =
            toml::from_str(s).map_err(|e| SoilwatError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check every parameter group.
    pub fn validate(&self) -> SoilwatResult<()> {
        self.site.validate()?;
        self.vegetation.validate()?;
        self.sky.validate()?;
        if let Some(markov) = &self.markov {
            markov.validate()?;
        }
        if self.layers.is_empty() {
            return Err(SoilwatError::Configuration(
                "at least one soil layer is required".into(),
            ));
        }
        Ok(())
    }

    /// Derive the soil profile.
    pub fn build_profile(&self) -> SoilwatResult<SoilProfile> {
        SoilProfile::new(&self.layers, &self.soil, &self.vegetation.swp_crit())
    }
}
