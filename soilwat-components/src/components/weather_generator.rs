//! Markov chain weather generator
//!
//! Produces daily precipitation and a correlated pair of maximum and minimum
//! air temperatures for days without historical weather.
//!
//! # What This Component Does
//!
//! 1. Decides whether today is wet from a first-order, two-state Markov chain
//!    with day-of-year transition probabilities
//! 2. Draws the precipitation amount of a wet day from a normal distribution
//! 3. Draws (tmax, tmin) from the weekly bivariate normal distribution
//! 4. Corrects the temperatures for wet or dry conditions
//!
//! # Physics Overview
//!
//! The temperature pair is drawn through the Cholesky factor of the weekly
//! covariance matrix:
//!
//! $$T_{max} = s z_1 + \mu_{max}$$
//! $$T_{min} = c z_1 + \sqrt{\sigma^2_{min} - c^2} \, z_2 + \mu_{min}$$
//!
//! with $s = \sqrt{\sigma^2_{max}}$, $c = cov / s$ and independent standard
//! normal draws $z_1, z_2$.
//!
//! All draws come from a generator owned by the component and seeded
//! explicitly, so two generators with the same seed produce the same weather.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal, StandardNormal};
use soilwat_core::errors::{SoilwatError, SoilwatResult};
use soilwat_core::markov::{CorrectionMode, MarkovParameters};
use soilwat_core::time::{week_of_doy, MAX_DAYS};

/// Weather of one generated day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneratedDay {
    /// Precipitation (cm).
    pub precipitation: f64,
    /// Maximum air temperature (°C).
    pub temp_max: f64,
    /// Minimum air temperature (°C).
    pub temp_min: f64,
}

/// Stochastic daily weather generator.
#[derive(Debug, Clone)]
pub struct WeatherGenerator {
    parameters: MarkovParameters,
    rng: ChaCha8Rng,
    /// Number of wet days generated since the last [`WeatherGenerator::reset_year`].
    events: usize,
}

impl WeatherGenerator {
    /// Create a generator with default parameters.
    pub fn new(seed: u64) -> SoilwatResult<Self> {
        Self::from_parameters(MarkovParameters::default(), seed)
    }

    /// Create a generator from parameters.
    ///
    /// Fails with a configuration error if any weekly covariance matrix cannot
    /// be decomposed.
    pub fn from_parameters(parameters: MarkovParameters, seed: u64) -> SoilwatResult<Self> {
        parameters.validate()?;
        Ok(Self {
            parameters,
            rng: ChaCha8Rng::seed_from_u64(seed),
            events: 0,
        })
    }

    /// Weather generator parameters.
    pub fn parameters(&self) -> &MarkovParameters {
        &self.parameters
    }

    /// Wet days generated this year.
    pub fn events(&self) -> usize {
        self.events
    }

    /// Start a new year of event counting.
    pub fn reset_year(&mut self) {
        self.events = 0;
    }

    /// Generate the weather of 1-based day of year `doy`.
    ///
    /// # Arguments
    ///
    /// * `doy` - Day of year (1..=366)
    /// * `yesterday_precipitation` - Precipitation of the previous day (cm);
    ///   selects the wet or dry transition probability
    pub fn generate_day(
        &mut self,
        doy: usize,
        yesterday_precipitation: f64,
    ) -> SoilwatResult<GeneratedDay> {
        if doy == 0 || doy > MAX_DAYS {
            return Err(SoilwatError::InputQuality(format!(
                "day of year {} outside 1..={}",
                doy, MAX_DAYS
            )));
        }
        let doy0 = doy - 1;
        let week = week_of_doy(doy);
        let params = &self.parameters;

        // Precipitation occurrence and amount
        let threshold = if yesterday_precipitation > 0.0 {
            params.wet_prob[doy0]
        } else {
            params.dry_prob[doy0]
        };
        let p: f64 = self.rng.gen();
        let precipitation = if threshold > 0.0 && p <= threshold {
            let normal = Normal::new(params.ppt_avg[doy0], params.ppt_sd[doy0])
                .map_err(|e| SoilwatError::Configuration(format!("precipitation: {}", e)))?;
            normal.sample(&mut self.rng).max(0.0)
        } else {
            0.0
        };
        if precipitation > 0.0 {
            self.events += 1;
        }

        // Correlated temperatures
        let z1: f64 = StandardNormal.sample(&mut self.rng);
        let z2: f64 = StandardNormal.sample(&mut self.rng);
        let covariance = params.covariance[week];
        let sd_tmax = covariance.var_tmax.sqrt();
        let cross = if sd_tmax > 0.0 {
            covariance.cov / sd_tmax
        } else {
            0.0
        };
        let residual = (covariance.var_tmin - cross * cross).max(0.0).sqrt();

        let temp_max = sd_tmax * z1 + params.tmax_mean[week];
        let temp_min = cross * z1 + residual * z2 + params.tmin_mean[week];

        let wet = precipitation > 0.0;
        let (cf_max, cf_min) = if wet {
            (params.cf_tmax_wet[week], params.cf_tmin_wet[week])
        } else {
            (params.cf_tmax_dry[week], params.cf_tmin_dry[week])
        };
        let temp_max = correct(temp_max, cf_max, params.correction_mode);
        let temp_min = correct(temp_min, cf_min, params.correction_mode).min(temp_max);

        Ok(GeneratedDay {
            precipitation,
            temp_max,
            temp_min,
        })
    }
}

/// Apply a wet/dry correction factor to temperature `t`.
///
/// The multiplicative correction divides negative temperatures so that a
/// factor above one warms both warm and cold days.
fn correct(t: f64, cf: f64, mode: CorrectionMode) -> f64 {
    match mode {
        CorrectionMode::Multiplicative => {
            if t >= 0.0 {
                t * cf
            } else {
                t / cf
            }
        }
        CorrectionMode::Additive => t + cf,
    }
}
