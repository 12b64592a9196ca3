//! Parameters of the Markov weather generator
//!
//! Precipitation occurrence follows a first-order, two-state Markov chain
//! with day-of-year transition probabilities. Daily maximum and minimum
//! temperatures are drawn from a weekly bivariate normal distribution.

use crate::errors::{SoilwatError, SoilwatResult};
use crate::time::{MAX_DAYS, MAX_WEEKS};
use crate::tolerance::gt;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// How wet/dry correction factors modify generated temperatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CorrectionMode {
    /// `t * cf` if `t >= 0`, else `t / cf`.
    #[default]
    Multiplicative,
    /// `t + cf`.
    Additive,
}

/// Per-week covariance of (tmax, tmin) (°C²).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureCovariance {
    pub var_tmax: f64,
    pub cov: f64,
    pub var_tmin: f64,
}

/// Markov chain and temperature distribution parameters.
///
/// Daily vectors have [`MAX_DAYS`] entries indexed by zero-based day of
/// year; weekly vectors have [`MAX_WEEKS`] entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkovParameters {
    /// Probability of a wet day after a wet day.
    pub wet_prob: Vec<f64>,
    /// Probability of a wet day after a dry day.
    pub dry_prob: Vec<f64>,
    /// Mean precipitation on wet days (cm).
    pub ppt_avg: Vec<f64>,
    /// Standard deviation of precipitation on wet days (cm).
    pub ppt_sd: Vec<f64>,
    /// Weekly mean maximum temperature (°C).
    pub tmax_mean: Vec<f64>,
    /// Weekly mean minimum temperature (°C).
    pub tmin_mean: Vec<f64>,
    /// Weekly covariance of maximum and minimum temperature.
    pub covariance: Vec<TemperatureCovariance>,
    /// Weekly correction factors of maximum temperature on wet days.
    pub cf_tmax_wet: Vec<f64>,
    /// Weekly correction factors of maximum temperature on dry days.
    pub cf_tmax_dry: Vec<f64>,
    /// Weekly correction factors of minimum temperature on wet days.
    pub cf_tmin_wet: Vec<f64>,
    /// Weekly correction factors of minimum temperature on dry days.
    pub cf_tmin_dry: Vec<f64>,
    /// Default: Multiplicative
    pub correction_mode: CorrectionMode,
}

impl Default for MarkovParameters {
    /// A mid-latitude continental climate with a seasonal temperature cycle.
    fn default() -> Self {
        let seasonal = |week: usize, mean: f64, amplitude: f64| {
            // Coldest in mid-January, warmest in mid-July
            mean - amplitude * (2.0 * PI * (week as f64 + 0.5 - 2.0) / 52.0).cos()
        };
        let covariance = TemperatureCovariance {
            var_tmax: 16.0,
            cov: 8.0,
            var_tmin: 12.0,
        };
        Self {
            wet_prob: vec![0.35; MAX_DAYS],
            dry_prob: vec![0.15; MAX_DAYS],
            ppt_avg: vec![0.4; MAX_DAYS],
            ppt_sd: vec![0.3; MAX_DAYS],
            tmax_mean: (0..MAX_WEEKS).map(|w| seasonal(w, 15.0, 13.0)).collect(),
            tmin_mean: (0..MAX_WEEKS).map(|w| seasonal(w, 0.0, 11.0)).collect(),
            covariance: vec![covariance; MAX_WEEKS],
            cf_tmax_wet: vec![1.0; MAX_WEEKS],
            cf_tmax_dry: vec![1.0; MAX_WEEKS],
            cf_tmin_wet: vec![1.0; MAX_WEEKS],
            cf_tmin_dry: vec![1.0; MAX_WEEKS],
            correction_mode: CorrectionMode::Multiplicative,
        }
    }
}

impl MarkovParameters {
    /// Parameters that are the same on every day and in every week.
    pub fn constant(
        wet_prob: f64,
        dry_prob: f64,
        ppt_avg: f64,
        ppt_sd: f64,
        tmax_mean: f64,
        tmin_mean: f64,
        covariance: TemperatureCovariance,
    ) -> Self {
        Self {
            wet_prob: vec![wet_prob; MAX_DAYS],
            dry_prob: vec![dry_prob; MAX_DAYS],
            ppt_avg: vec![ppt_avg; MAX_DAYS],
            ppt_sd: vec![ppt_sd; MAX_DAYS],
            tmax_mean: vec![tmax_mean; MAX_WEEKS],
            tmin_mean: vec![tmin_mean; MAX_WEEKS],
            covariance: vec![covariance; MAX_WEEKS],
            ..Self::default()
        }
    }

    /// Check vector lengths, probabilities and covariance matrices.
    ///
    /// A covariance whose cross term exceeds $\sqrt{var_{tmax} \, var_{tmin}}$
    /// cannot be decomposed and is rejected.
    pub fn validate(&self) -> SoilwatResult<()> {
        let fail = |what: String| Err(SoilwatError::Configuration(format!("markov: {}", what)));

        for (name, v, n) in [
            ("wet_prob", &self.wet_prob, MAX_DAYS),
            ("dry_prob", &self.dry_prob, MAX_DAYS),
            ("ppt_avg", &self.ppt_avg, MAX_DAYS),
            ("ppt_sd", &self.ppt_sd, MAX_DAYS),
            ("tmax_mean", &self.tmax_mean, MAX_WEEKS),
            ("tmin_mean", &self.tmin_mean, MAX_WEEKS),
            ("cf_tmax_wet", &self.cf_tmax_wet, MAX_WEEKS),
            ("cf_tmax_dry", &self.cf_tmax_dry, MAX_WEEKS),
            ("cf_tmin_wet", &self.cf_tmin_wet, MAX_WEEKS),
            ("cf_tmin_dry", &self.cf_tmin_dry, MAX_WEEKS),
        ] {
            if v.len() != n {
                return fail(format!("{} has {} values, expected {}", name, v.len(), n));
            }
        }
        if self.covariance.len() != MAX_WEEKS {
            return fail(format!(
                "covariance has {} values, expected {}",
                self.covariance.len(),
                MAX_WEEKS
            ));
        }

        let probability = |p: &f64| (0.0..=1.0).contains(p);
        if !self.wet_prob.iter().all(probability) || !self.dry_prob.iter().all(probability) {
            return fail("transition probabilities must be in [0, 1]".into());
        }
        if self.ppt_sd.iter().any(|&s| s < 0.0) {
            return fail("precipitation standard deviations must be >= 0".into());
        }

        for (week, c) in self.covariance.iter().enumerate() {
            if c.var_tmax < 0.0 || c.var_tmin < 0.0 {
                return fail(format!("negative temperature variance in week {}", week));
            }
            let cross = if c.var_tmax > 0.0 {
                c.cov / c.var_tmax.sqrt()
            } else {
                0.0
            };
            if gt(cross * cross, c.var_tmin) {
                return fail(format!(
                    "covariance {} of week {} exceeds sqrt(var_tmax * var_tmin); \
                     the matrix cannot be decomposed",
                    c.cov, week
                ));
            }
        }

        if self.correction_mode == CorrectionMode::Multiplicative
            && [
                &self.cf_tmax_wet,
                &self.cf_tmax_dry,
                &self.cf_tmin_wet,
                &self.cf_tmin_dry,
            ]
            .iter()
            .any(|v| v.iter().any(|&cf| cf <= 0.0))
        {
            return fail("multiplicative correction factors must be > 0".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let params = MarkovParameters::default();
        assert!(params.validate().is_ok());
        // Summer is warmer than winter
        assert!(params.tmax_mean[28] > params.tmax_mean[2] + 20.0);
    }

    #[test]
    fn test_bad_covariance() {
        let params = MarkovParameters::constant(
            0.5,
            0.5,
            0.5,
            0.1,
            10.0,
            0.0,
            TemperatureCovariance {
                var_tmax: 4.0,
                cov: 5.0,
                var_tmin: 4.0,
            },
        );
        let err = params.validate().unwrap_err();
        assert!(matches!(err, SoilwatError::Configuration(_)));
    }

    #[test]
    fn test_perfectly_correlated_covariance() {
        for (var_tmax, var_tmin) in [(3.0, 3.0), (5.0, 7.0), (0.3, 0.7), (2.0, 8.0), (10.0, 2.5)] {
            let params = MarkovParameters::constant(
                0.5,
                0.5,
                0.5,
                0.1,
                10.0,
                0.0,
                TemperatureCovariance {
                    var_tmax,
                    cov: f64::sqrt(var_tmax * var_tmin),
                    var_tmin,
                },
            );
            assert!(params.validate().is_ok(), "{} {}", var_tmax, var_tmin);
        }
    }

    #[test]
    fn test_wrong_lengths() {
        let params = MarkovParameters {
            wet_prob: vec![0.5; 365],
            ..MarkovParameters::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_correction_factors() {
        let mut params = MarkovParameters::default();
        params.cf_tmin_dry[3] = 0.0;
        assert!(params.validate().is_err());

        params.correction_mode = CorrectionMode::Additive;
        assert!(params.validate().is_ok());
    }
}
