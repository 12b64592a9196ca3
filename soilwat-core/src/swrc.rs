//! Soil water retention curves (SWRC)
//!
//! Converts between bulk soil water content (cm of water in a layer) and
//! matric soil water potential (positive bar, i.e. tension).
//!
//! # What This Module Does
//!
//! 1. Selects one retention curve per soil layer at setup ([`RetentionCurve`])
//! 2. Validates curve parameters ([`RetentionCurve::validate`])
//! 3. Converts water content to potential and back
//!    ([`RetentionCurve::swc_to_swp`], [`RetentionCurve::swp_to_swc`])
//!
//! # Conventions
//!
//! Bulk water content relates to matric volumetric water content by
//!
//! $$\theta = \frac{SWC}{w \, (1 - g)}$$
//!
//! where $w$ is the layer width (cm) and $g$ the volumetric gravel fraction.
//!
//! The conversions are the inverse of each other between saturation and the
//! dry end of each curve. Campbell1974 has a discontinuity at the air-entry
//! potential: water contents above saturation map to 0 bar.

use crate::errors::{SoilwatError, SoilwatResult};
use crate::tolerance::{eq, gt, lt};
use log::warn;
use serde::{Deserialize, Serialize};
use std::f64::consts::E;

/// Conversion from cm of water (Campbell1974 legacy value) to bar.
const CM_PER_BAR_CAMPBELL: f64 = 1024.0;

/// Conversion from cm of water at 4 °C to bar.
const CM_PER_BAR: f64 = 1019.716;

/// FXW tension at zero water content (cm).
pub const FXW_H0: f64 = 6.3e6;

/// FXW residual tension for the correction factor (cm).
pub const FXW_HR: f64 = 1500.0;

/// `ln(1 + FXW_H0 / FXW_HR)`
const FXW_LOG_H0_HR: f64 = 8.343_077_871_169_38;

/// Soil water potential at field capacity (bar).
pub const SWP_FIELD_CAPACITY: f64 = 0.333;

/// Soil water potential at the permanent wilting point (bar).
pub const SWP_WILTING_POINT: f64 = 15.0;

/// How violations of conversion preconditions are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ErrorMode {
    /// Return [`SoilwatError::InvalidSoilState`].
    #[default]
    Fatal,
    /// Log a warning and return [`f64::NAN`].
    Warn,
}

/// Geometry of the layer a conversion applies to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerGeometry {
    /// Zero-based position of the layer, used for error messages.
    pub index: usize,
    /// Layer width (cm).
    pub width: f64,
    /// Volumetric gravel fraction of the whole soil (m3/m3).
    pub gravel: f64,
}

impl LayerGeometry {
    /// Matric volume of the layer per unit area (cm).
    pub fn matric_width(&self) -> f64 {
        self.width * (1.0 - self.gravel)
    }

    fn check(&self) -> SoilwatResult<()> {
        if eq(self.gravel, 1.0) || self.gravel > 1.0 || self.gravel < 0.0 {
            return Err(SoilwatError::InvalidSoilState {
                layer: self.index,
                message: format!("gravel fraction {} must be in [0, 1)", self.gravel),
            });
        }
        if self.width <= 0.0 {
            return Err(SoilwatError::InvalidSoilState {
                layer: self.index,
                message: format!("width {} must be > 0", self.width),
            });
        }
        Ok(())
    }
}

/// A soil water retention curve with its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RetentionCurve {
    /// Campbell 1974.
    Campbell1974 {
        /// Air-entry suction (cm).
        psis: f64,
        /// Saturated volumetric water content (cm/cm).
        theta_sat: f64,
        /// Shape parameter `b`.
        b: f64,
        /// Saturated hydraulic conductivity (cm/day).
        ksat: f64,
    },
    /// van Genuchten 1980.
    VanGenuchten1980 {
        /// Residual volumetric water content (cm/cm).
        theta_r: f64,
        /// Saturated volumetric water content (cm/cm).
        theta_s: f64,
        /// Inverse of air-entry suction (1/cm).
        alpha: f64,
        /// Pore-size distribution parameter `n`.
        n: f64,
        /// Saturated hydraulic conductivity (cm/day).
        ksat: f64,
    },
    /// Fredlund & Xing 1994 with the Wang et al. 2018 correction.
    Fxw {
        /// Saturated volumetric water content (cm/cm).
        theta_s: f64,
        /// Shape parameter `alpha` (1/cm).
        alpha: f64,
        /// Shape parameter `n`.
        n: f64,
        /// Shape parameter `m`.
        m: f64,
        /// Saturated hydraulic conductivity (cm/day).
        ksat: f64,
        /// Tortuosity/connectivity parameter `L`.
        l: f64,
    },
}

impl Default for RetentionCurve {
    /// Campbell1974 curve of a loam (40 % sand, 20 % clay).
    fn default() -> Self {
        Self::campbell_from_texture(0.4, 0.2)
    }
}

impl RetentionCurve {
    /// Campbell1974 parameters estimated with the Cosby et al. 1984 pedotransfer functions.
    ///
    /// # Arguments
    ///
    /// * `sand` - Sand weight fraction of the matric soil (0-1)
    /// * `clay` - Clay weight fraction of the matric soil (0-1)
    ///
    /// $$\psi_s = 10^{-1.58 \, sand - 0.63 \, clay + 2.17}$$
    /// $$\theta_s = -0.142 \, sand - 0.037 \, clay + 0.505$$
    /// $$b = -0.3 \, sand + 15.7 \, clay + 3.10$$
    pub fn campbell_from_texture(sand: f64, clay: f64) -> Self {
        RetentionCurve::Campbell1974 {
            psis: 10f64.powf(-1.58 * sand - 0.63 * clay + 2.17),
            theta_sat: -0.142 * sand - 0.037 * clay + 0.505,
            b: -0.3 * sand + 15.7 * clay + 3.10,
            // inches/hour to cm/day
            ksat: 2.54 * 24.0 * 10f64.powf(1.26 * sand - 0.64 * clay - 0.60),
        }
    }

    /// Short name of the curve family.
    pub fn name(&self) -> &'static str {
        match self {
            RetentionCurve::Campbell1974 { .. } => "Campbell1974",
            RetentionCurve::VanGenuchten1980 { .. } => "vanGenuchten1980",
            RetentionCurve::Fxw { .. } => "FXW",
        }
    }

    /// Check that the parameters describe a physically valid curve.
    pub fn validate(&self) -> SoilwatResult<()> {
        let fail = |what: &str| {
            Err(SoilwatError::Configuration(format!(
                "invalid {} parameters: {}",
                self.name(),
                what
            )))
        };

        match *self {
            RetentionCurve::Campbell1974 {
                psis,
                theta_sat,
                b,
                ksat,
            } => {
                if psis <= 0.0 {
                    return fail("psis must be > 0");
                }
                if theta_sat <= 0.0 || theta_sat > 1.0 {
                    return fail("theta_sat must be in (0, 1]");
                }
                if b == 0.0 {
                    return fail("b must be != 0");
                }
                if ksat <= 0.0 {
                    return fail("ksat must be > 0");
                }
            }
            RetentionCurve::VanGenuchten1980 {
                theta_r,
                theta_s,
                alpha,
                n,
                ksat,
            } => {
                if theta_r <= 0.0 || theta_r > 1.0 {
                    return fail("theta_r must be in (0, 1]");
                }
                if theta_s <= 0.0 || theta_s > 1.0 {
                    return fail("theta_s must be in (0, 1]");
                }
                if theta_s <= theta_r {
                    return fail("theta_s must be > theta_r");
                }
                if alpha <= 0.0 {
                    return fail("alpha must be > 0");
                }
                if n <= 1.0 {
                    return fail("n must be > 1");
                }
                if ksat <= 0.0 {
                    return fail("ksat must be > 0");
                }
            }
            RetentionCurve::Fxw {
                theta_s,
                alpha,
                n,
                m,
                ksat,
                l,
            } => {
                if theta_s <= 0.0 || theta_s > 1.0 {
                    return fail("theta_s must be in (0, 1]");
                }
                if alpha <= 0.0 {
                    return fail("alpha must be > 0");
                }
                if n <= 1.0 || n > 10.0 {
                    return fail("n must be in (1, 10]");
                }
                if m <= 0.0 || m > 1.5 {
                    return fail("m must be in (0, 1.5]");
                }
                if ksat <= 0.0 {
                    return fail("ksat must be > 0");
                }
                if l <= 0.0 {
                    return fail("L must be > 0");
                }
            }
        }
        Ok(())
    }

    /// Saturated volumetric water content of the matric soil (cm/cm).
    pub fn theta_saturated(&self) -> f64 {
        match *self {
            RetentionCurve::Campbell1974 { theta_sat, .. } => theta_sat,
            RetentionCurve::VanGenuchten1980 { theta_s, .. } => theta_s,
            RetentionCurve::Fxw { theta_s, .. } => theta_s,
        }
    }

    /// Lowest volumetric water content the curve can represent (cm/cm).
    pub fn theta_min(&self) -> f64 {
        match *self {
            RetentionCurve::Campbell1974 { .. } => 0.0,
            RetentionCurve::VanGenuchten1980 { theta_r, .. } => theta_r,
            RetentionCurve::Fxw { .. } => 0.0,
        }
    }

    /// Saturated hydraulic conductivity (cm/day).
    pub fn ksat(&self) -> f64 {
        match *self {
            RetentionCurve::Campbell1974 { ksat, .. } => ksat,
            RetentionCurve::VanGenuchten1980 { ksat, .. } => ksat,
            RetentionCurve::Fxw { ksat, .. } => ksat,
        }
    }

    /// Bulk water content at saturation (cm).
    pub fn swc_saturated(&self, geometry: &LayerGeometry) -> f64 {
        self.theta_saturated() * geometry.matric_width()
    }

    /// Theoretical minimum bulk water content (cm).
    pub fn swc_theoretical_min(&self, geometry: &LayerGeometry) -> f64 {
        self.theta_min() * geometry.matric_width()
    }

    /// Convert bulk water content (cm) to matric potential (bar).
    pub fn swc_to_swp(&self, swc: f64, geometry: &LayerGeometry) -> SoilwatResult<f64> {
        geometry.check()?;
        if lt(swc, 0.0) {
            return Err(SoilwatError::invalid_state(
                geometry.index,
                format!("water content {} must be >= 0", swc),
            ));
        }

        let theta = swc.max(0.0) / geometry.matric_width();

        match *self {
            RetentionCurve::Campbell1974 {
                psis, theta_sat, b, ..
            } => {
                if gt(theta, theta_sat) {
                    return Ok(0.0);
                }
                let tmp = (theta / theta_sat).powf(b);
                if tmp <= 0.0 {
                    return Err(SoilwatError::invalid_state(
                        geometry.index,
                        format!(
                            "(theta / theta_sat) ^ b = ({} / {}) ^ {} must be > 0",
                            theta, theta_sat, b
                        ),
                    ));
                }
                Ok(psis / tmp / CM_PER_BAR_CAMPBELL)
            }
            RetentionCurve::VanGenuchten1980 {
                theta_r,
                theta_s,
                alpha,
                n,
                ..
            } => {
                if !gt(theta, theta_r) {
                    return Err(SoilwatError::invalid_state(
                        geometry.index,
                        format!("theta = {} must be > theta_r = {}", theta, theta_r),
                    ));
                }
                if eq(theta, theta_s) {
                    return Ok(0.0);
                }
                if theta > theta_s {
                    return Err(SoilwatError::invalid_state(
                        geometry.index,
                        format!("theta = {} must be <= theta_s = {}", theta, theta_s),
                    ));
                }
                let inv_se = (theta_s - theta_r) / (theta - theta_r);
                let tmp = inv_se.powf(1.0 / (1.0 - 1.0 / n));
                Ok((tmp - 1.0).max(0.0).powf(1.0 / n) / alpha / CM_PER_BAR)
            }
            RetentionCurve::Fxw { theta_s, .. } => {
                if eq(theta, theta_s) {
                    return Ok(0.0);
                }
                if theta > theta_s {
                    return Err(SoilwatError::invalid_state(
                        geometry.index,
                        format!("theta = {} must be <= theta_s = {}", theta, theta_s),
                    ));
                }
                let phi = self.fxw_phi_for_theta(theta).ok_or_else(|| {
                    SoilwatError::invalid_state(
                        geometry.index,
                        format!("FXW root finding did not converge for theta = {}", theta),
                    )
                })?;
                Ok(phi / CM_PER_BAR)
            }
        }
    }

    /// Convert matric potential (bar) to bulk water content (cm).
    pub fn swp_to_swc(&self, swp: f64, geometry: &LayerGeometry) -> SoilwatResult<f64> {
        geometry.check()?;
        if lt(swp, 0.0) {
            return Err(SoilwatError::invalid_state(
                geometry.index,
                format!("water potential {} must be >= 0", swp),
            ));
        }
        let swp = swp.max(0.0);

        let theta = match *self {
            RetentionCurve::Campbell1974 {
                psis, theta_sat, b, ..
            } => {
                let phi = swp * CM_PER_BAR_CAMPBELL;
                if phi < psis {
                    theta_sat
                } else {
                    theta_sat * (psis / phi).powf(1.0 / b)
                }
            }
            RetentionCurve::VanGenuchten1980 {
                theta_r,
                theta_s,
                alpha,
                n,
                ..
            } => {
                let phi = swp * CM_PER_BAR;
                theta_r + (theta_s - theta_r) / (1.0 + (alpha * phi).powf(n)).powf(1.0 - 1.0 / n)
            }
            RetentionCurve::Fxw { .. } => self.fxw_theta_for_phi(swp * CM_PER_BAR),
        };

        Ok(theta * geometry.matric_width())
    }

    /// [`Self::swc_to_swp`] honouring an [`ErrorMode`].
    pub fn swc_to_swp_with_mode(
        &self,
        swc: f64,
        geometry: &LayerGeometry,
        mode: ErrorMode,
    ) -> SoilwatResult<f64> {
        match (self.swc_to_swp(swc, geometry), mode) {
            (Err(e), ErrorMode::Warn) => {
                warn!("{}", e);
                Ok(f64::NAN)
            }
            (res, _) => res,
        }
    }

    /// [`Self::swp_to_swc`] honouring an [`ErrorMode`].
    pub fn swp_to_swc_with_mode(
        &self,
        swp: f64,
        geometry: &LayerGeometry,
        mode: ErrorMode,
    ) -> SoilwatResult<f64> {
        match (self.swp_to_swc(swp, geometry), mode) {
            (Err(e), ErrorMode::Warn) => {
                warn!("{}", e);
                Ok(f64::NAN)
            }
            (res, _) => res,
        }
    }

    /// FXW volumetric water content at tension `phi` (cm).
    ///
    /// $$S_e = \ln\left(e + |\alpha \phi|^n\right)^{-m}$$
    /// $$C_f = 1 - \frac{\ln(1 + \phi / h_r)}{\ln(1 + h_0 / h_r)}$$
    /// $$\theta = \theta_s \, S_e \, C_f$$
    fn fxw_theta_for_phi(&self, phi: f64) -> f64 {
        let RetentionCurve::Fxw {
            theta_s, alpha, n, m, ..
        } = *self
        else {
            return f64::NAN;
        };

        if phi >= FXW_H0 {
            return 0.0;
        }
        let s_e = (E + (alpha * phi).abs().powf(n)).ln().powf(-m);
        let c_f = 1.0 - (1.0 + phi / FXW_HR).ln() / FXW_LOG_H0_HR;
        theta_s * s_e * c_f
    }

    /// Solve the FXW curve for tension (cm) with the ITP bracketing method
    /// (Oliveira & Takahashi 2021).
    ///
    /// Returns `None` if the iteration fails to converge.
    fn fxw_phi_for_theta(&self, theta: f64) -> Option<f64> {
        let tol2 = 2e-9;
        let k1 = 2e-3;
        let k2 = 2.0;
        let n0 = 1;

        let mut a = 0.0;
        let mut b = FXW_H0;
        let mut diff_ba = b - a;
        let mut y_a = theta - self.fxw_theta_for_phi(a);
        let mut y_b = theta - self.fxw_theta_for_phi(b);

        let n_max = (diff_ba / tol2).log2().ceil() as i32 + n0;
        let mut j = 0;

        while diff_ba > tol2 && j <= n_max {
            let x_half = (a + b) / 2.0;
            let r = (tol2 * 2f64.powi(n_max - j) - diff_ba) / 2.0;
            let delta = k1 * diff_ba.powf(k2);

            // Interpolation
            let x_f = (y_b * a - y_a * b) / (y_b - y_a);

            // Truncation
            let diff_hf = x_half - x_f;
            let sigma = if diff_hf == 0.0 { 0.0 } else { diff_hf.signum() };
            let x_t = if delta <= diff_hf.abs() {
                x_f + sigma * delta
            } else {
                x_half
            };

            // Projection
            let x_itp = if (x_t - x_half).abs() <= r {
                x_t
            } else {
                x_half - sigma * r
            };

            // Bracket update
            let y_itp = theta - self.fxw_theta_for_phi(x_itp);
            if y_itp > 0.0 {
                b = x_itp;
                y_b = y_itp;
            } else if y_itp < 0.0 {
                a = x_itp;
                y_a = y_itp;
            } else {
                a = x_itp;
                b = x_itp;
            }
            diff_ba = b - a;
            j += 1;
        }

        let phi = (a + b) / 2.0;
        if diff_ba.abs() > tol2 || !(0.0..=FXW_H0).contains(&phi) {
            None
        } else {
            Some(phi)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn geometry() -> LayerGeometry {
        LayerGeometry {
            index: 0,
            width: 10.0,
            gravel: 0.1,
        }
    }

    fn curves() -> Vec<RetentionCurve> {
        vec![
            RetentionCurve::campbell_from_texture(0.33, 0.33),
            RetentionCurve::VanGenuchten1980 {
                theta_r: 0.1246,
                theta_s: 0.4445,
                alpha: 0.0112,
                n: 1.2673,
                ksat: 7.7851,
            },
            RetentionCurve::Fxw {
                theta_s: 0.437461,
                alpha: 0.050757,
                n: 1.247689,
                m: 0.308681,
                ksat: 22.985379,
                l: 2.697338,
            },
        ]
    }

    #[test]
    fn test_default_curve_is_valid() {
        let curve = RetentionCurve::default();
        assert!(curve.validate().is_ok());
        assert_eq!(curve.name(), "Campbell1974");
    }

    #[test]
    fn test_cosby_pedotransfer() {
        let RetentionCurve::Campbell1974 {
            psis,
            theta_sat,
            b,
            ksat,
        } = RetentionCurve::campbell_from_texture(0.0, 0.0)
        else {
            panic!("expected Campbell1974");
        };
        assert_relative_eq!(psis, 10f64.powf(2.17));
        assert_relative_eq!(theta_sat, 0.505);
        assert_relative_eq!(b, 3.10);
        assert_relative_eq!(ksat, 2.54 * 24.0 * 10f64.powf(-0.6));
    }

    #[test]
    fn test_parameter_validation() {
        for curve in curves() {
            assert!(curve.validate().is_ok(), "{:?}", curve);
        }

        let bad = RetentionCurve::VanGenuchten1980 {
            theta_r: 0.3,
            theta_s: 0.2,
            alpha: 0.01,
            n: 1.5,
            ksat: 1.0,
        };
        assert!(matches!(bad.validate(), Err(SoilwatError::Configuration(_))));

        let bad = RetentionCurve::Fxw {
            theta_s: 0.4,
            alpha: 0.05,
            n: 11.0,
            m: 0.3,
            ksat: 1.0,
            l: 1.0,
        };
        assert!(bad.validate().is_err());

        let bad = RetentionCurve::Campbell1974 {
            psis: 10.0,
            theta_sat: 0.4,
            b: 0.0,
            ksat: 1.0,
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_potential_decreases_with_water_content() {
        let g = geometry();
        for curve in curves() {
            let fc = curve.swp_to_swc(SWP_FIELD_CAPACITY, &g).unwrap();
            let wp = curve.swp_to_swc(SWP_WILTING_POINT, &g).unwrap();
            assert!(wp < fc, "{}: wp={} fc={}", curve.name(), wp, fc);
            assert!(fc <= curve.swc_saturated(&g));

            let swp_fc = curve.swc_to_swp(fc, &g).unwrap();
            let swp_wp = curve.swc_to_swp(wp, &g).unwrap();
            assert!(swp_wp > swp_fc);
        }
    }

    #[test]
    fn test_round_trip_above_field_capacity() {
        let g = geometry();
        for curve in curves() {
            let fc = curve.swp_to_swc(SWP_FIELD_CAPACITY, &g).unwrap();
            let sat = curve.swc_saturated(&g);
            for i in 0..=10 {
                let swc = fc + (sat - fc) * i as f64 / 10.0;
                let swp = curve.swc_to_swp(swc, &g).unwrap();
                let back = curve.swp_to_swc(swp, &g).unwrap();
                assert_relative_eq!(back, swc, epsilon = 1e-6, max_relative = 1e-6);
            }
        }
    }

    #[test]
    fn test_round_trip_below_field_capacity() {
        let g = geometry();
        for curve in curves() {
            let swc = curve.swp_to_swc(30.0, &g).unwrap();
            let swp = curve.swc_to_swp(swc, &g).unwrap();
            assert_relative_eq!(swp, 30.0, max_relative = 1e-5);
        }
    }

    #[test]
    fn test_saturation_maps_to_zero_potential() {
        let g = geometry();
        for curve in curves() {
            let sat = curve.swc_saturated(&g);
            assert_relative_eq!(curve.swc_to_swp(sat, &g).unwrap(), 0.0, epsilon = 1e-9);
            assert_relative_eq!(curve.swp_to_swc(0.0, &g).unwrap(), sat, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_invalid_state_is_reported() {
        let g = geometry();
        let curve = RetentionCurve::default();
        assert!(matches!(
            curve.swc_to_swp(-1.0, &g),
            Err(SoilwatError::InvalidSoilState { layer: 0, .. })
        ));
        assert!(curve.swp_to_swc(-1.0, &g).is_err());

        let gravel_only = LayerGeometry {
            index: 3,
            width: 10.0,
            gravel: 1.0,
        };
        assert!(matches!(
            curve.swc_to_swp(1.0, &gravel_only),
            Err(SoilwatError::InvalidSoilState { layer: 3, .. })
        ));

        let no_width = LayerGeometry {
            index: 0,
            width: 0.0,
            gravel: 0.0,
        };
        assert!(curve.swc_to_swp(1.0, &no_width).is_err());
    }

    #[test]
    fn test_van_genuchten_at_residual_is_invalid() {
        let g = geometry();
        let curve = curves()[1];
        let residual = curve.swc_theoretical_min(&g);
        assert!(curve.swc_to_swp(residual, &g).is_err());
    }

    #[test]
    fn test_warn_mode_returns_sentinel() {
        let g = geometry();
        let curve = RetentionCurve::default();
        let res = curve
            .swc_to_swp_with_mode(-1.0, &g, ErrorMode::Warn)
            .unwrap();
        assert!(res.is_nan());
        assert!(curve
            .swc_to_swp_with_mode(-1.0, &g, ErrorMode::Fatal)
            .is_err());
    }

    #[test]
    fn test_fxw_dry_end() {
        let g = geometry();
        let curve = curves()[2];
        assert_relative_eq!(curve.swp_to_swc(FXW_H0 / CM_PER_BAR, &g).unwrap(), 0.0);
        let swp = curve.swc_to_swp(1e-4, &g).unwrap();
        assert!(swp > 1000.0);
    }

    #[test]
    fn test_serialization() {
        let curve = curves()[1];
        let json = serde_json::to_string(&curve).unwrap();
        assert!(json.contains("VanGenuchten1980"));
        let parsed: RetentionCurve = serde_json::from_str(&json).unwrap();
        assert_eq!(curve, parsed);
    }
}
