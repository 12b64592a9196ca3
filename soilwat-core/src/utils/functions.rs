//! Empirical response curves.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Generalized arctangent response curve.
///
/// $$f(z) = y_{inflec} + \frac{r}{\pi} \arctan\left(\pi \, s \, (z - x_{inflec})\right)$$
///
/// # Arguments
///
/// * `z` - Independent variable
/// * `xinflec` - X-value of the inflection point
/// * `yinflec` - Y-value of the inflection point
/// * `range` - Max y-value minus min y-value at the limits
/// * `slope` - Slope of the line at the inflection point
pub fn tanfunc(z: f64, xinflec: f64, yinflec: f64, range: f64, slope: f64) -> f64 {
    yinflec + (range / PI) * (PI * slope * (z - xinflec)).atan()
}

/// Parameter set for [`tanfunc`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TanfuncParameters {
    /// X-value of the inflection point.
    pub xinflec: f64,
    /// Y-value of the inflection point.
    pub yinflec: f64,
    /// Max y-value minus min y-value at the limits.
    pub range: f64,
    /// Slope of the line at the inflection point.
    pub slope: f64,
}

impl TanfuncParameters {
    pub const fn new(xinflec: f64, yinflec: f64, range: f64, slope: f64) -> Self {
        Self {
            xinflec,
            yinflec,
            range,
            slope,
        }
    }

    /// Evaluate the response curve at `z`.
    pub fn eval(&self, z: f64) -> f64 {
        tanfunc(z, self.xinflec, self.yinflec, self.range, self.slope)
    }
}
