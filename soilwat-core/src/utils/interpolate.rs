//! Interpolation helpers.

use crate::time::{days_in_month, month_start_doy0, year_length};

/// Interpolate twelve monthly values to a daily value.
///
/// Each monthly value is located at the middle of its month; days between two
/// month centres are linearly interpolated, wrapping from December to January.
///
/// # Arguments
///
/// * `monthly` - Values for January to December
/// * `doy` - Day of year (1-based)
/// * `year` - Calendar year (leap years shift the month centres)
pub fn monthly_to_daily(monthly: &[f64; 12], doy: usize, year: i32) -> f64 {
    let n_days = year_length(year) as f64;
    let centre = |m: usize| month_start_doy0(m, year) as f64 + days_in_month(m, year) as f64 / 2.0;
    let x = doy.clamp(1, year_length(year)) as f64 - 0.5;

    // Locate the month whose centre is at or before `x`
    let mut lower = 11;
    for m in 0..12 {
        if centre(m) <= x {
            lower = m;
        }
    }
    let upper = (lower + 1) % 12;

    let mut x0 = centre(lower);
    let mut x1 = centre(upper);
    let mut xx = x;
    if x1 <= x0 {
        // Wrap around the year end
        if xx < x0 {
            xx += n_days;
        }
        x1 += n_days;
    }
    if x0 > xx {
        x0 -= n_days;
    }

    let w = (xx - x0) / (x1 - x0);
    monthly[lower] + w * (monthly[upper] - monthly[lower])
}

/// Linear interpolation of `y` at `x` through the points `(xs, ys)`.
///
/// Values outside the range of `xs` are held constant at the end points.
/// `xs` must be sorted in increasing order.
pub fn linear(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    debug_assert_eq!(xs.len(), ys.len());
    match xs.len() {
        0 => f64::NAN,
        1 => ys[0],
        n => {
            if x <= xs[0] {
                return ys[0];
            }
            if x >= xs[n - 1] {
                return ys[n - 1];
            }
            let i = xs.partition_point(|&v| v <= x).saturating_sub(1);
            let dx = xs[i + 1] - xs[i];
            if dx <= 0.0 {
                ys[i]
            } else {
                ys[i] + (x - xs[i]) * (ys[i + 1] - ys[i]) / dx
            }
        }
    }
}
