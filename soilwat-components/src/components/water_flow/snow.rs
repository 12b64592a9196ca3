//! Snow accumulation, melt and sublimation (SWAT2K)

use soilwat_core::site::SnowParameters;

/// Result of partitioning one day of precipitation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SnowPartition {
    /// Precipitation falling as rain (cm).
    pub rain: f64,
    /// Precipitation falling as snow (cm SWE).
    pub snowfall: f64,
    /// Water released from the snowpack (cm).
    pub snowmelt: f64,
}

/// Melt rate (cm/(°C day)) on day `doy`, following a sine between the
/// winter and summer solstices.
pub fn melt_rate(params: &SnowParameters, doy: usize) -> f64 {
    (params.rmelt_max + params.rmelt_min) / 2.0
        + ((doy as f64 - 81.0) / 58.09).sin() * (params.rmelt_max - params.rmelt_min) / 2.0
}

/// Partition precipitation into rain and snow and melt the snowpack.
///
/// # Arguments
///
/// * `params` - Snow parameters
/// * `doy` - Day of year
/// * `temp_min`, `temp_max` - Daily air temperatures (°C)
/// * `precipitation` - Daily precipitation (cm)
/// * `snowpack` - Snowpack (cm SWE); updated in place
/// * `snow_temperature` - Lagged snowpack temperature (°C); updated in place
pub fn adjust_snow(
    params: &SnowParameters,
    doy: usize,
    temp_min: f64,
    temp_max: f64,
    precipitation: f64,
    snowpack: &mut f64,
    snow_temperature: &mut f64,
) -> SnowPartition {
    let temp_avg = (temp_min + temp_max) / 2.0;

    let snowfall = if temp_avg <= params.t_min_accu {
        precipitation
    } else {
        0.0
    };
    let rain = precipitation - snowfall;
    *snowpack += snowfall;

    *snow_temperature =
        *snow_temperature * (1.0 - params.lambda_snow) + temp_avg * params.lambda_snow;

    let snowmelt = if *snow_temperature > params.t_max_crit {
        let potential = melt_rate(params, doy)
            * ((*snow_temperature + temp_max) / 2.0 - params.t_max_crit);
        potential.min(*snowpack).max(0.0)
    } else {
        0.0
    };
    *snowpack = (*snowpack - snowmelt).max(0.0);

    SnowPartition {
        rain,
        snowfall,
        snowmelt,
    }
}

/// Sublimation of the snowpack driven by potential evapotranspiration.
///
/// Removes the sublimated water from `snowpack` and returns it.
pub fn snow_loss(snowpack: &mut f64, pet: f64) -> f64 {
    if *snowpack <= 0.0 {
        return 0.0;
    }
    let loss = snowpack.min(0.5 * pet).max(0.0);
    *snowpack -= loss;
    loss
}

/// Snow depth (cm) of `snowpack` (cm SWE) at `density` (kg/m3).
pub fn snow_depth(snowpack: f64, density: f64) -> f64 {
    if density > 0.0 {
        snowpack / density * 1000.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use is_close::is_close;

    #[test]
    fn test_cold_day_accumulates() {
        let params = SnowParameters::default();
        let mut snowpack = 1.0;
        let mut t_snow = -5.0;
        let part = adjust_snow(&params, 20, -10.0, -2.0, 0.5, &mut snowpack, &mut t_snow);
        assert_relative_eq!(part.snowfall, 0.5);
        assert_relative_eq!(part.rain, 0.0);
        assert_relative_eq!(part.snowmelt, 0.0);
        assert_relative_eq!(snowpack, 1.5);
    }

    #[test]
    fn test_warm_day_melts_and_rains() {
        let params = SnowParameters::default();
        let mut snowpack = 1.0;
        let mut t_snow = 2.0;
        let part = adjust_snow(&params, 150, 5.0, 15.0, 0.3, &mut snowpack, &mut t_snow);
        assert_relative_eq!(part.rain, 0.3);
        assert_relative_eq!(part.snowfall, 0.0);
        assert!(part.snowmelt > 0.0);
        assert_relative_eq!(snowpack + part.snowmelt, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_melt_limited_by_snowpack() {
        let params = SnowParameters::default();
        let mut snowpack = 0.01;
        let mut t_snow = 20.0;
        let part = adjust_snow(&params, 180, 20.0, 30.0, 0.0, &mut snowpack, &mut t_snow);
        assert_relative_eq!(part.snowmelt, 0.01);
        assert_relative_eq!(snowpack, 0.0);
    }

    #[test]
    fn test_melt_rate_season() {
        let params = SnowParameters {
            rmelt_min: 0.2,
            rmelt_max: 0.6,
            ..SnowParameters::default()
        };
        assert!(melt_rate(&params, 172) > melt_rate(&params, 355));
    }

    #[test]
    fn test_snow_loss() {
        let mut snowpack = 0.2;
        assert_relative_eq!(snow_loss(&mut snowpack, 0.1), 0.05);
        assert_relative_eq!(snowpack, 0.15);

        let mut snowpack = 0.02;
        assert_relative_eq!(snow_loss(&mut snowpack, 0.5), 0.02);
        assert_relative_eq!(snowpack, 0.0);

        let mut none = 0.0;
        assert_relative_eq!(snow_loss(&mut none, 0.5), 0.0);
    }

    #[test]
    fn test_snow_depth() {
        assert!(is_close!(snow_depth(1.0, 200.0), 5.0));
        assert!(is_close!(snow_depth(0.5, 400.0), 1.25));
        assert_relative_eq!(snow_depth(1.0, 0.0), 0.0);
    }
}
