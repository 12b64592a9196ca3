//! Potential evapotranspiration (Penman 1948)
//!
//! Daily PET from top-of-atmosphere solar radiation reduced by cloud cover,
//! net long-wave radiation and an aerodynamic term driven by the vapor
//! pressure deficit and wind speed:
//!
//! $$PET = \frac{\Delta R_n + \gamma E_a}{\Delta + \gamma}$$

use std::f64::consts::PI;

/// Langley to evaporative millimetres.
const LY_TO_MM: f64 = 0.0168;
/// W/m2 to evaporative millimetres per day.
const W_PER_M2_TO_MM_PER_DAY: f64 = 0.0346988;
/// m/s to miles per day.
const M_PER_S_TO_MILES_PER_DAY: f64 = 53.686471;
/// kPa/K to mmHg/°F.
const KPA_PER_K_TO_MMHG_PER_F: f64 = 4.1670093484;
/// Solar constant (ly/min).
const SOLAR_CONSTANT: f64 = 1.952;
/// Minimum PET (cm/day).
const MIN_PET: f64 = 0.01;

/// Site and weather values of one day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PetInputs {
    /// Day of year (1-based).
    pub doy: usize,
    /// Mean air temperature (°C).
    pub temp_avg: f64,
    /// Latitude (radians).
    pub latitude: f64,
    /// Elevation (m a.s.l.).
    pub elevation: f64,
    /// Slope (degrees).
    pub slope: f64,
    /// Aspect (degrees, south = 180; -1 for none).
    pub aspect: f64,
    /// Surface albedo.
    pub albedo: f64,
    /// Relative humidity (%).
    pub humidity: f64,
    /// Wind speed at 2 m (m/s).
    pub wind_speed: f64,
    /// Cloud cover (%).
    pub cloud_cover: f64,
    /// Atmospheric transmission coefficient.
    pub transmission: f64,
}

/// Solar declination (radians) after Spencer (1971).
pub fn solar_declination(doy: usize) -> f64 {
    let day_angle = 2.0 * PI * (doy as f64 - 1.0) / 365.0;
    0.006918 - 0.399912 * day_angle.cos() + 0.070257 * day_angle.sin()
        - 0.006758 * (2.0 * day_angle).cos()
        + 0.000907 * (2.0 * day_angle).sin()
        - 0.002697 * (3.0 * day_angle).cos()
        + 0.001480 * (3.0 * day_angle).sin()
}

/// Sunset hour angle (radians) on a horizontal surface.
pub fn sunset_hour_angle(latitude: f64, declination: f64) -> f64 {
    (-latitude.tan() * declination.tan()).clamp(-1.0, 1.0).acos()
}

/// Daily top-of-atmosphere solar radiation (ly/day), Sellers (1965).
///
/// Sloped sites integrate instantaneous radiation from sunrise to sunset.
fn solar_radiation_toa(
    latitude: f64,
    slope: f64,
    aspect: f64,
    sunset: f64,
    declination: f64,
) -> f64 {
    let (sin_lat, cos_lat) = latitude.sin_cos();
    let (sin_decl, cos_decl) = declination.sin_cos();

    let solrad = if slope != 0.0 && aspect != -1.0 {
        let step = sunset / 24.0;
        let azimuth_slope = (aspect - 180.0).to_radians();
        let (sin_slope, cos_slope) = slope.to_radians().sin_cos();
        let mut total = 0.0;
        let mut hour = -sunset;
        while hour <= sunset && step > 0.0 {
            let cos_z = sin_lat * sin_decl + cos_lat * cos_decl * hour.cos();
            let sin_z = (1.0 - cos_z * cos_z).max(0.0).sqrt();
            if sin_z > 0.0 {
                let cos_a = (sin_lat * cos_z - sin_decl) / (cos_lat * sin_z);
                let sin_a = cos_decl * hour.sin() / sin_z;
                let azimuth = sin_a.atan2(cos_a);
                total += step * (cos_z * cos_slope + sin_z * sin_slope * (azimuth - azimuth_slope).cos());
            } else {
                total += step * cos_z * cos_slope;
            }
            hour += step;
        }
        total / 2.0
    } else {
        sunset * sin_lat * sin_decl + cos_lat * cos_decl * sunset.sin()
    };

    1440.0 / PI * SOLAR_CONSTANT * solrad
}

/// Saturation vapor pressure (mmHg) at `temp` (°C).
pub fn saturation_vapor_pressure(temp: f64) -> f64 {
    (6.11_f64.ln() + 5418.38 * (0.00366 - 1.0 / (temp + 273.0))).exp() * 0.75
}

/// Potential evapotranspiration (cm/day).
pub fn petfunc(inputs: &PetInputs) -> f64 {
    let clear_sky = 1.0 - inputs.cloud_cover / 100.0;
    let wind = inputs.wind_speed * M_PER_S_TO_MILES_PER_DAY;

    let declination = solar_declination(inputs.doy);
    let sunset = sunset_hour_angle(inputs.latitude, declination);
    let rs = solar_radiation_toa(
        inputs.latitude,
        inputs.slope,
        inputs.aspect,
        sunset,
        declination,
    ) * LY_TO_MM;
    let rc = rs * (0.18 + 0.55 * clear_sky) * inputs.transmission;

    let rbb = 5.670374 * ((inputs.temp_avg + 273.15) * 0.01).powi(4) * W_PER_M2_TO_MM_PER_DAY;

    let pressure = 101.3 * ((293.0 - 0.0065 * inputs.elevation) / 293.0).powf(5.26);
    let gamma = 0.000665 * pressure * KPA_PER_K_TO_MMHG_PER_F;

    let vapor = saturation_vapor_pressure(inputs.temp_avg);
    let delta = 4098.0 * vapor / (inputs.temp_avg + 237.3).powi(2) * 5.0 / 9.0;
    let actual_vapor = inputs.humidity * vapor / 100.0;

    let ea = 0.35 * (vapor - actual_vapor) * (1.0 + 0.0098 * wind);
    let rn = (1.0 - inputs.albedo) * rc
        - rbb * (0.56 - 0.092 * actual_vapor.sqrt()) * (0.10 + 0.90 * clear_sky);

    let pet = (delta * rn + gamma * ea) / (delta + gamma);
    (0.1 * pet).max(MIN_PET)
}
