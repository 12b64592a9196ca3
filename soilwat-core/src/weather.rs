//! Daily weather records and monthly sky climatology

use crate::errors::{SoilwatError, SoilwatResult};
use crate::utils::interpolate::monthly_to_daily;
use serde::{Deserialize, Serialize};

/// Accepted range of air temperatures (°C).
pub const TEMPERATURE_LIMIT: f64 = 100.0;

/// Weather of one day as used by the simulation.
///
/// Temperatures in °C, precipitation in cm. The optional forcings override
/// the monthly [`SkyParameters`] for that day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub temp_max: f64,
    pub temp_min: f64,
    pub temp_avg: f64,
    /// Precipitation (cm).
    pub precipitation: f64,
    /// Relative humidity (%).
    pub humidity: Option<f64>,
    /// Wind speed at 2 m (m/s).
    pub wind_speed: Option<f64>,
    /// Cloud cover (%).
    pub cloud_cover: Option<f64>,
    /// Whether the values were produced by the weather generator.
    pub generated: bool,
}

impl WeatherRecord {
    /// A record from temperatures and precipitation; the mean temperature is
    /// the midpoint of the extremes.
    pub fn new(temp_max: f64, temp_min: f64, precipitation: f64) -> Self {
        Self {
            temp_max,
            temp_min,
            temp_avg: (temp_max + temp_min) / 2.0,
            precipitation,
            humidity: None,
            wind_speed: None,
            cloud_cover: None,
            generated: false,
        }
    }

    /// Check that values are physically plausible.
    pub fn validate(&self) -> SoilwatResult<()> {
        for (name, t) in [
            ("maximum temperature", self.temp_max),
            ("minimum temperature", self.temp_min),
            ("mean temperature", self.temp_avg),
        ] {
            if !t.is_finite() || t.abs() > TEMPERATURE_LIMIT {
                return Err(SoilwatError::InputQuality(format!(
                    "{} {} °C outside [-{limit}, {limit}]",
                    name,
                    t,
                    limit = TEMPERATURE_LIMIT
                )));
            }
        }
        if self.temp_min > self.temp_max {
            return Err(SoilwatError::InputQuality(format!(
                "minimum temperature {} exceeds maximum temperature {}",
                self.temp_min, self.temp_max
            )));
        }
        if !self.precipitation.is_finite() || self.precipitation < 0.0 {
            return Err(SoilwatError::InputQuality(format!(
                "precipitation {} cm must be >= 0",
                self.precipitation
            )));
        }
        let percent = |v: Option<f64>| v.map_or(true, |v| (0.0..=100.0).contains(&v));
        if !percent(self.humidity) || !percent(self.cloud_cover) {
            return Err(SoilwatError::InputQuality(
                "relative humidity and cloud cover must be in [0, 100] %".into(),
            ));
        }
        if self.wind_speed.is_some_and(|w| w < 0.0) {
            return Err(SoilwatError::InputQuality(
                "wind speed must be >= 0".into(),
            ));
        }
        Ok(())
    }
}

/// One day of a historical weather archive.
///
/// `None` marks a missing value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherObservation {
    pub temp_max: Option<f64>,
    pub temp_min: Option<f64>,
    /// Precipitation (cm).
    pub precipitation: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    pub cloud_cover: Option<f64>,
}

impl WeatherObservation {
    /// A complete observation.
    pub fn new(temp_max: f64, temp_min: f64, precipitation: f64) -> Self {
        Self {
            temp_max: Some(temp_max),
            temp_min: Some(temp_min),
            precipitation: Some(precipitation),
            ..Self::default()
        }
    }

    /// Whether any of the required values is missing.
    pub fn is_incomplete(&self) -> bool {
        self.temp_max.is_none() || self.temp_min.is_none() || self.precipitation.is_none()
    }

    /// Convert to a record if all required values are present.
    pub fn to_record(&self) -> Option<WeatherRecord> {
        let record = WeatherRecord::new(self.temp_max?, self.temp_min?, self.precipitation?);
        Some(WeatherRecord {
            humidity: self.humidity,
            wind_speed: self.wind_speed,
            cloud_cover: self.cloud_cover,
            ..record
        })
    }
}

/// Monthly sky and snow climatology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkyParameters {
    /// Cloud cover (%).
    pub cloud_cover: [f64; 12],
    /// Relative humidity (%).
    pub humidity: [f64; 12],
    /// Wind speed at 2 m (m/s).
    pub wind_speed: [f64; 12],
    /// Atmospheric transmission coefficient (0-1).
    pub transmission: [f64; 12],
    /// Snow density (kg/m3).
    pub snow_density: [f64; 12],
    /// Number of precipitation events per day.
    pub rain_events_per_day: [f64; 12],
}

impl Default for SkyParameters {
    fn default() -> Self {
        Self {
            cloud_cover: [71.0, 61.0, 61.0, 51.0, 41.0, 31.0, 23.0, 23.0, 31.0, 41.0, 61.0, 61.0],
            humidity: [61.0, 61.0, 61.0, 51.0, 51.0, 51.0, 41.0, 41.0, 51.0, 51.0, 61.0, 61.0],
            wind_speed: [1.3, 2.9, 3.3, 3.8, 3.8, 3.8, 3.3, 3.3, 2.9, 1.3, 1.3, 1.3],
            transmission: [1.0; 12],
            snow_density: [
                213.7, 241.6, 261.0, 308.0, 398.1, 464.5, 400.0, 400.0, 400.0, 140.0, 161.6, 185.1,
            ],
            rain_events_per_day: [1.0; 12],
        }
    }
}

/// Sky values interpolated to one day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailySky {
    pub cloud_cover: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub transmission: f64,
    pub snow_density: f64,
    pub rain_events_per_day: f64,
}

impl SkyParameters {
    /// Check ranges of the monthly values.
    pub fn validate(&self) -> SoilwatResult<()> {
        let in_range = |values: &[f64; 12], lo: f64, hi: f64| {
            values.iter().all(|v| (lo..=hi).contains(v))
        };
        if !in_range(&self.cloud_cover, 0.0, 100.0) || !in_range(&self.humidity, 0.0, 100.0) {
            return Err(SoilwatError::Configuration(
                "monthly cloud cover and humidity must be in [0, 100] %".into(),
            ));
        }
        if !in_range(&self.transmission, 0.0, 1.0) {
            return Err(SoilwatError::Configuration(
                "monthly transmission must be in [0, 1]".into(),
            ));
        }
        if !in_range(&self.wind_speed, 0.0, f64::MAX) {
            return Err(SoilwatError::Configuration(
                "monthly wind speed must be >= 0".into(),
            ));
        }
        if self.snow_density.iter().any(|&d| d <= 0.0) {
            return Err(SoilwatError::Configuration(
                "monthly snow density must be > 0".into(),
            ));
        }
        if !self.rain_events_per_day.iter().all(|&m| m >= 1.0) {
            return Err(SoilwatError::Configuration(
                "rain events per day must be >= 1".into(),
            ));
        }
        Ok(())
    }

    /// Interpolate the monthly values to day `doy` of `year`.
    ///
    /// Precipitation events are not interpolated; the month's value is used.
    pub fn daily(&self, doy: usize, year: i32) -> DailySky {
        let month = crate::time::month_of_doy(doy, year);
        DailySky {
            cloud_cover: monthly_to_daily(&self.cloud_cover, doy, year),
            humidity: monthly_to_daily(&self.humidity, doy, year),
            wind_speed: monthly_to_daily(&self.wind_speed, doy, year),
            transmission: monthly_to_daily(&self.transmission, doy, year),
            snow_density: monthly_to_daily(&self.snow_density, doy, year),
            rain_events_per_day: self.rain_events_per_day[month],
        }
    }
}
