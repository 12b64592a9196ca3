//! Daily driver of one simulated site.
//!
//! A [`Simulation`] owns everything one soil column needs between days: the
//! configuration, the derived soil profile, the weather source, the weather
//! generator, the soil temperature solver and the column state. Days are run
//! in calendar order with [`Simulation::run_day`], or a year at a time with
//! [`Simulation::run_year`].

use crate::components::soil_temperature::SoilTemperatureSolver;
use crate::components::water_flow::{DayDrivers, WaterFlow};
use crate::components::weather_generator::WeatherGenerator;
use crate::water_balance::WaterBalanceChecker;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use soilwat_core::errors::{SoilwatError, SoilwatResult};
use soilwat_core::site::SiteConfiguration;
use soilwat_core::soil::SoilProfile;
use soilwat_core::state::{DailyFluxes, SoilWaterState};
use soilwat_core::time::year_length;
use soilwat_core::weather::{WeatherObservation, WeatherRecord};
use std::collections::HashMap;

/// Historical daily weather, one vector per calendar year indexed by
/// zero-based day of year.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherArchive {
    years: HashMap<i32, Vec<WeatherObservation>>,
}

impl WeatherArchive {
    /// An empty archive.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the observations of `year`, replacing any stored before.
    pub fn insert_year(&mut self, year: i32, days: Vec<WeatherObservation>) {
        self.years.insert(year, days);
    }

    /// Observation of `year` and 1-based `doy`; `None` if the archive has no
    /// entry for that day.
    pub fn get(&self, year: i32, doy: usize) -> Option<&WeatherObservation> {
        if doy == 0 {
            return None;
        }
        self.years.get(&year).and_then(|days| days.get(doy - 1))
    }
}

/// Where daily weather comes from; chosen once per simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WeatherSource {
    /// Observations only; a missing value is an error.
    Historical(WeatherArchive),
    /// Every day comes from the weather generator.
    Generated,
    /// Observations, with days that miss a required value generated.
    HistoricalWithGapFill(WeatherArchive),
}

impl WeatherSource {
    fn needs_generator(&self) -> bool {
        !matches!(self, WeatherSource::Historical(_))
    }
}

/// Output of one simulated day.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationDay {
    pub year: i32,
    pub doy: usize,
    pub weather: WeatherRecord,
    pub fluxes: DailyFluxes,
}

/// Annual totals (cm) of one simulated year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct YearSummary {
    pub year: i32,
    pub precipitation: f64,
    pub pet: f64,
    pub aet: f64,
    pub transpiration: f64,
    pub evaporation: f64,
    pub runoff: f64,
    pub deep_drainage: f64,
    /// Days without a valid soil temperature profile.
    pub soil_temperature_failures: usize,
    /// Generated weather days.
    pub generated_days: usize,
}

impl YearSummary {
    fn add(&mut self, day: &SimulationDay) {
        let f = &day.fluxes;
        self.precipitation += day.weather.precipitation;
        self.pet += f.pet;
        self.aet += f.aet;
        self.transpiration += f.transpiration_total();
        self.evaporation += f.evaporation_total();
        self.runoff += f.runoff + f.snow_runoff;
        self.deep_drainage += f.deep_drainage;
        if f.soil_temperature_error {
            self.soil_temperature_failures += 1;
        }
        if day.weather.generated {
            self.generated_days += 1;
        }
    }
}

/// One soil column run day by day.
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SiteConfiguration,
    profile: SoilProfile,
    weather: WeatherSource,
    generator: Option<WeatherGenerator>,
    soil_temperature: SoilTemperatureSolver,
    water_flow: WaterFlow,
    state: SoilWaterState,
    balance: Option<WaterBalanceChecker>,
    yesterday_precipitation: f64,
}

impl Simulation {
    /// Set up a site.
    ///
    /// # Arguments
    ///
    /// * `config` - Site configuration; validated here
    /// * `weather` - Weather source
    /// * `seed` - Seed of the weather generator
    ///
    /// # Returns
    ///
    /// A configuration error if the configuration is invalid, or if the
    /// weather source needs the generator but no Markov parameters are given
    pub fn new(config: SiteConfiguration, weather: WeatherSource, seed: u64) -> SoilwatResult<Self> {
        config.validate()?;
        let profile = config.build_profile()?;

        let generator = if weather.needs_generator() {
            let markov = config.markov.clone().ok_or_else(|| {
                SoilwatError::Configuration(
                    "weather generation requires markov parameters".into(),
                )
            })?;
            Some(WeatherGenerator::from_parameters(markov, seed)?)
        } else {
            None
        };

        let state = SoilWaterState::new(&profile);
        let mut soil_temperature =
            SoilTemperatureSolver::from_parameters(config.site.soil_temperature.clone());
        if config.site.soil_temperature.enabled {
            soil_temperature.initialize(&profile, &state.soil_temperature.today)?;
        }
        let water_flow = WaterFlow::from_parameters(config.site.clone());

        info!(
            "site set up with {} soil layers to {} cm",
            profile.len(),
            profile.depth()
        );
        Ok(Self {
            config,
            profile,
            weather,
            generator,
            soil_temperature,
            water_flow,
            state,
            balance: None,
            yesterday_precipitation: 0.0,
        })
    }

    /// Check the water balance of every following day.
    pub fn with_balance_checks(mut self) -> Self {
        self.balance = Some(WaterBalanceChecker::new());
        self
    }

    /// Site configuration the simulation was built from.
    pub fn config(&self) -> &SiteConfiguration {
        &self.config
    }

    /// Soil profile derived from the configuration.
    pub fn profile(&self) -> &SoilProfile {
        &self.profile
    }

    /// Water state at the end of the last simulated day.
    pub fn state(&self) -> &SoilWaterState {
        &self.state
    }

    /// Soil temperature solver of the site.
    pub fn soil_temperature(&self) -> &SoilTemperatureSolver {
        &self.soil_temperature
    }

    /// Water balance counts, if checks are enabled.
    pub fn balance(&self) -> Option<&WaterBalanceChecker> {
        self.balance.as_ref()
    }

    /// Weather of one day from the configured source.
    ///
    /// Errors with [`SoilwatError::MissingWeather`] if a historical value is
    /// missing and nothing can generate it, and with
    /// [`SoilwatError::InputQuality`] if the values are implausible.
    pub fn weather(&mut self, year: i32, doy: usize) -> SoilwatResult<WeatherRecord> {
        if doy == 1 {
            if let Some(generator) = self.generator.as_mut() {
                generator.reset_year();
            }
        }

        let observed = match &self.weather {
            WeatherSource::Historical(archive) | WeatherSource::HistoricalWithGapFill(archive) => {
                archive.get(year, doy).copied().unwrap_or_default()
            }
            WeatherSource::Generated => WeatherObservation::default(),
        };

        let record = match observed.to_record() {
            Some(record) => record,
            None => {
                let generator = self
                    .generator
                    .as_mut()
                    .ok_or(SoilwatError::MissingWeather { year, doy })?;
                let day = generator.generate_day(doy, self.yesterday_precipitation)?;
                if !matches!(self.weather, WeatherSource::Generated) {
                    debug!("generated missing weather of year {} day {}", year, doy);
                }
                WeatherRecord {
                    humidity: observed.humidity,
                    wind_speed: observed.wind_speed,
                    cloud_cover: observed.cloud_cover,
                    generated: true,
                    ..WeatherRecord::new(day.temp_max, day.temp_min, day.precipitation)
                }
            }
        };
        record.validate()?;
        Ok(record)
    }

    /// Simulate one day.
    pub fn run_day(&mut self, year: i32, doy: usize) -> SoilwatResult<SimulationDay> {
        let weather = self.weather(year, doy)?;
        let sky = self.config.sky.daily(doy, year);
        let vegetation = self.config.vegetation.daily(doy, year);
        let drivers = DayDrivers {
            doy,
            weather: &weather,
            sky: &sky,
            composition: &self.config.vegetation,
            vegetation: &vegetation,
        };

        let before = self.balance.as_ref().map(|_| self.state.clone());
        let fluxes = self.water_flow.run_one_day(
            &drivers,
            &self.profile,
            &mut self.state,
            &mut self.soil_temperature,
        )?;
        if fluxes.soil_temperature_error {
            warn!(
                "soil temperature of year {} day {} could not be computed",
                year, doy
            );
        }
        if let (Some(checker), Some(before)) = (self.balance.as_mut(), before) {
            checker.check_day(&before, &self.state, weather.precipitation, &fluxes);
        }

        self.yesterday_precipitation = weather.precipitation;
        Ok(SimulationDay {
            year,
            doy,
            weather,
            fluxes,
        })
    }

    /// Simulate every day of `year` and return the annual totals.
    pub fn run_year(&mut self, year: i32) -> SoilwatResult<YearSummary> {
        let mut summary = YearSummary {
            year,
            ..YearSummary::default()
        };
        for doy in 1..=year_length(year) {
            let day = self.run_day(year, doy)?;
            summary.add(&day);
        }
        info!(
            "year {}: precipitation {:.2} cm, aet {:.2} cm, deep drainage {:.2} cm",
            year, summary.precipitation, summary.aet, summary.deep_drainage
        );
        Ok(summary)
    }

    /// Simulate the years `start..=end`.
    pub fn run(&mut self, start: i32, end: i32) -> SoilwatResult<Vec<YearSummary>> {
        (start..=end).map(|year| self.run_year(year)).collect()
    }
}
