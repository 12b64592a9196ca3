//! Daily soil water and soil energy balance of a single soil column.
//!
//! The model is split into two crates that are re-exported here:
//!
//! - [`soilwat_core`]: parameters, soil profile, state and shared utilities
//! - [`soilwat_components`]: the weather generator, the water flow engine, the soil
//!   temperature solver and the daily [`Simulation`] driver
//!
//! ```no_run
//! use soilwat::{Simulation, SiteConfiguration, WeatherSource};
//!
//! let config = SiteConfiguration::from_toml_str(
//!     r#"
//!     [site]
//!     latitude = 40.8
//!
//!     [markov]
//!     "#,
//! )?;
//! let mut simulation = Simulation::new(config, WeatherSource::Generated, 42)?;
//! for summary in simulation.run(2001, 2010)? {
//!     println!("{}: {:.1} cm deep drainage", summary.year, summary.deep_drainage);
//! }
//! # Ok::<(), soilwat::SoilwatError>(())
//! ```

pub use soilwat_components;
pub use soilwat_core;

pub use soilwat_components::simulation::{
    Simulation, SimulationDay, WeatherArchive, WeatherSource, YearSummary,
};
pub use soilwat_components::water_balance::{BalanceCheck, WaterBalanceChecker};
pub use soilwat_core::errors::{SoilwatError, SoilwatResult};
pub use soilwat_core::site::SiteConfiguration;
